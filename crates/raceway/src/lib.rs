//! Raceway - a pipes-and-filters runtime for embedded and host software.
//!
//! An application is expressed as a static graph of independent components
//! whose typed ports are joined by connections, with a cooperative reactor
//! driving execution. Every data-carrying connection owns a bounded
//! lock-free SPSC ring, which is what makes a connection safely usable
//! across execution contexts — thread, main loop, or interrupt handler —
//! without locks and without allocating at steady state.
//!
//! # Key pieces
//!
//! - [`Ring`]: the SPSC ring buffer under every connection (16-bit wrapping
//!   counters, release/acquire publication)
//! - [`OutPort`]/[`InPort`]/[`InOutPort`] and [`connect`]: typed endpoints
//!   and the binding between them
//! - [`OutTrigger`]/[`InTrigger`]: payload-free connections carrying only
//!   edge counts
//! - [`Pool`]: fixed-address elements for zero-copy passing by handle
//! - [`Component`]/[`Reactor`]: run-to-completion units, woken only when
//!   their inputs have data
//! - [`Platform`]: the one-function porting interface for idle waiting
//!
//! # Example
//!
//! ```
//! use raceway::{connect, Component, InPort, OutPort, Reactor, Readiness};
//!
//! struct Doubler {
//!     readiness: Readiness,
//!     input: InPort<u32>,
//!     output: OutPort<u32>,
//! }
//!
//! impl Doubler {
//!     fn new() -> Self {
//!         let readiness = Readiness::new();
//!         Self {
//!             input: InPort::new(&readiness),
//!             output: OutPort::new(),
//!             readiness,
//!         }
//!     }
//! }
//!
//! impl Component for Doubler {
//!     fn readiness(&self) -> &Readiness {
//!         &self.readiness
//!     }
//!
//!     fn run(&mut self) {
//!         while let Some(value) = self.input.receive() {
//!             self.output.send(value * 2);
//!         }
//!     }
//! }
//!
//! let doubler = Doubler::new();
//! let stimulus = OutPort::new();
//! let response = InPort::detached();
//! let _wiring = [
//!     connect(&stimulus, &doubler.input, 4),
//!     connect(&doubler.output, &response, 4),
//! ];
//!
//! let mut reactor = Reactor::new();
//! reactor.add(Box::new(doubler));
//! reactor.start();
//!
//! stimulus.send(21);
//! reactor.run();
//! assert_eq!(response.receive(), Some(42));
//! ```

mod component;
mod invariants;
mod platform;
mod pool;
mod port;
mod reactor;
mod ring;
mod trigger;

pub use component::{Component, Readiness};
pub use platform::{Platform, YieldWait};
pub use pool::{Pool, PoolItem};
pub use port::{
    bind_constant, connect, connect_pair, disconnect, Connection, InOutPort, InPort, OutPort,
    TrySendError,
};
pub use reactor::Reactor;
pub use ring::Ring;
pub use trigger::{connect_trigger, InTrigger, OutTrigger};
