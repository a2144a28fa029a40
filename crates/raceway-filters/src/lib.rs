//! Stock filter components for the raceway runtime.
//!
//! Thin users of the core: each component owns a [`Readiness`] record and
//! its ports, and does one small thing in its `run` body. They exist to be
//! wired between an application's own components — inverting a flag stream,
//! counting ticks, fanning a value out, merging several streams into one.
//!
//! [`Readiness`]: raceway::Readiness

mod count;
mod fanout;
mod timer;
mod transform;

pub use count::{Counter, UpDownCounter};
pub use fanout::{Combine, Split};
pub use timer::{SoftwareTimer, Tick, Toggle, TICK};
pub use transform::{Convert, Invert};
