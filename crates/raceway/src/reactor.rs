use crate::component::Component;
use crate::platform::{Platform, YieldWait};
use std::sync::Arc;

/// The cooperative scheduler driving a component graph.
///
/// Components are registered explicitly with [`add`](Self::add) and run
/// demand-driven: a sweep of [`run`](Self::run) invokes only the components
/// whose inputs report data or whose request flag was raised. Putting
/// `reactor.run()` in a `loop` in `main` is the typical shape on a
/// microcontroller.
///
/// The reactor thread is the only caller of component `run`/`start`/`stop`;
/// other contexts interact with the graph solely through port operations.
pub struct Reactor {
    components: Vec<Box<dyn Component>>,
    running: bool,
    platform: Arc<dyn Platform>,
}

impl Reactor {
    /// Creates a reactor with the host default platform.
    pub fn new() -> Self {
        Self::with_platform(Arc::new(YieldWait))
    }

    /// Creates a reactor with a custom [`Platform`].
    pub fn with_platform(platform: Arc<dyn Platform>) -> Self {
        Self {
            components: Vec::new(),
            running: false,
            platform,
        }
    }

    /// Registers a component. Components are swept in registration order.
    ///
    /// Registration while running is allowed (the list is append-only) but
    /// the component's `start` hook will not be invoked retroactively.
    pub fn add(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    /// Performs second-stage initialization of every registered component,
    /// in registration order, and transitions to running.
    ///
    /// # Panics
    ///
    /// Panics if already running.
    pub fn start(&mut self) {
        assert!(!self.running, "reactor is already running");

        for component in &mut self.components {
            component.start();
        }
        self.running = true;
    }

    /// Symmetrical deinitialization, see [`start`](Self::start).
    ///
    /// # Panics
    ///
    /// Panics if not running.
    pub fn stop(&mut self) {
        assert!(self.running, "reactor is not running");

        for component in &mut self.components {
            component.stop();
        }
        self.running = false;
    }

    /// One scheduling sweep.
    ///
    /// Walks the components in registration order; each one whose request
    /// flag was set (consumed here) or whose inputs report data is run
    /// exactly once. Data sent to a component later in the order is seen in
    /// this same sweep; data sent backwards fires on the next sweep. If
    /// nothing ran, `Platform::wait_for_event` is called once.
    ///
    /// # Panics
    ///
    /// Panics if not running.
    pub fn run(&mut self) {
        assert!(self.running, "reactor is not running");

        let mut ran_something = false;
        for component in &mut self.components {
            if component.readiness().take_runnable() {
                component.run();
                ran_something = true;
            }
        }

        if !ran_something {
            self.platform.wait_for_event();
        }
    }

    /// Drops all registered components, returning the reactor to its
    /// unconfigured state. Meant for tests; in production this loses every
    /// registration.
    pub fn reset(&mut self) {
        self.components.clear();
        self.running = false;
    }
}

impl Default for Reactor {
    fn default() -> Self {
        Self::new()
    }
}
