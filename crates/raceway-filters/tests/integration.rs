//! End-to-end graphs driven through the reactor: timer-fed counter chains,
//! inversion, toggling, and prioritized merging, with idle-wait accounting.

use raceway::{connect, InPort, OutPort, Platform, Reactor};
use raceway_filters::{Combine, Counter, Invert, SoftwareTimer, Tick, Toggle, TICK};
use std::array;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingPlatform {
    waits: AtomicUsize,
}

impl CountingPlatform {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            waits: AtomicUsize::new(0),
        })
    }

    fn waits(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }
}

impl Platform for CountingPlatform {
    fn wait_for_event(&self) {
        self.waits.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn timer_counter_chain_reaches_one_hundred() {
    let mut reactor = Reactor::new();

    let timer = SoftwareTimer::new(1);
    let counter = Counter::<Tick>::new(u32::MAX);
    let sink = InPort::detached();

    let _wiring = [
        connect(timer.out_tick(), &counter.input, 1),
        connect(&counter.output, &sink, 1),
    ];

    reactor.add(Box::new(timer.clone()));
    reactor.add(Box::new(counter));

    reactor.start();

    let mut final_count = 0;
    while final_count < 100 {
        timer.isr();
        reactor.run();
        if let Some(count) = sink.receive() {
            final_count = count;
        }
    }
    reactor.stop();

    assert_eq!(final_count, 100);
}

#[test]
fn two_counter_chain_waits_once_per_idle_sweep() {
    let platform = CountingPlatform::new();
    let mut reactor = Reactor::with_platform(platform.clone());

    let timer = SoftwareTimer::new(1);
    let counter_a = Counter::<Tick>::new(u32::MAX);
    let counter_b = Counter::<u32>::new(u32::MAX);
    let sink = InPort::detached();

    let _wiring = [
        connect(timer.out_tick(), &counter_a.input, 1),
        connect(&counter_a.output, &counter_b.input, 1),
        connect(&counter_b.output, &sink, 1),
    ];

    reactor.add(Box::new(timer.clone()));
    reactor.add(Box::new(counter_a));
    reactor.add(Box::new(counter_b));

    reactor.start();

    for pulse in 1..=100u32 {
        timer.isr();

        // The stimulated sweep drains the whole chain forward; no wait.
        reactor.run();
        assert_eq!(platform.waits(), (pulse - 1) as usize);
        assert_eq!(sink.receive(), Some(pulse));

        // The next sweep finds nothing and waits exactly once.
        reactor.run();
        assert_eq!(platform.waits(), pulse as usize);
    }

    reactor.stop();
}

#[test]
fn invert_round_trips_through_the_reactor() {
    let mut reactor = Reactor::new();

    let invert = Invert::<bool>::new();
    let stimulus = OutPort::new();
    let response = InPort::detached();
    let _wiring = [
        connect(&stimulus, &invert.input, 1),
        connect(&invert.output, &response, 1),
    ];

    reactor.add(Box::new(invert));
    reactor.start();

    stimulus.send(false);
    reactor.run();
    assert_eq!(response.receive(), Some(true));

    stimulus.send(true);
    reactor.run();
    assert_eq!(response.receive(), Some(false));
}

#[test]
fn toggle_produces_an_alternating_stream() {
    let mut reactor = Reactor::new();

    let toggle = Toggle::new();
    let stimulus = OutPort::new();
    let response = InPort::detached();
    let _wiring = [
        connect(&stimulus, &toggle.tick, 1),
        connect(&toggle.output, &response, 1),
    ];

    reactor.add(Box::new(toggle));
    reactor.start();

    for want in [true, false, true, false] {
        stimulus.send(TICK);
        reactor.run();
        assert_eq!(response.receive(), Some(want));
    }
}

#[test]
fn combine_merges_with_index_priority() {
    let mut reactor = Reactor::new();

    let combine = Combine::<char, 5>::new();
    let stimuli: [OutPort<char>; 5] = array::from_fn(|_| OutPort::new());
    let response = InPort::detached();

    let mut wiring = vec![connect(&combine.output, &response, 5)];
    for (stimulus, input) in stimuli.iter().zip(&combine.inputs) {
        wiring.push(connect(stimulus, input, 1));
    }

    reactor.add(Box::new(combine));
    reactor.start();

    stimuli[0].send('0');
    stimuli[2].send('2');
    stimuli[4].send('4');
    reactor.run();

    assert_eq!(response.receive(), Some('0'));
    assert_eq!(response.receive(), Some('2'));
    assert_eq!(response.receive(), Some('4'));
    assert_eq!(response.receive(), None);
}

#[test]
fn timer_component_is_quiet_between_periods() {
    let platform = CountingPlatform::new();
    let mut reactor = Reactor::with_platform(platform.clone());

    let timer = SoftwareTimer::new(4);
    let counter = Counter::<Tick>::new(u32::MAX);
    let sink = InPort::detached();
    let _wiring = [
        connect(timer.out_tick(), &counter.input, 1),
        connect(&counter.output, &sink, 1),
    ];

    reactor.add(Box::new(timer.clone()));
    reactor.add(Box::new(counter));
    reactor.start();

    // Three system ticks inside the period: every sweep is idle.
    for _ in 0..3 {
        timer.isr();
        reactor.run();
    }
    assert_eq!(platform.waits(), 3);
    assert_eq!(sink.receive(), None);

    // The fourth tick completes the period.
    timer.isr();
    reactor.run();
    assert_eq!(platform.waits(), 3);
    assert_eq!(sink.receive(), Some(1));
}

/// A component graph wholly owned by the reactor still talks to the
/// outside world through detached edge ports.
#[test]
fn graph_edges_are_ordinary_ports() {
    let mut reactor = Reactor::new();

    let invert = Invert::<bool>::new();
    let toggle = Toggle::new();
    let ticks = OutPort::new();
    let out = InPort::detached();

    let _wiring = [
        connect(&ticks, &toggle.tick, 1),
        connect(&toggle.output, &invert.input, 1),
        connect(&invert.output, &out, 1),
    ];

    reactor.add(Box::new(toggle));
    reactor.add(Box::new(invert));
    reactor.start();

    ticks.send(TICK);
    reactor.run();
    // Toggle goes false -> true, invert flips it back to false.
    assert_eq!(out.receive(), Some(false));
}
