//! Trigger connection tests: pulse round trips, reconnection, the 16-bit
//! saturation boundary, and a threaded pulse stream.

use raceway::{connect_trigger, disconnect, InTrigger, OutTrigger};
use std::hint;
use std::thread;

#[test]
fn send_receive_pulse() {
    let out = OutTrigger::new();
    let input = InTrigger::detached();
    let _wiring = connect_trigger(&out, &input);

    assert!(!input.peek());
    assert!(out.send());
    assert!(input.peek());
    assert!(input.receive());
    assert!(!input.peek());
    assert!(!input.receive());
}

#[test]
fn reconnect_restores_service() {
    let out = OutTrigger::new();
    let input = InTrigger::detached();

    for _ in 0..3 {
        let wiring = connect_trigger(&out, &input);

        assert!(out.send());
        assert!(input.peek());
        assert!(input.receive());

        disconnect(wiring);

        assert!(!input.full());
        assert!(!out.send());
        assert!(!input.peek());
        assert!(!input.receive());
    }
}

#[test]
fn saturates_at_the_wrap_boundary() {
    let out = OutTrigger::new();
    let input = InTrigger::detached();
    let _wiring = connect_trigger(&out, &input);

    // One round trip first, so saturation is checked away from zero.
    assert!(out.send());
    assert!(input.receive());

    for _ in 0..u16::MAX {
        assert!(out.send());
    }
    assert!(!out.send());
    assert!(out.full());
    assert!(input.full());

    for _ in 0..u16::MAX {
        assert!(input.peek());
        assert!(input.receive());
    }
    assert!(!input.peek());
    assert!(!input.receive());
    assert!(!out.full());
}

#[test]
fn threaded_pulse_stream() {
    const COUNT: u32 = 100_000;

    let out = OutTrigger::new();
    let input = InTrigger::detached();
    let _wiring = connect_trigger(&out, &input);

    let producer = thread::spawn(move || {
        for _ in 0..COUNT {
            while !out.send() {
                hint::spin_loop();
            }
        }
    });

    let mut received = 0;
    while received < COUNT {
        if input.receive() {
            received += 1;
        } else {
            hint::spin_loop();
        }
    }

    producer.join().unwrap();
    assert!(!input.peek());
}
