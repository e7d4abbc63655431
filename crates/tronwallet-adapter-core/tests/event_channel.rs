use std::sync::{Arc, Mutex};

use tronwallet_adapter_core::{AdapterEvent, AdapterState, EventChannel, EventName};

fn recorder() -> (Arc<Mutex<Vec<String>>>, EventChannel) {
    (Arc::new(Mutex::new(Vec::new())), EventChannel::new())
}

#[test]
fn dispatches_in_registration_order() {
    let (seen, channel) = recorder();
    for tag in ["first", "second", "third"] {
        let seen = Arc::clone(&seen);
        channel.on(EventName::Connect, move |event| {
            if let AdapterEvent::Connect(address) = event {
                seen.lock().expect("lock").push(format!("{tag}:{address}"));
            }
        });
    }
    channel.emit(&AdapterEvent::Connect("TAddr".to_owned()));
    assert_eq!(
        *seen.lock().expect("lock"),
        vec!["first:TAddr", "second:TAddr", "third:TAddr"]
    );
}

#[test]
fn only_listeners_of_the_emitted_name_run() {
    let (seen, channel) = recorder();
    let s = Arc::clone(&seen);
    channel.on(EventName::Disconnect, move |_| {
        s.lock().expect("lock").push("disconnect".to_owned())
    });
    channel.emit(&AdapterEvent::StateChanged(AdapterState::Connected));
    assert!(seen.lock().expect("lock").is_empty());
    channel.emit(&AdapterEvent::Disconnect);
    assert_eq!(seen.lock().expect("lock").len(), 1);
}

#[test]
fn off_removes_a_single_registration() {
    let (seen, channel) = recorder();
    let a = Arc::clone(&seen);
    let first = channel.on(EventName::Disconnect, move |_| {
        a.lock().expect("lock").push("a".to_owned())
    });
    let b = Arc::clone(&seen);
    channel.on(EventName::Disconnect, move |_| {
        b.lock().expect("lock").push("b".to_owned())
    });

    assert!(channel.off(EventName::Disconnect, first));
    assert!(!channel.off(EventName::Disconnect, first));
    channel.emit(&AdapterEvent::Disconnect);
    assert_eq!(*seen.lock().expect("lock"), vec!["b"]);
}

#[test]
fn remove_all_listeners_clears_every_event() {
    let (_, channel) = recorder();
    channel.on(EventName::Connect, |_| {});
    channel.on(EventName::Error, |_| {});
    assert_eq!(channel.listener_count(EventName::Connect), 1);
    channel.remove_all_listeners();
    assert_eq!(channel.listener_count(EventName::Connect), 0);
    assert_eq!(channel.listener_count(EventName::Error), 0);
}

#[test]
fn listener_may_unsubscribe_during_dispatch() {
    let channel = Arc::new(EventChannel::new());
    let hits = Arc::new(Mutex::new(0));
    let id_slot = Arc::new(Mutex::new(None));

    let (ch, h, slot) = (Arc::clone(&channel), Arc::clone(&hits), Arc::clone(&id_slot));
    let id = channel.on(EventName::Disconnect, move |_| {
        *h.lock().expect("lock") += 1;
        if let Some(id) = *slot.lock().expect("lock") {
            ch.off(EventName::Disconnect, id);
        }
    });
    *id_slot.lock().expect("lock") = Some(id);

    channel.emit(&AdapterEvent::Disconnect);
    channel.emit(&AdapterEvent::Disconnect);
    assert_eq!(*hits.lock().expect("lock"), 1);
}

#[test]
#[should_panic(expected = "listener failure")]
fn listener_panics_reach_the_emitter() {
    let channel = EventChannel::new();
    channel.on(EventName::Disconnect, |_| panic!("listener failure"));
    channel.emit(&AdapterEvent::Disconnect);
}
