use tronwallet_adapter_core::{
    adapter_transition, check_address, ready_transition, AdapterState, ReadyState,
};

#[test]
fn adapter_lifecycle_transitions() {
    let t1 = adapter_transition(AdapterState::Loading, AdapterState::Disconnect, "detected")
        .expect("loading -> disconnect");
    assert_eq!(t1.to, AdapterState::Disconnect);
    let t2 = adapter_transition(t1.to, AdapterState::Connected, "connect")
        .expect("disconnect -> connected");
    assert_eq!(t2.to, AdapterState::Connected);
    let t3 = adapter_transition(t2.to, AdapterState::Disconnect, "disconnect")
        .expect("connected -> disconnect");
    assert_eq!(t3.to, AdapterState::Disconnect);
    assert!(!t3.is_noop());
}

#[test]
fn loading_settles_into_any_terminal_state() {
    for to in [
        AdapterState::NotFound,
        AdapterState::Disconnect,
        AdapterState::Connected,
    ] {
        adapter_transition(AdapterState::Loading, to, "detected").expect("loading settles");
    }
}

#[test]
fn same_state_is_a_noop() {
    let t = adapter_transition(AdapterState::Connected, AdapterState::Connected, "accounts")
        .expect("same state is allowed");
    assert!(t.is_noop());
}

#[test]
fn not_found_is_unreachable_after_detection() {
    let err = adapter_transition(AdapterState::Disconnect, AdapterState::NotFound, "late")
        .expect_err("must fail");
    assert!(err.to_string().contains("illegal adapter transition"));
    adapter_transition(AdapterState::Connected, AdapterState::Loading, "reset")
        .expect_err("cannot go back to loading");
    adapter_transition(AdapterState::NotFound, AdapterState::Connected, "connect")
        .expect_err("not found is terminal");
}

#[test]
fn ready_state_settles_once() {
    assert_eq!(
        ready_transition(ReadyState::Loading, ReadyState::Found).expect("loading -> found"),
        ReadyState::Found
    );
    ready_transition(ReadyState::Loading, ReadyState::NotFound).expect("loading -> not found");
    let err = ready_transition(ReadyState::Found, ReadyState::NotFound).expect_err("must fail");
    assert!(err.to_string().contains("illegal ready-state transition"));
    ready_transition(ReadyState::NotFound, ReadyState::Loading).expect_err("never back to loading");
}

#[test]
fn connected_requires_non_empty_address() {
    check_address(AdapterState::Connected, Some("TAddr")).expect("connected with address");
    check_address(AdapterState::Connected, Some("")).expect_err("empty address");
    check_address(AdapterState::Connected, None).expect_err("missing address");
    check_address(AdapterState::Disconnect, None).expect("disconnect without address");
    check_address(AdapterState::Disconnect, Some("TAddr")).expect_err("stale address");
    check_address(AdapterState::NotFound, None).expect("not found without address");
}
