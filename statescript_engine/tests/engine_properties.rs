//! Cross-cutting engine guarantees: listener-lifecycle symmetry, the
//! single-pending-transition protocol, and document round-tripping.

use statescript_engine::{ActionRegistry, InputEvent, Machine, MachineHost};
use statescript_graph::{GraphDoc, Value};

fn machine_for(raw: &str) -> (Machine, MachineHost) {
    let doc = GraphDoc::from_json(raw).expect("parse graph");
    let host = MachineHost::new();
    let machine =
        Machine::load(&doc, &ActionRegistry::builtin(), host.clone()).expect("load graph");
    (machine, host)
}

/// Two states bouncing on bus messages, each holding an input listener and
/// a bus subscription while active.
const PING_PONG: &str = r#"{
    "id": "pingpong",
    "initialState": "ping",
    "states": [
        {
            "id": "ping",
            "actions": [
                {
                    "variantKey": "keyDown",
                    "settings": { "key": "P" },
                    "transitions": { "keydown": "flip" }
                },
                {
                    "variantKey": "transitionOnMessage",
                    "settings": { "channel": "flip" },
                    "transitions": { "transition": "flip" }
                }
            ],
            "transitions": { "flip": "pong" }
        },
        {
            "id": "pong",
            "actions": [
                {
                    "variantKey": "keyDown",
                    "settings": { "key": "P" },
                    "transitions": { "keydown": "flop" }
                },
                {
                    "variantKey": "transitionOnMessage",
                    "settings": { "channel": "flip" },
                    "transitions": { "transition": "flop" }
                }
            ],
            "transitions": { "flop": "ping" }
        }
    ]
}"#;

#[test]
fn listeners_never_leak_across_many_transitions() {
    let (mut machine, host) = machine_for(PING_PONG);
    machine.start();
    assert_eq!(host.input.listener_count(), 1);
    assert_eq!(host.bus.listener_count(), 1);

    for round in 0..100 {
        host.bus.publish("flip", &Value::Int(round));
        machine.update(0.016);
        // Exactly the active state's resources, never an accumulation.
        assert_eq!(host.input.listener_count(), 1, "round {round}");
        assert_eq!(host.bus.listener_count(), 1, "round {round}");
    }
    assert_eq!(machine.journal().len(), 100);

    machine.unload();
    assert_eq!(host.input.listener_count(), 0);
    assert_eq!(host.bus.listener_count(), 0);
}

#[test]
fn unload_is_idempotent_and_releases_everything() {
    let (mut machine, host) = machine_for(PING_PONG);
    machine.update(0.016);
    machine.unload();
    machine.unload();
    assert_eq!(host.input.listener_count(), 0);
    assert_eq!(host.bus.listener_count(), 0);
    assert!(!machine.is_started());
}

#[test]
fn first_of_two_competing_requests_wins_the_tick() {
    let (mut machine, _host) = machine_for(
        r#"{
            "id": "race",
            "initialState": "start",
            "states": [
                {
                    "id": "start",
                    "actions": [
                        {
                            "variantKey": "transition",
                            "transitions": { "transition": "goFirst" }
                        },
                        {
                            "variantKey": "transition",
                            "transitions": { "transition": "goSecond" }
                        }
                    ],
                    "transitions": { "goFirst": "first", "goSecond": "second" }
                },
                { "id": "first" },
                { "id": "second" }
            ]
        }"#,
    );

    machine.update(0.016);
    assert_eq!(machine.current_state_id(), "first");
    assert_eq!(machine.discarded_sends(), 1);
    assert_eq!(machine.journal().len(), 1);
    assert_eq!(machine.journal()[0].key, "goFirst");
}

#[test]
fn event_between_ticks_applies_exactly_once_at_the_next_update() {
    let (mut machine, host) = machine_for(PING_PONG);
    machine.start();

    host.input.dispatch(InputEvent::KeyDown(80));
    assert_eq!(machine.current_state_id(), "ping");

    machine.update(0.016);
    assert_eq!(machine.current_state_id(), "pong");
    machine.update(0.016);
    assert_eq!(machine.current_state_id(), "pong");
    assert_eq!(machine.journal().len(), 1);
}

#[test]
fn reloaded_document_yields_an_equivalent_machine() {
    let doc = GraphDoc::from_json(PING_PONG).expect("parse graph");
    let json = doc.to_json().expect("serialize graph");
    let reloaded = GraphDoc::from_json(&json).expect("reparse graph");
    assert_eq!(reloaded, doc);

    let registry = ActionRegistry::builtin();
    let original = Machine::load(&doc, &registry, MachineHost::new()).expect("load original");
    let duplicate = Machine::load(&reloaded, &registry, MachineHost::new()).expect("load copy");

    assert_eq!(original.current_state_id(), duplicate.current_state_id());
    assert_eq!(original.variables(), duplicate.variables());
    let ids: Vec<&str> = original.state_ids().collect();
    assert_eq!(ids, duplicate.state_ids().collect::<Vec<&str>>());
    for id in ids {
        assert_eq!(original.transition_table(id), duplicate.transition_table(id));
    }
}
