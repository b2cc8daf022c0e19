//! The FSM driver: owns the states, the shared variable store and the
//! pending-transition slot, and applies at most one state change per tick.
//!
//! Transition protocol: requests made during the update pass, while
//! entering a state, or by a host event callback between ticks all land in
//! the one slot (first request wins). The slot is consumed once per
//! `update`, after every action of the current state has run, so a request
//! made while entering the new state is applied at the end of the *next*
//! tick: chained unconditional transitions advance one state per tick and
//! can never recurse unboundedly within a single call.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;
use statescript_graph::{GraphDoc, Value};

use crate::action::{Action, OutletMap, Settings};
use crate::entity::OwnerEntity;
use crate::error::ConfigError;
use crate::host::{InputSource, MachineHost, MessageBus};
use crate::registry::ActionRegistry;
use crate::signal::{TransitionSender, TransitionSignal};
use crate::variables::VariableStore;

/// What an action sees during `enter`, `update` and `exit`.
pub struct TickContext<'a> {
    vars: &'a mut VariableStore,
    host: &'a MachineHost,
    signal: &'a TransitionSignal,
    tpf: f64,
    elapsed: f64,
}

impl<'a> TickContext<'a> {
    /// Request a transition by symbolic key; resolved against the current
    /// state's table after the update pass.
    pub fn send(&self, key: &str) {
        self.signal.request(key);
    }

    /// A send-only handle for event callbacks to capture.
    pub fn sender(&self) -> TransitionSender {
        self.signal.sender()
    }

    pub fn tpf(&self) -> f64 {
        self.tpf
    }

    /// World time accumulated across all ticks so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn input(&self) -> &InputSource {
        &self.host.input
    }

    pub fn bus(&self) -> &MessageBus {
        &self.host.bus
    }

    pub fn owner(&self) -> &OwnerEntity {
        &self.host.owner
    }

    pub fn variables(&self) -> &VariableStore {
        self.vars
    }

    pub fn variables_mut(&mut self) -> &mut VariableStore {
        self.vars
    }
}

/// One applied state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub tick: u64,
    pub from: String,
    pub key: String,
    pub to: String,
}

struct RuntimeState {
    actions: Vec<Box<dyn Action>>,
    transitions: BTreeMap<String, String>,
}

pub struct Machine {
    graph_id: String,
    states: BTreeMap<String, RuntimeState>,
    current: String,
    started: bool,
    ticks: u64,
    elapsed: f64,
    vars: VariableStore,
    host: MachineHost,
    signal: TransitionSignal,
    journal: Vec<TransitionRecord>,
}

impl Machine {
    /// Build a machine from a graph document. Every problem this can
    /// detect (duplicate or missing state ids, dangling transition
    /// targets, unknown variants, malformed settings) is fatal here, so
    /// nothing after a successful load can dangle.
    pub fn load(
        doc: &GraphDoc,
        registry: &ActionRegistry,
        host: MachineHost,
    ) -> Result<Self, ConfigError> {
        let mut states: BTreeMap<String, RuntimeState> = BTreeMap::new();
        for state_doc in &doc.states {
            if states.contains_key(&state_doc.id) {
                return Err(ConfigError::DuplicateState {
                    graph: doc.id.clone(),
                    state: state_doc.id.clone(),
                });
            }
            let mut actions: Vec<Box<dyn Action>> = Vec::with_capacity(state_doc.actions.len());
            for action_doc in &state_doc.actions {
                let Some(entry) = registry.entry(&action_doc.variant_key) else {
                    return Err(ConfigError::UnknownVariant {
                        state: state_doc.id.clone(),
                        variant: action_doc.variant_key.clone(),
                    });
                };
                let settings = Settings::resolve(&entry.descriptor, &action_doc.settings)?;
                let outlets = OutletMap::resolve(&entry.descriptor, &action_doc.transitions)?;
                actions.push(entry.build(&settings, &outlets));
            }
            states.insert(
                state_doc.id.clone(),
                RuntimeState {
                    actions,
                    transitions: state_doc.transitions.clone(),
                },
            );
        }

        if !states.contains_key(&doc.initial_state) {
            return Err(ConfigError::UnknownInitialState {
                graph: doc.id.clone(),
                state: doc.initial_state.clone(),
            });
        }
        for state_doc in &doc.states {
            for (key, target) in &state_doc.transitions {
                if !states.contains_key(target) {
                    return Err(ConfigError::UnknownTargetState {
                        state: state_doc.id.clone(),
                        key: key.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        Ok(Machine {
            graph_id: doc.id.clone(),
            states,
            current: doc.initial_state.clone(),
            started: false,
            ticks: 0,
            elapsed: 0.0,
            vars: VariableStore::seeded(doc.variables.clone()),
            host,
            signal: TransitionSignal::new(),
            journal: Vec::new(),
        })
    }

    /// Enter the initial state's actions. Idempotent; the first `update`
    /// calls it when the host has not.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let Some(state) = self.states.get_mut(&self.current) else {
            return;
        };
        let mut ctx = TickContext {
            vars: &mut self.vars,
            host: &self.host,
            signal: &self.signal,
            tpf: 0.0,
            elapsed: self.elapsed,
        };
        for action in &mut state.actions {
            action.enter(&mut ctx);
        }
    }

    /// One simulation tick: run every action of the current state in
    /// declaration order, then apply the pending transition, if any.
    pub fn update(&mut self, tpf: f64) {
        self.start();
        self.ticks += 1;
        self.elapsed += tpf;

        let Some(state) = self.states.get_mut(&self.current) else {
            return;
        };
        let mut ctx = TickContext {
            vars: &mut self.vars,
            host: &self.host,
            signal: &self.signal,
            tpf,
            elapsed: self.elapsed,
        };
        for action in &mut state.actions {
            action.update(&mut ctx);
        }

        if let Some(key) = self.signal.take() {
            self.apply_transition(&key, tpf);
        }
    }

    /// Request a transition from outside the tick loop (host code or an
    /// event callback); consumed at the end of the next `update`.
    pub fn send(&self, key: &str) {
        self.signal.request(key);
    }

    /// Exit the current state's actions as if a transition had occurred,
    /// releasing every outstanding listener. The machine is inert after.
    pub fn unload(&mut self) {
        if !self.started {
            return;
        }
        if let Some(state) = self.states.get_mut(&self.current) {
            let mut ctx = TickContext {
                vars: &mut self.vars,
                host: &self.host,
                signal: &self.signal,
                tpf: 0.0,
                elapsed: self.elapsed,
            };
            for action in &mut state.actions {
                action.exit(&mut ctx);
            }
        }
        self.signal.take();
        self.started = false;
    }

    fn apply_transition(&mut self, key: &str, tpf: f64) {
        let target = match self
            .states
            .get(&self.current)
            .and_then(|state| state.transitions.get(key))
        {
            Some(target) => target.clone(),
            None => {
                debug!(
                    "graph `{}`: transition key `{key}` not mapped in state `{}`; ignoring",
                    self.graph_id, self.current
                );
                return;
            }
        };

        let from = self.current.clone();
        if let Some(state) = self.states.get_mut(&from) {
            let mut ctx = TickContext {
                vars: &mut self.vars,
                host: &self.host,
                signal: &self.signal,
                tpf,
                elapsed: self.elapsed,
            };
            for action in &mut state.actions {
                action.exit(&mut ctx);
            }
        }

        self.current = target.clone();
        self.journal.push(TransitionRecord {
            tick: self.ticks,
            from: from.clone(),
            key: key.to_string(),
            to: target.clone(),
        });
        debug!("graph `{}`: `{from}` --{key}--> `{target}`", self.graph_id);

        if let Some(state) = self.states.get_mut(&self.current) {
            let mut ctx = TickContext {
                vars: &mut self.vars,
                host: &self.host,
                signal: &self.signal,
                tpf,
                elapsed: self.elapsed,
            };
            for action in &mut state.actions {
                action.enter(&mut ctx);
            }
        }
    }

    pub fn current_state_id(&self) -> &str {
        &self.current
    }

    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.set(name, value);
    }

    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }

    /// Transition table of a state, mainly for hosts that introspect or
    /// compare loaded graphs.
    pub fn transition_table(&self, state_id: &str) -> Option<&BTreeMap<String, String>> {
        self.states.get(state_id).map(|state| &state.transitions)
    }

    pub fn state_ids(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn journal(&self) -> &[TransitionRecord] {
        &self.journal
    }

    /// Requests that lost the first-request-wins race so far.
    pub fn discarded_sends(&self) -> u64 {
        self.signal.discarded()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn host(&self) -> &MachineHost {
        &self.host
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use statescript_graph::{ActionDoc, StateDoc};

    use super::*;

    fn doc(states: Vec<StateDoc>) -> GraphDoc {
        GraphDoc {
            id: "test".to_string(),
            initial_state: states
                .first()
                .map(|state| state.id.clone())
                .unwrap_or_default(),
            variables: BTreeMap::new(),
            states,
        }
    }

    fn bare_state(id: &str) -> StateDoc {
        StateDoc {
            id: id.to_string(),
            actions: Vec::new(),
            transitions: BTreeMap::new(),
        }
    }

    #[test]
    fn load_rejects_duplicate_state_ids() {
        let graph = doc(vec![bare_state("a"), bare_state("a")]);
        let err = Machine::load(&graph, &ActionRegistry::builtin(), MachineHost::new())
            .err()
            .expect("duplicate ids must fail");
        assert!(matches!(err, ConfigError::DuplicateState { .. }));
    }

    #[test]
    fn load_rejects_missing_initial_state() {
        let mut graph = doc(vec![bare_state("a")]);
        graph.initial_state = "nowhere".to_string();
        let err = Machine::load(&graph, &ActionRegistry::builtin(), MachineHost::new())
            .err()
            .expect("missing initial state must fail");
        assert!(matches!(err, ConfigError::UnknownInitialState { .. }));
    }

    #[test]
    fn load_rejects_dangling_transition_target() {
        let mut state = bare_state("a");
        state
            .transitions
            .insert("go".to_string(), "nowhere".to_string());
        let err = Machine::load(&doc(vec![state]), &ActionRegistry::builtin(), MachineHost::new())
            .err()
            .expect("dangling target must fail");
        assert!(matches!(err, ConfigError::UnknownTargetState { .. }));
    }

    #[test]
    fn load_rejects_unknown_variant() {
        let mut state = bare_state("a");
        state.actions.push(ActionDoc {
            variant_key: "noSuchVariant".to_string(),
            settings: BTreeMap::new(),
            transitions: BTreeMap::new(),
        });
        let err = Machine::load(&doc(vec![state]), &ActionRegistry::builtin(), MachineHost::new())
            .err()
            .expect("unknown variant must fail");
        assert!(matches!(err, ConfigError::UnknownVariant { .. }));
    }

    #[test]
    fn send_with_unmapped_key_never_changes_state() {
        let mut state = bare_state("a");
        state.transitions.insert("go".to_string(), "b".to_string());
        let graph = doc(vec![state, bare_state("b")]);
        let mut machine =
            Machine::load(&graph, &ActionRegistry::builtin(), MachineHost::new()).expect("load");

        machine.send("unmapped");
        machine.update(0.016);
        assert_eq!(machine.current_state_id(), "a");
        assert!(machine.journal().is_empty());

        machine.send("go");
        machine.update(0.016);
        assert_eq!(machine.current_state_id(), "b");
        assert_eq!(machine.journal().len(), 1);
        assert_eq!(machine.journal()[0].from, "a");
        assert_eq!(machine.journal()[0].key, "go");
    }

    #[test]
    fn at_most_one_transition_per_tick() {
        let mut a = bare_state("a");
        a.transitions.insert("go".to_string(), "b".to_string());
        let mut b = bare_state("b");
        b.transitions.insert("go".to_string(), "c".to_string());
        let graph = doc(vec![a, b, bare_state("c")]);
        let mut machine =
            Machine::load(&graph, &ActionRegistry::builtin(), MachineHost::new()).expect("load");

        machine.send("go");
        machine.send("go");
        machine.update(0.016);
        // The duplicate request was discarded, not forwarded into state b.
        assert_eq!(machine.current_state_id(), "b");
        assert_eq!(machine.discarded_sends(), 1);
        machine.update(0.016);
        assert_eq!(machine.current_state_id(), "b");
    }

    #[test]
    fn variables_seed_from_the_document() {
        let mut graph = doc(vec![bare_state("a")]);
        graph
            .variables
            .insert("lives".to_string(), Value::Int(3));
        let mut machine =
            Machine::load(&graph, &ActionRegistry::builtin(), MachineHost::new()).expect("load");
        assert_eq!(machine.get_variable("lives"), Some(&Value::Int(3)));
        machine.set_variable("lives", 2i64);
        assert_eq!(machine.get_variable("lives"), Some(&Value::Int(2)));
    }
}
