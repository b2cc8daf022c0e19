//! The single pending-transition slot.
//!
//! Transition requests from the per-tick update pass, from an action
//! entering a state, and from host event callbacks firing between ticks
//! all funnel through one slot. The first request of a tick wins; later
//! requests are
//! discarded with a diagnostic and counted. The machine consumes the slot
//! exactly once, after the full update pass.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

#[derive(Debug, Default)]
struct SlotState {
    pending: Option<String>,
    discarded: u64,
}

/// Shared slot handle. Clones refer to the same slot.
#[derive(Clone, Default)]
pub struct TransitionSignal {
    slot: Rc<RefCell<SlotState>>,
}

impl TransitionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A send-only handle for event callbacks to capture.
    pub fn sender(&self) -> TransitionSender {
        TransitionSender {
            signal: self.clone(),
        }
    }

    /// Record `key` as the pending request; first request wins.
    pub fn request(&self, key: &str) {
        let mut state = self.slot.borrow_mut();
        match state.pending.clone() {
            None => state.pending = Some(key.to_string()),
            Some(first) => {
                state.discarded += 1;
                debug!("transition request `{key}` discarded; `{first}` is already pending");
            }
        }
    }

    /// Consume the pending request, leaving the slot empty.
    pub fn take(&self) -> Option<String> {
        self.slot.borrow_mut().pending.take()
    }

    pub fn pending(&self) -> Option<String> {
        self.slot.borrow().pending.clone()
    }

    /// How many requests lost the first-request-wins race so far.
    pub fn discarded(&self) -> u64 {
        self.slot.borrow().discarded
    }
}

/// Cloneable handle that can only request transitions. Event callbacks
/// capture one of these instead of any part of the machine.
#[derive(Clone)]
pub struct TransitionSender {
    signal: TransitionSignal,
}

impl TransitionSender {
    pub fn send(&self, key: &str) {
        self.signal.request(key);
    }
}
