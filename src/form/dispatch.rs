use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

type Reaction = Box<dyn FnOnce() + Send + 'static>;

/// Work deferred until the current event has been handled.
///
/// The host drains the queue with [`ReactionQueue::run_until_idle`] after it
/// finishes dispatching each UI event. Reactions run in posting order, and a
/// reaction posted while draining runs in the same drain after everything
/// ahead of it. This is the settle barrier a form submit waits behind: a blur
/// commit posted before the submit has landed by the time the submit is
/// evaluated.
#[derive(Clone, Default)]
pub struct ReactionQueue {
    pending: Arc<Mutex<VecDeque<Reaction>>>,
}

impl fmt::Debug for ReactionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

impl ReactionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, reaction: impl FnOnce() + Send + 'static) {
        self.lock().push_back(Box::new(reaction));
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Runs reactions until none are left. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            // Released before the reaction runs, so it can post more.
            let next = self.lock().pop_front();
            let Some(reaction) = next else {
                break;
            };
            reaction();
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "reactions drained");
        }
        ran
    }

    // A reaction that panicked leaves the queue itself intact.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Reaction>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
