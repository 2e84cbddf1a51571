use std::sync::{Arc, Mutex, TryLockError};

use flapga_policy::{Activations, NetworkWeights};

use crate::{Agent, Episode, GenerationRecord};

/// Receives read-only views of training progress.
///
/// Hooks run on the training thread between ticks, so implementations must
/// return quickly. Hand heavy work to another thread through a [`LatestSlot`].
pub trait TrainingObserver {
    fn on_tick(&mut self, view: &TickView<'_>) {
        let _ = view;
    }

    fn on_generation(&mut self, record: &GenerationRecord) {
        let _ = record;
    }
}

/// State of the running episode right after a tick.
#[derive(Debug, Clone, Copy)]
pub struct TickView<'a> {
    pub generation: u32,
    /// Best-ever score before this generation.
    pub best_score: Option<u32>,
    pub episode: &'a Episode,
}

impl<'a> TickView<'a> {
    /// The agent worth watching: the alive one with the highest score.
    #[must_use]
    pub fn focus(&self) -> Option<(usize, &'a Agent)> {
        self.episode.leader()
    }

    /// Weights and latest activations of the focus agent's network.
    #[must_use]
    pub fn network_snapshot(&self) -> Option<NetworkSnapshot> {
        let (_, agent) = self.focus()?;
        Some(NetworkSnapshot {
            weights: agent.network()?.weights(),
            activations: agent.last_activations().copied(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSnapshot {
    pub weights: NetworkWeights,
    pub activations: Option<Activations>,
}

/// Single-slot hand-off where only the newest value matters.
///
/// [`publish`](Self::publish) never waits: it overwrites whatever the slot
/// holds, or drops the value if the consumer is reading at that moment.
/// [`take`](Self::take) empties the slot.
#[derive(Debug)]
pub struct LatestSlot<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for LatestSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Stores `value`, replacing any unread one. Returns `false` if it was dropped.
    pub fn publish(&self, value: T) -> bool {
        match self.inner.try_lock() {
            Ok(mut slot) => {
                *slot = Some(value);
                true
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                *poisoned.into_inner() = Some(value);
                true
            }
            Err(TryLockError::WouldBlock) => false,
        }
    }

    /// Removes and returns the newest value, if any.
    pub fn take(&self) -> Option<T> {
        match self.inner.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}
