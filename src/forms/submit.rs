//! Submission state and at-most-once guarding.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use crate::domain::types::SubmissionId;

/// `Idle → Submitting → Idle | Failed(message)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    Failed(String),
}

impl SubmitState {
    /// Moves to `Submitting`; refuses while a submit is already running.
    pub fn begin(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        *self = SubmitState::Submitting;
        true
    }

    pub fn succeed(&mut self) {
        *self = SubmitState::Idle;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        *self = SubmitState::Failed(message.into());
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmitState::Submitting)
    }

    /// The submit trigger is disabled whenever this is false.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting()
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            SubmitState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Completed ids remembered to reject replays.
pub const DEFAULT_GUARD_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct GuardState {
    in_flight: HashSet<SubmissionId>,
    completed: HashSet<SubmissionId>,
    order: VecDeque<SubmissionId>,
}

/// Refuses a second submission carrying the same id while the first is
/// running or after it succeeded. Failed submissions may be retried.
#[derive(Debug)]
pub struct SubmissionGuard {
    capacity: usize,
    state: Mutex<GuardState>,
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_GUARD_CAPACITY)
    }
}

impl SubmissionGuard {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(GuardState::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GuardState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns a ticket when `id` may proceed. Dropping the ticket without
    /// calling [`SubmissionTicket::complete`] releases the id for a retry.
    pub fn begin(&self, id: SubmissionId) -> Option<SubmissionTicket<'_>> {
        let mut state = self.lock();
        if state.completed.contains(&id) || !state.in_flight.insert(id) {
            log::warn!("Refusing duplicate submission {id}");
            return None;
        }
        Some(SubmissionTicket {
            guard: self,
            id,
            completed: false,
        })
    }

    fn finish(&self, id: SubmissionId, completed: bool) {
        let mut state = self.lock();
        state.in_flight.remove(&id);
        if !completed {
            return;
        }
        if state.completed.insert(id) {
            state.order.push_back(id);
        }
        while state.order.len() > self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.completed.remove(&oldest);
            }
        }
    }
}

#[must_use]
pub struct SubmissionTicket<'a> {
    guard: &'a SubmissionGuard,
    id: SubmissionId,
    completed: bool,
}

impl SubmissionTicket<'_> {
    pub fn id(&self) -> SubmissionId {
        self.id
    }

    /// Marks the submission as done; the id is refused from now on.
    pub fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for SubmissionTicket<'_> {
    fn drop(&mut self) {
        self.guard.finish(self.id, self.completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_refuses_while_submitting() {
        let mut state = SubmitState::default();
        assert!(state.begin());
        assert!(!state.can_submit());
        assert!(!state.begin());

        state.fail("boom");
        assert_eq!(state.failure(), Some("boom"));
        assert!(state.begin());
        state.succeed();
        assert_eq!(state, SubmitState::Idle);
    }

    #[test]
    fn duplicate_in_flight_submission_is_refused() {
        let guard = SubmissionGuard::default();
        let id = SubmissionId::generate();
        let ticket = guard.begin(id).unwrap();
        assert!(guard.begin(id).is_none());
        ticket.complete();
        assert!(guard.begin(id).is_none());
    }

    #[test]
    fn failed_submission_can_be_retried() {
        let guard = SubmissionGuard::default();
        let id = SubmissionId::generate();
        drop(guard.begin(id).unwrap());
        assert!(guard.begin(id).is_some());
    }

    #[test]
    fn oldest_completed_ids_are_forgotten() {
        let guard = SubmissionGuard::new(2);
        let ids: Vec<_> = (0..3).map(|_| SubmissionId::generate()).collect();
        for id in &ids {
            guard.begin(*id).unwrap().complete();
        }
        assert!(guard.begin(ids[0]).is_some());
        assert!(guard.begin(ids[2]).is_none());
    }
}
