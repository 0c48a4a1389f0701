//! [`VoteTracker`] — session-scoped helpful-votes with optimistic counts.
//!
//! A review can be voted on once per session. The displayed count goes up
//! immediately and the backend call runs on a spawned task; if it fails the
//! increment is rolled back and the review can be voted on again.

use std::{
  collections::{HashMap, HashSet},
  sync::{Arc, Mutex, MutexGuard},
};

use campus_core::{backend::ReviewBackend, review::ReviewId};
use tokio::task::JoinHandle;

use crate::{Error, Result};

/// Outcome of [`VoteTracker::vote`].
#[derive(Debug)]
pub enum Vote {
  /// This session already voted; nothing was sent.
  AlreadyVoted { count: u32 },
  /// The optimistic count, plus the task confirming it with the backend.
  /// The task resolves to the server's count.
  Pending {
    count:        u32,
    confirmation: JoinHandle<Result<u32>>,
  },
}

impl Vote {
  /// The count to display right now.
  pub fn count(&self) -> u32 {
    match self {
      Self::AlreadyVoted { count } | Self::Pending { count, .. } => *count,
    }
  }
}

#[derive(Debug, Default)]
struct VoteState {
  voted:  HashSet<ReviewId>,
  counts: HashMap<ReviewId, u32>,
}

pub struct VoteTracker<B> {
  backend: Arc<B>,
  state:   Arc<Mutex<VoteState>>,
}

fn lock(state: &Mutex<VoteState>) -> MutexGuard<'_, VoteState> {
  state.lock().unwrap_or_else(|e| e.into_inner())
}

impl<B> VoteTracker<B>
where
  B: ReviewBackend<Error = Error> + 'static,
{
  pub fn new(backend: Arc<B>) -> Self {
    Self { backend, state: Arc::new(Mutex::new(VoteState::default())) }
  }

  /// Vote for `review_id`, whose count is currently shown as `displayed`.
  ///
  /// Must be called from within a tokio runtime.
  pub fn vote(&self, review_id: &ReviewId, displayed: u32) -> Vote {
    let count = {
      let mut state = lock(&self.state);
      if state.voted.contains(review_id) {
        let count = state.counts.get(review_id).copied().unwrap_or(displayed);
        return Vote::AlreadyVoted { count };
      }
      let count = displayed.saturating_add(1);
      state.voted.insert(review_id.clone());
      state.counts.insert(review_id.clone(), count);
      count
    };

    let backend = Arc::clone(&self.backend);
    let state = Arc::clone(&self.state);
    let review_id = review_id.clone();
    let confirmation = tokio::spawn(async move {
      let result = backend.vote(&review_id).await;
      let mut state = lock(&state);
      match result {
        Ok(server) => {
          tracing::debug!(%review_id, count = server, "vote confirmed");
          state.counts.insert(review_id, server);
          Ok(server)
        }
        Err(e) => {
          tracing::warn!(%review_id, error = %e, "vote failed, rolling back");
          state.voted.remove(&review_id);
          if let Some(c) = state.counts.get_mut(&review_id) {
            *c = c.saturating_sub(1);
          }
          Err(e)
        }
      }
    });

    Vote::Pending { count, confirmation }
  }

  pub fn has_voted(&self, review_id: &ReviewId) -> bool {
    lock(&self.state).voted.contains(review_id)
  }

  /// The count this session last showed for `review_id`, if it was voted on.
  pub fn count(&self, review_id: &ReviewId) -> Option<u32> {
    lock(&self.state).counts.get(review_id).copied()
  }
}
