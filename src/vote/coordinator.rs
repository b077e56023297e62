//! Optimistic voting on questions and answers.
//!
//! A click is applied to the local score and vote state immediately, then sent
//! to the backend. If any request fails the local change is undone, so once a
//! subject is idle again its score matches what the server has recorded.

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ApiError, VoteError};
use crate::models::session::Session;
use crate::models::vote::{UserVotes, VoteCall, VoteDirection, VoteSubject};
use crate::vote::backend::VoteBackend;
use crate::vote::transition::VoteTransition;

/// The viewer's vote on one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteState {
    pub current: Option<VoteDirection>,
    pub pending: bool,
}

/// What a view needs to draw one vote control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectSnapshot {
    pub current: Option<VoteDirection>,
    pub pending: bool,
    pub score: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The backend confirmed the optimistic update.
    Committed {
        current: Option<VoteDirection>,
        delta: i64,
    },
    /// A request was already in flight for the subject; nothing happened.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Tracked {
    state: VoteState,
    score: i64,
    /// Changes every time the subject is registered afresh, so a reply
    /// meant for a forgotten entry never lands on its successor.
    epoch: u64,
}

pub struct VoteCoordinator {
    backend: Arc<dyn VoteBackend>,
    session: Session,
    subjects: Mutex<HashMap<VoteSubject, Tracked>>,
    epochs: AtomicU64,
}

impl VoteCoordinator {
    pub fn new(backend: Arc<dyn VoteBackend>, session: Session) -> Self {
        Self {
            backend,
            session,
            subjects: Mutex::new(HashMap::new()),
            epochs: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn subjects(&self) -> MutexGuard<'_, HashMap<VoteSubject, Tracked>> {
        self.subjects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start tracking a rendered subject, or refresh the score of an idle one.
    pub fn register(&self, subject: VoteSubject, score: i64) {
        let mut subjects = self.subjects();
        let tracked = subjects.entry(subject).or_insert_with(|| Tracked {
            state: VoteState::default(),
            score,
            epoch: self.epochs.fetch_add(1, Ordering::Relaxed),
        });
        if !tracked.state.pending {
            tracked.score = score;
        }
    }

    pub fn snapshot(&self, subject: VoteSubject) -> Option<SubjectSnapshot> {
        self.subjects().get(&subject).map(|tracked| SubjectSnapshot {
            current: tracked.state.current,
            pending: tracked.state.pending,
            score: tracked.score,
        })
    }

    pub fn forget(&self, subject: VoteSubject) {
        self.subjects().remove(&subject);
    }

    pub fn clear(&self) {
        self.subjects().clear();
    }

    /// Seed vote states from the backend's record for a question page.
    ///
    /// Only the question and the listed answers are touched. Answers missing
    /// from `votes` are reset to no vote. Subjects with a request in flight
    /// keep their optimistic state.
    pub fn apply_user_votes(&self, question_id: i64, answer_ids: &[i64], votes: &UserVotes) {
        let mut subjects = self.subjects();
        let page = std::iter::once((VoteSubject::question(question_id), votes.question_vote)).chain(
            answer_ids
                .iter()
                .map(|&id| (VoteSubject::answer(id), votes.answer_votes.get(&id).copied())),
        );
        for (subject, current) in page {
            match subjects.get_mut(&subject) {
                Some(tracked) if !tracked.state.pending => tracked.state.current = current,
                _ => {}
            }
        }
    }

    /// Fetch and apply the viewer's votes. Failure leaves every state at no vote.
    pub async fn load_user_votes(&self, question_id: i64, answer_ids: &[i64]) {
        match self.backend.user_votes(&self.session, question_id).await {
            Ok(votes) => {
                debug!("Loaded user votes for question #{}: {:?}", question_id, votes);
                self.apply_user_votes(question_id, answer_ids, &votes);
            }
            Err(e) => {
                info!(
                    "Could not fetch user votes for question #{} (viewer may be anonymous): {}",
                    question_id, e
                );
            }
        }
    }

    /// Handle a click on the up or down arrow of `subject`.
    ///
    /// Returns `Ignored` while an earlier click on the same subject is still
    /// in flight. On backend failure the optimistic update is rolled back
    /// before the error is returned.
    pub async fn cast_vote(
        &self,
        subject: VoteSubject,
        requested: VoteDirection,
    ) -> Result<VoteOutcome, VoteError> {
        let (transition, epoch) = {
            let mut subjects = self.subjects();
            let tracked = subjects
                .get_mut(&subject)
                .ok_or(VoteError::UnknownSubject(subject))?;
            if tracked.state.pending {
                debug!("Ignoring {} vote on {}: request pending", requested, subject);
                return Ok(VoteOutcome::Ignored);
            }
            let transition = VoteTransition::plan(tracked.state.current, requested);
            tracked.score += transition.delta();
            tracked.state.current = transition.target();
            tracked.state.pending = true;
            (transition, tracked.epoch)
        };
        debug!("{} on {}: {:?}", requested, subject, transition);

        let settled = self.send(subject, &transition).await;

        let mut subjects = self.subjects();
        let tracked = subjects
            .get_mut(&subject)
            .filter(|tracked| tracked.epoch == epoch);
        if tracked.is_none() {
            debug!("{} was forgotten while its vote was in flight", subject);
        }
        match settled {
            Settled::Confirmed => {
                if let Some(tracked) = tracked {
                    tracked.state.pending = false;
                }
                info!("Vote on {} recorded: {:?}", subject, transition.target());
                Ok(VoteOutcome::Committed {
                    current: transition.target(),
                    delta: transition.delta(),
                })
            }
            Settled::Reverted(source) => {
                if let Some(tracked) = tracked {
                    tracked.score -= transition.delta();
                    tracked.state.current = transition.origin();
                    tracked.state.pending = false;
                }
                warn!("Rolled back vote on {}", subject);
                error!("Failed to vote on {}: {}", subject, source);
                Err(VoteError::Backend { subject, source })
            }
            Settled::Retracted(source) => {
                if let Some(tracked) = tracked {
                    tracked.score -= transition.delta();
                    tracked.score -= transition.origin().map_or(0, VoteDirection::weight);
                    tracked.state.current = None;
                    tracked.state.pending = false;
                }
                error!(
                    "Failed to switch vote on {}; server kept the retract: {}",
                    subject, source
                );
                Err(VoteError::Backend { subject, source })
            }
        }
    }

    async fn send(&self, subject: VoteSubject, transition: &VoteTransition) -> Settled {
        let mut confirmed: Vec<VoteCall> = Vec::new();
        for call in transition.calls() {
            match self.backend.record_vote(&self.session, subject, call).await {
                Ok(()) => confirmed.push(call),
                Err(e) => return self.compensate(subject, &confirmed, e).await,
            }
        }
        Settled::Confirmed
    }

    // Only a switch can fail after an earlier call went through: the retract
    // of the old vote is already on the server, so put the old vote back.
    async fn compensate(
        &self,
        subject: VoteSubject,
        confirmed: &[VoteCall],
        source: ApiError,
    ) -> Settled {
        let Some(retracted) = confirmed.first() else {
            return Settled::Reverted(source);
        };
        let restore = VoteCall::record(retracted.direction);
        warn!("Restoring {} vote on {} after failed switch", retracted.direction, subject);
        match self.backend.record_vote(&self.session, subject, restore).await {
            Ok(()) => Settled::Reverted(source),
            Err(e) => {
                error!("Could not restore vote on {}: {}", subject, e);
                Settled::Retracted(source)
            }
        }
    }
}

enum Settled {
    Confirmed,
    /// Server state is as before the click.
    Reverted(ApiError),
    /// Server holds no vote: a switch lost its new vote and the old one.
    Retracted(ApiError),
}
