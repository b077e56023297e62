//! In-memory `VoteBackend` for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::{Notify, Semaphore};

use crate::error::ApiError;
use crate::models::session::Session;
use crate::models::vote::{UserVotes, VoteAction, VoteCall, VoteSubject};
use crate::vote::backend::VoteBackend;

/// Records every request, keeps a server-side score per subject, and fails
/// the requests whose index was passed to `fail_call`.
///
/// A gated mock holds each request until `release` hands out a permit.
pub struct MockBackend {
    calls: Mutex<Vec<(VoteSubject, VoteCall)>>,
    comment_calls: Mutex<Vec<i64>>,
    failing: Mutex<HashSet<usize>>,
    scores: Mutex<HashMap<VoteSubject, i64>>,
    user_votes: Mutex<Option<UserVotes>>,
    comment_votes: Mutex<HashSet<i64>>,
    gate: Option<Semaphore>,
    started: Notify,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            comment_calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            scores: Mutex::new(HashMap::new()),
            user_votes: Mutex::new(Some(UserVotes::default())),
            comment_votes: Mutex::new(HashSet::new()),
            gate: None,
            started: Notify::new(),
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    /// Fail the `index`-th request (counting from zero, across all kinds).
    pub fn fail_call(&self, index: usize) {
        self.failing.lock().unwrap().insert(index);
    }

    pub fn set_user_votes(&self, votes: UserVotes) {
        *self.user_votes.lock().unwrap() = Some(votes);
    }

    pub fn fail_user_votes(&self) {
        *self.user_votes.lock().unwrap() = None;
    }

    pub fn set_comment_voted(&self, comment_id: i64) {
        self.comment_votes.lock().unwrap().insert(comment_id);
    }

    pub fn calls(&self) -> Vec<(VoteSubject, VoteCall)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn comment_calls(&self) -> Vec<i64> {
        self.comment_calls.lock().unwrap().clone()
    }

    /// Net score change the server has accepted for `subject`.
    pub fn server_score(&self, subject: VoteSubject) -> i64 {
        self.scores.lock().unwrap().get(&subject).copied().unwrap_or(0)
    }

    pub fn has_comment_vote(&self, comment_id: i64) -> bool {
        self.comment_votes.lock().unwrap().contains(&comment_id)
    }

    pub async fn wait_for_call(&self) {
        self.started.notified().await;
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    fn request_index(&self) -> usize {
        self.calls.lock().unwrap().len() + self.comment_calls.lock().unwrap().len()
    }

    async fn hold(&self) {
        if let Some(gate) = &self.gate {
            self.started.notify_one();
            gate.acquire().await.unwrap().forget();
        }
    }

    fn outcome(&self, index: usize) -> Result<(), ApiError> {
        if self.failing.lock().unwrap().contains(&index) {
            Err(ApiError::rejected(500, "mock failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl VoteBackend for MockBackend {
    async fn record_vote(
        &self,
        _session: &Session,
        subject: VoteSubject,
        call: VoteCall,
    ) -> Result<(), ApiError> {
        let index = self.request_index();
        self.calls.lock().unwrap().push((subject, call));
        self.hold().await;
        self.outcome(index)?;

        let change = match call.action {
            VoteAction::Record => call.direction.weight(),
            VoteAction::Retract => -call.direction.weight(),
        };
        *self.scores.lock().unwrap().entry(subject).or_insert(0) += change;
        Ok(())
    }

    async fn user_votes(
        &self,
        _session: &Session,
        _question_id: i64,
    ) -> Result<UserVotes, ApiError> {
        self.user_votes
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::Network("connection refused".to_owned()))
    }

    async fn comment_vote_status(
        &self,
        _session: &Session,
        comment_id: i64,
    ) -> Result<bool, ApiError> {
        Ok(self.has_comment_vote(comment_id))
    }

    async fn toggle_comment_vote(
        &self,
        _session: &Session,
        comment_id: i64,
    ) -> Result<(), ApiError> {
        let index = self.request_index();
        self.comment_calls.lock().unwrap().push(comment_id);
        self.hold().await;
        self.outcome(index)?;

        let mut voted = self.comment_votes.lock().unwrap();
        if !voted.remove(&comment_id) {
            voted.insert(comment_id);
        }
        Ok(())
    }
}
