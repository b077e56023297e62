//! Optimistic upvote toggle for comments.

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::VoteError;
use crate::models::session::Session;
use crate::vote::backend::VoteBackend;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentSnapshot {
    pub voted: bool,
    pub pending: bool,
    pub score: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Committed { voted: bool },
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct TrackedComment {
    snapshot: CommentSnapshot,
    epoch: u64,
}

pub struct CommentVoteToggle {
    backend: Arc<dyn VoteBackend>,
    session: Session,
    comments: Mutex<HashMap<i64, TrackedComment>>,
    epochs: AtomicU64,
}

impl CommentVoteToggle {
    pub fn new(backend: Arc<dyn VoteBackend>, session: Session) -> Self {
        Self {
            backend,
            session,
            comments: Mutex::new(HashMap::new()),
            epochs: AtomicU64::new(0),
        }
    }

    fn comments(&self) -> MutexGuard<'_, HashMap<i64, TrackedComment>> {
        self.comments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, comment_id: i64, score: i64) {
        let mut comments = self.comments();
        let tracked = comments.entry(comment_id).or_insert_with(|| TrackedComment {
            snapshot: CommentSnapshot::default(),
            epoch: self.epochs.fetch_add(1, Ordering::Relaxed),
        });
        if !tracked.snapshot.pending {
            tracked.snapshot.score = score;
        }
    }

    pub fn apply_status(&self, comment_id: i64, has_voted: bool) {
        if let Some(tracked) = self.comments().get_mut(&comment_id) {
            if !tracked.snapshot.pending {
                tracked.snapshot.voted = has_voted;
            }
        }
    }

    pub async fn load_status(&self, comment_id: i64) {
        match self
            .backend
            .comment_vote_status(&self.session, comment_id)
            .await
        {
            Ok(has_voted) => self.apply_status(comment_id, has_voted),
            Err(e) => error!("Error loading vote status for comment #{}: {}", comment_id, e),
        }
    }

    pub fn snapshot(&self, comment_id: i64) -> Option<CommentSnapshot> {
        self.comments()
            .get(&comment_id)
            .map(|tracked| tracked.snapshot)
    }

    pub fn forget(&self, comment_id: i64) {
        self.comments().remove(&comment_id);
    }

    pub fn clear(&self) {
        self.comments().clear();
    }

    /// Flip the viewer's upvote on a comment, rolling back if the backend
    /// refuses. Ignored while a toggle on the same comment is in flight.
    pub async fn toggle(&self, comment_id: i64) -> Result<ToggleOutcome, VoteError> {
        let (voted, delta, epoch) = {
            let mut comments = self.comments();
            let tracked = comments
                .get_mut(&comment_id)
                .ok_or(VoteError::UnknownComment(comment_id))?;
            let comment = &mut tracked.snapshot;
            if comment.pending {
                debug!("Ignoring toggle on comment #{}: request pending", comment_id);
                return Ok(ToggleOutcome::Ignored);
            }
            comment.voted = !comment.voted;
            let delta = if comment.voted { 1 } else { -1 };
            comment.score += delta;
            comment.pending = true;
            (comment.voted, delta, tracked.epoch)
        };

        let result = self
            .backend
            .toggle_comment_vote(&self.session, comment_id)
            .await;

        let mut comments = self.comments();
        let comment = comments
            .get_mut(&comment_id)
            .filter(|tracked| tracked.epoch == epoch)
            .map(|tracked| &mut tracked.snapshot);
        if comment.is_none() {
            debug!("Comment #{} was forgotten while its vote was in flight", comment_id);
        }
        match result {
            Ok(()) => {
                if let Some(comment) = comment {
                    comment.pending = false;
                }
                info!("Comment #{} vote toggled to {}", comment_id, voted);
                Ok(ToggleOutcome::Committed { voted })
            }
            Err(source) => {
                if let Some(comment) = comment {
                    comment.voted = !voted;
                    comment.score -= delta;
                    comment.pending = false;
                }
                warn!("Rolled back vote on comment #{}", comment_id);
                error!("Error voting on comment #{}: {}", comment_id, source);
                Err(VoteError::CommentBackend { comment_id, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::mock::MockBackend;

    fn toggle(backend: &Arc<MockBackend>) -> Arc<CommentVoteToggle> {
        Arc::new(CommentVoteToggle::new(backend.clone(), Session::new(1)))
    }

    #[tokio::test]
    async fn vote_then_unvote_restores_count() {
        let backend = Arc::new(MockBackend::new());
        let comments = toggle(&backend);
        comments.register(21, 4);

        let outcome = comments.toggle(21).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Committed { voted: true });
        assert_eq!(comments.snapshot(21).unwrap().score, 5);

        let outcome = comments.toggle(21).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Committed { voted: false });
        assert_eq!(
            comments.snapshot(21).unwrap(),
            CommentSnapshot { voted: false, pending: false, score: 4 }
        );
        assert!(!backend.has_comment_vote(21));
    }

    #[tokio::test]
    async fn failed_toggle_reverts_flag_and_count() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_call(0);
        let comments = toggle(&backend);
        comments.register(22, 0);

        let err = comments.toggle(22).await.unwrap_err();
        assert!(matches!(err, VoteError::CommentBackend { comment_id: 22, .. }));
        assert_eq!(
            comments.snapshot(22).unwrap(),
            CommentSnapshot { voted: false, pending: false, score: 0 }
        );
    }

    #[tokio::test]
    async fn seeded_status_makes_first_toggle_an_unvote() {
        let backend = Arc::new(MockBackend::new());
        backend.set_comment_voted(23);
        let comments = toggle(&backend);
        comments.register(23, 2);

        comments.load_status(23).await;
        assert!(comments.snapshot(23).unwrap().voted);

        comments.toggle(23).await.unwrap();
        assert_eq!(comments.snapshot(23).unwrap().score, 1);
        assert!(!backend.has_comment_vote(23));
    }

    #[tokio::test]
    async fn toggle_while_pending_is_ignored() {
        let backend = Arc::new(MockBackend::gated());
        let comments = toggle(&backend);
        comments.register(24, 0);

        let first = tokio::spawn({
            let comments = comments.clone();
            async move { comments.toggle(24).await }
        });
        backend.wait_for_call().await;

        assert_eq!(comments.toggle(24).await.unwrap(), ToggleOutcome::Ignored);
        assert_eq!(backend.comment_calls(), vec![24]);

        backend.release(1);
        first.await.unwrap().unwrap();
        assert_eq!(
            comments.snapshot(24).unwrap(),
            CommentSnapshot { voted: true, pending: false, score: 1 }
        );
    }

    #[tokio::test]
    async fn unknown_comment_is_an_error() {
        let backend = Arc::new(MockBackend::new());
        let comments = toggle(&backend);
        assert_eq!(comments.toggle(5).await.unwrap_err(), VoteError::UnknownComment(5));
    }

    #[tokio::test]
    async fn reply_after_forget_updates_nothing() {
        let backend = Arc::new(MockBackend::gated());
        let comments = toggle(&backend);
        comments.register(25, 3);

        let pending = tokio::spawn({
            let comments = comments.clone();
            async move { comments.toggle(25).await }
        });
        backend.wait_for_call().await;
        comments.forget(25);
        backend.release(1);

        assert_eq!(pending.await.unwrap().unwrap(), ToggleOutcome::Committed { voted: true });
        assert_eq!(comments.snapshot(25), None);
    }

    #[tokio::test]
    async fn stale_reply_after_reregister_leaves_new_entry_alone() {
        let backend = Arc::new(MockBackend::gated());
        backend.fail_call(0);
        let comments = toggle(&backend);
        comments.register(26, 3);

        let stale = tokio::spawn({
            let comments = comments.clone();
            async move { comments.toggle(26).await }
        });
        backend.wait_for_call().await;

        comments.forget(26);
        comments.register(26, 3);
        let fresh = tokio::spawn({
            let comments = comments.clone();
            async move { comments.toggle(26).await }
        });
        backend.wait_for_call().await;

        backend.release(2);
        assert!(stale.await.unwrap().is_err());
        assert_eq!(fresh.await.unwrap().unwrap(), ToggleOutcome::Committed { voted: true });
        assert_eq!(
            comments.snapshot(26).unwrap(),
            CommentSnapshot { voted: true, pending: false, score: 4 }
        );
        assert!(backend.has_comment_vote(26));
    }
}
