use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::session::Session;
use crate::models::vote::{UserVotes, VoteCall, VoteSubject};

/// The backend operations the vote coordinators depend on.
///
/// `HttpVoteBackend` talks to the REST API; tests inject mocks.
#[async_trait]
pub trait VoteBackend: Send + Sync {
    /// Record or retract one vote on a question or answer.
    async fn record_vote(
        &self,
        session: &Session,
        subject: VoteSubject,
        call: VoteCall,
    ) -> Result<(), ApiError>;

    /// The viewer's existing votes on a question and its answers.
    async fn user_votes(&self, session: &Session, question_id: i64)
        -> Result<UserVotes, ApiError>;

    async fn comment_vote_status(
        &self,
        session: &Session,
        comment_id: i64,
    ) -> Result<bool, ApiError>;

    /// Flip the viewer's upvote on a comment.
    async fn toggle_comment_vote(&self, session: &Session, comment_id: i64)
        -> Result<(), ApiError>;
}
