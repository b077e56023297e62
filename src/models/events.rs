use crate::models::question::QuestionPage;
use crate::models::vote::VoteSubject;

/// Results of background work, drained by the UI each frame.
#[derive(Debug)]
pub enum Event {
    PageLoaded(Box<QuestionPage>),
    PageLoadFailed(String),
    VoteFailed { subject: VoteSubject, message: String },
    CommentVoteFailed { comment_id: i64, message: String },
}
