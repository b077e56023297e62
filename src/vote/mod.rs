pub mod backend;
pub mod comment;
pub mod coordinator;
#[cfg(test)]
mod mock;
pub mod transition;

pub use backend::VoteBackend;
pub use comment::{CommentSnapshot, CommentVoteToggle, ToggleOutcome};
pub use coordinator::{SubjectSnapshot, VoteCoordinator, VoteOutcome, VoteState};
pub use transition::VoteTransition;
