use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Direction of a vote arrow.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn opposite(self) -> Self {
        match self {
            VoteDirection::Up => VoteDirection::Down,
            VoteDirection::Down => VoteDirection::Up,
        }
    }

    /// Score change caused by casting a vote in this direction.
    pub fn weight(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    Question,
    Answer,
}

/// A votable question or answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoteSubject {
    pub kind: SubjectKind,
    pub id: i64,
}

impl VoteSubject {
    pub fn question(id: i64) -> Self {
        Self {
            kind: SubjectKind::Question,
            id,
        }
    }

    pub fn answer(id: i64) -> Self {
        Self {
            kind: SubjectKind::Answer,
            id,
        }
    }
}

impl fmt::Display for VoteSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SubjectKind::Question => write!(f, "question #{}", self.id),
            SubjectKind::Answer => write!(f, "answer #{}", self.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Record,
    Retract,
}

/// A single request to the vote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteCall {
    pub direction: VoteDirection,
    pub action: VoteAction,
}

impl VoteCall {
    pub fn record(direction: VoteDirection) -> Self {
        Self {
            direction,
            action: VoteAction::Record,
        }
    }

    pub fn retract(direction: VoteDirection) -> Self {
        Self {
            direction,
            action: VoteAction::Retract,
        }
    }
}

/// The viewer's existing votes on a question page.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserVotes {
    #[serde(default)]
    pub question_vote: Option<VoteDirection>,
    #[serde(default)]
    pub answer_votes: HashMap<i64, VoteDirection>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentVoteStatus {
    pub has_voted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_votes_accepts_string_keys_and_null_question_vote() {
        let body = r#"{"question_vote": null, "answer_votes": {"7": "up", "9": "down"}}"#;
        let votes: UserVotes = serde_json::from_str(body).unwrap();

        assert_eq!(votes.question_vote, None);
        assert_eq!(votes.answer_votes.get(&7), Some(&VoteDirection::Up));
        assert_eq!(votes.answer_votes.get(&9), Some(&VoteDirection::Down));
    }

    #[test]
    fn user_votes_tolerates_missing_fields() {
        let votes: UserVotes = serde_json::from_str(r#"{"question_vote": "down"}"#).unwrap();
        assert_eq!(votes.question_vote, Some(VoteDirection::Down));
        assert!(votes.answer_votes.is_empty());
    }

    #[test]
    fn subject_display() {
        assert_eq!(VoteSubject::question(12).to_string(), "question #12");
        assert_eq!(VoteSubject::answer(7).to_string(), "answer #7");
    }
}
