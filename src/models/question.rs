use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Question {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author_id: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub is_answered: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Answer {
    pub id: i64,
    pub body: String,
    pub question_id: i64,
    pub author_id: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub is_accepted: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub author_id: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub votes: i64,
}

/// Everything the question detail view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPage {
    pub question: Question,
    pub answers: Vec<Answer>,
    pub question_comments: Vec<Comment>,
    pub answer_comments: HashMap<i64, Vec<Comment>>,
}

impl QuestionPage {
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.question_comments
            .iter()
            .chain(self.answer_comments.values().flatten())
    }
}
