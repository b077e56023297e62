use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use std::str::FromStr;

use crate::api::comment;
use crate::api::question::get_user_votes;
use crate::api::{authorize, send_json, session_token};
use crate::error::ApiError;
use crate::models::session::Session;
use crate::models::vote::{SubjectKind, UserVotes, VoteAction, VoteCall, VoteSubject};
use crate::vote::backend::VoteBackend;

/// How a retract is expressed on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetractMode {
    /// `vote_type=<direction>&undo=true`
    #[default]
    UndoFlag,
    /// `vote_type=<opposite direction>`, for backends without `undo`.
    OppositeDirection,
}

impl FromStr for RetractMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "undo" | "undo_flag" => Ok(RetractMode::UndoFlag),
            "opposite" | "opposite_direction" => Ok(RetractMode::OppositeDirection),
            other => Err(format!("unknown retract mode '{}'", other)),
        }
    }
}

pub fn vote_url(base_url: &str, subject: VoteSubject) -> String {
    let resource = match subject.kind {
        SubjectKind::Question => "questions",
        SubjectKind::Answer => "answers",
    };
    format!("{}/{}/{}/vote", base_url, resource, subject.id)
}

pub fn vote_query(user_id: i64, call: VoteCall, mode: RetractMode) -> Vec<(&'static str, String)> {
    let mut query = vec![("user_id", user_id.to_string())];
    match (call.action, mode) {
        (VoteAction::Record, _) => {
            query.push(("vote_type", call.direction.to_string()));
        }
        (VoteAction::Retract, RetractMode::UndoFlag) => {
            query.push(("vote_type", call.direction.to_string()));
            query.push(("undo", "true".to_owned()));
        }
        (VoteAction::Retract, RetractMode::OppositeDirection) => {
            query.push(("vote_type", call.direction.opposite().to_string()));
        }
    }
    query
}

pub async fn record_vote(
    client: &Client,
    base_url: &str,
    session: &Session,
    subject: VoteSubject,
    call: VoteCall,
    mode: RetractMode,
) -> Result<(), ApiError> {
    let url = vote_url(base_url, subject);
    let query = vote_query(session.user_id, call, mode);
    debug!("POST {} {:?}", url, query);
    let request = client.post(&url).query(&query);
    send_json::<serde_json::Value>(authorize(request, session_token(session)), "record vote")
        .await?;
    info!("{:?} {} on {} accepted", call.action, call.direction, subject);
    Ok(())
}

/// `VoteBackend` over the REST API.
#[derive(Clone)]
pub struct HttpVoteBackend {
    client: Client,
    base_url: String,
    retract_mode: RetractMode,
}

impl HttpVoteBackend {
    pub fn new(client: Client, base_url: impl Into<String>, retract_mode: RetractMode) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            retract_mode,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl VoteBackend for HttpVoteBackend {
    async fn record_vote(
        &self,
        session: &Session,
        subject: VoteSubject,
        call: VoteCall,
    ) -> Result<(), ApiError> {
        record_vote(
            &self.client,
            &self.base_url,
            session,
            subject,
            call,
            self.retract_mode,
        )
        .await
    }

    async fn user_votes(
        &self,
        session: &Session,
        question_id: i64,
    ) -> Result<UserVotes, ApiError> {
        get_user_votes(&self.client, &self.base_url, session, question_id).await
    }

    async fn comment_vote_status(
        &self,
        session: &Session,
        comment_id: i64,
    ) -> Result<bool, ApiError> {
        comment::get_comment_vote_status(&self.client, &self.base_url, session, comment_id)
            .await
            .map(|status| status.has_voted)
    }

    async fn toggle_comment_vote(
        &self,
        session: &Session,
        comment_id: i64,
    ) -> Result<(), ApiError> {
        comment::toggle_comment_vote(&self.client, &self.base_url, session, comment_id).await
    }
}
