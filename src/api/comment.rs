use log::{debug, info};
use reqwest::Client;

use crate::api::{authorize, send_json, session_token};
use crate::error::ApiError;
use crate::models::question::Comment;
use crate::models::session::Session;
use crate::models::vote::CommentVoteStatus;

pub async fn get_question_comments(
    client: &Client,
    base_url: &str,
    question_id: i64,
) -> Result<Vec<Comment>, ApiError> {
    let url = format!("{}/comments/question/{}", base_url, question_id);
    send_json(authorize(client.get(&url), None), "get question comments").await
}

pub async fn get_answer_comments(
    client: &Client,
    base_url: &str,
    answer_id: i64,
) -> Result<Vec<Comment>, ApiError> {
    let url = format!("{}/comments/answer/{}", base_url, answer_id);
    send_json(authorize(client.get(&url), None), "get answer comments").await
}

pub async fn get_comment_vote_status(
    client: &Client,
    base_url: &str,
    session: &Session,
    comment_id: i64,
) -> Result<CommentVoteStatus, ApiError> {
    let url = format!(
        "{}/comments/{}/vote-status/{}",
        base_url, comment_id, session.user_id
    );
    let status: CommentVoteStatus = send_json(
        authorize(client.get(&url), session_token(session)),
        "get comment vote status",
    )
    .await?;
    debug!("Comment #{} vote status: {:?}", comment_id, status);
    Ok(status)
}

pub async fn toggle_comment_vote(
    client: &Client,
    base_url: &str,
    session: &Session,
    comment_id: i64,
) -> Result<(), ApiError> {
    let url = format!("{}/comments/{}/vote", base_url, comment_id);
    let request = client
        .post(&url)
        .query(&[("user_id", session.user_id.to_string())]);
    send_json::<serde_json::Value>(
        authorize(request, session_token(session)),
        "toggle comment vote",
    )
    .await?;
    info!("Comment #{} vote toggled", comment_id);
    Ok(())
}
