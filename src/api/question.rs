use log::{error, info};
use reqwest::Client;
use std::collections::HashMap;

use crate::api::comment::{get_answer_comments, get_question_comments};
use crate::api::{authorize, send_json, session_token};
use crate::error::ApiError;
use crate::models::question::{Answer, Question, QuestionPage};
use crate::models::session::Session;
use crate::models::vote::UserVotes;

pub async fn get_question(
    client: &Client,
    base_url: &str,
    question_id: i64,
) -> Result<Question, ApiError> {
    let url = format!("{}/questions/{}", base_url, question_id);
    let question = send_json::<Question>(authorize(client.get(&url), None), "get question").await?;
    info!("Question #{} received", question_id);
    Ok(question)
}

pub async fn get_answers(
    client: &Client,
    base_url: &str,
    question_id: i64,
) -> Result<Vec<Answer>, ApiError> {
    let url = format!("{}/answers/", base_url);
    let request = client
        .get(&url)
        .query(&[("question_id", question_id.to_string())]);
    let answers = send_json::<Vec<Answer>>(authorize(request, None), "get answers").await?;
    info!("{} answers received for question #{}", answers.len(), question_id);
    Ok(answers)
}

pub async fn get_user_votes(
    client: &Client,
    base_url: &str,
    session: &Session,
    question_id: i64,
) -> Result<UserVotes, ApiError> {
    let url = format!("{}/questions/{}/user-votes", base_url, question_id);
    let request = client
        .get(&url)
        .query(&[("user_id", session.user_id.to_string())]);
    send_json(authorize(request, session_token(session)), "get user votes").await
}

/// Question, answers and all comments for the detail view.
///
/// Comments are best effort: a failed fetch leaves that list empty.
pub async fn load_question_page(
    client: &Client,
    base_url: &str,
    question_id: i64,
) -> Result<QuestionPage, ApiError> {
    let question = get_question(client, base_url, question_id).await?;
    let answers = get_answers(client, base_url, question_id).await?;

    let question_comments = get_question_comments(client, base_url, question_id)
        .await
        .unwrap_or_else(|e| {
            error!("Error loading comments for question #{}: {}", question_id, e);
            Vec::new()
        });

    let mut answer_comments = HashMap::new();
    for answer in &answers {
        let comments = get_answer_comments(client, base_url, answer.id)
            .await
            .unwrap_or_else(|e| {
                error!("Error loading comments for answer #{}: {}", answer.id, e);
                Vec::new()
            });
        answer_comments.insert(answer.id, comments);
    }

    Ok(QuestionPage {
        question,
        answers,
        question_comments,
        answer_comments,
    })
}
