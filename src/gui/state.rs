use anyhow::Result;
use log::{debug, error, info};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Handle;

use crate::analytics::{analytics_session_id, AnalyticsLogger};
use crate::api::question::load_question_page;
use crate::api::HttpVoteBackend;
use crate::config::AgentConfig;
use crate::models::events::Event;
use crate::models::question::QuestionPage;
use crate::models::vote::{SubjectKind, VoteDirection, VoteSubject};
use crate::vote::{CommentVoteToggle, VoteBackend, VoteCoordinator};

const MAX_LOGS: usize = 100;
const SCROLL_LOG_STEP: f32 = 200.0;

/// Tags page loads so that a superseded load leaves the coordinators alone.
#[derive(Debug, Clone, Default)]
pub struct LoadGeneration(Arc<AtomicU64>);

impl LoadGeneration {
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0.load(Ordering::SeqCst) == generation
    }
}

pub struct AppState {
    pub config: AgentConfig,
    pub question_id_input: String,
    pub question_id: i64,
    pub page: Option<QuestionPage>,
    pub loading: bool,
    pub status_message: String,
    pub logs: Vec<String>,
    history: Vec<i64>,
    forward: Vec<i64>,
    hovered: Option<VoteSubject>,
    logged_scroll_y: f32,
    generation: LoadGeneration,
    client: reqwest::Client,
    runtime: Handle,
    votes: Arc<VoteCoordinator>,
    comments: Arc<CommentVoteToggle>,
    analytics: AnalyticsLogger,
    event_sender: Sender<Event>,
    event_receiver: Receiver<Event>,
}

impl AppState {
    pub fn new(config: AgentConfig, runtime: Handle) -> Result<Self> {
        let client = config.http_client()?;
        let session = config.session();
        let backend: Arc<dyn VoteBackend> = Arc::new(HttpVoteBackend::new(
            client.clone(),
            config.api_url.clone(),
            config.retract_mode,
        ));
        let votes = Arc::new(VoteCoordinator::new(backend.clone(), session.clone()));
        let comments = Arc::new(CommentVoteToggle::new(backend, session.clone()));
        let analytics = if config.analytics_enabled {
            AnalyticsLogger::new(
                client.clone(),
                config.api_url.clone(),
                analytics_session_id(session.token.as_deref()),
                runtime.clone(),
            )
        } else {
            AnalyticsLogger::disabled(runtime.clone())
        };
        let (event_sender, event_receiver) = channel();

        Ok(Self {
            question_id_input: config.question_id.to_string(),
            question_id: config.question_id,
            config,
            page: None,
            loading: false,
            status_message: "Idle".to_owned(),
            logs: Vec::new(),
            history: Vec::new(),
            forward: Vec::new(),
            hovered: None,
            logged_scroll_y: 0.0,
            generation: LoadGeneration::default(),
            client,
            runtime,
            votes,
            comments,
            analytics,
            event_sender,
            event_receiver,
        })
    }

    pub fn votes(&self) -> &VoteCoordinator {
        &self.votes
    }

    pub fn comments(&self) -> &CommentVoteToggle {
        &self.comments
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    /// Open the question typed into the header. `key` is the key that
    /// submitted it, if any.
    pub fn submit_question_input(&mut self, key: Option<&str>) {
        let input = self.question_id_input.trim().to_owned();
        if let Some(key) = key {
            self.analytics.log_key_press("question-id", &input, key);
        }
        match input.parse::<i64>() {
            Ok(question_id) => self.open_question(question_id),
            Err(_) => self.status_message = "Invalid question ID".to_owned(),
        }
    }

    pub fn open_question(&mut self, question_id: i64) {
        self.analytics
            .log_go_to_url("Load", &format!("/questions/{}", question_id));
        if question_id != self.question_id {
            self.history.push(self.question_id);
            self.forward.clear();
        }
        self.load_question(question_id);
    }

    pub fn go_back(&mut self) {
        let Some(previous) = self.history.pop() else {
            return;
        };
        self.analytics.log_go_back("Back");
        self.forward.push(self.question_id);
        self.load_question(previous);
    }

    pub fn go_forward(&mut self) {
        let Some(next) = self.forward.pop() else {
            return;
        };
        self.analytics.log_go_forward("Forward");
        self.history.push(self.question_id);
        self.load_question(next);
    }

    /// Drop the current page's vote state and load another question.
    pub fn load_question(&mut self, question_id: i64) {
        self.votes.clear();
        self.comments.clear();
        self.page = None;
        self.loading = true;
        self.question_id = question_id;
        self.question_id_input = question_id.to_string();
        self.hovered = None;
        self.logged_scroll_y = 0.0;
        self.logs.clear();
        self.status_message = format!("Loading question #{}...", question_id);
        self.analytics
            .set_page_url(format!("/questions/{}", question_id));

        let ticket = self.generation.begin();
        let generation = self.generation.clone();
        let client = self.client.clone();
        let base_url = self.config.api_url.clone();
        let votes = self.votes.clone();
        let comments = self.comments.clone();
        let sender = self.event_sender.clone();

        self.runtime.spawn(async move {
            let page = match load_question_page(&client, &base_url, question_id).await {
                Ok(page) => page,
                Err(e) => {
                    error!("Failed to load question #{}: {}", question_id, e);
                    if generation.is_current(ticket) {
                        notify(&sender, Event::PageLoadFailed(e.to_string()));
                    }
                    return;
                }
            };
            if !generation.is_current(ticket) {
                debug!("Dropping superseded load of question #{}", question_id);
                return;
            }

            votes.register(VoteSubject::question(page.question.id), page.question.votes);
            let answer_ids: Vec<i64> = page
                .answers
                .iter()
                .map(|answer| {
                    votes.register(VoteSubject::answer(answer.id), answer.votes);
                    answer.id
                })
                .collect();
            let comment_ids: Vec<i64> = page
                .comments()
                .map(|comment| {
                    comments.register(comment.id, comment.votes);
                    comment.id
                })
                .collect();

            votes.load_user_votes(question_id, &answer_ids).await;
            for comment_id in comment_ids {
                comments.load_status(comment_id).await;
            }
            if generation.is_current(ticket) {
                notify(&sender, Event::PageLoaded(Box::new(page)));
            }
        });
    }

    pub fn cast_vote(&mut self, subject: VoteSubject, direction: VoteDirection) {
        let label = match direction {
            VoteDirection::Up => "Upvote",
            VoteDirection::Down => "Downvote",
        };
        self.analytics.log_click(
            &format!("{}-vote-{}", element_id(subject), direction),
            label,
            None,
        );

        let votes = self.votes.clone();
        let sender = self.event_sender.clone();
        self.runtime.spawn(async move {
            if let Err(e) = votes.cast_vote(subject, direction).await {
                notify(
                    &sender,
                    Event::VoteFailed {
                        subject,
                        message: e.to_string(),
                    },
                );
            }
        });
    }

    pub fn toggle_comment_vote(&mut self, comment_id: i64) {
        self.analytics.log_click(
            &format!("comment-{}-vote", comment_id),
            "This comment adds something useful to the post",
            None,
        );

        let comments = self.comments.clone();
        let sender = self.event_sender.clone();
        self.runtime.spawn(async move {
            if let Err(e) = comments.toggle(comment_id).await {
                notify(
                    &sender,
                    Event::CommentVoteFailed {
                        comment_id,
                        message: e.to_string(),
                    },
                );
            }
        });
    }

    /// Score label under the pointer this frame, if any.
    pub fn hover_score(&mut self, hovered: Option<(VoteSubject, i64)>) {
        let subject = hovered.map(|(subject, _)| subject);
        if subject == self.hovered {
            return;
        }
        self.hovered = subject;
        if let Some((subject, score)) = hovered {
            self.analytics
                .log_hover(&format!("{}-score", element_id(subject)), &score.to_string());
        }
    }

    pub fn note_scroll(&mut self, offset_y: f32) {
        if (offset_y - self.logged_scroll_y).abs() >= SCROLL_LOG_STEP {
            self.logged_scroll_y = offset_y;
            self.analytics.log_scroll("question", 0.0, offset_y);
        }
    }

    fn push_log(&mut self, message: String) {
        if self.logs.len() >= MAX_LOGS {
            self.logs.drain(..=self.logs.len() - MAX_LOGS);
        }
        self.logs.push(message);
    }

    /// Apply results of background work; called once per frame.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                Event::PageLoaded(page) => {
                    if page.question.id != self.question_id {
                        continue;
                    }
                    info!("Question #{} loaded", page.question.id);
                    let data = HashMap::from([
                        ("question_id".to_owned(), page.question.id.into()),
                        ("answers".to_owned(), page.answers.len().into()),
                    ]);
                    self.analytics
                        .log_custom("question_viewed", &page.question.title, data);
                    self.loading = false;
                    self.status_message = format!("Loaded question #{}", page.question.id);
                    self.page = Some(*page);
                }
                Event::PageLoadFailed(message) => {
                    self.loading = false;
                    self.status_message = format!("Failed to load question: {}", message);
                    self.push_log(self.status_message.clone());
                }
                Event::VoteFailed { subject, message } => {
                    self.status_message = format!("Vote on {} failed", subject);
                    self.push_log(message);
                }
                Event::CommentVoteFailed {
                    comment_id,
                    message,
                } => {
                    self.status_message = format!("Vote on comment #{} failed", comment_id);
                    self.push_log(message);
                }
            }
        }
    }
}

fn element_id(subject: VoteSubject) -> String {
    let kind = match subject.kind {
        SubjectKind::Question => "question",
        SubjectKind::Answer => "answer",
    };
    format!("{}-{}", kind, subject.id)
}

fn notify(sender: &Sender<Event>, event: Event) {
    if sender.send(event).is_err() {
        debug!("Event channel closed, dropping event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_state() -> AppState {
        let config = AgentConfig {
            api_url: "http://127.0.0.1:9".to_owned(),
            analytics_enabled: false,
            ..AgentConfig::default()
        };
        AppState::new(config, Handle::current()).unwrap()
    }

    #[test]
    fn newer_load_supersedes_older() {
        let generation = LoadGeneration::default();
        let first = generation.begin();
        assert!(generation.is_current(first));

        let second = generation.clone().begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[test]
    fn event_for_a_closed_window_is_dropped() {
        let (sender, receiver) = channel();
        drop(receiver);
        notify(&sender, Event::PageLoadFailed("gone".to_owned()));
    }

    #[tokio::test]
    async fn log_keeps_only_recent_entries() {
        let mut state = offline_state();
        for i in 0..(MAX_LOGS + 50) {
            state
                .event_sender
                .send(Event::CommentVoteFailed {
                    comment_id: 1,
                    message: i.to_string(),
                })
                .unwrap();
        }
        state.drain_events();

        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.first().map(String::as_str), Some("50"));
        assert_eq!(state.logs.last().map(String::as_str), Some("149"));
    }

    #[tokio::test]
    async fn loading_a_question_clears_the_log() {
        let mut state = offline_state();
        state.logs.push("old failure".to_owned());
        state.load_question(2);
        assert!(state.logs.is_empty());
        assert!(state.loading);
    }

    #[tokio::test]
    async fn back_and_forward_walk_the_history() {
        let mut state = offline_state();
        assert_eq!(state.question_id, 1);

        state.open_question(2);
        state.open_question(3);
        assert!(state.can_go_back());
        assert!(!state.can_go_forward());

        state.go_back();
        assert_eq!(state.question_id, 2);
        assert!(state.can_go_forward());

        state.go_back();
        assert_eq!(state.question_id, 1);
        assert!(!state.can_go_back());

        state.go_forward();
        assert_eq!(state.question_id, 2);

        // a new destination drops the forward trail
        state.open_question(7);
        assert!(!state.can_go_forward());
        assert_eq!(state.question_id_input, "7");
    }

    #[tokio::test]
    async fn invalid_input_is_reported() {
        let mut state = offline_state();
        state.question_id_input = "abc".to_owned();
        state.submit_question_input(Some("Enter"));
        assert_eq!(state.status_message, "Invalid question ID");
        assert_eq!(state.question_id, 1);
    }

    #[tokio::test]
    async fn stale_page_is_not_shown() {
        let mut state = offline_state();
        state.load_question(2);
        let question = serde_json::from_value(serde_json::json!({
            "id": 1, "title": "t", "body": "b", "author_id": 1
        }))
        .unwrap();
        let page = QuestionPage {
            question,
            answers: Vec::new(),
            question_comments: Vec::new(),
            answer_comments: HashMap::new(),
        };
        state.event_sender.send(Event::PageLoaded(Box::new(page))).unwrap();
        state.drain_events();
        assert!(state.page.is_none());
        assert!(state.loading);
    }
}
