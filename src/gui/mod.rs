use eframe::egui;
use egui::RichText;
use std::time::Duration;

use crate::models::question::Comment;
use crate::models::vote::{VoteDirection, VoteSubject};
use crate::vote::{CommentSnapshot, CommentVoteToggle, VoteCoordinator};

pub mod state;

use state::AppState;

enum UiAction {
    Submit(Option<&'static str>),
    Back,
    Forward,
    Vote(VoteSubject, VoteDirection),
    ToggleComment(i64),
}

pub struct VoteApp {
    state: AppState,
}

impl VoteApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for VoteApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui_main(ctx, &mut self.state);
    }
}

pub fn ui_main(ctx: &egui::Context, state: &mut AppState) {
    ctx.set_visuals(egui::Visuals::light());
    state.drain_events();

    let mut actions = Vec::new();
    let mut hovered = None;
    let mut scrolled = None;

    egui::TopBottomPanel::top("header").show(ctx, |ui| {
        egui::Frame::default()
            .outer_margin(egui::vec2(0.0, 4.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if ui.add_enabled(state.can_go_back(), egui::Button::new("◀")).clicked() {
                        actions.push(UiAction::Back);
                    }
                    if ui
                        .add_enabled(state.can_go_forward(), egui::Button::new("▶"))
                        .clicked()
                    {
                        actions.push(UiAction::Forward);
                    }
                    ui.label("Question #");
                    let input = ui.add(
                        egui::TextEdit::singleline(&mut state.question_id_input)
                            .desired_width(60.0),
                    );
                    if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        actions.push(UiAction::Submit(Some("Enter")));
                    }
                    if ui.button("Load").clicked() {
                        actions.push(UiAction::Submit(None));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!("User {}", state.config.user_id));
                    });
                });
            });
    });

    egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(&state.status_message);
            if let Some(last) = state.logs.last() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(last).small().weak());
                });
            }
        });
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(page) = &state.page else {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                if state.loading {
                    ui.spinner();
                } else {
                    ui.label("No question loaded");
                }
            });
            return;
        };
        let votes = state.votes();
        let comments = state.comments();

        let output = egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(page.question.title.as_str());
                ui.label(
                    RichText::new(format!(
                        "Asked {}  Viewed {} times",
                        page.question.created_at, page.question.views
                    ))
                    .small()
                    .weak(),
                );
                ui.separator();

                ui.horizontal_top(|ui| {
                    let subject = VoteSubject::question(page.question.id);
                    vote_control(ui, votes, subject, &mut actions, &mut hovered);
                    ui.vertical(|ui| {
                        ui.label(&page.question.body);
                        comment_list(ui, &page.question_comments, comments, &mut actions);
                    });
                });

                ui.add_space(16.0);
                let count = page.answers.len();
                ui.heading(format!("{} Answer{}", count, if count == 1 { "" } else { "s" }));

                for answer in &page.answers {
                    ui.separator();
                    ui.horizontal_top(|ui| {
                        let subject = VoteSubject::answer(answer.id);
                        vote_control(ui, votes, subject, &mut actions, &mut hovered);
                        ui.vertical(|ui| {
                            if answer.is_accepted {
                                ui.label(RichText::new("✔ Accepted").color(egui::Color32::DARK_GREEN));
                            }
                            ui.label(&answer.body);
                            ui.label(
                                RichText::new(format!("answered by User {}", answer.author_id))
                                    .small()
                                    .weak(),
                            );
                            let answer_comments = page
                                .answer_comments
                                .get(&answer.id)
                                .map(Vec::as_slice)
                                .unwrap_or(&[]);
                            comment_list(ui, answer_comments, comments, &mut actions);
                        });
                    });
                }
            });
        scrolled = Some(output.state.offset.y);
    });

    state.hover_score(hovered);
    if let Some(offset_y) = scrolled {
        state.note_scroll(offset_y);
    }

    for action in actions {
        match action {
            UiAction::Submit(key) => state.submit_question_input(key),
            UiAction::Back => state.go_back(),
            UiAction::Forward => state.go_forward(),
            UiAction::Vote(subject, direction) => state.cast_vote(subject, direction),
            UiAction::ToggleComment(comment_id) => state.toggle_comment_vote(comment_id),
        }
    }

    // pick up coordinator changes made by background tasks
    ctx.request_repaint_after(Duration::from_millis(200));
}

fn vote_control(
    ui: &mut egui::Ui,
    votes: &VoteCoordinator,
    subject: VoteSubject,
    actions: &mut Vec<UiAction>,
    hovered: &mut Option<(VoteSubject, i64)>,
) {
    let Some(snapshot) = votes.snapshot(subject) else {
        return;
    };
    ui.vertical_centered(|ui| {
        ui.set_width(40.0);
        let up = egui::SelectableLabel::new(snapshot.current == Some(VoteDirection::Up), "▲");
        if ui.add_enabled(!snapshot.pending, up).clicked() {
            actions.push(UiAction::Vote(subject, VoteDirection::Up));
        }
        let score = ui.label(RichText::new(snapshot.score.to_string()).strong());
        if score.hovered() {
            *hovered = Some((subject, snapshot.score));
        }
        let down = egui::SelectableLabel::new(snapshot.current == Some(VoteDirection::Down), "▼");
        if ui.add_enabled(!snapshot.pending, down).clicked() {
            actions.push(UiAction::Vote(subject, VoteDirection::Down));
        }
    });
}

fn comment_list(
    ui: &mut egui::Ui,
    list: &[Comment],
    toggle: &CommentVoteToggle,
    actions: &mut Vec<UiAction>,
) {
    if list.is_empty() {
        return;
    }
    ui.add_space(8.0);
    ui.label(
        RichText::new(format!(
            "{} Comment{}",
            list.len(),
            if list.len() == 1 { "" } else { "s" }
        ))
        .small()
        .strong(),
    );
    for comment in list {
        let snapshot = toggle.snapshot(comment.id).unwrap_or(CommentSnapshot {
            voted: false,
            pending: false,
            score: comment.votes,
        });
        ui.horizontal_wrapped(|ui| {
            let text = if snapshot.score > 0 {
                format!("▲ {}", snapshot.score)
            } else {
                "▲".to_owned()
            };
            let button = egui::SelectableLabel::new(snapshot.voted, text);
            if ui.add_enabled(!snapshot.pending, button).clicked() {
                actions.push(UiAction::ToggleComment(comment.id));
            }
            ui.label(RichText::new(&comment.body).small());
            ui.label(
                RichText::new(format!("– User {}", comment.author_id))
                    .small()
                    .weak(),
            );
        });
    }
}
