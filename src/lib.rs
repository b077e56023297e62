//! Optimistic voting client for a Q&A site.
//!
//! [`vote::VoteCoordinator`] applies question and answer votes locally before
//! the backend confirms them and rolls them back on failure;
//! [`vote::CommentVoteToggle`] does the same for comment upvotes. The `api`
//! module talks to the REST backend, and `gui` is a small egui front end.

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod gui;
pub mod models;
pub mod vote;

pub use error::{ApiError, VoteError};
