pub mod analytics;
pub mod events;
pub mod question;
pub mod session;
pub mod vote;
