//! A deliberately small client for the handful of Slack Web API methods the
//! workflow needs.
//!
//! Every call goes through [api::SlackClient], which checks the HTTP status
//! and Slack's own `ok` flag before anything endpoint-specific happens.

pub mod api;
pub mod auth;
pub mod channel;
pub mod error;
pub mod member;
pub mod message;
