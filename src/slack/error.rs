use crate::slack::channel::ChannelName;
use reqwest::StatusCode;
use std::fmt;

/// Sum type representing every possible unexceptional fail state.
#[derive(Debug)]
pub enum SlackError {
    APIRequestFailed(reqwest::Error),
    UnexpectedStatus(StatusCode),
    APIResponseError(String),
    APIResponseMissingError,
    MalformedResponse(serde_json::Error),
    MissingField(&'static str),
    UnknownChannel(ChannelName),
}

impl From<reqwest::Error> for SlackError {
    fn from(e: reqwest::Error) -> Self {
        SlackError::APIRequestFailed(e)
    }
}

impl fmt::Display for SlackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            SlackError::APIRequestFailed(e) => format!("Slack API request failed: {:?}", e),
            SlackError::UnexpectedStatus(s) => format!("Slack API responded with status {}", s),
            SlackError::APIResponseError(e) => format!("Slack API returned error: {}", e),
            SlackError::APIResponseMissingError => "Slack API failed to return error.".into(),
            SlackError::MalformedResponse(e) => format!("Slack API response was malformed: {}", e),
            SlackError::MissingField(x) => format!("Slack API response is missing `{}`", x),
            SlackError::UnknownChannel(c) => format!("Unknown Slack channel: {}", c),
        };

        write!(f, "{}", x)
    }
}
