//! Send plain text messages to a Slack channel, optionally as a reply within a
//! thread.

use super::{api::*, auth::SlackAccessToken, channel::*, error::SlackError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A message timestamp, which doubles as the message's ID within its channel.
/// Replies refer to their parent by it as `thread_ts`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTs(pub String);

impl fmt::Display for MessageTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// <https://api.slack.com/methods/chat.postMessage#args>
#[derive(Serialize)]
struct MessageRequest<'a> {
    channel: &'a ChannelId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a MessageTs>,
}

/// <https://api.slack.com/methods/chat.postMessage#examples>
#[derive(Deserialize)]
struct MessageResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    message: Option<PostedMessage>,
}

#[derive(Deserialize)]
struct PostedMessage {
    ts: Option<MessageTs>,
}

impl SlackClient {
    /// Post a message in a channel we've already joined, as a reply if
    /// `thread_ts` is supplied. The body is handed back untouched so that it
    /// can be persisted before being read with [posted_ts].
    pub async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
        thread_ts: Option<&MessageTs>,
        token: &SlackAccessToken,
    ) -> Result<Value, SlackError> {
        send(self.post("/chat.postMessage", token).json(&MessageRequest {
            channel,
            text,
            thread_ts,
        }))
        .await
    }
}

/// Check that a message was posted, returning its timestamp if Slack
/// included one.
pub fn check_posted(body: Value) -> Result<Option<MessageTs>, SlackError> {
    let res: MessageResponse = parse(body)?;

    Ok(res.message.and_then(|m| m.ts))
}

/// The timestamp of a successfully posted message, which must be present.
pub fn posted_ts(body: Value) -> Result<MessageTs, SlackError> {
    check_posted(body)?.ok_or(SlackError::MissingField("message.ts"))
}
