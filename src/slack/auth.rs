//! Helpers around Slack's use of OAuth Bearer Authentication, and discovering
//! who that authentication says we are.

use super::{api::*, error::SlackError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A newtype wrapper around Slack access tokens.
#[derive(PartialEq, Eq, Clone)]
pub struct SlackAccessToken(pub String);

/// Tokens end up in logged structures, so only the prefix identifying the token
/// type is ever printed.
///
/// ```
/// let token = SlackAccessToken("xoxb-1234-5678".into());
/// assert_eq!(format!("{:?}", token), "SlackAccessToken(xoxb-***)");
/// ```
impl fmt::Debug for SlackAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_once('-') {
            Some((prefix, _)) => write!(f, "SlackAccessToken({}-***)", prefix),
            None => write!(f, "SlackAccessToken(***)"),
        }
    }
}

/// Convert a Slack access token to a `Bearer` `Authorization` header value.
///
/// ```
/// let token = SlackAccessToken("xoxb-foo".into());
/// assert_eq!(to_auth_header_val(&token), "Bearer xoxb-foo");
/// ```
pub fn to_auth_header_val(t: &SlackAccessToken) -> String {
    format!("Bearer {}", t.0)
}

/// Slack's identifier for a user, bots included, e.g. `U01B2QZG4V7`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// <https://api.slack.com/methods/auth.test#examples>
#[derive(Deserialize)]
struct AuthTestResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    user_id: UserId,
}

impl SlackClient {
    /// Ask Slack which user the token belongs to. For a bot token that's the
    /// bot's own user.
    pub async fn whoami(&self, token: &SlackAccessToken) -> Result<UserId, SlackError> {
        let body = send(self.get("/auth.test", token)).await?;
        let res: AuthTestResponse = parse(body)?;

        Ok(res.user_id)
    }
}
