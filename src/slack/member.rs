//! Channel membership.

use super::{api::*, auth::*, channel::ChannelId, error::SlackError};
use serde::{Deserialize, Serialize};

/// <https://api.slack.com/methods/conversations.members#args>
#[derive(Serialize)]
struct MembersRequest<'a> {
    channel: &'a ChannelId,
}

/// <https://api.slack.com/methods/conversations.members#examples>
#[derive(Deserialize)]
struct MembersResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    members: Vec<UserId>,
}

impl SlackClient {
    /// List the users in a channel. Only the first page Slack returns is read.
    pub async fn channel_members(
        &self,
        channel: &ChannelId,
        token: &SlackAccessToken,
    ) -> Result<Vec<UserId>, SlackError> {
        let body = send(
            self.post("/conversations.members", token)
                .json(&MembersRequest { channel }),
        )
        .await?;
        let res: MembersResponse = parse(body)?;

        Ok(res.members)
    }

    pub async fn is_member(
        &self,
        channel: &ChannelId,
        user: &UserId,
        token: &SlackAccessToken,
    ) -> Result<bool, SlackError> {
        let members = self.channel_members(channel, token).await?;

        Ok(members.iter().any(|m| m == user))
    }
}
