//! Interact with Slack channels, including the ability to programmatically
//! join them.

use super::{api::*, auth::SlackAccessToken, error::SlackError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, NoneAsEmptyString};
use std::fmt;

/// Channel names as are visible in the Slack UI, with or without the leading
/// hash.
///
/// ```
/// let with =    ChannelName("#일반".into());
/// let without = ChannelName("일반".into());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelName(pub String);

impl ChannelName {
    /// Channel names can't contain hashes, so stripping one lets consumers
    /// supply (or not) a leading hash.
    pub fn normalised(&self) -> ChannelName {
        ChannelName(self.0.trim_start_matches('#').into())
    }
}

/// Format without the surrounding newtype wrapper.
///
/// ```
/// let x = ChannelName("fp".into());
/// assert_eq!(format!("{}", x), "fp");
/// ```
impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Because channel names can change, channels are generally referred to by
/// their underlying ID. This can be found in the UI by copying a link to the
/// channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The metadata we care about per-channel within [ListResponse].
#[derive(Debug, Deserialize)]
pub struct ChannelMeta {
    pub id: ChannelId,
    pub name: ChannelName,
}

/// <https://api.slack.com/methods/conversations.join#args>
#[derive(Serialize)]
struct JoinRequest<'a> {
    channel: &'a ChannelId,
}

/// <https://api.slack.com/methods/conversations.join#examples>
#[derive(Deserialize)]
struct JoinResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
}

impl SlackClient {
    /// We must join channels before we can message in them.
    pub async fn join_channel(
        &self,
        channel: &ChannelId,
        token: &SlackAccessToken,
    ) -> Result<(), SlackError> {
        let body = send(
            self.post("/conversations.join", token)
                .json(&JoinRequest { channel }),
        )
        .await?;

        parse::<JoinResponse>(body).map(|_| ())
    }

    /// Fetch a single page of channels. The body is handed back untouched so
    /// that it can be persisted before being read with
    /// [ChannelPage::from_body].
    pub async fn list_channels(
        &self,
        cursor: Option<String>,
        token: &SlackAccessToken,
    ) -> Result<Value, SlackError> {
        send(
            self.get("/conversations.list", token)
                .query(&ListRequest {
                    limit: 200,
                    exclude_archived: true,
                    cursor,
                }),
        )
        .await
    }
}

/// <https://api.slack.com/methods/conversations.list#args>
#[derive(Serialize)]
struct ListRequest {
    /// Maximum supported is 1000, but a limit of 200 is "recommended".
    limit: u16,
    /// Doesn't affect `limit`.
    exclude_archived: bool,
    cursor: Option<String>,
}

/// <https://api.slack.com/methods/conversations.list#examples>
#[derive(Deserialize)]
struct ListResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    channels: Vec<ChannelMeta>,
    #[serde(default)]
    response_metadata: Option<PaginationMeta>,
}

/// The metadata attached to a [ListResponse], enabling pagination.
#[serde_as]
#[derive(Deserialize)]
struct PaginationMeta {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    next_cursor: Option<String>,
}

/// One successfully parsed page of `conversations.list`.
#[derive(Debug)]
pub struct ChannelPage {
    pub channels: Vec<ChannelMeta>,
    /// Present only when there are further pages to fetch.
    pub next_cursor: Option<String>,
}

impl ChannelPage {
    pub fn from_body(body: Value) -> Result<Self, SlackError> {
        let res: ListResponse = parse(body)?;

        Ok(ChannelPage {
            channels: res.channels,
            next_cursor: res.response_metadata.and_then(|m| m.next_cursor),
        })
    }

    /// The ID of the first channel on this page with exactly the given name.
    pub fn find(&self, name: &ChannelName) -> Option<&ChannelId> {
        let name = name.normalised();

        self.channels
            .iter()
            .find(|meta| meta.name == name)
            .map(|meta| &meta.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn token() -> SlackAccessToken {
        SlackAccessToken("xoxb-foo".into())
    }

    #[test]
    fn test_normalised() {
        assert_eq!(
            ChannelName("#일반".into()).normalised(),
            ChannelName("일반".into())
        );
        assert_eq!(
            ChannelName("random".into()).normalised(),
            ChannelName("random".into())
        );
    }

    #[test]
    fn test_page_find() {
        let page = ChannelPage::from_body(json!({
            "ok": true,
            "channels": [
                { "id": "C1", "name": "random" },
                { "id": "C2", "name": "일반" },
                { "id": "C3", "name": "일반" }
            ],
            "response_metadata": { "next_cursor": "" }
        }))
        .unwrap();

        assert_eq!(page.next_cursor, None);
        assert_eq!(
            page.find(&ChannelName("일반".into())),
            Some(&ChannelId("C2".into()))
        );
        assert_eq!(
            page.find(&ChannelName("#일반".into())),
            Some(&ChannelId("C2".into()))
        );
        assert_eq!(page.find(&ChannelName("general".into())), None);
    }

    #[test]
    fn test_page_without_metadata() {
        let page = ChannelPage::from_body(json!({ "ok": true, "channels": [] })).unwrap();

        assert!(page.channels.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_page_cursor() {
        let page = ChannelPage::from_body(json!({
            "ok": true,
            "channels": [],
            "response_metadata": { "next_cursor": "dGVhbTpDMDYxRkE1UEI=" }
        }))
        .unwrap();

        assert_eq!(page.next_cursor.as_deref(), Some("dGVhbTpDMDYxRkE1UEI="));
    }

    #[tokio::test]
    async fn test_list_channels_query() {
        let mut srv = mockito::Server::new_async().await;
        let mock = srv
            .mock("GET", "/conversations.list")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "200".into()),
                Matcher::UrlEncoded("exclude_archived".into(), "true".into()),
                Matcher::UrlEncoded("cursor".into(), "next".into()),
            ]))
            .with_body(r#"{ "ok": true, "channels": [] }"#)
            .create_async()
            .await;

        let body = SlackClient::new(srv.url())
            .list_channels(Some("next".into()), &token())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(body, json!({ "ok": true, "channels": [] }));
    }

    #[tokio::test]
    async fn test_join_channel() {
        let mut srv = mockito::Server::new_async().await;
        let mock = srv
            .mock("POST", "/conversations.join")
            .match_header("authorization", "Bearer xoxb-foo")
            .match_body(Matcher::Json(json!({ "channel": "C1" })))
            .with_body(r#"{ "ok": true, "channel": { "id": "C1" } }"#)
            .create_async()
            .await;

        let res = SlackClient::new(srv.url())
            .join_channel(&ChannelId("C1".into()), &token())
            .await;

        mock.assert_async().await;
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn test_join_channel_archived() {
        let mut srv = mockito::Server::new_async().await;
        let mock = srv
            .mock("POST", "/conversations.join")
            .with_body(r#"{ "ok": false, "error": "is_archived" }"#)
            .create_async()
            .await;

        let res = SlackClient::new(srv.url())
            .join_channel(&ChannelId("C1".into()), &token())
            .await;

        mock.assert_async().await;
        assert!(matches!(res, Err(SlackError::APIResponseError(e)) if e == "is_archived"));
    }
}
