//! The fixed sequence of Slack calls making up a run:
//!
//! 1. Resolve the bot's user ID, unless configured.
//! 2. Resolve the channel ID by name, unless configured.
//! 3. Check whether the member user is in the channel, and
//! 4. join it if not.
//! 5. Post a message.
//! 6. Reply to that message in a thread.
//!
//! Each step takes the [Context] by value and hands back an updated one. The
//! first failure ends the run; nothing already done on Slack's side is undone.

use crate::{
    config::Config,
    dump::{self, Dumps},
    error::Failure,
    slack::{
        api::SlackClient,
        auth::{SlackAccessToken, UserId},
        channel::{ChannelId, ChannelName, ChannelPage},
        error::SlackError,
        message::{check_posted, posted_ts, MessageTs},
    },
};
use serde_json::Value;
use std::{collections::HashSet, fmt};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    ResolveBotId,
    ResolveChannel,
    CheckMembership,
    JoinChannel,
    PostMessage,
    PostReply,
}

impl Step {
    /// Attribute a Slack error to this step.
    fn fail(self) -> impl FnOnce(SlackError) -> Failure {
        move |e| Failure::Slack(self, e)
    }
}

/// Formatted to read as "Failed to ...".
impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            Step::ResolveBotId => "resolve bot identity",
            Step::ResolveChannel => "resolve channel",
            Step::CheckMembership => "check channel membership",
            Step::JoinChannel => "join channel",
            Step::PostMessage => "post message",
            Step::PostReply => "post threaded reply",
        };

        write!(f, "{}", x)
    }
}

/// What the steps know. Unset options are filled in as the run progresses.
#[derive(Clone, Debug)]
pub struct Context {
    pub token: SlackAccessToken,
    pub channel_id: Option<ChannelId>,
    pub thread_ts: Option<MessageTs>,
    pub bot_id: Option<UserId>,
    pub channel_name: ChannelName,
    pub member_id: UserId,
    pub text: String,
}

impl From<Config> for Context {
    fn from(c: Config) -> Self {
        Context {
            token: c.token,
            channel_id: c.channel_id,
            thread_ts: c.thread_ts,
            bot_id: c.bot_id,
            channel_name: c.channel_name,
            member_id: c.member_id,
            text: c.text,
        }
    }
}

pub struct Runner {
    client: SlackClient,
    dumps: Dumps,
}

impl Runner {
    pub fn new(client: SlackClient, dumps: Dumps) -> Self {
        Runner { client, dumps }
    }

    pub async fn run(&self, ctx: Context) -> Result<Context, Failure> {
        let ctx = self.resolve_bot_id(ctx).await?;
        let ctx = self.resolve_channel_id(ctx).await?;
        let ctx = self.ensure_membership(ctx).await?;
        let ctx = self.post_message(ctx).await?;
        let ctx = self.post_reply(ctx).await?;

        info!("Done");
        Ok(ctx)
    }

    pub async fn resolve_bot_id(&self, ctx: Context) -> Result<Context, Failure> {
        if let Some(bot_id) = &ctx.bot_id {
            debug!(%bot_id, "Using configured bot ID");
            return Ok(ctx);
        }

        let bot_id = self
            .client
            .whoami(&ctx.token)
            .await
            .map_err(Step::ResolveBotId.fail())?;

        info!(%bot_id, "Resolved bot ID");
        Ok(Context {
            bot_id: Some(bot_id),
            ..ctx
        })
    }

    /// Walk `conversations.list` until a channel with the configured name
    /// turns up. Only the first page is dumped.
    pub async fn resolve_channel_id(&self, ctx: Context) -> Result<Context, Failure> {
        if let Some(channel_id) = &ctx.channel_id {
            debug!(%channel_id, "Using configured channel ID");
            return Ok(ctx);
        }

        let mut cursor: Option<String> = None;
        let mut seen: HashSet<String> = HashSet::new();

        loop {
            let first_page = cursor.is_none();

            let body = self
                .client
                .list_channels(cursor, &ctx.token)
                .await
                .map_err(Step::ResolveChannel.fail())?;
            let page = ChannelPage::from_body(body.clone()).map_err(Step::ResolveChannel.fail())?;

            if first_page {
                self.dump(dump::CHANNEL_LIST, &body)?;
            }

            if let Some(channel_id) = page.find(&ctx.channel_name) {
                info!(channel = %ctx.channel_name, %channel_id, "Resolved channel ID");
                return Ok(Context {
                    channel_id: Some(channel_id.clone()),
                    ..ctx
                });
            }

            // A repeated cursor would otherwise page forever.
            cursor = match page.next_cursor {
                Some(next) if seen.insert(next.clone()) => Some(next),
                Some(next) => {
                    warn!(cursor = %next, "conversations.list repeated a cursor");
                    break;
                }
                None => break,
            };
        }

        info!("No channel named '{}' found", ctx.channel_name);
        Err(Failure::Slack(
            Step::ResolveChannel,
            SlackError::UnknownChannel(ctx.channel_name),
        ))
    }

    /// Join the channel unless the member user is already in it.
    // The member user is configured independently of the resolved bot ID, so
    // the two can disagree. That's surfaced rather than reconciled.
    pub async fn ensure_membership(&self, ctx: Context) -> Result<Context, Failure> {
        let channel = channel(&ctx, Step::CheckMembership)?;

        if let Some(bot_id) = &ctx.bot_id {
            if bot_id != &ctx.member_id {
                warn!(
                    member_id = %ctx.member_id,
                    %bot_id,
                    "Checking membership of a user other than the bot"
                );
            }
        }

        let is_member = self
            .client
            .is_member(channel, &ctx.member_id, &ctx.token)
            .await
            .map_err(Step::CheckMembership.fail())?;

        if is_member {
            debug!(%channel, "Already a member of the channel");
        } else {
            info!(%channel, "Not a member of the channel, joining");

            self.client
                .join_channel(channel, &ctx.token)
                .await
                .map_err(Step::JoinChannel.fail())?;
        }

        Ok(ctx)
    }

    /// Post the top-level message, remembering its timestamp as the thread to
    /// reply in. The raw response is dumped before being checked.
    pub async fn post_message(&self, ctx: Context) -> Result<Context, Failure> {
        let channel = channel(&ctx, Step::PostMessage)?;

        let body = self
            .client
            .post_message(channel, &ctx.text, None, &ctx.token)
            .await
            .map_err(Step::PostMessage.fail())?;

        info!(response = %body, "chat.postMessage responded");
        self.dump(dump::MESSAGE_POST, &body)?;

        let thread_ts = posted_ts(body).map_err(Step::PostMessage.fail())?;

        Ok(Context {
            thread_ts: Some(thread_ts),
            ..ctx
        })
    }

    pub async fn post_reply(&self, ctx: Context) -> Result<Context, Failure> {
        let channel = channel(&ctx, Step::PostReply)?;
        let thread_ts = ctx.thread_ts.as_ref().ok_or_else(|| {
            Failure::Slack(Step::PostReply, SlackError::MissingField("thread_ts"))
        })?;

        let body = self
            .client
            .post_message(channel, &ctx.text, Some(thread_ts), &ctx.token)
            .await
            .map_err(Step::PostReply.fail())?;
        // Nothing follows the reply, so its own timestamp is optional.
        match check_posted(body).map_err(Step::PostReply.fail())? {
            Some(reply_ts) => info!(%thread_ts, %reply_ts, "Reply posted"),
            None => info!(%thread_ts, "Reply posted"),
        }

        Ok(ctx)
    }

    fn dump(&self, name: &str, body: &Value) -> Result<(), Failure> {
        let path = self
            .dumps
            .write(name, body)
            .map_err(|e| Failure::Dump(self.dumps.dir().join(name), e))?;

        debug!(path = %path.display(), "Wrote response");
        Ok(())
    }
}

/// The channel every step after resolution works in.
fn channel(ctx: &Context, step: Step) -> Result<&ChannelId, Failure> {
    ctx.channel_id
        .as_ref()
        .ok_or_else(|| Failure::Slack(step, SlackError::UnknownChannel(ctx.channel_name.clone())))
}
