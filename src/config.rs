//! Runtime configuration.
//!
//! Values come from an optional TOML settings file, overridden field by field
//! by `HERMES_*` environment variables (which may themselves come from a
//! `.env` file). Only the token is required; everything else either has a
//! default or is resolved against Slack at runtime.
//!
//! ```toml
//! token = "xoxb-..."
//! channel_id = ""
//! bot_id = ""
//! ```

use crate::slack::{
    api::API_BASE, auth::SlackAccessToken, auth::UserId, channel::ChannelId,
    channel::ChannelName, message::MessageTs,
};
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

/// Where the settings file is looked for when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "hermes.toml";

/// The channel looked up by name when no channel ID is configured.
pub const DEFAULT_CHANNEL_NAME: &str = "일반";

/// The user whose membership decides whether we join the channel.
// This is not necessarily the bot resolved via `auth.test`; see
// `workflow::Runner::ensure_membership`.
pub const DEFAULT_MEMBER_ID: &str = "U01B2QZG4V7";

pub const DEFAULT_TEXT: &str = "Hello, World!";

#[derive(Clone, Debug)]
pub struct Config {
    pub token: SlackAccessToken,
    pub channel_id: Option<ChannelId>,
    pub thread_ts: Option<MessageTs>,
    pub bot_id: Option<UserId>,
    pub channel_name: ChannelName,
    pub member_id: UserId,
    pub text: String,
    pub api_base: String,
}

/// The settings file as written. Empty strings are treated as absent.
#[serde_as]
#[derive(Default, Deserialize)]
struct FileConfig {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    token: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    channel_id: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    thread_ts: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    bot_id: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    channel_name: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    member_id: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    text: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    api_base: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    ReadFile { path: PathBuf, source: io::Error },
    ParseFile { path: PathBuf, source: toml::de::Error },
    MissingToken,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFile { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            ConfigError::ParseFile { path, source } => {
                write!(f, "Failed to parse {}: {}", path.display(), source)
            }
            ConfigError::MissingToken => write!(
                f,
                "No Slack token configured; set `token` or $HERMES_TOKEN"
            ),
        }
    }
}

impl Config {
    /// Load from the settings file at `path`, or [DEFAULT_CONFIG_PATH] if
    /// there is one, then apply the environment looked up through `var` on
    /// top.
    ///
    /// An explicitly given path must exist.
    pub fn load<F>(path: Option<&Path>, var: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match path {
            Some(path) => read_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    read_file(path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        from_sources(file, var)
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge the file with environment lookups, the latter winning. An empty
/// environment variable is treated as unset.
fn from_sources<F>(file: FileConfig, var: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |key: &str, from_file: Option<String>| {
        var(key).filter(|x| !x.is_empty()).or(from_file)
    };

    let token = pick("HERMES_TOKEN", file.token).ok_or(ConfigError::MissingToken)?;

    Ok(Config {
        token: SlackAccessToken(token),
        channel_id: pick("HERMES_CHANNEL_ID", file.channel_id).map(ChannelId),
        thread_ts: pick("HERMES_THREAD_TS", file.thread_ts).map(MessageTs),
        bot_id: pick("HERMES_BOT_ID", file.bot_id).map(UserId),
        channel_name: ChannelName(
            pick("HERMES_CHANNEL_NAME", file.channel_name)
                .unwrap_or_else(|| DEFAULT_CHANNEL_NAME.into()),
        ),
        member_id: UserId(
            pick("HERMES_MEMBER_ID", file.member_id).unwrap_or_else(|| DEFAULT_MEMBER_ID.into()),
        ),
        text: pick("HERMES_TEXT", file.text).unwrap_or_else(|| DEFAULT_TEXT.into()),
        api_base: pick("HERMES_API_BASE", file.api_base).unwrap_or_else(|| API_BASE.into()),
    })
}
