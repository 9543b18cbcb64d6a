use crate::{config::ConfigError, slack::error::SlackError, workflow::Step};
use std::{fmt, io, path::PathBuf};

/// Sum type representing every way a run can fail. Every variant is fatal.
#[derive(Debug)]
pub enum Failure {
    Config(ConfigError),
    Slack(Step, SlackError),
    Dump(PathBuf, io::Error),
}

impl From<ConfigError> for Failure {
    fn from(e: ConfigError) -> Self {
        Failure::Config(e)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            Failure::Config(e) => format!("Invalid configuration: {}", e),
            Failure::Slack(step, e) => format!("Failed to {}: {}", step, e),
            Failure::Dump(path, e) => format!("Failed to write {}: {}", path.display(), e),
        };

        write!(f, "{}", x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Failure::Slack(
                Step::JoinChannel,
                SlackError::APIResponseError("is_archived".into())
            )
            .to_string(),
            "Failed to join channel: Slack API returned error: is_archived"
        );
        assert_eq!(
            Failure::Config(ConfigError::MissingToken).to_string(),
            "Invalid configuration: No Slack token configured; set `token` or $HERMES_TOKEN"
        );
    }
}
