//! Diagnostic copies of raw Slack responses, written for a human to inspect
//! after a run. Each run overwrites the previous one's files.

use serde_json::Value;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// The first page of `conversations.list`.
pub const CHANNEL_LIST: &str = "response.json";

/// The response to posting the top-level message.
pub const MESSAGE_POST: &str = "response2.json";

pub struct Dumps {
    dir: PathBuf,
}

impl Dumps {
    pub fn new(dir: PathBuf) -> Self {
        Dumps { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `body` as indented JSON to `name` within the dump directory,
    /// returning the path written to. Non-ASCII text is kept as is.
    pub fn write(&self, name: &str, body: &Value) -> io::Result<PathBuf> {
        let path = self.dir.join(name);
        let pretty = serde_json::to_string_pretty(body)?;

        fs::write(&path, pretty)?;

        Ok(path)
    }
}
