//! Canned responses keyed by topic.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ResponseError;

/// Topic -> response lines.
///
/// Topics are stored lowercase and looked up exactly as given, so only a
/// lowercase lookup can hit.
#[derive(Debug, Default)]
pub struct ResponseStore {
    table: HashMap<String, Vec<String>>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `lines` under `topic`, replacing any earlier set.
    pub fn load(&mut self, topic: &str, lines: Vec<String>) -> Result<usize, ResponseError> {
        if lines.is_empty() {
            return Err(ResponseError::Empty {
                path: PathBuf::from(topic),
            });
        }
        let count = lines.len();
        self.table.insert(topic.to_lowercase(), lines);
        Ok(count)
    }

    /// Pick one line for `topic` uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, topic: &str, rng: &mut R) -> Option<&str> {
        self.table
            .get(topic)
            .and_then(|lines| lines.choose(rng))
            .map(String::as_str)
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.table.contains_key(topic)
    }
}

/// Path of the source file for `name` inside `dir`.
pub fn source_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.txt"))
}

/// Read `<dir>/<name>.txt`, one response per non-blank line.
pub async fn read_source(dir: &Path, name: &str) -> Result<Vec<String>, ResponseError> {
    let path = source_path(dir, name);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ResponseError::Read {
            path: path.clone(),
            source,
        })?;

    let lines: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    if lines.is_empty() {
        return Err(ResponseError::Empty { path });
    }
    Ok(lines)
}
