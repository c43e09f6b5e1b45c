//! JSON persistence for win totals, shot history and the league
//!
//! Callers treat read failures as "start from defaults" and write failures
//! as diagnostics only; in-memory state is never rolled back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::sim::ShotRecord;

/// Default win totals file
pub const DEFAULT_SCORE_FILE: &str = "gorillas_scores.json";
/// Default shot history file
pub const DEFAULT_SHOTS_FILE: &str = "gorillas_shots.json";

/// Read and decode a JSON document
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("decoding {}", path.display()))
}

/// Encode and write a JSON document
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string(value).context("encoding JSON")?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

/// File locations for the cumulative win totals and shot history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreStore {
    pub scores_path: PathBuf,
    pub shots_path: PathBuf,
}

impl Default for ScoreStore {
    fn default() -> Self {
        Self::in_dir(Path::new("."))
    }
}

impl ScoreStore {
    pub fn new(scores_path: impl Into<PathBuf>, shots_path: impl Into<PathBuf>) -> Self {
        Self {
            scores_path: scores_path.into(),
            shots_path: shots_path.into(),
        }
    }

    /// Default file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DEFAULT_SCORE_FILE), dir.join(DEFAULT_SHOTS_FILE))
    }

    /// Win totals, or zeros if the file is missing or unreadable
    pub fn load_totals(&self) -> [u32; 2] {
        if !self.scores_path.exists() {
            return [0, 0];
        }
        load_json(&self.scores_path).unwrap_or_else(|e| {
            log::warn!("load scores: {e:#}");
            [0, 0]
        })
    }

    pub fn save_totals(&self, totals: [u32; 2]) {
        if let Err(e) = save_json(&self.scores_path, &totals) {
            log::warn!("save scores: {e:#}");
        }
    }

    /// Shot history, or empty if the file is missing or unreadable
    pub fn load_shots(&self) -> Vec<ShotRecord> {
        if !self.shots_path.exists() {
            return Vec::new();
        }
        load_json(&self.shots_path).unwrap_or_else(|e| {
            log::warn!("load shots: {e:#}");
            Vec::new()
        })
    }

    pub fn save_shots(&self, shots: &[ShotRecord]) {
        if let Err(e) = save_json(&self.shots_path, shots) {
            log::warn!("save shots: {e:#}");
        }
    }
}
