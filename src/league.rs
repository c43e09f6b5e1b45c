//! Player league table
//!
//! Tracks rounds played, rounds won and a running shots-per-win figure for
//! every named player. Persisted as a JSON object keyed by player name.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persistence;

/// Default league file name
pub const DEFAULT_LEAGUE_FILE: &str = "gorillas.lge";

/// Accumulated statistics for one player
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub rounds: u32,
    pub wins: u32,
    /// Running mean of throws needed per win (lower is better)
    pub accuracy: f64,
}

impl PlayerStats {
    pub fn win_ratio(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.wins as f64 / self.rounds as f64
        }
    }

    fn record_win(&mut self, shots: u32) {
        self.wins += 1;
        if shots > 0 {
            self.accuracy = if self.accuracy > 0.0 {
                (self.accuracy + shots as f64) / 2.0
            } else {
                shots as f64
            };
        }
    }
}

/// One row of [`League::standings`]
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub name: String,
    pub stats: PlayerStats,
}

/// League of named players
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct League {
    pub players: BTreeMap<String, PlayerStats>,
    /// Backing file; `None` keeps the league in memory only
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl League {
    /// Empty in-memory league
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`, starting empty if it is missing or unreadable.
    /// The league remembers the path for [`League::save`].
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let players = if path.exists() {
            match persistence::load_json(&path) {
                Ok(players) => players,
                Err(e) => {
                    log::warn!("load league: {e:#}");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        log::info!("Loaded league with {} players", players.len());
        Self {
            players,
            path: Some(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stop writing to disk (trial simulations)
    pub fn detach(&mut self) {
        self.path = None;
    }

    /// Write to the backing file. Failures are logged, never fatal.
    pub fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        match persistence::save_json(path, &self.players) {
            Ok(()) => log::debug!("League saved ({} players)", self.players.len()),
            Err(e) => log::warn!("save league: {e:#}"),
        }
    }

    /// Ensure a player exists
    pub fn add_player(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        self.players.entry(name.to_string()).or_default();
    }

    /// Move a player's stats to a new name
    pub fn rename_player(&mut self, old: &str, new: &str) {
        if old == new || new.is_empty() {
            return;
        }
        if let Some(stats) = self.players.remove(old) {
            self.players.insert(new.to_string(), stats);
        }
    }

    pub fn delete_player(&mut self, name: &str) {
        self.players.remove(name);
    }

    /// Player names in alphabetical order
    pub fn names(&self) -> Vec<String> {
        self.players.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&PlayerStats> {
        self.players.get(name)
    }

    /// Record one finished round between `p1` and `p2`.
    ///
    /// Both players get a round; `winner` (0 or 1) gets a win and folds
    /// `shots` into their accuracy. Any other winner value records no win.
    pub fn record_round(&mut self, p1: &str, p2: &str, winner: usize, shots: u32) {
        self.players.entry(p1.to_string()).or_default().rounds += 1;
        self.players.entry(p2.to_string()).or_default().rounds += 1;
        let name = match winner {
            0 => p1,
            1 => p2,
            _ => return,
        };
        if let Some(stats) = self.players.get_mut(name) {
            stats.record_win(shots);
        }
    }

    /// Table sorted by win ratio (descending), ties by accuracy (ascending)
    pub fn standings(&self) -> Vec<Standing> {
        let mut list: Vec<Standing> = self
            .players
            .iter()
            .map(|(name, stats)| Standing {
                name: name.clone(),
                stats: *stats,
            })
            .collect();
        list.sort_by(|a, b| {
            b.stats
                .win_ratio()
                .total_cmp(&a.stats.win_ratio())
                .then(a.stats.accuracy.total_cmp(&b.stats.accuracy))
        });
        list
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Player           Rounds Wins Accuracy")?;
        for s in self.standings() {
            writeln!(
                f,
                "{:<15} {:>6} {:>4} {:>8.1}",
                s.name, s.stats.rounds, s.stats.wins, s.stats.accuracy
            )?;
        }
        Ok(())
    }
}
