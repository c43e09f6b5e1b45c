//! Game settings and preferences
//!
//! Loaded from defaults, then an optional `gorillas.ini`, then `GORILLAS_*`
//! environment variables. Loading never fails: bad values are logged and
//! skipped.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::ExplosionStyle;

/// Default settings file name, looked up in the working directory
pub const DEFAULT_INI_FILE: &str = "gorillas.ini";

/// Fallback explosion radius when the configured one is not positive
const FALLBACK_EXPLOSION_RADIUS: f64 = 16.0;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Queue sound cues for the front end
    pub use_sound: bool,

    // === Explosions ===
    /// Integer grow/shrink explosions instead of the six colored frames
    pub use_old_explosions: bool,
    /// Precompute vector outlines for the colored frames
    pub use_vector_explosions: bool,
    /// Base explosion radius in pixels (non-positive means 16)
    pub new_explosion_radius: f64,
    /// Halve explosion radius (low color displays)
    pub force_cga: bool,

    // === Match ===
    pub default_gravity: f64,
    pub default_round_qty: u32,
    /// Round winner throws first in the next round
    pub winner_first: bool,
    /// Draw a fresh wind every round
    pub variable_wind: bool,
    /// Jitter the wind by up to ±2 on every throw
    pub wind_fluctuations: bool,

    // === Presentation (front ends only) ===
    pub use_sliding_text: bool,
    pub show_intro: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_sound: true,

            use_old_explosions: false,
            use_vector_explosions: false,
            new_explosion_radius: 40.0,
            force_cga: false,

            default_gravity: 17.0,
            default_round_qty: 4,
            winner_first: false,
            variable_wind: false,
            wind_fluctuations: false,

            use_sliding_text: false,
            show_intro: true,
        }
    }
}

/// Parse a boolean the way the ini files write them
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" => Some(true),
        "0" | "f" | "false" | "no" => Some(false),
        _ => None,
    }
}

impl Settings {
    /// Defaults, then `gorillas.ini`, then the process environment
    pub fn load() -> Self {
        Self::load_from(Path::new(DEFAULT_INI_FILE))
    }

    /// Defaults, then the given ini file (if readable), then the environment
    pub fn load_from(ini: &Path) -> Self {
        let mut settings = Self::default();
        match fs::read_to_string(ini) {
            Ok(text) => {
                settings.apply_ini(&text);
                log::info!("Loaded settings from {}", ini.display());
            }
            Err(_) => log::debug!("No settings file at {}, using defaults", ini.display()),
        }
        settings.apply_env_with(|key| std::env::var(key).ok());
        settings
    }

    /// Apply `KEY=VALUE` lines. Comments (`#`, `;`), blank lines and lines
    /// without `=` are skipped; keys are case-insensitive.
    pub fn apply_ini(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let (key, val) = (key.trim(), val.trim());
            if !self.apply_ini_key(&key.to_ascii_uppercase(), val) {
                log::warn!("Ignoring setting {key}={val}");
            }
        }
    }

    /// Returns false if the key is unknown or the value does not parse
    fn apply_ini_key(&mut self, key: &str, val: &str) -> bool {
        let flag = |slot: &mut bool| parse_flag(val).map(|b| *slot = b).is_some();
        match key {
            "USESOUND" => flag(&mut self.use_sound),
            "USEOLDEXPLOSIONS" => flag(&mut self.use_old_explosions),
            "USEVECTOREXPLOSIONS" => flag(&mut self.use_vector_explosions),
            "USESLIDINGTEXT" => flag(&mut self.use_sliding_text),
            "SHOWINTRO" => flag(&mut self.show_intro),
            "FORCECGA" => flag(&mut self.force_cga),
            "WINNERFIRST" => flag(&mut self.winner_first),
            "VARIABLEWIND" => flag(&mut self.variable_wind),
            "WINDFLUCTUATIONS" => flag(&mut self.wind_fluctuations),
            "NEWEXPLOSIONRADIUS" => val.parse().map(|r| self.new_explosion_radius = r).is_ok(),
            "DEFAULTGRAVITY" => match val.parse::<f64>() {
                Ok(g) if g > 0.0 => {
                    self.default_gravity = g;
                    true
                }
                _ => false,
            },
            "DEFAULTROUNDQTY" => match val.parse::<u32>() {
                Ok(n) if n > 0 => {
                    self.default_round_qty = n;
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Apply `GORILLAS_*` overrides read through `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let flags: [(&str, &mut bool); 5] = [
            ("GORILLAS_SOUND", &mut self.use_sound),
            ("GORILLAS_OLD_EXPLOSIONS", &mut self.use_old_explosions),
            ("GORILLAS_WINNER_FIRST", &mut self.winner_first),
            ("GORILLAS_VARIABLE_WIND", &mut self.variable_wind),
            ("GORILLAS_WIND_FLUCTUATIONS", &mut self.wind_fluctuations),
        ];
        for (key, slot) in flags {
            if let Some(v) = lookup(key) {
                match parse_flag(&v) {
                    Some(b) => *slot = b,
                    None => log::warn!("Ignoring {key}={v}"),
                }
            }
        }
        if let Some(v) = lookup("GORILLAS_EXPLOSION_RADIUS") {
            match v.trim().parse() {
                Ok(r) => self.new_explosion_radius = r,
                Err(_) => log::warn!("Ignoring GORILLAS_EXPLOSION_RADIUS={v}"),
            }
        }
        if let Some(v) = lookup("GORILLAS_GRAVITY") {
            match v.trim().parse::<f64>() {
                Ok(g) if g > 0.0 => self.default_gravity = g,
                _ => log::warn!("Ignoring GORILLAS_GRAVITY={v}"),
            }
        }
        if let Some(v) = lookup("GORILLAS_ROUNDS") {
            match v.trim().parse::<u32>() {
                Ok(n) if n > 0 => self.default_round_qty = n,
                _ => log::warn!("Ignoring GORILLAS_ROUNDS={v}"),
            }
        }
    }

    /// Base blast radius after the fallback and low-color halving
    pub fn explosion_base(&self) -> f64 {
        let base = if self.new_explosion_radius > 0.0 {
            self.new_explosion_radius
        } else {
            FALLBACK_EXPLOSION_RADIUS
        };
        if self.force_cga { base / 2.0 } else { base }
    }

    pub fn explosion_style(&self) -> ExplosionStyle {
        if self.use_old_explosions {
            ExplosionStyle::Classic
        } else {
            ExplosionStyle::Modern {
                vectors: self.use_vector_explosions,
            }
        }
    }
}
