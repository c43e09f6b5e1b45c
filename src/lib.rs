//! Gorillas - two gorillas throw explosive bananas across a city skyline
//!
//! Core modules:
//! - `sim`: Deterministic simulation (skyline, ballistics, hit map, explosions, AI)
//! - `settings`: Preferences from defaults, `gorillas.ini` and the environment
//! - `league`: Named-player statistics
//! - `persistence`: JSON files for win totals and shot history
//! - `audio`: Sound cues for front ends to play

pub mod audio;
pub mod league;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use league::League;
pub use settings::Settings;
pub use sim::Game;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Real-time tick interval front ends drive `Game::step` at
    pub const TICK: Duration = Duration::from_millis(50);

    /// Buildings when the requested count cannot seat two gorillas
    pub const DEFAULT_BUILDING_COUNT: usize = 10;
    /// Gorillas stand on the second and second-to-last building
    pub const MIN_BUILDING_COUNT: usize = 3;

    /// Starting aim for both players
    pub const DEFAULT_ANGLE: f64 = 45.0;
    pub const DEFAULT_POWER: f64 = 50.0;

    /// Per-tick velocity change is gravity / 34 and wind / 20
    pub const GRAVITY_DIVISOR: f64 = 34.0;
    pub const WIND_DIVISOR: f64 = 20.0;
    /// Wind stays within ±10 under per-throw fluctuation
    pub const WIND_LIMIT: f64 = 10.0;
    pub const WIND_JITTER: i32 = 2;

    /// Downward speed above which the banana bounces off the ground
    pub const GROUND_BOUNCE_THRESHOLD: f64 = 5.0;
    pub const GROUND_BOUNCE_FACTOR: f64 = 0.4;

    /// Gorilla disc radius in the hit map
    pub const GORILLA_HIT_RADIUS: i32 = 4;
    /// Half extents of the geometric gorilla box
    pub const GORILLA_HALF_WIDTH: f64 = 5.0;
    pub const GORILLA_HALF_HEIGHT: f64 = 10.0;
    /// Samples at the start of a rising throw that ignore the shooter
    pub const LAUNCH_GRACE_SAMPLES: usize = 5;

    /// Ticks a weak/backwards/self message stays up
    pub const EVENT_DISPLAY_TICKS: u32 = 40;

    /// AI search grid
    pub const AI_ANGLE_MIN: u32 = 15;
    pub const AI_ANGLE_MAX: u32 = 75;
    pub const AI_ANGLE_STEP: usize = 1;
    pub const AI_POWER_MIN: u32 = 20;
    pub const AI_POWER_MAX: u32 = 100;
    pub const AI_POWER_STEP: usize = 2;
    /// Tick cap for one simulated throw
    pub const MAX_TRIAL_TICKS: usize = 500;
}
