//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per `Game::step` call, no wall clock
//! - Seeded RNG only, owned by the `Game`
//! - No rendering, audio or platform dependencies (sounds are queued cues)

pub mod ai;
pub mod explosion;
pub mod hitmap;
pub mod state;
pub mod sun;
pub mod terrain;
pub mod tick;

pub use explosion::{DANCE_FRAMES, Dance, Explosion, ExplosionStyle, Rgba};
pub use hitmap::{Cell, HitMap};
pub use state::{
    Banana, Game, GamePhase, Gorilla, MatchSnapshot, ShotEvent, ShotRecord, basic_wind,
};
pub use sun::Sun;
pub use terrain::{Building, DamageCircle, Slope, generate_skyline};
