//! Game state and core simulation types
//!
//! A [`Game`] is one match. Rounds live inside it: [`Game::reset`] throws the
//! skyline away and builds a new one while the score, players, settings and
//! gravity carry over.

use std::collections::BTreeMap;
use std::mem;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::explosion::{Dance, Explosion};
use super::hitmap::HitMap;
use super::sun::Sun;
use super::terrain::{Building, generate_skyline};
use crate::audio::{SoundEffect, SoundQueue};
use crate::consts::*;
use crate::league::{League, PlayerStats};
use crate::persistence::ScoreStore;
use crate::settings::Settings;

/// Which of the three turn states the game is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Nothing in flight, the current player may edit angle/power and throw
    Aiming,
    /// Banana in the air
    Flying,
    /// Explosion animating
    Exploding,
}

/// Special outcomes of a throw, shown to the players for a short while
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShotEvent {
    #[default]
    None,
    /// Landed less than a third of the way to the opponent
    Weak,
    /// Thrown away from the opponent
    Backwards,
    /// Shooter blew up their own gorilla
    SelfHit,
}

const WEAK_MESSAGES: [&str; 3] = [
    "Your little muscles not strong enough?",
    "Now that was feeble.",
    "You can do better than that!",
];

impl ShotEvent {
    /// Display text; weak throws pick one of several taunts
    pub fn message<R: Rng>(self, rng: &mut R) -> &'static str {
        match self {
            ShotEvent::None => "",
            ShotEvent::Weak => WEAK_MESSAGES[rng.random_range(0..WEAK_MESSAGES.len())],
            ShotEvent::Backwards => "Don't throw it that way!",
            ShotEvent::SelfHit => "Now that was pretty dumb.",
        }
    }
}

/// A gorilla's anchor point: horizontal centre, feet on the roof
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gorilla {
    pub pos: DVec2,
}

impl Gorilla {
    pub fn new(x: f64, y: f64) -> Self {
        Self { pos: DVec2::new(x, y) }
    }
}

/// The single projectile
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Banana {
    pub pos: DVec2,
    pub vel: DVec2,
    pub active: bool,
}

/// Angle and power of one throw, plus the wind it flew in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub angle: f64,
    pub power: f64,
    #[serde(default)]
    pub wind: f64,
}

/// Where the current throw started, for classifying misses
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Launch {
    pub start_x: f64,
    pub other_x: f64,
    pub vx: f64,
}

/// Cumulative state a front end restores when the players abort a match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSnapshot {
    pub total_wins: [u32; 2],
    pub league_players: Option<BTreeMap<String, PlayerStats>>,
}

/// Roll a 1..=x die
fn fn_ran<R: Rng>(rng: &mut R, x: i32) -> i32 {
    rng.random_range(1..=x)
}

/// QBasic-style wind: a base of -4..=5, and one time in
/// three a further 1..=10 pushed in the same direction.
pub fn basic_wind<R: Rng>(rng: &mut R) -> f64 {
    let mut w = fn_ran(rng, 10) - 5;
    if fn_ran(rng, 3) == 1 {
        if w > 0 {
            w += fn_ran(rng, 10);
        } else {
            w -= fn_ran(rng, 10);
        }
    }
    w as f64
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct Game {
    pub width: i32,
    pub height: i32,
    pub buildings: Vec<Building>,
    pub gorillas: [Gorilla; 2],
    pub banana: Banana,
    pub explosion: Explosion,
    pub dance: Dance,
    pub sun: Sun,
    pub settings: Settings,

    /// Live aim of the current player (degrees, 0 = horizontal toward the opponent)
    pub angle: f64,
    pub power: f64,
    /// Aim each player last threw with, restored when their turn comes round
    pub angles: [f64; 2],
    pub powers: [f64; 2],
    /// Committed shot for the "repeat last shot" shortcut
    pub last_angle: [f64; 2],
    pub last_power: [f64; 2],

    /// Player whose turn it is (0 or 1)
    pub current: usize,
    pub wins: [u32; 2],
    pub total_wins: [u32; 2],
    /// Throws taken this round
    pub shots: [u32; 2],
    pub players: [String; 2],
    pub league: Option<League>,
    pub score_store: Option<ScoreStore>,
    pub shot_history: Vec<ShotRecord>,

    pub wind: f64,
    pub gravity: f64,
    pub building_count: usize,
    pub hit_map: HitMap,
    /// Number of resets so far; front ends watch it to redraw the skyline
    pub round: u32,

    pub last_event: ShotEvent,
    pub last_event_ticks: u32,
    pub last_event_msg: String,
    /// Set by a front end when the players quit mid-match
    pub aborted: bool,

    pub(crate) launch: Launch,
    /// Whether the running explosion ends the round
    pub(crate) round_over: bool,
    pub(crate) rng: Pcg32,
    pub(crate) sounds: SoundQueue,
}

impl Game {
    /// New match seeded from OS entropy
    pub fn new(width: i32, height: i32, building_count: usize) -> Self {
        let seed = rand::rng().random::<u64>();
        log::info!("New match with seed: {seed}");
        Self::with_seed(width, height, building_count, seed)
    }

    /// New match with a fixed seed (skyline, wind and taunts are reproducible)
    pub fn with_seed(width: i32, height: i32, building_count: usize, seed: u64) -> Self {
        Self::from_rng(width, height, building_count, Pcg32::seed_from_u64(seed))
    }

    /// Generate a round from `rng`. Draw order: wind, then the skyline.
    fn from_rng(width: i32, height: i32, building_count: usize, mut rng: Pcg32) -> Self {
        let building_count = if building_count < MIN_BUILDING_COUNT {
            DEFAULT_BUILDING_COUNT
        } else {
            building_count
        };
        let settings = Settings::default();
        let wind = basic_wind(&mut rng);
        let buildings = generate_skyline(&mut rng, width, height, building_count);

        let field_h = height as f64;
        let seat = |b: &Building| {
            let (x, y) = b.roof_center(field_h);
            Gorilla::new(x, y)
        };
        let gorillas = [seat(&buildings[1]), seat(&buildings[building_count - 2])];
        let hit_map = HitMap::from_scene(width, height, &buildings, &gorillas);

        Self {
            width,
            height,
            buildings,
            gorillas,
            banana: Banana::default(),
            explosion: Explosion::default(),
            dance: Dance::default(),
            sun: Sun::for_field(width),
            angle: DEFAULT_ANGLE,
            power: DEFAULT_POWER,
            angles: [DEFAULT_ANGLE; 2],
            powers: [DEFAULT_POWER; 2],
            last_angle: [0.0; 2],
            last_power: [0.0; 2],
            current: 0,
            wins: [0; 2],
            total_wins: [0; 2],
            shots: [0; 2],
            players: ["Player 1".to_string(), "Player 2".to_string()],
            league: None,
            score_store: None,
            shot_history: Vec::new(),
            wind,
            gravity: settings.default_gravity,
            building_count,
            hit_map,
            round: 0,
            last_event: ShotEvent::None,
            last_event_ticks: 0,
            last_event_msg: String::new(),
            aborted: false,
            launch: Launch::default(),
            round_over: true,
            rng,
            sounds: SoundQueue::new(true),
            settings,
        }
    }

    /// Install settings and take the gravity default from them
    pub fn apply_settings(&mut self, settings: Settings) {
        self.gravity = settings.default_gravity;
        self.settings = settings;
    }

    /// Attach a score store and load the win totals and shot history from it
    pub fn attach_store(&mut self, store: ScoreStore) {
        self.total_wins = store.load_totals();
        self.shot_history = store.load_shots();
        log::info!(
            "Loaded totals {:?} and {} recorded shots",
            self.total_wins,
            self.shot_history.len()
        );
        self.score_store = Some(store);
    }

    /// Write totals and shot history to the attached store, if any
    pub fn save_scores(&self) {
        if let Some(store) = &self.score_store {
            store.save_totals(self.total_wins);
            store.save_shots(&self.shot_history);
        }
    }

    /// Regenerate the skyline, gorillas, wind and hit map in place.
    ///
    /// Session and total wins, players, league, store, settings, gravity and
    /// shot history survive; aim and per-round counters start over.
    pub fn reset(&mut self) {
        let rng = self.rng.clone();
        let mut next = Self::from_rng(self.width, self.height, self.building_count, rng);
        next.wins = self.wins;
        next.total_wins = self.total_wins;
        next.players = mem::take(&mut self.players);
        next.league = self.league.take();
        next.score_store = self.score_store.take();
        next.shot_history = mem::take(&mut self.shot_history);
        next.settings = self.settings.clone();
        next.gravity = self.gravity;
        next.sounds = mem::take(&mut self.sounds);
        next.aborted = self.aborted;
        next.sun = self.sun.clone();
        next.sun.restore();
        next.round = self.round + 1;
        *self = next;
        log::info!("Round {} ready, wind {}", self.round, self.wind);
    }

    /// Hand the turn to `idx` and restore that player's last aim
    pub fn set_current(&mut self, idx: usize) {
        self.current = idx;
        self.angle = self.angles[idx];
        self.power = self.powers[idx];
    }

    pub fn other(&self) -> usize {
        1 - self.current
    }

    /// Copy the current player's last committed shot into the live aim
    pub fn repeat_last_shot(&mut self) {
        self.angle = self.last_angle[self.current];
        self.power = self.last_power[self.current];
    }

    pub fn phase(&self) -> GamePhase {
        if self.explosion.active {
            GamePhase::Exploding
        } else if self.banana.active {
            GamePhase::Flying
        } else {
            GamePhase::Aiming
        }
    }

    /// True while the round ends with the running explosion
    pub fn is_round_over(&self) -> bool {
        self.round_over
    }

    /// Whether (x, y) lies in blast damage recorded on building `idx`
    pub fn point_in_damage(&self, idx: usize, x: f64, y: f64) -> bool {
        self.buildings
            .get(idx)
            .is_some_and(|b| b.point_in_damage(x, y))
    }

    /// Width of one building slot
    pub fn building_width(&self) -> f64 {
        self.width as f64 / self.buildings.len() as f64
    }

    /// Sound cues raised since the last call
    pub fn drain_sounds(&mut self) -> Vec<SoundEffect> {
        self.sounds.drain()
    }

    pub(crate) fn cue(&mut self, effect: SoundEffect) {
        if self.settings.use_sound {
            self.sounds.play(effect);
        }
    }

    /// Show `event` for the standard number of ticks
    pub(crate) fn raise_event(&mut self, event: ShotEvent) {
        self.last_event = event;
        self.last_event_ticks = EVENT_DISPLAY_TICKS;
        self.last_event_msg = event.message(&mut self.rng).to_string();
        self.cue(SoundEffect::Alert);
    }

    /// Capture cumulative scores for a later abort rollback
    pub fn match_snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            total_wins: self.total_wins,
            league_players: self.league.as_ref().map(|l| l.players.clone()),
        }
    }

    /// Revert cumulative scores to `snapshot` and persist the league again
    pub fn restore_match(&mut self, snapshot: MatchSnapshot) {
        self.total_wins = snapshot.total_wins;
        if let (Some(league), Some(players)) = (self.league.as_mut(), snapshot.league_players) {
            league.players = players;
            league.save();
        }
    }

    /// Session and overall wins, followed by the league table when present
    pub fn stats_string(&self) -> String {
        let session = format!("Session - P1:{} P2:{}", self.wins[0], self.wins[1]);
        let total = format!("Overall - P1:{} P2:{}", self.total_wins[0], self.total_wins[1]);
        match &self.league {
            Some(league) => format!("{session}\n{total}\n\n{league}"),
            None => format!("{session}\n{total}"),
        }
    }
}
