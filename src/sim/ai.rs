//! Brute-force computer player
//!
//! Every candidate shot is flown on a private copy of the game. The copy has
//! its league, score store and sound detached, so nothing a trial does can
//! reach the disk or the speakers, and the real game is never touched.

use crate::consts::*;

use super::state::{Game, ShotRecord};

impl Game {
    /// Copy of the game safe to simulate ahead on
    fn trial(&self) -> Game {
        let mut sim = self.clone();
        if let Some(league) = sim.league.as_mut() {
            league.detach();
        }
        sim.score_store = None;
        sim.sounds.set_enabled(false);
        sim
    }

    /// Fly one shot on a trial copy; true if it wins the round for the
    /// current player
    fn trial_wins(&self, mut sim: Game, angle: f64, power: f64) -> bool {
        let cur = self.current;
        sim.angle = angle;
        sim.power = power;
        if !sim.throw() {
            return false;
        }
        for _ in 0..MAX_TRIAL_TICKS {
            if !sim.banana.active && !sim.explosion.active {
                break;
            }
            sim.step();
        }
        sim.wins[cur] > self.wins[cur]
    }

    /// Whether throwing `angle`/`power` now would win the round
    pub fn test_shot(&self, angle: f64, power: f64) -> bool {
        self.trial_wins(self.trial(), angle, power)
    }

    /// First winning shot in the search grid (angles ascending, then powers
    /// ascending), or the default aim if none wins
    pub fn find_shot(&self) -> (f64, f64) {
        for angle in (AI_ANGLE_MIN..=AI_ANGLE_MAX).step_by(AI_ANGLE_STEP) {
            for power in (AI_POWER_MIN..=AI_POWER_MAX).step_by(AI_POWER_STEP) {
                let (angle, power) = (angle as f64, power as f64);
                if self.test_shot(angle, power) {
                    log::debug!("AI found angle {angle} power {power}");
                    return (angle, power);
                }
            }
        }
        log::debug!("AI found no winning shot, falling back");
        (DEFAULT_ANGLE, DEFAULT_POWER)
    }

    /// Aim with [`Game::find_shot`] and throw
    pub fn auto_shot(&mut self) {
        let (angle, power) = self.find_shot();
        self.angle = angle;
        self.power = power;
        self.throw();
    }

    /// Re-fly a recorded shot in its recorded wind against the current
    /// skyline; true if it would win
    pub fn replay_shot(&self, shot: &ShotRecord) -> bool {
        let mut sim = self.trial();
        sim.wind = shot.wind;
        self.trial_wins(sim, shot.angle, shot.power)
    }
}
