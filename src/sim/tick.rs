//! Fixed-step simulation
//!
//! One call to [`Game::step`] is one tick. Front ends call it on a fixed
//! interval (see [`crate::consts::TICK`]); the AI calls it in a tight loop.
//!
//! Per tick, in order: victory dance, event timer, sun, then either the
//! explosion or the banana. A banana tick integrates position with the old
//! velocity, then checks ground, gorillas (swept), buildings and bounds.

use glam::DVec2;
use rand::Rng;

use super::explosion::{DANCE_FRAMES, Dance, Explosion};
use super::state::{Banana, Game, Launch, ShotEvent, ShotRecord};
use super::terrain::DamageCircle;
use crate::audio::SoundEffect;
use crate::consts::*;

impl Game {
    /// Launch the banana with the live angle and power.
    ///
    /// Returns false (and does nothing) while a banana or explosion is
    /// already in play.
    pub fn throw(&mut self) -> bool {
        if self.banana.active || self.explosion.active {
            log::debug!("Throw ignored while {:?}", self.phase());
            return false;
        }
        self.cue(SoundEffect::Throw);
        if self.settings.wind_fluctuations {
            let jitter = self.rng.random_range(-WIND_JITTER..=WIND_JITTER);
            self.wind = (self.wind + jitter as f64).clamp(-WIND_LIMIT, WIND_LIMIT);
        }

        let cur = self.current;
        self.last_angle[cur] = self.angle;
        self.last_power[cur] = self.power;
        self.angles[cur] = self.angle;
        self.powers[cur] = self.power;
        self.shots[cur] += 1;
        self.shot_history.push(ShotRecord {
            angle: self.angle,
            power: self.power,
            wind: self.wind,
        });

        let start = self.gorillas[cur].pos;
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let speed = self.power / 2.0;
        let dir = if cur == 1 { -1.0 } else { 1.0 };
        let vel = DVec2::new(dir * cos * speed, -sin * speed);

        self.launch = Launch {
            start_x: start.x,
            other_x: self.gorillas[1 - cur].pos.x,
            vx: vel.x,
        };
        self.banana = Banana {
            pos: start,
            vel,
            active: true,
        };
        self.last_event = ShotEvent::None;
        self.last_event_ticks = 0;
        self.last_event_msg.clear();
        log::debug!(
            "Player {} throws angle {} power {} wind {}",
            cur + 1,
            self.angle,
            self.power,
            self.wind
        );
        true
    }

    /// Advance the simulation one tick; returns the shot event for this tick
    pub fn step(&mut self) -> ShotEvent {
        self.step_victory_dance();
        if self.last_event_ticks > 0 {
            self.last_event_ticks -= 1;
            if self.last_event_ticks == 0 {
                self.last_event = ShotEvent::None;
                self.last_event_msg.clear();
            }
        }
        self.sun.tick();

        if self.explosion.active {
            self.step_explosion();
            return ShotEvent::None;
        }
        if !self.banana.active {
            return ShotEvent::None;
        }

        let old = self.banana.pos;
        self.banana.pos += self.banana.vel;
        self.banana.vel.y += self.gravity / GRAVITY_DIVISOR;
        self.banana.vel.x += self.wind / WIND_DIVISOR;

        let field_h = self.height as f64;
        if self.banana.pos.y > field_h {
            if self.banana.vel.y > GROUND_BOUNCE_THRESHOLD {
                self.banana.pos.y = field_h;
                self.banana.vel.y = -self.banana.vel.y * GROUND_BOUNCE_FACTOR;
            } else {
                return self.miss();
            }
        }

        if let Some(idx) = self.gorilla_hit_between(old, self.banana.pos) {
            self.banana.active = false;
            self.handle_gorilla_kill(idx);
            self.start_gorilla_explosion(idx);
            return self.last_event;
        }

        let pos = self.banana.pos;
        if self.building_hit_at(pos).is_some() {
            self.banana.active = false;
            self.start_explosion(pos);
            if self.round_over {
                return self.last_event;
            }
            return self.miss();
        }

        if pos.y > field_h || pos.x < 0.0 || pos.x >= self.width as f64 {
            return self.miss();
        }

        if self.sun.check_hit(pos) {
            log::debug!("Sun hit, integrity {}", self.sun.integrity);
        }
        self.last_event
    }

    /// End the throw without a kill and pass the turn
    fn miss(&mut self) -> ShotEvent {
        self.banana.active = false;
        self.evaluate_miss();
        self.set_current(1 - self.current);
        self.last_event
    }

    fn step_explosion(&mut self) {
        if !self.explosion.advance() || !self.round_over {
            return;
        }
        let cur = self.current;
        self.reset();
        if self.settings.variable_wind {
            self.wind = super::basic_wind(&mut self.rng);
        }
        let first = if self.settings.winner_first { cur } else { 1 - cur };
        self.set_current(first);
    }

    fn step_victory_dance(&mut self) {
        if let Some((y, played)) = self.dance.advance() {
            self.gorillas[self.dance.gorilla()].pos.y = y;
            if played {
                self.cue(SoundEffect::Dance);
            }
        }
    }

    /// First gorilla touched on the segment `from -> to`, sampled at unit
    /// steps along the longer axis.
    ///
    /// The shooter's own gorilla is ignored for the first few samples of a
    /// rising segment heading toward the opponent, so a banana can leave the
    /// hand.
    pub fn gorilla_hit_between(&self, from: DVec2, to: DVec2) -> Option<usize> {
        let d = to - from;
        let steps = (d.x.abs().max(d.y.abs()).ceil() as usize).max(1);
        let forward = (self.current == 0 && d.x > 0.0) || (self.current == 1 && d.x < 0.0);
        let in_grace = |idx: usize, i: usize| {
            idx == self.current && forward && d.y <= 0.0 && i <= LAUNCH_GRACE_SAMPLES
        };

        for i in 1..=steps {
            let p = from + d * (i as f64 / steps as f64);
            let (px, py) = (p.x.round() as i32, p.y.round() as i32);
            if let Some(idx) = self.hit_map.gorilla_hit_at(px, py) {
                if in_grace(idx, i) {
                    continue;
                }
                return Some(idx);
            }
            for (idx, g) in self.gorillas.iter().enumerate() {
                let near = (g.pos.x - px as f64).abs() < GORILLA_HALF_WIDTH
                    && (g.pos.y - py as f64).abs() < GORILLA_HALF_HEIGHT;
                if near && !in_grace(idx, i) {
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Building slot under `pos` if the point is solid (inside the rectangle
    /// and not blasted away)
    pub fn building_hit_at(&self, pos: DVec2) -> Option<usize> {
        let idx = (pos.x / self.building_width()) as i64;
        let b = self.buildings.get(usize::try_from(idx).ok()?)?;
        let field_h = self.height as f64;
        let solid =
            pos.y < field_h && pos.y > field_h - b.h && !b.point_in_damage(pos.x, pos.y);
        solid.then_some(idx as usize)
    }

    /// Blast at an impact point. Kills any gorilla within reach, otherwise
    /// the round goes on once the animation ends.
    pub fn start_explosion(&mut self, pos: DVec2) {
        let base = self.settings.explosion_base();
        self.cue(SoundEffect::Explosion);
        self.explosion = Explosion::new(pos, base, self.settings.explosion_style());
        let reach = self.explosion.max_radius(base);
        if !self.kill_gorilla_in_radius(pos, reach) {
            self.round_over = false;
        }
        self.record_explosion_damage(pos, base);
    }

    /// Blast centred on gorilla `idx`; always ends the round
    pub fn start_gorilla_explosion(&mut self, idx: usize) {
        let base = self.settings.explosion_base();
        let pos = self.gorillas[idx].pos;
        self.cue(SoundEffect::Explosion);
        self.explosion = Explosion::new(pos, base, self.settings.explosion_style());
        self.round_over = true;
        self.record_explosion_damage(pos, base);
    }

    /// Kill the lowest-index gorilla with a hit-map pixel inside the circle
    pub fn kill_gorilla_in_radius(&mut self, pos: DVec2, r: f64) -> bool {
        let hit = self.hit_map.gorilla_hit_in_circle(
            pos.x.round() as i32,
            pos.y.round() as i32,
            r.ceil() as i32,
        );
        match hit {
            Some(idx) => {
                self.handle_gorilla_kill(idx);
                true
            }
            None => false,
        }
    }

    /// Score a kill of gorilla `idx` by the current player.
    ///
    /// The winner is always the dead gorilla's opponent; killing yourself
    /// raises [`ShotEvent::SelfHit`].
    pub fn handle_gorilla_kill(&mut self, idx: usize) {
        let shooter = self.current;
        let winner = 1 - idx;
        let self_kill = idx == shooter;
        if self_kill {
            self.raise_event(ShotEvent::SelfHit);
        }

        self.wins[winner] += 1;
        self.total_wins[winner] += 1;
        if let Some(league) = self.league.as_mut() {
            let shots = self.shots[shooter];
            league.record_round(&self.players[0], &self.players[1], winner, shots);
            league.save();
        }
        self.shots = [0, 0];
        if let Some(store) = &self.score_store {
            store.save_totals(self.total_wins);
        }

        let dead = self.gorillas[idx].pos;
        self.hit_map
            .clear_gorilla(dead.x as i32, dead.y as i32, idx, GORILLA_HIT_RADIUS);
        self.dance = Dance::new(winner, DANCE_FRAMES.to_vec(), self.gorillas[winner].pos.y);
        self.set_current(winner);
        self.round_over = true;
        log::info!(
            "{} wins the round ({}:{})",
            self.players[winner],
            self.wins[0],
            self.wins[1]
        );
    }

    /// Append a damage circle to every building the blast touches and clear
    /// the blasted pixels from the hit map
    pub fn record_explosion_damage(&mut self, pos: DVec2, r: f64) {
        let field_h = self.height as f64;
        for b in &mut self.buildings {
            if b.overlaps_circle(pos.x, pos.y, r, field_h) {
                b.damage.push(DamageCircle { x: pos.x, y: pos.y, r });
            }
        }
        self.hit_map
            .clear_building_area(pos.x.round() as i32, pos.y.round() as i32, r.ceil() as i32);
    }

    /// Classify a throw that ended without a kill
    pub fn evaluate_miss(&mut self) {
        let to_other = self.launch.other_x - self.launch.start_x;
        let travelled = self.banana.pos.x - self.launch.start_x;
        if self.launch.vx * to_other < 0.0 {
            self.raise_event(ShotEvent::Backwards);
        } else if travelled.abs() < to_other.abs() / 3.0 {
            self.raise_event(ShotEvent::Weak);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Cell, GamePhase, HitMap, basic_wind, generate_skyline};

    /// 100x100 field, ten buildings, every roof at y = 85
    fn flat_game(seed: u64) -> Game {
        let mut game = Game::with_seed(100, 100, 10, seed);
        for b in &mut game.buildings {
            b.h = 15.0;
        }
        game.gorillas[0].pos = DVec2::new(15.0, 85.0);
        game.gorillas[1].pos = DVec2::new(85.0, 85.0);
        game.hit_map = HitMap::from_scene(100, 100, &game.buildings, &game.gorillas);
        game.wind = 0.0;
        game
    }

    fn run_until_idle(game: &mut Game) {
        for _ in 0..MAX_TRIAL_TICKS {
            if game.phase() == GamePhase::Aiming {
                return;
            }
            game.step();
        }
    }

    #[test]
    fn test_throw_sets_velocity() {
        let mut game = flat_game(1);
        assert!(game.throw());
        let v = game.banana.vel;
        assert!((v.x - 25.0 * 45f64.to_radians().cos()).abs() < 1e-9);
        assert!((v.y + 25.0 * 45f64.to_radians().sin()).abs() < 1e-9);
        assert_eq!(game.banana.pos, game.gorillas[0].pos);
        assert_eq!(game.shots, [1, 0]);
        assert_eq!(game.shot_history.last().map(|s| s.angle), Some(45.0));

        // player 2 throws to the left
        let mut game = flat_game(1);
        game.set_current(1);
        game.throw();
        assert!(game.banana.vel.x < 0.0);
    }

    #[test]
    fn test_throw_ignored_in_flight() {
        let mut game = flat_game(1);
        assert!(game.throw());
        assert!(!game.throw());
        assert_eq!(game.shots, [1, 0]);
    }

    #[test]
    fn test_step_integrates_with_old_velocity() {
        let mut game = flat_game(2);
        game.wind = 4.0;
        game.throw();
        let p0 = game.banana.pos;
        let v0 = game.banana.vel;
        game.step();
        assert_eq!(game.banana.pos, p0 + v0);
        assert!((game.banana.vel.y - (v0.y + 17.0 / 34.0)).abs() < 1e-12);
        assert!((game.banana.vel.x - (v0.x + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_idle_step_does_nothing() {
        let mut game = flat_game(3);
        let before = game.banana;
        assert_eq!(game.step(), ShotEvent::None);
        assert_eq!(game.banana, before);
        assert_eq!(game.current, 0);
    }

    #[test]
    fn test_ground_bounce() {
        let mut game = flat_game(4);
        game.buildings.clear();
        game.buildings.push(crate::sim::Building::new(0.0, 100.0, 0.0));
        game.banana = Banana {
            pos: DVec2::new(50.0, 95.0),
            vel: DVec2::new(0.0, 10.0),
            active: true,
        };
        game.step();
        assert!(game.banana.active);
        assert_eq!(game.banana.pos.y, 100.0);
        assert!((game.banana.vel.y + (10.0 + 0.5) * 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_slow_ground_contact_is_a_miss() {
        let mut game = flat_game(4);
        game.buildings.clear();
        game.buildings.push(crate::sim::Building::new(0.0, 100.0, 0.0));
        game.banana = Banana {
            pos: DVec2::new(50.0, 98.0),
            vel: DVec2::new(0.0, 3.0),
            active: true,
        };
        game.step();
        assert!(!game.banana.active);
        assert_eq!(game.current, 1);
    }

    #[test]
    fn test_grace_lets_banana_leave_the_hand() {
        let game = flat_game(5);
        let from = game.gorillas[0].pos;
        // rising and toward the opponent: own gorilla ignored for early samples
        assert_eq!(game.gorilla_hit_between(from, from + DVec2::new(3.0, -3.0)), None);
        // falling back onto the shooter counts
        assert_eq!(game.gorilla_hit_between(from + DVec2::new(0.0, -20.0), from), Some(0));
    }

    #[test]
    fn test_grace_ends_after_five_samples() {
        let game = flat_game(5);
        // rising and forward, but the shooter's box is first reached on sample 6
        let from = DVec2::new(5.0, 95.0);
        let to = DVec2::new(25.0, 75.0);
        assert_eq!(game.gorilla_hit_between(from, to), Some(0));
    }

    #[test]
    fn test_backwards_segment_gets_no_grace() {
        let game = flat_game(5);
        let from = game.gorillas[0].pos;
        assert_eq!(game.gorilla_hit_between(from, from + DVec2::new(-3.0, -3.0)), Some(0));
    }

    #[test]
    fn test_grace_mirrors_for_second_player() {
        let mut game = flat_game(5);
        game.set_current(1);
        let from = game.gorillas[1].pos;
        assert_eq!(game.gorilla_hit_between(from, from + DVec2::new(-3.0, -3.0)), None);
        assert_eq!(game.gorilla_hit_between(from, from + DVec2::new(3.0, -3.0)), Some(1));
    }

    #[test]
    fn test_sweep_catches_fast_segments() {
        let game = flat_game(5);
        let target = game.gorillas[1].pos;
        let from = target - DVec2::new(30.0, 0.0);
        let to = target + DVec2::new(30.0, 0.0);
        assert_eq!(game.gorilla_hit_between(from, to), Some(1));
    }

    #[test]
    fn test_building_hit_respects_damage() {
        let mut game = flat_game(6);
        let p = DVec2::new(55.0, 90.0);
        assert_eq!(game.building_hit_at(p), Some(5));
        game.buildings[5].damage.push(DamageCircle { x: 55.0, y: 90.0, r: 3.0 });
        assert_eq!(game.building_hit_at(p), None);
        assert_eq!(game.building_hit_at(DVec2::new(55.0, 80.0)), None);
        assert_eq!(game.building_hit_at(DVec2::new(150.0, 90.0)), None);
    }

    #[test]
    fn test_explosion_damage_and_hit_map() {
        let mut game = flat_game(7);
        let before = game.hit_map.count(Cell::Building);
        game.record_explosion_damage(DVec2::new(50.0, 85.0), 8.0);
        assert!(game.hit_map.count(Cell::Building) < before);
        assert_eq!(game.buildings[4].damage.len(), 1);
        assert_eq!(game.buildings[5].damage.len(), 1);
        assert!(game.buildings[0].damage.is_empty());
        assert!(game.point_in_damage(5, 50.0, 87.0));
    }

    #[test]
    fn test_kill_by_opponent() {
        let mut game = flat_game(8);
        game.shots = [3, 1];
        game.handle_gorilla_kill(1);
        assert_eq!(game.wins, [1, 0]);
        assert_eq!(game.total_wins, [1, 0]);
        assert_eq!(game.shots, [0, 0]);
        assert_eq!(game.current, 0);
        assert_eq!(game.last_event, ShotEvent::None);
        assert!(game.dance.active);
        assert_eq!(game.dance.gorilla(), 0);
        assert_eq!(game.hit_map.count(Cell::Gorilla1), 0);
    }

    #[test]
    fn test_self_kill_awards_opponent() {
        let mut game = flat_game(8);
        game.handle_gorilla_kill(0);
        assert_eq!(game.wins, [0, 1]);
        assert_eq!(game.current, 1);
        assert_eq!(game.last_event, ShotEvent::SelfHit);
        assert_eq!(game.last_event_ticks, EVENT_DISPLAY_TICKS);
        assert_eq!(game.last_event_msg, "Now that was pretty dumb.");
    }

    #[test]
    fn test_miss_classification() {
        let classify = |vx: f64, landed_x: f64| {
            let mut game = flat_game(9);
            game.launch = Launch {
                start_x: 15.0,
                other_x: 85.0,
                vx,
            };
            game.banana.pos.x = landed_x;
            game.evaluate_miss();
            (game.last_event, game.last_event_msg)
        };

        let backwards = (ShotEvent::Backwards, "Don't throw it that way!".to_string());
        assert_eq!(classify(-4.0, 2.0), backwards);
        let (event, msg) = classify(4.0, 30.0);
        assert_eq!(event, ShotEvent::Weak);
        assert!(!msg.is_empty());
        assert_eq!(classify(4.0, 60.0).0, ShotEvent::None);
    }

    #[test]
    fn test_building_impact_passes_turn() {
        let mut game = flat_game(9);
        game.settings.new_explosion_radius = 4.0;
        // straight into the side of building 6
        game.banana = Banana {
            pos: DVec2::new(55.0, 88.0),
            vel: DVec2::new(8.0, 0.0),
            active: true,
        };
        game.launch = Launch {
            start_x: 15.0,
            other_x: 85.0,
            vx: 8.0,
        };
        game.step();
        assert!(!game.banana.active);
        assert!(game.explosion.active);
        assert!(!game.is_round_over());
        assert_eq!(game.current, 1);
        assert_eq!(game.last_event, ShotEvent::None);
        assert_eq!(game.buildings[6].damage.len(), 1);

        run_until_idle(&mut game);
        assert_eq!(game.round, 0);
        assert_eq!(game.current, 1);
    }

    #[test]
    fn test_event_expires() {
        let mut game = flat_game(10);
        game.raise_event(ShotEvent::Backwards);
        for _ in 0..EVENT_DISPLAY_TICKS - 1 {
            game.step();
        }
        assert_eq!(game.last_event, ShotEvent::Backwards);
        game.step();
        assert_eq!(game.last_event, ShotEvent::None);
        assert!(game.last_event_msg.is_empty());
    }

    #[test]
    fn test_victory_dance_bounces_winner() {
        let mut game = flat_game(11);
        game.handle_gorilla_kill(1);
        let base = game.gorillas[0].pos.y;
        let mut ys = Vec::new();
        while game.dance.active {
            game.step();
            ys.push(game.gorillas[0].pos.y);
        }
        assert_eq!(ys, vec![base - 3.0, base, base - 3.0, base, base]);
    }

    #[test]
    fn test_wind_fluctuation_stays_clamped() {
        let mut game = flat_game(12);
        game.settings.wind_fluctuations = true;
        game.wind = 10.0;
        for _ in 0..50 {
            game.banana.active = false;
            game.throw();
            assert!((-WIND_LIMIT..=WIND_LIMIT).contains(&game.wind));
        }

        let jitter = f64::from(WIND_JITTER);
        game.wind = 0.0;
        for _ in 0..50 {
            let before = game.wind;
            game.banana.active = false;
            game.throw();
            if before.abs() <= WIND_LIMIT - jitter {
                assert!((game.wind - before).abs() <= jitter);
            }
        }
    }

    #[test]
    fn test_sounds_are_queued_in_order() {
        let mut game = flat_game(13);
        game.throw();
        game.handle_gorilla_kill(0);
        game.start_gorilla_explosion(0);
        assert_eq!(
            game.drain_sounds(),
            vec![SoundEffect::Throw, SoundEffect::Alert, SoundEffect::Explosion]
        );

        let mut game = flat_game(13);
        game.settings.use_sound = false;
        game.throw();
        assert!(game.drain_sounds().is_empty());
    }

    #[test]
    fn test_variable_wind_redraws_after_round() {
        let mut game = Game::with_seed(100, 100, 10, 42);
        game.settings.variable_wind = true;
        game.explosion = Explosion {
            radii: vec![1.0],
            active: true,
            ..Default::default()
        };

        // reset draws wind then skyline, then the round gets a second wind
        let mut expected = game.rng.clone();
        let _ = basic_wind(&mut expected);
        let _ = generate_skyline(&mut expected, 100, 100, 10);
        let want = basic_wind(&mut expected);

        game.step();
        assert!(!game.explosion.active);
        assert_eq!(game.round, 1);
        assert_eq!(game.wind, want);
    }

    #[test]
    fn test_variable_wind_usually_changes() {
        let changed = (0..40)
            .filter(|&seed| {
                let mut game = Game::with_seed(100, 100, 10, seed);
                game.settings.variable_wind = true;
                game.explosion = Explosion {
                    radii: vec![1.0],
                    active: true,
                    ..Default::default()
                };
                let before = game.wind;
                game.step();
                assert!((-14.0..=15.0).contains(&game.wind));
                game.wind != before
            })
            .count();
        assert!(changed >= 20, "wind changed in only {changed} of 40 rounds");
    }

    #[test]
    fn test_finished_explosion_without_round_end_keeps_round() {
        let mut game = flat_game(14);
        game.settings.new_explosion_radius = 4.0;
        game.start_explosion(DVec2::new(50.0, 95.0));
        game.explosion.radii.truncate(2);
        assert!(!game.is_round_over());
        game.step();
        assert!(game.explosion.active);
        game.step();
        assert!(!game.explosion.active);
        assert_eq!(game.round, 0);
    }
}
