//! Gorillas headless entry point
//!
//! Plays a computer-vs-computer match on the simulation core, persisting win
//! totals, shot history and the league like an interactive front end would.

use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result, bail};
use clap::Parser;

use gorillas::consts::TICK;
use gorillas::league::{DEFAULT_LEAGUE_FILE, League};
use gorillas::persistence::ScoreStore;
use gorillas::settings::{DEFAULT_INI_FILE, Settings};
use gorillas::sim::{Game, GamePhase, ShotEvent};

/// Throws per round after which a match is abandoned
const MAX_TURNS_PER_ROUND: u32 = 100;
/// Ticks one throw may take, explosion included
const MAX_TICKS_PER_THROW: u32 = 2000;

#[derive(Parser)]
#[command(name = "gorillas")]
#[command(about = "Run a headless computer-vs-computer Gorillas match")]
struct Args {
    /// Playfield width in pixels
    #[arg(long, default_value_t = 640)]
    width: i32,
    /// Playfield height in pixels
    #[arg(long, default_value_t = 350)]
    height: i32,
    /// Number of buildings in the skyline
    #[arg(long, default_value_t = 10)]
    buildings: usize,
    /// Rounds to play (defaults to DefaultRoundQty from the settings)
    #[arg(long)]
    rounds: Option<u32>,
    /// RNG seed for a reproducible match
    #[arg(long)]
    seed: Option<u64>,
    /// Fixed starting wind instead of a random one
    #[arg(long, allow_hyphen_values = true)]
    wind: Option<f64>,
    /// Gravity (overrides DefaultGravity)
    #[arg(long)]
    gravity: Option<f64>,
    /// Round winner throws first in the next round
    #[arg(long)]
    winner_first: bool,
    /// Settings file
    #[arg(long, default_value = DEFAULT_INI_FILE)]
    settings: PathBuf,
    /// Directory for score, shot and league files; nothing is saved without it
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long, default_value = "Player 1")]
    player1: String,
    #[arg(long, default_value = "Player 2")]
    player2: String,
    /// Step at the real-time tick rate instead of as fast as possible
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("Gorillas (headless) starting...");

    let mut settings = Settings::load_from(&args.settings);
    if args.winner_first {
        settings.winner_first = true;
    }
    if let Some(gravity) = args.gravity {
        if gravity <= 0.0 {
            bail!("--gravity must be positive");
        }
        settings.default_gravity = gravity;
    }
    let rounds = args.rounds.unwrap_or(settings.default_round_qty);
    if rounds == 0 {
        bail!("--rounds must be at least 1");
    }

    let mut game = match args.seed {
        Some(seed) => Game::with_seed(args.width, args.height, args.buildings, seed),
        None => Game::new(args.width, args.height, args.buildings),
    };
    game.apply_settings(settings);
    if let Some(wind) = args.wind {
        game.wind = wind;
    }
    game.players = [args.player1.clone(), args.player2.clone()];

    if let Some(dir) = &args.data_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;
        game.attach_store(ScoreStore::in_dir(dir));
        let mut league = League::load(dir.join(DEFAULT_LEAGUE_FILE));
        league.add_player(&args.player1);
        league.add_player(&args.player2);
        game.league = Some(league);
    }

    let mut turns = 0;
    while game.wins.iter().sum::<u32>() < rounds {
        if turns >= MAX_TURNS_PER_ROUND * rounds {
            log::warn!("Giving up after {turns} throws");
            break;
        }
        turns += 1;
        play_turn(&mut game, args.realtime);
    }

    game.save_scores();
    println!("{}", game.stats_string());
    Ok(())
}

/// One AI throw, stepped until the banana and any explosion are done
fn play_turn(game: &mut Game, realtime: bool) {
    let shooter = game.current;
    let round = game.round;
    game.auto_shot();
    println!(
        "{} throws: angle {} power {} (wind {})",
        game.players[shooter], game.angle, game.power, game.wind
    );

    for _ in 0..MAX_TICKS_PER_THROW {
        let event = game.step();
        if event != ShotEvent::None {
            println!("  {}", game.last_event_msg);
        }
        for sound in game.drain_sounds() {
            log::trace!("sound {sound:?}");
        }
        if realtime {
            thread::sleep(TICK);
        }
        if game.phase() == GamePhase::Aiming {
            break;
        }
    }

    if game.round != round {
        println!(
            "Round {} over - {} {} : {} {}",
            round + 1,
            game.players[0],
            game.wins[0],
            game.wins[1],
            game.players[1]
        );
    }
}
