mod constants;
mod entities;
mod game;
mod rendering;
mod scheduler;
mod session;
mod terminal_io;
mod types;

use std::io::{self, Write};
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    style::ResetColor,
    terminal::{disable_raw_mode, enable_raw_mode, size, Clear, ClearType},
};
use log::{error, info};

use crate::constants::*;
use crate::game::Game;
use crate::rendering::{OutputTarget, ScreenBuffer};
use crate::session::GameConfig;
use crate::terminal_io::SimulatedInput;

/// Drone Invasion: turn the laser cannon with the arrow keys, fire with `s`, quit with `q`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Run headless against a scripted demo and log the screen instead of drawing it.
    #[arg(long)]
    debug: bool,

    /// Headless screen width in characters.
    #[arg(long, default_value_t = DEBUG_WIDTH)]
    width: u16,

    /// Headless screen height in characters.
    #[arg(long, default_value_t = DEBUG_HEIGHT)]
    height: u16,

    /// Stop after this many milliseconds of game time.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Seed for drone placement; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Degrees the cannon turns per key press.
    #[arg(long, default_value_t = CANNON_TURN_STEP)]
    turn_step: f64,

    #[arg(long, default_value = "drone-invasion.log")]
    log_file: String,
}

impl Cli {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            turn_step: self.turn_step,
            seed: self.seed,
            ..GameConfig::default()
        }
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    if let Err(e) = simple_logging::log_to_file(&cli.log_file, log::LevelFilter::Info) {
        eprintln!("Failed to open log file {}: {}", cli.log_file, e);
    }
    info!("Starting Drone Invasion.");

    let config = cli.game_config();

    if cli.debug {
        info!("Debug mode enabled. Screen {}x{}", cli.width, cli.height);
        let quit_at = cli.max_ticks.unwrap_or(30_000);
        let mut game = Game::new(
            &config,
            cli.width,
            cli.height,
            OutputTarget::ScreenBuffer(ScreenBuffer::new(cli.width, cli.height)),
            Some(SimulatedInput::demo_script(quit_at)),
            true,
            cli.max_ticks,
        );
        let score = game.run()?;
        info!("Headless run finished. Final score: {}", score);
        println!("Final score: {}", score);
        return Ok(());
    }

    info!("Attempting to enable raw mode.");
    enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
    let (width, height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}", width, height);

    let mut stdout_target = OutputTarget::Stdout(io::stdout());
    stdout_target.execute_other_command(Hide).map_err(|e| { error!("Failed to hide cursor: {}", e); e })?;

    let mut game = Game::new(&config, width, height, stdout_target, None, false, cli.max_ticks);
    let result = game.run();

    // Restore the terminal whether or not the game loop failed.
    let restore = restore_terminal(&mut game.stdout_target);
    let score = result?;
    restore?;

    info!("Game over. Final score: {}", score);
    println!("Final score: {}", score);
    Ok(())
}

fn restore_terminal(stdout_target: &mut OutputTarget) -> io::Result<()> {
    stdout_target.execute_other_command(ResetColor)?;
    stdout_target.execute_other_command(Clear(ClearType::All))?;
    stdout_target.execute_other_command(Show).map_err(|e| { error!("Failed to show cursor on exit: {}", e); e })?;
    stdout_target.flush()?;
    disable_raw_mode().map_err(|e| { error!("Failed to disable raw mode on exit: {}", e); e })
}
