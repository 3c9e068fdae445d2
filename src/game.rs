use std::io::{self, Write};
use std::time::{Duration, Instant};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event},
};
use log::{error, info};

use crate::constants::*;
use crate::rendering::{GameGrid, OutputTarget, BACKGROUND};
use crate::session::{DroneInvasion, GameConfig};
use crate::terminal_io::{command_for, SimulatedInput};

/// Drives a session against a terminal (or a headless screen buffer) until quit.
pub struct Game {
    pub session: DroneInvasion,
    pub stdout_target: OutputTarget,
    game_grid: GameGrid,
    simulated_input: Option<SimulatedInput>,
    debug_mode_active: bool,
    max_ticks: Option<u64>,
    last_dump: Option<u64>,
}

impl Game {
    pub fn new(
        config: &GameConfig,
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        simulated_input: Option<SimulatedInput>,
        debug_mode_active: bool,
        max_ticks: Option<u64>,
    ) -> Self {
        Game {
            session: DroneInvasion::new(config),
            stdout_target,
            game_grid: GameGrid::new(config.bounds, terminal_width, terminal_height),
            simulated_input,
            debug_mode_active,
            max_ticks,
            last_dump: None,
        }
    }

    /// Plays until the quit key (or the tick limit). Returns the final score.
    pub fn run(&mut self) -> io::Result<i32> {
        self.configure_screen()?;
        self.session.start();
        self.render()?;

        let started = Instant::now();
        while self.session.is_running() {
            self.handle_input()?;

            let now = if self.debug_mode_active {
                self.session.now() + DEBUG_FRAME_MS
            } else {
                started.elapsed().as_millis() as u64
            };

            if let Some(limit) = self.max_ticks {
                if now >= limit {
                    self.session.advance_to(limit);
                    info!("Tick limit of {} ms reached.", limit);
                    self.session.quit();
                }
            }
            self.session.advance_to(now);
            self.render()?;
        }

        Ok(self.session.score())
    }

    fn configure_screen(&mut self) -> io::Result<()> {
        self.stdout_target
            .set_background(BACKGROUND)
            .map_err(|e| { error!("Failed to set background: {}", e); e })?;
        self.game_grid
            .clear_screen_manual(&mut self.stdout_target)
            .map_err(|e| { error!("Failed to clear screen: {}", e); e })?;
        self.stdout_target.flush()
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let mut events = Vec::new();
        if self.debug_mode_active {
            if let Some(sim_input) = &mut self.simulated_input {
                while sim_input.poll(self.session.now())? {
                    events.push(sim_input.read()?);
                }
            }
        } else {
            let timeout = self.input_timeout();
            if event::poll(timeout).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
                events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
                // Drain anything else already queued so held keys don't lag behind.
                while event::poll(Duration::ZERO)? {
                    events.push(event::read()?);
                }
            }
        }

        for event in events {
            match event {
                Event::Key(key_event) => {
                    if let Some(command) = command_for(&key_event) {
                        self.session.handle_command(command);
                    }
                }
                Event::Resize(new_width, new_height) => {
                    info!("Terminal resized to {}x{}", new_width, new_height);
                    self.game_grid.resize(new_width, new_height);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Waits no longer than the next scheduled tick.
    fn input_timeout(&self) -> Duration {
        let wait = match self.session.next_due_time() {
            Some(due) => due.saturating_sub(self.session.now()).min(INPUT_POLL_MS),
            None => INPUT_POLL_MS,
        };
        Duration::from_millis(wait)
    }

    fn render(&mut self) -> io::Result<()> {
        self.game_grid.clear();
        self.session.draw(&mut self.game_grid);
        self.game_grid.render(&mut self.stdout_target)?;
        self.session
            .score_board()
            .render(&self.game_grid.viewport, &mut self.stdout_target)?;
        self.stdout_target.execute_move_to(MoveTo(0, 0))?;
        self.stdout_target.flush()?;

        if let OutputTarget::ScreenBuffer(sb) = &self.stdout_target {
            let now = self.session.now();
            let due = self.last_dump.map_or(true, |last| now >= last + DEBUG_DUMP_INTERVAL_MS);
            if due || !self.session.is_running() {
                sb.print_to_log();
                self.last_dump = Some(now);
            }
        }
        Ok(())
    }
}
