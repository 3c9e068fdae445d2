use std::collections::BTreeMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use log::{debug, info};

use crate::constants::*;
use crate::entities::{Bomb, BombId, BombTick, Drone, DroneId, DroneRegistry, DroneTick, LaserCannon};
use crate::rendering::{GameGrid, ScoreBoard};
use crate::scheduler::{Scheduler, Task};
use crate::terminal_io::Command;
use crate::types::{PlayfieldBounds, Vector2D};

/// Runtime knobs for a session.
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub bounds: PlayfieldBounds,
    pub turn_step: f64,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            bounds: PlayfieldBounds::default(),
            turn_step: CANNON_TURN_STEP,
            seed: None,
        }
    }
}

/// One game of Drone Invasion: the score, every entity, and the timer queue
/// that drives them. Single-threaded; tasks never interleave.
pub struct DroneInvasion {
    pub bounds: PlayfieldBounds,
    pub(crate) score: i32,
    pub(crate) score_board: ScoreBoard,
    pub(crate) drones: DroneRegistry,
    pub(crate) bombs: BTreeMap<BombId, Bomb>,
    pub(crate) cannon: LaserCannon,
    pub(crate) scheduler: Scheduler,
    next_bomb_id: u64,
    rng: StdRng,
    running: bool,
}

impl DroneInvasion {
    pub fn new(config: &GameConfig) -> Self {
        let bounds = config.bounds;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let anchor = Vector2D::new(bounds.x_min + SCORE_OFFSET_X, bounds.y_max - SCORE_OFFSET_Y);
        DroneInvasion {
            bounds,
            score: 0,
            score_board: ScoreBoard::new(anchor),
            drones: DroneRegistry::new(),
            bombs: BTreeMap::new(),
            cannon: LaserCannon::new(bounds, config.turn_step),
            scheduler: Scheduler::new(),
            next_bomb_id: 0,
            rng,
            running: false,
        }
    }

    /// One-time setup: fresh cannon, score display at zero, spawner armed.
    pub fn start(&mut self) {
        self.cannon = LaserCannon::new(self.bounds, self.cannon.turn_step);
        self.score = 0;
        self.update_score(0);
        self.scheduler.schedule(DRONE_SPAWN_INTERVAL_MS, Task::SpawnDrone);
        self.running = true;
        info!(
            "Session started. Bounds: ({}, {}, {}, {})",
            self.bounds.x_min, self.bounds.x_max, self.bounds.y_min, self.bounds.y_max
        );
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn score_board(&self) -> &ScoreBoard {
        &self.score_board
    }

    pub fn cannon(&self) -> &LaserCannon {
        &self.cannon
    }

    pub fn drones(&self) -> &DroneRegistry {
        &self.drones
    }

    pub fn bombs(&self) -> impl Iterator<Item = (&BombId, &Bomb)> {
        self.bombs.iter()
    }

    pub fn next_due_time(&self) -> Option<u64> {
        self.scheduler.next_due_time()
    }

    // --- Score ---

    pub fn update_score(&mut self, delta: i32) {
        self.score += delta;
        self.score_board.write_score(self.score);
        if delta != 0 {
            info!("Score {:+} -> {}", delta, self.score);
        }
    }

    pub fn report_escape(&mut self) {
        self.update_score(ESCAPE_PENALTY);
    }

    pub fn report_kill(&mut self) {
        self.update_score(KILL_BONUS);
    }

    // --- Input ---

    pub fn handle_command(&mut self, command: Command) {
        if !self.running {
            return;
        }
        match command {
            Command::TurnLeft => self.cannon.turn_left(),
            Command::TurnRight => self.cannon.turn_right(),
            Command::Shoot => {
                self.shoot();
            }
            Command::Quit => self.quit(),
        }
    }

    pub fn shoot(&mut self) -> BombId {
        let bomb = self.cannon.shoot();
        self.launch_bomb(bomb)
    }

    pub fn launch_bomb(&mut self, bomb: Bomb) -> BombId {
        let id = BombId(self.next_bomb_id);
        self.next_bomb_id += 1;
        debug!("Bomb {:?} fired at heading {}", id, bomb.heading);
        self.bombs.insert(id, bomb);
        self.scheduler.schedule(BOMB_TICK_MS, Task::MoveBomb(id));
        id
    }

    /// Ends the session. Pending ticks are dropped and none will run again.
    pub fn quit(&mut self) {
        if self.running {
            info!(
                "Quit requested. Final score: {}, dropping {} pending ticks",
                self.score,
                self.scheduler.pending()
            );
        }
        self.running = false;
        self.scheduler.clear();
    }

    // --- Drones ---

    /// Spawner tick: one new drone while fewer than the maximum are alive.
    /// Re-arms itself either way.
    pub fn add_drone(&mut self) -> Option<DroneId> {
        let spawned = if self.drones.alive_count() < MAX_ALIVE_DRONES {
            let drone = Drone::spawn(DRONE_SPEED, self.bounds, &mut self.rng);
            Some(self.insert_drone(drone))
        } else {
            None
        };
        self.scheduler.schedule(DRONE_SPAWN_INTERVAL_MS, Task::SpawnDrone);
        spawned
    }

    /// Registers a drone and arms its first move.
    pub fn insert_drone(&mut self, drone: Drone) -> DroneId {
        debug!(
            "Drone spawned at ({}, {}) heading {}",
            drone.position.x, drone.position.y, drone.heading
        );
        let id = self.drones.register(drone);
        self.scheduler.schedule(DRONE_TICK_MS, Task::MoveDrone(id));
        id
    }

    // --- Clock ---

    /// Runs every task due up to `until`, in fire-time order, then moves the clock there.
    pub fn advance_to(&mut self, until: u64) {
        while self.running {
            match self.scheduler.pop_due(until) {
                Some(task) => self.run_task(task),
                None => break,
            }
        }
        if self.running {
            self.scheduler.settle(until);
        }
    }

    pub fn advance_by(&mut self, delta_ms: u64) {
        let until = self.now() + delta_ms;
        self.advance_to(until);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::SpawnDrone => {
                self.add_drone();
            }
            Task::MoveDrone(id) => self.move_drone(id),
            Task::MoveBomb(id) => self.move_bomb(id),
        }
    }

    fn move_drone(&mut self, id: DroneId) {
        let Some(drone) = self.drones.get_mut(id) else {
            return;
        };
        // A drone shot down between ticks ends its chain here.
        if !drone.is_alive() {
            return;
        }
        match drone.tick() {
            DroneTick::Moved => self.scheduler.schedule(DRONE_TICK_MS, Task::MoveDrone(id)),
            DroneTick::Escaped => {
                info!("Drone {:?} escaped at ({:.1}, {:.1})", id, drone.position.x, drone.position.y);
                self.report_escape();
            }
        }
    }

    fn move_bomb(&mut self, id: BombId) {
        let Some(bomb) = self.bombs.get_mut(&id) else {
            return;
        };
        match bomb.tick(&mut self.drones) {
            BombTick::Flying => self.scheduler.schedule(BOMB_TICK_MS, Task::MoveBomb(id)),
            BombTick::Hit(drone_id) => {
                info!("Bomb {:?} destroyed drone {:?}", id, drone_id);
                self.bombs.remove(&id);
                self.report_kill();
            }
            BombTick::OutOfBounds => {
                debug!("Bomb {:?} left the field", id);
                self.bombs.remove(&id);
            }
        }
    }

    // --- Drawing ---

    pub fn draw(&self, game_grid: &mut GameGrid) {
        self.drones.draw(game_grid);
        for bomb in self.bombs.values() {
            bomb.draw(game_grid);
        }
        self.cannon.draw(game_grid);
    }
}
