// --- Playfield ---
pub const X_MIN: f64 = -200.0;
pub const X_MAX: f64 = 200.0;
pub const Y_MIN: f64 = -200.0;
pub const Y_MAX: f64 = 200.0;

// --- Drones ---
pub const MAX_ALIVE_DRONES: usize = 7;
pub const DRONE_SPAWN_INTERVAL_MS: u64 = 1000;
pub const DRONE_TICK_MS: u64 = 200;
pub const DRONE_SPEED: f64 = 1.0;
pub const DRONE_SPAWN_INSET: i32 = 20; // Distance from the side and top edges
pub const DRONE_MIN_HEADING: i32 = 250;
pub const DRONE_MAX_HEADING: i32 = 290;

// --- Bombs ---
pub const BOMB_TICK_MS: u64 = 100;
pub const BOMB_SPEED: f64 = 5.0;
pub const COLLISION_RADIUS: f64 = 10.0; // Strictly less than this is a hit

// --- Cannon ---
pub const CANNON_TURN_STEP: f64 = 10.0; // Degrees per key press
pub const CANNON_INITIAL_HEADING: f64 = 0.0; // Degrees, pointing east
pub const CANNON_AIM_LENGTH: f64 = 20.0; // World units

// --- Score ---
pub const ESCAPE_PENALTY: i32 = -5;
pub const KILL_BONUS: i32 = 5;
pub const SCORE_OFFSET_X: f64 = 10.0;
pub const SCORE_OFFSET_Y: f64 = 20.0;

// --- Headless mode ---
pub const DEBUG_WIDTH: u16 = 80;
pub const DEBUG_HEIGHT: u16 = 24;
pub const INPUT_POLL_MS: u64 = 20; // Upper bound on a single input wait
pub const DEBUG_FRAME_MS: u64 = 50; // Virtual time per headless frame
pub const DEBUG_DUMP_INTERVAL_MS: u64 = 1000; // How often the headless screen is logged
