use crate::constants::*;
use crate::types::{normalize_heading, out_of_bounds, PlayfieldBounds, Vector2D};
use crate::rendering::GameGrid;
use rand::Rng;
use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DroneId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BombId(pub u64);

/// Shared contract of anything that moves in a straight line inside the playfield.
pub trait BoundedEntity {
    fn position(&self) -> Vector2D;
    fn set_position(&mut self, position: Vector2D);
    fn heading(&self) -> f64;
    fn speed(&self) -> f64;
    fn bounds(&self) -> &PlayfieldBounds;

    /// Teardown: hide the sprite and stop taking part in the game.
    fn remove(&mut self);

    fn out_of_bounds(&self) -> bool {
        out_of_bounds(self.position(), self.bounds())
    }

    /// One tick of movement: `speed` units along the current heading.
    fn advance(&mut self) {
        let step = Vector2D::from_heading(self.heading()).scale(self.speed());
        self.set_position(self.position().add(step));
    }
}

// --- Drone ---
pub struct Drone {
    pub position: Vector2D,
    pub heading: f64,
    pub speed: f64,
    pub bounds: PlayfieldBounds,
    pub alive: bool,
    pub display_char: char,
}

/// Result of one drone tick.
#[derive(Debug, PartialEq, Eq)]
pub enum DroneTick {
    Moved,
    Escaped,
}

impl Drone {
    /// Spawns near the top edge with a random x and a random downward heading.
    pub fn spawn(speed: f64, bounds: PlayfieldBounds, rng: &mut impl Rng) -> Self {
        let x_low = bounds.x_min as i32 + DRONE_SPAWN_INSET;
        let x_high = bounds.x_max as i32 - DRONE_SPAWN_INSET;
        let x = rng.gen_range(x_low..=x_high) as f64;
        let heading = rng.gen_range(DRONE_MIN_HEADING..=DRONE_MAX_HEADING) as f64;
        let y = bounds.y_max - DRONE_SPAWN_INSET as f64;
        Drone::at(Vector2D::new(x, y), heading, speed, bounds)
    }

    pub fn at(position: Vector2D, heading: f64, speed: f64, bounds: PlayfieldBounds) -> Self {
        Drone {
            position,
            heading,
            speed,
            bounds,
            alive: true,
            display_char: 'V',
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Moves once. An escaped drone is already removed when this returns.
    pub fn tick(&mut self) -> DroneTick {
        self.advance();
        if self.out_of_bounds() {
            self.remove();
            DroneTick::Escaped
        } else {
            DroneTick::Moved
        }
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        if self.alive {
            game_grid.set_world_char(self.position, self.display_char);
        }
    }
}

impl BoundedEntity for Drone {
    fn position(&self) -> Vector2D {
        self.position
    }

    fn set_position(&mut self, position: Vector2D) {
        self.position = position;
    }

    fn heading(&self) -> f64 {
        self.heading
    }

    fn speed(&self) -> f64 {
        self.speed
    }

    fn bounds(&self) -> &PlayfieldBounds {
        &self.bounds
    }

    fn remove(&mut self) {
        self.alive = false;
    }
}

// --- DroneRegistry ---

/// Every drone created during a session, in creation order. Dead drones stay
/// in place so that ids remain stable; queries skip them.
#[derive(Default)]
pub struct DroneRegistry {
    drones: Vec<Drone>,
}

impl DroneRegistry {
    pub fn new() -> Self {
        DroneRegistry { drones: Vec::new() }
    }

    pub fn register(&mut self, drone: Drone) -> DroneId {
        let id = DroneId(self.drones.len());
        self.drones.push(drone);
        id
    }

    pub fn get(&self, id: DroneId) -> Option<&Drone> {
        self.drones.get(id.0)
    }

    pub fn get_mut(&mut self, id: DroneId) -> Option<&mut Drone> {
        self.drones.get_mut(id.0)
    }

    /// Alive drones in registry order.
    pub fn alive(&self) -> impl Iterator<Item = (DroneId, &Drone)> {
        self.drones
            .iter()
            .enumerate()
            .filter(|(_, drone)| drone.alive)
            .map(|(index, drone)| (DroneId(index), drone))
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Total number of drones ever registered, dead ones included.
    pub fn len(&self) -> usize {
        self.drones.len()
    }

    /// First alive drone strictly closer than `radius` to `position`.
    pub fn first_within(&self, position: Vector2D, radius: f64) -> Option<DroneId> {
        self.alive()
            .find(|(_, drone)| position.distance(drone.position) < radius)
            .map(|(id, _)| id)
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        for (_, drone) in self.alive() {
            drone.draw(game_grid);
        }
    }
}

// --- Bomb ---
pub struct Bomb {
    pub position: Vector2D,
    pub heading: f64,
    pub speed: f64,
    pub bounds: PlayfieldBounds,
    pub visible: bool,
    pub display_char: char,
}

/// Result of one bomb tick.
#[derive(Debug, PartialEq, Eq)]
pub enum BombTick {
    Flying,
    Hit(DroneId),
    OutOfBounds,
}

impl Bomb {
    pub fn new(origin: Vector2D, heading: f64, speed: f64, bounds: PlayfieldBounds) -> Self {
        Bomb {
            position: origin,
            heading,
            speed,
            bounds,
            visible: true,
            display_char: '*',
        }
    }

    /// Moves once, then kills at most one drone: the first alive one within
    /// the collision radius. The bomb is removed on a hit or once it leaves the field.
    pub fn tick(&mut self, drones: &mut DroneRegistry) -> BombTick {
        self.advance();

        if let Some(id) = drones.first_within(self.position, COLLISION_RADIUS) {
            if let Some(drone) = drones.get_mut(id) {
                drone.remove();
            }
            self.remove();
            return BombTick::Hit(id);
        }

        if self.out_of_bounds() {
            self.remove();
            return BombTick::OutOfBounds;
        }

        BombTick::Flying
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        if self.visible {
            game_grid.set_world_char(self.position, self.display_char);
        }
    }
}

impl BoundedEntity for Bomb {
    fn position(&self) -> Vector2D {
        self.position
    }

    fn set_position(&mut self, position: Vector2D) {
        self.position = position;
    }

    fn heading(&self) -> f64 {
        self.heading
    }

    fn speed(&self) -> f64 {
        self.speed
    }

    fn bounds(&self) -> &PlayfieldBounds {
        &self.bounds
    }

    fn remove(&mut self) {
        self.visible = false;
    }
}

// --- LaserCannon ---
pub struct LaserCannon {
    pub position: Vector2D,
    pub heading: f64, // Degrees
    pub turn_step: f64,
    pub bounds: PlayfieldBounds,
}

impl LaserCannon {
    pub fn new(bounds: PlayfieldBounds, turn_step: f64) -> Self {
        LaserCannon {
            position: Vector2D::new(0.0, 0.0),
            heading: CANNON_INITIAL_HEADING,
            turn_step,
            bounds,
        }
    }

    /// Counter-clockwise.
    pub fn turn_left(&mut self) {
        self.heading = normalize_heading(self.heading + self.turn_step);
        debug!("Cannon heading: {}", self.heading);
    }

    pub fn turn_right(&mut self) {
        self.heading = normalize_heading(self.heading - self.turn_step);
        debug!("Cannon heading: {}", self.heading);
    }

    /// The bomb keeps this heading even if the cannon turns afterwards.
    pub fn shoot(&self) -> Bomb {
        Bomb::new(self.position, self.heading, BOMB_SPEED, self.bounds)
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        // Aiming indicator first so the barrel base stays visible.
        let direction = Vector2D::from_heading(self.heading);
        let steps = 4;
        for i in 1..=steps {
            let distance = CANNON_AIM_LENGTH * i as f64 / steps as f64;
            let point = self.position.add(direction.scale(distance));
            game_grid.set_world_char(point, Self::barrel_char(self.heading));
        }
        game_grid.set_world_char(self.position, 'O');
    }

    pub fn barrel_char(heading: f64) -> char {
        // Octants, 0 = east, counter-clockwise.
        let octant = ((normalize_heading(heading) + 22.5) / 45.0).floor() as u8 % 8;
        match octant {
            0 | 4 => '-',
            1 | 5 => '/',
            2 | 6 => '|',
            _ => '\u{005C}',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bounds() -> PlayfieldBounds {
        PlayfieldBounds::default()
    }

    #[test]
    fn drone_spawns_inside_the_top_inset() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let drone = Drone::spawn(DRONE_SPEED, bounds(), &mut rng);
            assert!(drone.position.x >= -180.0 && drone.position.x <= 180.0);
            assert_eq!(drone.position.y, 180.0);
            assert!(drone.heading >= 250.0 && drone.heading <= 290.0);
            assert_eq!(drone.position.x.fract(), 0.0);
            assert_eq!(drone.heading.fract(), 0.0);
            assert!(drone.is_alive());
        }
    }

    #[test]
    fn drone_descends_in_a_straight_line() {
        let mut drone = Drone::at(Vector2D::new(0.0, 180.0), 270.0, 1.0, bounds());
        for _ in 0..20 {
            assert_eq!(drone.tick(), DroneTick::Moved);
        }
        assert!(drone.position.x.abs() < 1e-9);
        assert!((drone.position.y - 160.0).abs() < 1e-9);
        assert_eq!(drone.heading, 270.0);
        assert!(drone.is_alive());
    }

    #[test]
    fn drone_leaving_the_field_is_removed() {
        let mut drone = Drone::at(Vector2D::new(0.0, -199.5), 270.0, 1.0, bounds());
        assert_eq!(drone.tick(), DroneTick::Escaped);
        assert!(!drone.is_alive());
        assert!(drone.out_of_bounds());
    }

    #[test]
    fn registry_only_reports_alive_drones() {
        let mut registry = DroneRegistry::new();
        let a = registry.register(Drone::at(Vector2D::new(-50.0, 100.0), 270.0, 1.0, bounds()));
        let b = registry.register(Drone::at(Vector2D::new(0.0, 100.0), 270.0, 1.0, bounds()));
        let c = registry.register(Drone::at(Vector2D::new(50.0, 100.0), 270.0, 1.0, bounds()));

        if let Some(drone) = registry.get_mut(b) {
            drone.remove();
        }

        let alive: Vec<DroneId> = registry.alive().map(|(id, _)| id).collect();
        assert_eq!(alive, vec![a, c]);
        assert!(registry.alive().all(|(_, drone)| drone.is_alive()));
        assert_eq!(registry.alive_count(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn collision_radius_is_strict() {
        let mut registry = DroneRegistry::new();
        registry.register(Drone::at(Vector2D::new(0.0, 10.0), 270.0, 0.0, bounds()));
        assert_eq!(registry.first_within(Vector2D::new(0.0, 0.0), COLLISION_RADIUS), None);

        let near = registry.register(Drone::at(Vector2D::new(9.999, 0.0), 270.0, 0.0, bounds()));
        assert_eq!(registry.first_within(Vector2D::new(0.0, 0.0), COLLISION_RADIUS), Some(near));
    }

    #[test]
    fn bomb_kills_only_the_first_drone_in_registry_order() {
        let mut registry = DroneRegistry::new();
        let first = registry.register(Drone::at(Vector2D::new(1.0, 5.0), 270.0, 0.0, bounds()));
        let second = registry.register(Drone::at(Vector2D::new(-1.0, 5.0), 270.0, 0.0, bounds()));

        let mut bomb = Bomb::new(Vector2D::new(0.0, 0.0), 90.0, 5.0, bounds());
        assert_eq!(bomb.tick(&mut registry), BombTick::Hit(first));
        assert!(!bomb.visible);
        assert!(!registry.get(first).is_some_and(|d| d.is_alive()));
        assert!(registry.get(second).is_some_and(|d| d.is_alive()));
    }

    #[test]
    fn bomb_ignores_dead_drones() {
        let mut registry = DroneRegistry::new();
        let dead = registry.register(Drone::at(Vector2D::new(0.0, 5.0), 270.0, 0.0, bounds()));
        if let Some(drone) = registry.get_mut(dead) {
            drone.remove();
        }

        let mut bomb = Bomb::new(Vector2D::new(0.0, 0.0), 90.0, 5.0, bounds());
        assert_eq!(bomb.tick(&mut registry), BombTick::Flying);
        assert!(bomb.visible);
    }

    #[test]
    fn bomb_leaving_the_field_is_removed() {
        let mut registry = DroneRegistry::new();
        let mut bomb = Bomb::new(Vector2D::new(198.0, 0.0), 0.0, 5.0, bounds());
        assert_eq!(bomb.tick(&mut registry), BombTick::OutOfBounds);
        assert!(!bomb.visible);
    }

    #[test]
    fn cannon_turns_relative_and_wraps() {
        let mut cannon = LaserCannon::new(bounds(), CANNON_TURN_STEP);
        cannon.turn_left();
        assert_eq!(cannon.heading, 10.0);
        cannon.turn_right();
        cannon.turn_right();
        assert_eq!(cannon.heading, 350.0);
    }

    #[test]
    fn bomb_keeps_heading_after_cannon_turns() {
        let mut cannon = LaserCannon::new(bounds(), 15.0);
        cannon.turn_left();
        let bomb = cannon.shoot();
        cannon.turn_left();
        assert_eq!(bomb.heading, 15.0);
        assert_eq!(bomb.speed, BOMB_SPEED);
        assert_eq!(bomb.position, cannon.position);
        assert_eq!(cannon.heading, 30.0);
    }

    #[test]
    fn barrel_char_matches_octant() {
        assert_eq!(LaserCannon::barrel_char(0.0), '-');
        assert_eq!(LaserCannon::barrel_char(45.0), '/');
        assert_eq!(LaserCannon::barrel_char(90.0), '|');
        assert_eq!(LaserCannon::barrel_char(135.0), '\u{005C}');
        assert_eq!(LaserCannon::barrel_char(350.0), '-');
    }
}
