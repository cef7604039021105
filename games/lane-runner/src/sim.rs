//! Lane runner simulation: player lane, speed, obstacles, score.
//!
//! Pure game logic with no engine or browser dependencies besides the
//! seedable `Rng`, so every rule can be exercised directly in tests.

use glam::Vec2;
use lane_engine::Rng;

use crate::tuning::Tuning;

/// Per-session values mutated once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    /// Always within `0..lanes`.
    pub player_lane: u32,
    /// Always within `[min_speed, max_speed]`. Distance per frame.
    pub speed: f32,
    pub score: u64,
    pub running: bool,
}

/// A block scrolling down one lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub lane: u32,
    /// Vertical centre; grows as the obstacle scrolls toward the player.
    pub y: f32,
    pub height: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
}

/// Axis-aligned box given by its centre and full size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub size: Vec2,
}

impl Aabb {
    /// Strict overlap on both axes; touching edges do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let separation = (self.center - other.center).abs();
        let reach = (self.size + other.size) / 2.0;
        separation.x < reach.x && separation.y < reach.y
    }
}

/// One run of the game, from restart to crash.
pub struct GameSession {
    tuning: Tuning,
    state: SimulationState,
    obstacles: Vec<Obstacle>,
    spawn_timer_ms: f32,
    crashed: bool,
    rng: Rng,
}

impl GameSession {
    /// A fresh, running session.
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let tuning = tuning.normalized();
        let state = Self::initial_state(&tuning);
        Self {
            tuning,
            state,
            obstacles: Vec::with_capacity(16),
            spawn_timer_ms: 0.0,
            crashed: false,
            rng: Rng::new(seed),
        }
    }

    fn initial_state(tuning: &Tuning) -> SimulationState {
        SimulationState {
            player_lane: tuning.initial_lane,
            speed: tuning.initial_speed,
            score: 0,
            running: true,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Live obstacles in spawn order.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Stopped by a collision (as opposed to paused).
    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    pub fn is_paused(&self) -> bool {
        !self.state.running && !self.crashed
    }

    /// Advance the simulation by `dt_ms`. Returns true if this call crashed.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        if !self.state.running {
            return false;
        }
        let dt_ms = dt_ms.max(0.0);

        self.spawn_timer_ms += dt_ms;
        if self.spawn_timer_ms > self.tuning.spawn_threshold_ms(self.state.score) {
            self.spawn_timer_ms = 0.0;
            self.spawn_obstacle();
        }

        // Speed is distance per frame, not per ms
        let speed = self.state.speed;
        for obstacle in &mut self.obstacles {
            obstacle.y += speed;
        }
        let despawn_y = self.tuning.despawn_y();
        self.obstacles.retain(|o| o.y < despawn_y);

        self.state.score += speed.floor() as u64;
        self.state.speed = (speed + self.tuning.acceleration_per_ms * dt_ms).min(self.tuning.max_speed);

        if self.collides() {
            self.state.running = false;
            self.crashed = true;
            return true;
        }
        false
    }

    fn spawn_obstacle(&mut self) {
        let lane = self.rng.next_int(self.tuning.lanes);
        self.obstacles.push(Obstacle {
            lane,
            y: self.tuning.obstacle_spawn_y,
            height: self.tuning.obstacle_height,
            width: self.tuning.obstacle_width(),
        });
    }

    /// The player's hitbox.
    pub fn player_box(&self) -> Aabb {
        Aabb {
            center: Vec2::new(
                self.tuning.lane_center_x(self.state.player_lane),
                self.tuning.player_y(),
            ),
            size: Vec2::new(self.tuning.player_width(), self.tuning.player_height),
        }
    }

    pub fn obstacle_box(&self, obstacle: &Obstacle) -> Aabb {
        Aabb {
            center: Vec2::new(self.tuning.lane_center_x(obstacle.lane), obstacle.y),
            size: Vec2::new(obstacle.width, obstacle.height),
        }
    }

    /// Whether any live obstacle overlaps the player.
    pub fn collides(&self) -> bool {
        let player = self.player_box();
        self.obstacles
            .iter()
            .any(|o| player.overlaps(&self.obstacle_box(o)))
    }

    /// Move one lane left or right; no-op at the road edge.
    pub fn steer(&mut self, direction: Steer) {
        let last = self.tuning.lanes - 1;
        self.state.player_lane = match direction {
            Steer::Left => self.state.player_lane.saturating_sub(1),
            Steer::Right => (self.state.player_lane + 1).min(last),
        };
    }

    /// Called once per frame with the held state of the brake.
    /// Held: speed is scaled down toward the floor.
    /// Released: speed climbs by a fixed step toward the ceiling.
    pub fn set_braking(&mut self, pressed: bool) {
        let t = &self.tuning;
        self.state.speed = if pressed {
            (self.state.speed * t.brake_factor).max(t.min_speed)
        } else {
            (self.state.speed + t.release_step).min(t.max_speed)
        };
    }

    /// Back to the initial state with no obstacles, running.
    pub fn restart(&mut self) {
        self.state = Self::initial_state(&self.tuning);
        self.obstacles.clear();
        self.spawn_timer_ms = 0.0;
        self.crashed = false;
    }

    /// Pause or resume. A crashed session stays crashed.
    /// Returns the new paused flag, or None when nothing changed.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        if self.crashed {
            return None;
        }
        self.state.running = !self.state.running;
        Some(!self.state.running)
    }

    #[cfg(test)]
    pub(crate) fn place_obstacle(&mut self, lane: u32, y: f32) {
        self.obstacles.push(Obstacle {
            lane,
            y,
            height: self.tuning.obstacle_height,
            width: self.tuning.obstacle_width(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn session() -> GameSession {
        GameSession::new(Tuning::default(), 42)
    }

    #[test]
    fn one_frame_scores_floor_of_speed() {
        let mut s = session();
        assert_eq!(s.state().speed, 4.0);
        let crashed = s.advance(16.0);
        assert!(!crashed);
        assert_eq!(s.state().score, 4);
        assert!(s.state().running);
        assert!(s.obstacles().is_empty());
    }

    #[test]
    fn speed_grows_with_elapsed_time() {
        let mut s = session();
        s.advance(50.0);
        assert!((s.state().speed - 4.1).abs() < 1e-5);
    }

    #[test]
    fn speed_never_overshoots_max() {
        let mut s = session();
        s.state.speed = 13.99;
        s.advance(50.0);
        assert_eq!(s.state().speed, 14.0);
    }

    #[test]
    fn spawns_once_timer_strictly_exceeds_threshold() {
        let mut s = session();
        // Timer reaches exactly 1200ms at score 0: not yet
        s.advance(1200.0);
        assert!(s.obstacles().is_empty());
        // Threshold is now 1200 - 2 * 4 = 1192
        s.advance(1.0);
        assert_eq!(s.obstacles().len(), 1);

        let o = s.obstacles()[0];
        assert!(o.lane < 3);
        assert_eq!(o.height, 60.0);
        assert!((o.width - 72.0).abs() < 1e-4);
        // Spawned above the canvas and moved once this frame
        assert!(o.y > -60.0 && o.y < 0.0);
    }

    #[test]
    fn spawn_threshold_is_never_below_floor() {
        let mut s = session();
        s.state.score = 10_000;
        s.advance(350.0);
        assert!(s.obstacles().is_empty());
        s.advance(1.0);
        assert_eq!(s.obstacles().len(), 1);
    }

    #[test]
    fn obstacles_past_the_bottom_are_dropped() {
        let mut s = session();
        s.place_obstacle(0, 737.0);
        s.place_obstacle(0, 100.0);
        s.state.player_lane = 2;
        s.advance(1.0);
        assert_eq!(s.obstacles().len(), 1);
        assert!(s.obstacles().iter().all(|o| o.y < s.tuning().despawn_y()));
    }

    #[test]
    fn overlapping_obstacle_crashes() {
        let mut s = session();
        let py = s.tuning().player_y();
        s.place_obstacle(1, py - 10.0);
        assert!(s.advance(16.0));
        assert!(!s.state().running);
        assert!(s.is_crashed());
        assert!(!s.is_paused());
    }

    #[test]
    fn touching_edges_do_not_crash() {
        let mut s = session();
        // After moving by speed 4 the vertical gap is exactly (80 + 60) / 2
        let py = s.tuning().player_y();
        s.place_obstacle(1, py - 70.0 - 4.0);
        assert!(!s.advance(16.0));
        assert!(s.state().running);
    }

    #[test]
    fn neighbouring_lane_does_not_crash() {
        let mut s = session();
        let py = s.tuning().player_y();
        s.place_obstacle(0, py);
        s.place_obstacle(2, py);
        assert!(!s.advance(16.0));
    }

    #[test]
    fn advance_is_ignored_while_stopped() {
        let mut s = session();
        s.toggle_pause();
        let before = *s.state();
        assert!(!s.advance(16.0));
        assert_eq!(*s.state(), before);
    }

    #[test]
    fn steering_is_clamped_at_the_edges() {
        let mut s = session();
        s.steer(Steer::Left);
        assert_eq!(s.state().player_lane, 0);
        s.steer(Steer::Left);
        assert_eq!(s.state().player_lane, 0);
        s.steer(Steer::Right);
        s.steer(Steer::Right);
        s.steer(Steer::Right);
        assert_eq!(s.state().player_lane, 2);
    }

    #[test]
    fn braking_halves_to_floor_and_release_steps_to_ceiling() {
        let mut s = session();
        s.set_braking(true);
        assert_eq!(s.state().speed, 2.0);
        s.set_braking(true);
        assert_eq!(s.state().speed, 2.0);
        s.set_braking(false);
        assert!((s.state().speed - 2.2).abs() < 1e-6);
        for _ in 0..100 {
            s.set_braking(false);
        }
        assert_eq!(s.state().speed, 14.0);
    }

    #[test]
    fn restart_twice_gives_identical_state() {
        let mut s = session();
        s.place_obstacle(1, s.tuning().player_y());
        s.advance(16.0);
        assert!(s.is_crashed());

        s.restart();
        let first = *s.state();
        s.restart();
        assert_eq!(*s.state(), first);
        assert_eq!(
            first,
            SimulationState { player_lane: 1, speed: 4.0, score: 0, running: true }
        );
        assert!(s.obstacles().is_empty());
        assert!(!s.is_crashed());
    }

    #[test]
    fn pause_does_not_clear_a_crash() {
        let mut s = session();
        assert_eq!(s.toggle_pause(), Some(true));
        assert!(s.is_paused());
        assert_eq!(s.toggle_pause(), Some(false));
        assert!(s.state().running);

        s.place_obstacle(1, s.tuning().player_y());
        s.advance(16.0);
        assert_eq!(s.toggle_pause(), None);
        assert!(s.is_crashed());
        assert!(!s.state().running);
    }

    #[test]
    fn same_seed_same_obstacle_lanes() {
        let mut a = session();
        let mut b = session();
        for _ in 0..200 {
            a.advance(50.0);
            b.advance(50.0);
        }
        let lanes_a: Vec<u32> = a.obstacles().iter().map(|o| o.lane).collect();
        let lanes_b: Vec<u32> = b.obstacles().iter().map(|o| o.lane).collect();
        assert_eq!(lanes_a, lanes_b);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Steer(Steer),
        Brake(bool),
        Advance(f32),
        Restart,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Steer(Steer::Left)),
            Just(Op::Steer(Steer::Right)),
            any::<bool>().prop_map(Op::Brake),
            (0.0f32..50.0).prop_map(Op::Advance),
            Just(Op::Restart),
        ]
    }

    proptest! {
        #[test]
        fn lane_and_speed_stay_in_bounds(ops in prop::collection::vec(op(), 0..300)) {
            let mut s = session();
            for op in ops {
                match op {
                    Op::Steer(d) => s.steer(d),
                    Op::Brake(b) => s.set_braking(b),
                    Op::Advance(dt) => { s.advance(dt); }
                    Op::Restart => s.restart(),
                }
                prop_assert!(s.state().player_lane < 3);
                prop_assert!(s.state().speed >= 2.0 && s.state().speed <= 14.0);
                let despawn_y = s.tuning().despawn_y();
                prop_assert!(s.obstacles().iter().all(|o| o.y < despawn_y));
            }
        }

        #[test]
        fn collision_ignores_obstacle_order(
            (placed, shuffled) in prop::collection::vec((0u32..3, 300.0f32..700.0), 0..8)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
            lane in 0u32..3,
        ) {
            let mut a = session();
            let mut b = session();
            a.state.player_lane = lane;
            b.state.player_lane = lane;
            for (l, y) in &placed {
                a.place_obstacle(*l, *y);
            }
            for (l, y) in &shuffled {
                b.place_obstacle(*l, *y);
            }
            prop_assert_eq!(a.collides(), b.collides());
        }
    }
}
