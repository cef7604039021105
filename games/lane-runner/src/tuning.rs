use serde::{Deserialize, Serialize};

/// Gameplay constants. The defaults are the shipped balance; a JSON
/// document may override any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Number of lanes.
    pub lanes: u32,
    /// Logical canvas width.
    pub world_width: f32,
    /// Logical canvas height.
    pub world_height: f32,
    /// Largest frame delta fed to the simulation (ms).
    pub max_frame_ms: f32,
    /// Lane the player starts in.
    pub initial_lane: u32,
    pub initial_speed: f32,
    /// Floor for braking.
    pub min_speed: f32,
    pub max_speed: f32,
    /// Speed gained per millisecond of play.
    pub acceleration_per_ms: f32,
    /// Speed multiplier applied each frame the brake is held.
    pub brake_factor: f32,
    /// Speed added each frame the brake is released.
    pub release_step: f32,
    /// Spawn interval at score 0 (ms).
    pub spawn_base_ms: f32,
    /// Shortest spawn interval (ms).
    pub spawn_floor_ms: f32,
    /// Spawn interval reduction per point of score (ms).
    pub spawn_ms_per_point: f32,
    pub obstacle_height: f32,
    /// Obstacle width as a fraction of the lane width.
    pub obstacle_width_ratio: f32,
    /// Vertical centre of a freshly spawned obstacle.
    pub obstacle_spawn_y: f32,
    /// Distance below the canvas at which obstacles are dropped.
    pub despawn_margin: f32,
    /// Distance from the bottom edge to the player's centre.
    pub player_offset_y: f32,
    pub player_height: f32,
    /// Player width as a fraction of the lane width.
    pub player_width_ratio: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lanes: 3,
            world_width: 360.0,
            world_height: 640.0,
            max_frame_ms: 50.0,
            initial_lane: 1,
            initial_speed: 4.0,
            min_speed: 2.0,
            max_speed: 14.0,
            acceleration_per_ms: 0.002,
            brake_factor: 0.5,
            release_step: 0.2,
            spawn_base_ms: 1200.0,
            spawn_floor_ms: 350.0,
            spawn_ms_per_point: 2.0,
            obstacle_height: 60.0,
            obstacle_width_ratio: 0.6,
            obstacle_spawn_y: -60.0,
            despawn_margin: 100.0,
            player_offset_y: 120.0,
            player_height: 80.0,
            player_width_ratio: 0.55,
        }
    }
}

impl Tuning {
    /// Parse a tuning document. Missing fields keep their defaults;
    /// inconsistent values are repaired (see `normalized`).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.normalized())
    }

    /// Repair values that would break the lane and speed invariants.
    pub fn normalized(mut self) -> Self {
        if self.lanes == 0 {
            log::warn!("tuning: lanes must be at least 1, using 1");
            self.lanes = 1;
        }
        if self.initial_lane >= self.lanes {
            log::warn!(
                "tuning: initial lane {} outside 0..{}, using the middle lane",
                self.initial_lane,
                self.lanes
            );
            self.initial_lane = self.lanes / 2;
        }
        if self.min_speed > self.max_speed {
            log::warn!("tuning: min_speed above max_speed, swapping");
            std::mem::swap(&mut self.min_speed, &mut self.max_speed);
        }
        self.initial_speed = self.initial_speed.clamp(self.min_speed, self.max_speed);
        self.acceleration_per_ms = self.acceleration_per_ms.max(0.0);
        self.release_step = self.release_step.max(0.0);
        self.brake_factor = self.brake_factor.clamp(0.0, 1.0);
        self.spawn_floor_ms = self.spawn_floor_ms.max(0.0);
        self.max_frame_ms = self.max_frame_ms.max(0.0);
        self
    }

    pub fn lane_width(&self) -> f32 {
        self.world_width / self.lanes as f32
    }

    /// Horizontal centre of a lane.
    pub fn lane_center_x(&self, lane: u32) -> f32 {
        let w = self.lane_width();
        lane as f32 * w + w / 2.0
    }

    /// Vertical centre of the player car (fixed screen depth).
    pub fn player_y(&self) -> f32 {
        self.world_height - self.player_offset_y
    }

    pub fn player_width(&self) -> f32 {
        self.lane_width() * self.player_width_ratio
    }

    pub fn obstacle_width(&self) -> f32 {
        self.lane_width() * self.obstacle_width_ratio
    }

    /// Obstacles at or beyond this y are removed.
    pub fn despawn_y(&self) -> f32 {
        self.world_height + self.despawn_margin
    }

    /// Time between spawns for a given score: shrinks linearly, never below
    /// the floor.
    pub fn spawn_threshold_ms(&self, score: u64) -> f32 {
        (self.spawn_base_ms - self.spawn_ms_per_point * score as f32).max(self.spawn_floor_ms)
    }
}
