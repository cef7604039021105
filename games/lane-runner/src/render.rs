use glam::Vec2;
use lane_engine::{VectorColor, VectorState};

use crate::sim::GameSession;

const ROAD: u32 = 0x1a1a1a;
const CAR: u32 = 0x4ade80;
const OBSTACLE: u32 = 0xf43f5e;

const LANE_LINE_WIDTH: f32 = 4.0;
const LANE_DASH: f32 = 20.0;
const LANE_GAP: f32 = 16.0;

const CAR_RADIUS: f32 = 12.0;
const OBSTACLE_RADIUS: f32 = 10.0;

// Windshield, relative to the lane width and the car centre
const WINDSHIELD_WIDTH_RATIO: f32 = 0.40;
const WINDSHIELD_TOP: f32 = -20.0;
const WINDSHIELD_HEIGHT: f32 = 28.0;
const WINDSHIELD_RADIUS: f32 = 8.0;

const OVERLAY_ALPHA: f32 = 0.55;

/// Draw the whole scene, back to front. Reads the session only.
pub fn draw_scene(session: &GameSession, vectors: &mut VectorState) {
    draw_road(session, vectors);
    draw_obstacles(session, vectors);
    draw_player(session, vectors);
    if !session.state().running {
        draw_overlay(session, vectors);
    }
}

fn draw_road(session: &GameSession, vectors: &mut VectorState) {
    let t = session.tuning();
    vectors.fill_rect(Vec2::ZERO, t.world_width, t.world_height, VectorColor::hex(ROAD));

    let line = VectorColor::WHITE.with_alpha(0.25);
    for i in 1..t.lanes {
        let x = i as f32 * t.lane_width();
        vectors.stroke_dashed_line(
            Vec2::new(x, 0.0),
            Vec2::new(x, t.world_height),
            LANE_DASH,
            LANE_GAP,
            LANE_LINE_WIDTH,
            line,
        );
    }
}

fn draw_obstacles(session: &GameSession, vectors: &mut VectorState) {
    let color = VectorColor::hex(OBSTACLE);
    for obstacle in session.obstacles() {
        let hitbox = session.obstacle_box(obstacle);
        vectors.fill_rounded_rect(
            hitbox.center - hitbox.size / 2.0,
            hitbox.size,
            OBSTACLE_RADIUS,
            color,
        );
    }
}

fn draw_player(session: &GameSession, vectors: &mut VectorState) {
    let car = session.player_box();
    vectors.fill_rounded_rect(car.center - car.size / 2.0, car.size, CAR_RADIUS, VectorColor::hex(CAR));

    let width = session.tuning().lane_width() * WINDSHIELD_WIDTH_RATIO;
    vectors.fill_rounded_rect(
        car.center + Vec2::new(-width / 2.0, WINDSHIELD_TOP),
        Vec2::new(width, WINDSHIELD_HEIGHT),
        WINDSHIELD_RADIUS,
        VectorColor::WHITE.with_alpha(0.4),
    );
}

/// Dim the scene while stopped; the UI layer draws the prompt text.
fn draw_overlay(session: &GameSession, vectors: &mut VectorState) {
    let t = session.tuning();
    vectors.fill_rect(
        Vec2::ZERO,
        t.world_width,
        t.world_height,
        VectorColor::BLACK.with_alpha(OVERLAY_ALPHA),
    );
}
