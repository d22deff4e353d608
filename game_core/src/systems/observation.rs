use glam::Vec2;

use crate::controller::Observation;
use crate::params::Params;
use crate::{Ball, Field, Paddle, Side};

/// Linear extrapolation of the ball to `target_x`, ignoring walls
pub fn predict_ball_position(ball: &Ball, target_x: f32) -> Vec2 {
    if ball.vel.x == 0.0 {
        return ball.pos;
    }
    let time_to_reach = (target_x - ball.pos.x) / ball.vel.x;
    ball.pos + ball.vel * time_to_reach
}

/// Everything besides the paddles that goes into an observation
#[derive(Debug, Clone, Copy)]
pub struct ObservationContext<'a> {
    pub ball: &'a Ball,
    pub field: &'a Field,
    /// Extrapolation target; always the left paddle's x, for both sides
    pub prediction_x: f32,
    pub ticks_since_last_hit: u32,
    pub difficulty: f32,
    pub last_hit: Option<Side>,
}

/// Build the normalized state vector for the paddle `own`
pub fn build_observation(own: &Paddle, opponent: &Paddle, ctx: &ObservationContext) -> Observation {
    let ball = ctx.ball;
    let field = ctx.field;
    let predicted = predict_ball_position(ball, ctx.prediction_x);
    let own_last_hit = if ctx.last_hit == Some(own.side) { 1.0 } else { 0.0 };

    [
        own.y / field.height,
        opponent.y / field.height,
        ball.pos.x / field.width,
        ball.pos.y / field.height,
        ball.vel.x / field.width,
        ball.vel.y / field.height,
        predicted.x / field.width,
        predicted.y / field.height,
        ctx.ticks_since_last_hit as f32 / Params::TICKS_SINCE_HIT_SCALE,
        ctx.difficulty,
        own_last_hit,
    ]
}
