//! Difficulty hysteresis and the per-hit speed ramp

use crate::params::Params;
use crate::{Ball, Config, Streaks};

/// Streak multiplier applied to the ball's speed on a hit, in `[1, max_speed_multiplier]`
pub fn speed_multiplier(consecutive_hits: u32, config: &Config) -> f32 {
    (1.0 + consecutive_hits as f32 * config.speed_increase_rate)
        .clamp(1.0, config.max_speed_multiplier)
}

/// Ramp the ball's speed after a hit; returns the multiplier used.
///
/// The result overwrites any difficulty scaling until the next difficulty update.
pub fn ramp_ball_speed(ball: &mut Ball, streaks: &Streaks, config: &Config) -> f32 {
    let multiplier = speed_multiplier(streaks.hits, config);
    ball.speed = config.ball_speed * multiplier;
    multiplier
}

/// One hysteresis step: up after a long enough hit streak, down after a long
/// enough miss streak, otherwise unchanged. Always within `[1, max_difficulty]`.
pub fn next_difficulty(difficulty: f32, hit_occurred: bool, streaks: &Streaks, config: &Config) -> f32 {
    let next = if hit_occurred && streaks.hits >= config.hit_streak_threshold {
        difficulty + config.difficulty_increase_rate
    } else if !hit_occurred && streaks.misses >= config.miss_streak_threshold {
        difficulty - config.difficulty_decrease_rate
    } else {
        difficulty
    };
    next.clamp(Params::MIN_DIFFICULTY, config.max_difficulty)
}

/// Apply the hysteresis step and rescale the ball to `ball_speed * difficulty`
pub fn update_difficulty(
    difficulty: &mut f32,
    ball: &mut Ball,
    hit_occurred: bool,
    streaks: &Streaks,
    config: &Config,
) {
    let next = next_difficulty(*difficulty, hit_occurred, streaks, config);
    if next != *difficulty {
        tracing::debug!(from = *difficulty, to = next, "difficulty changed");
    }
    *difficulty = next;
    ball.speed = config.ball_speed * next;
}
