//! Per-side reward shaping
//!
//! Each tick a side earns the sum of eight shaping terms computed from the
//! post-motion, pre-collision state. Hit and score bonuses are added by the
//! tick itself, not here. Terms are unbounded and never clipped.

use std::ops::AddAssign;

use crate::params::Params;
use crate::systems::observation::predict_ball_position;
use crate::{Action, Ball, Field, Paddle};

/// The shaping terms of one reward, kept apart for inspection
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardTerms {
    /// Closing in on the ball since last tick
    pub distance: f32,
    /// Moving while already level with the ball
    pub jitter: f32,
    /// Staying near the midline while the ball is far away
    pub centering: f32,
    /// Paddle box leaving the field vertically
    pub out_of_play: f32,
    /// Paddle center above/below the ball
    pub alignment: f32,
    /// Paddle center above/below the extrapolated ball
    pub prediction: f32,
    /// Second distance-closing term
    pub energy: f32,
    /// Always-on midline term
    pub defensive: f32,
}

impl RewardTerms {
    pub fn total(&self) -> f32 {
        self.to_array().iter().sum()
    }

    /// Distance-closing part: `distance + energy`
    pub fn closing(&self) -> f32 {
        self.distance + self.energy
    }

    pub fn to_array(&self) -> [f32; 8] {
        [
            self.distance,
            self.jitter,
            self.centering,
            self.out_of_play,
            self.alignment,
            self.prediction,
            self.energy,
            self.defensive,
        ]
    }

    pub fn from_array(terms: [f32; 8]) -> Self {
        let [distance, jitter, centering, out_of_play, alignment, prediction, energy, defensive] =
            terms;
        Self {
            distance,
            jitter,
            centering,
            out_of_play,
            alignment,
            prediction,
            energy,
            defensive,
        }
    }
}

impl AddAssign for RewardTerms {
    fn add_assign(&mut self, rhs: Self) {
        let mut terms = self.to_array();
        for (term, add) in terms.iter_mut().zip(rhs.to_array()) {
            *term += add;
        }
        *self = Self::from_array(terms);
    }
}

/// Running reward bookkeeping for one side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardLedger {
    /// Sum of every reward delivered, bonuses included
    pub total: f32,
    /// Cumulative shaping terms, bonuses excluded
    pub terms: RewardTerms,
    /// Paddle-to-ball distance at the end of the previous tick
    pub last_distance: f32,
}

/// Euclidean distance from the paddle center to the ball center
pub fn paddle_ball_distance(paddle: &Paddle, ball: &Ball) -> f32 {
    paddle.center().distance(ball.pos)
}

/// +weight when `center_y` is above `target_y`, -weight when below
fn above_or_below(center_y: f32, target_y: f32) -> f32 {
    if center_y < target_y {
        Params::REWARD_ALIGNMENT
    } else if center_y > target_y {
        -Params::REWARD_ALIGNMENT
    } else {
        0.0
    }
}

/// Compute every shaping term for one side.
///
/// `prediction_x` is where the ball is extrapolated to for the predictive
/// term. The tick passes the left paddle's x for both sides, so for the right
/// side this term scores alignment with where the ball will cross the left
/// paddle, not its own.
pub fn shape_reward(
    paddle: &Paddle,
    action: Action,
    ball: &Ball,
    field: &Field,
    prediction_x: f32,
    last_distance: f32,
) -> RewardTerms {
    let current_distance = paddle_ball_distance(paddle, ball);
    let center_y = paddle.center_y();
    let half_height = field.height / 2.0;
    let midline_factor = 1.0 - (center_y - field.mid_y()).abs() / half_height;

    let distance = (last_distance - current_distance) * Params::REWARD_DISTANCE_WEIGHT;

    let jitter = if action.is_move() && (center_y - ball.pos.y).abs() < paddle.height / 4.0 {
        -Params::REWARD_JITTER_PENALTY
    } else {
        0.0
    };

    let centering = if (ball.pos.x - paddle.x).abs() > field.width / 2.0 {
        midline_factor * Params::REWARD_CENTERING_WEIGHT
    } else {
        0.0
    };

    let out_of_play = if field.contains_vertically(&paddle.aabb()) {
        0.0
    } else {
        -Params::REWARD_OUT_OF_PLAY_PENALTY
    };

    let alignment = above_or_below(center_y, ball.pos.y);

    let predicted_y = predict_ball_position(ball, prediction_x).y;
    let prediction = above_or_below(center_y, predicted_y);

    let energy = (last_distance - current_distance) * Params::REWARD_ENERGY_WEIGHT;

    let defensive = midline_factor * Params::REWARD_DEFENSIVE_WEIGHT;

    RewardTerms {
        distance,
        jitter,
        centering,
        out_of_play,
        alignment,
        prediction,
        energy,
        defensive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, Side};
    use glam::Vec2;

    fn setup() -> (Field, Ball, Paddle, Paddle) {
        let config = Config::new();
        let field = Field::new(config.width, config.height);
        let ball = Ball::new(&config);
        let left = Paddle::new(Side::Left, &config);
        let right = Paddle::new(Side::Right, &config);
        (field, ball, left, right)
    }

    #[test]
    fn test_distance_terms_reward_closing_in() {
        let (field, mut ball, left, _right) = setup();
        ball.pos = Vec2::new(200.0, 300.0);
        ball.vel = Vec2::new(-5.0, 0.0);
        let current = paddle_ball_distance(&left, &ball);

        let terms = shape_reward(&left, Action::Hold, &ball, &field, left.x, current + 10.0);

        assert!((terms.distance - 0.5).abs() < 1e-4);
        assert_eq!(terms.energy, terms.distance, "Energy term duplicates the distance term");
        assert!((terms.closing() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_jitter_penalty_only_when_moving_near_alignment() {
        let (field, mut ball, left, _right) = setup();
        ball.pos = Vec2::new(200.0, left.center_y() + 10.0);
        let last = paddle_ball_distance(&left, &ball);

        let moving = shape_reward(&left, Action::Up, &ball, &field, left.x, last);
        let holding = shape_reward(&left, Action::Hold, &ball, &field, left.x, last);
        assert_eq!(moving.jitter, -Params::REWARD_JITTER_PENALTY);
        assert_eq!(holding.jitter, 0.0);

        ball.pos.y = left.center_y() + left.height;
        let far = shape_reward(&left, Action::Up, &ball, &field, left.x, last);
        assert_eq!(far.jitter, 0.0);
    }

    #[test]
    fn test_centering_only_when_ball_is_far() {
        let (field, mut ball, left, _right) = setup();
        ball.pos = Vec2::new(700.0, 300.0);
        let terms = shape_reward(&left, Action::Hold, &ball, &field, left.x, 0.0);
        // Paddle centered: full midline factor
        assert!((terms.centering - Params::REWARD_CENTERING_WEIGHT).abs() < 1e-6);

        ball.pos.x = 100.0;
        let near = shape_reward(&left, Action::Hold, &ball, &field, left.x, 0.0);
        assert_eq!(near.centering, 0.0);
    }

    #[test]
    fn test_defensive_term_is_unconditional() {
        let (field, mut ball, mut left, _right) = setup();
        ball.pos = Vec2::new(100.0, 300.0);
        let centered = shape_reward(&left, Action::Hold, &ball, &field, left.x, 0.0);
        assert!((centered.defensive - Params::REWARD_DEFENSIVE_WEIGHT).abs() < 1e-6);

        left.y = 0.0;
        let top = shape_reward(&left, Action::Hold, &ball, &field, left.x, 0.0);
        // center at 60 of 600: factor 1 - 240/300
        assert!((top.defensive - 0.2 * Params::REWARD_DEFENSIVE_WEIGHT).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_play_penalty() {
        let (field, ball, mut left, _right) = setup();
        let inside = shape_reward(&left, Action::Hold, &ball, &field, left.x, 0.0);
        assert_eq!(inside.out_of_play, 0.0);

        left.y = -1.0;
        let outside = shape_reward(&left, Action::Hold, &ball, &field, left.x, 0.0);
        assert_eq!(outside.out_of_play, -Params::REWARD_OUT_OF_PLAY_PENALTY);
    }

    #[test]
    fn test_alignment_sign() {
        let (field, mut ball, left, _right) = setup();
        ball.pos = Vec2::new(400.0, left.center_y() + 50.0);
        let above = shape_reward(&left, Action::Hold, &ball, &field, left.x, 0.0);
        assert_eq!(above.alignment, Params::REWARD_ALIGNMENT);

        ball.pos.y = left.center_y() - 50.0;
        let below = shape_reward(&left, Action::Hold, &ball, &field, left.x, 0.0);
        assert_eq!(below.alignment, -Params::REWARD_ALIGNMENT);

        ball.pos.y = left.center_y();
        let level = shape_reward(&left, Action::Hold, &ball, &field, left.x, 0.0);
        assert_eq!(level.alignment, 0.0);
    }

    #[test]
    fn test_prediction_term_uses_left_paddle_for_right_side() {
        let (field, mut ball, left, right) = setup();
        // Ball above the right paddle's center (300), heading right and down
        ball.pos = Vec2::new(400.0, 250.0);
        ball.vel = Vec2::new(4.0, 2.0);

        // Extrapolated back to the left paddle: y = 250 - 2 * 96 = 58, above the paddle
        let quirk = shape_reward(&right, Action::Hold, &ball, &field, left.x, 0.0);
        // Extrapolated to its own x: y = 250 + 2 * 92 = 434, below the paddle
        let own_side = shape_reward(&right, Action::Hold, &ball, &field, right.x, 0.0);

        assert_eq!(quirk.prediction, -Params::REWARD_ALIGNMENT);
        assert_eq!(own_side.prediction, Params::REWARD_ALIGNMENT);
    }

    #[test]
    fn test_total_sums_terms() {
        let terms = RewardTerms::from_array([0.1, -0.02, 0.05, 0.0, 0.05, -0.05, 0.1, 0.04]);
        assert!((terms.total() - 0.27).abs() < 1e-6);

        let mut ledger = RewardTerms::default();
        ledger += terms;
        ledger += terms;
        assert!((ledger.total() - 0.54).abs() < 1e-6);
    }
}
