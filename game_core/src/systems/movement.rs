use crate::{Action, Ball, Field, Paddle};

/// Apply each side's action to its paddle
pub fn move_paddles(paddles: &mut [Paddle; 2], actions: &[Action; 2], field: &Field) {
    for (paddle, action) in paddles.iter_mut().zip(actions) {
        paddle.apply_action(*action, field);
    }
}

/// Move ball based on velocity
pub fn move_ball(ball: &mut Ball) {
    ball.advance();
}
