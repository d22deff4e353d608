use crate::{Ball, Field, Side};

/// Side that wins the point when the ball has left the field, if it has.
///
/// Exactly one side wins per exit: the ball past the left half scores for the
/// right side and vice versa.
pub fn check_scoring(ball: &Ball, field: &Field) -> Option<Side> {
    if !ball.is_out(field) {
        return None;
    }
    if ball.pos.x < field.width / 2.0 {
        Some(Side::Right)
    } else {
        Some(Side::Left)
    }
}
