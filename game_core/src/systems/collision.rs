use crate::{Ball, Events, Field, GameEvent, GameRng, Paddle, Side};

/// Reverse vertical velocity when the ball reaches the top or bottom edge.
///
/// The position is not clamped, so the ball may sit past the edge for a tick.
pub fn bounce_off_walls(ball: &mut Ball, field: &Field, events: &mut Events) -> bool {
    if ball.pos.y <= 0.0 || ball.pos.y >= field.height {
        ball.vel.y = -ball.vel.y;
        events.push(GameEvent::WallBounce);
        return true;
    }
    false
}

/// Bounce the ball off the first paddle it overlaps; left is checked first and
/// at most one hit is resolved per tick
pub fn resolve_paddle_hit(ball: &mut Ball, paddles: &[Paddle; 2], rng: &mut GameRng) -> Option<Side> {
    let hit = paddles
        .iter()
        .find(|paddle| paddle.collides_with(ball))
        .map(|paddle| paddle.side)?;
    ball.bounce(rng);
    Some(hit)
}

/// Whether either paddle currently overlaps the ball
pub fn any_paddle_overlaps(ball: &Ball, paddles: &[Paddle; 2]) -> bool {
    paddles.iter().any(|paddle| paddle.collides_with(ball))
}
