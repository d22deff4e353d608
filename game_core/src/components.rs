use std::fmt;

use glam::Vec2;
use rand::Rng;

use crate::field::{Aabb, Field};
use crate::params::Params;
use crate::resources::GameRng;
use crate::Config;

/// One of the two competing paddles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Side> {
        match index {
            0 => Some(Side::Left),
            1 => Some(Side::Right),
            _ => None,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// 1 for left, 2 for right
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Discrete paddle command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Action {
    #[default]
    Hold = 0,
    Up = 1,
    Down = 2,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Hold, Action::Up, Action::Down];

    /// Decode a controller's raw action, `None` when out of range
    pub fn from_raw(raw: u8) -> Option<Action> {
        match raw {
            0 => Some(Action::Hold),
            1 => Some(Action::Up),
            2 => Some(Action::Down),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_move(self) -> bool {
        self != Action::Hold
    }
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    /// Current target speed; `vel` is renormalized to it on every bounce
    pub speed: f32,
    /// Nominal speed the motion step is scaled against
    pub base_speed: f32,
    pub size: f32,
}

impl Ball {
    /// Stationary ball at the field center
    pub fn new(config: &Config) -> Self {
        Self {
            pos: Vec2::new(config.width / 2.0, config.height / 2.0),
            vel: Vec2::ZERO,
            speed: config.ball_speed,
            base_speed: config.ball_speed,
            size: config.ball_size(),
        }
    }

    /// Re-derive size and nominal speed after a config change
    pub fn apply_config(&mut self, config: &Config) {
        self.size = config.ball_size();
        self.base_speed = config.ball_speed;
    }

    /// Center the ball and launch it at a random angle within 45° of horizontal
    pub fn reset(&mut self, field: &Field, base_speed: f32, rng: &mut GameRng) {
        self.pos = field.center();
        self.base_speed = base_speed;
        self.speed = base_speed;
        self.vel = launch_velocity(base_speed, rng);
    }

    /// Integrate one tick; the step scales with current speed over nominal speed
    pub fn advance(&mut self) {
        self.pos += self.vel * (self.speed / self.base_speed);
    }

    /// Reflect horizontally, jitter vertically, renormalize to `speed`
    pub fn bounce(&mut self, rng: &mut GameRng) {
        let jitter = rng.0.gen_range(-Params::BOUNCE_JITTER..=Params::BOUNCE_JITTER) * self.speed;
        let raw = Vec2::new(-self.vel.x, self.vel.y + jitter);

        let dir = if raw.length_squared() > Params::BOUNCE_MIN_MAGNITUDE_SQ {
            raw / raw.length()
        } else {
            tracing::warn!(?raw, "degenerate ball velocity on bounce, falling back to horizontal");
            Vec2::new(raw.x.signum(), 0.0)
        };

        self.vel = dir * self.speed;
    }

    /// Whether the ball has left the field past either side
    pub fn is_out(&self, field: &Field) -> bool {
        self.pos.x < 0.0 || self.pos.x > field.width
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.pos, Vec2::splat(self.size))
    }
}

/// Draw a launch velocity, redrawing while either component is near zero
fn launch_velocity(speed: f32, rng: &mut GameRng) -> Vec2 {
    let max = Params::LAUNCH_ANGLE_MAX;
    for _ in 0..Params::LAUNCH_MAX_ATTEMPTS {
        let angle: f32 = rng.0.gen_range(-max..=max);
        let mut vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        if rng.0.gen_bool(0.5) {
            vel.x = -vel.x;
        }
        if vel.x.abs() >= Params::LAUNCH_MIN_COMPONENT && vel.y.abs() >= Params::LAUNCH_MIN_COMPONENT
        {
            return vel;
        }
    }

    tracing::warn!(speed, "launch retries exhausted, using fallback angle");
    let angle = Params::LAUNCH_FALLBACK_ANGLE;
    let x_dir = if rng.0.gen_bool(0.5) { -1.0 } else { 1.0 };
    Vec2::new(angle.cos() * x_dir, angle.sin()) * speed
}

/// A player's paddle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paddle {
    pub side: Side,
    /// Left edge
    pub x: f32,
    /// Top edge, clamped to `[0, field.height - height]`
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Distance covered per tick
    pub speed: f32,
}

impl Paddle {
    /// Vertically centered paddle for `side`
    pub fn new(side: Side, config: &Config) -> Self {
        Self {
            side,
            x: config.paddle_x(side),
            y: config.paddle_start_y(),
            width: config.paddle_width(),
            height: config.paddle_height(),
            speed: config.paddle_speed,
        }
    }

    /// Re-derive geometry after a config change, keeping the current height on the field
    pub fn apply_config(&mut self, config: &Config) {
        self.x = config.paddle_x(self.side);
        self.width = config.paddle_width();
        self.height = config.paddle_height();
        self.speed = config.paddle_speed;
        self.y = config.clamp_paddle_y(self.y);
    }

    pub fn apply_action(&mut self, action: Action, field: &Field) {
        let y = match action {
            Action::Hold => self.y,
            Action::Up => self.y - self.speed,
            Action::Down => self.y + self.speed,
        };
        self.y = y.clamp(0.0, field.height - self.height);
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_top_left(Vec2::new(self.x, self.y), Vec2::new(self.width, self.height))
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.center_y())
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn collides_with(&self, ball: &Ball) -> bool {
        self.aabb().intersects(&ball.aabb())
    }
}
