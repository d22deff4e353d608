use crate::error::ConfigError;
use crate::params::Params;
use crate::Side;

/// Game configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub width: f32,
    pub height: f32,
    pub ball_speed: f32,
    pub paddle_speed: f32,
    pub max_difficulty: f32,
    pub difficulty_increase_rate: f32,
    pub difficulty_decrease_rate: f32,
    pub hit_streak_threshold: u32,
    pub miss_streak_threshold: u32,
    pub speed_increase_rate: f32,
    pub max_speed_multiplier: f32,
    pub max_events: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: Params::FIELD_WIDTH,
            height: Params::FIELD_HEIGHT,
            ball_speed: Params::BALL_SPEED,
            paddle_speed: Params::PADDLE_SPEED,
            max_difficulty: Params::MAX_DIFFICULTY,
            difficulty_increase_rate: Params::DIFFICULTY_INCREASE_RATE,
            difficulty_decrease_rate: Params::DIFFICULTY_DECREASE_RATE,
            hit_streak_threshold: Params::HIT_STREAK_THRESHOLD,
            miss_streak_threshold: Params::MISS_STREAK_THRESHOLD,
            speed_increase_rate: Params::SPEED_INCREASE_RATE,
            max_speed_multiplier: Params::MAX_SPEED_MULTIPLIER,
            max_events: Params::MAX_EVENTS,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every tunable before it reaches the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("ball_speed", self.ball_speed)?;
        positive("paddle_speed", self.paddle_speed)?;
        non_negative("difficulty_increase_rate", self.difficulty_increase_rate)?;
        non_negative("difficulty_decrease_rate", self.difficulty_decrease_rate)?;
        non_negative("speed_increase_rate", self.speed_increase_rate)?;

        if !self.max_difficulty.is_finite() || self.max_difficulty < Params::MIN_DIFFICULTY {
            return Err(ConfigError::OutOfRange {
                field: "max_difficulty",
                value: self.max_difficulty,
            });
        }
        if !self.max_speed_multiplier.is_finite() || self.max_speed_multiplier < 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "max_speed_multiplier",
                value: self.max_speed_multiplier,
            });
        }
        if !(1..=Params::MAX_EVENTS_LIMIT).contains(&self.max_events) {
            return Err(ConfigError::OutOfRange {
                field: "max_events",
                value: self.max_events as f32,
            });
        }
        // Sizes truncate to whole units; a field too small for a paddle is useless
        if self.paddle_width() < 1.0 || self.paddle_height() < 1.0 || self.ball_size() < 1.0 {
            return Err(ConfigError::FieldTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn ball_size(&self) -> f32 {
        (self.width.min(self.height) * Params::BALL_SIZE_RATIO).floor()
    }

    pub fn paddle_width(&self) -> f32 {
        (self.width * Params::PADDLE_WIDTH_RATIO).floor()
    }

    pub fn paddle_height(&self) -> f32 {
        (self.height * Params::PADDLE_HEIGHT_RATIO).floor()
    }

    /// Get left edge X position for a side's paddle
    pub fn paddle_x(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.paddle_width(),
            Side::Right => self.width - self.paddle_width() * 2.0,
        }
    }

    /// Clamp a paddle's top edge to the field
    pub fn clamp_paddle_y(&self, y: f32) -> f32 {
        y.clamp(0.0, self.height - self.paddle_height())
    }

    /// Top edge of a vertically centered paddle
    pub fn paddle_start_y(&self) -> f32 {
        (self.height - self.paddle_height()) / 2.0
    }

    pub(crate) fn to_settings(&self) -> proto::SettingsState {
        proto::SettingsState {
            width: self.width,
            height: self.height,
            ball_speed: self.ball_speed,
            paddle_speed: self.paddle_speed,
            max_difficulty: self.max_difficulty,
            difficulty_increase_rate: self.difficulty_increase_rate,
            difficulty_decrease_rate: self.difficulty_decrease_rate,
            hit_streak_threshold: self.hit_streak_threshold,
            miss_streak_threshold: self.miss_streak_threshold,
            speed_increase_rate: self.speed_increase_rate,
            max_speed_multiplier: self.max_speed_multiplier,
            max_events: self.max_events,
        }
    }

    pub(crate) fn from_settings(settings: &proto::SettingsState) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            ball_speed: settings.ball_speed,
            paddle_speed: settings.paddle_speed,
            max_difficulty: settings.max_difficulty,
            difficulty_increase_rate: settings.difficulty_increase_rate,
            difficulty_decrease_rate: settings.difficulty_decrease_rate,
            hit_streak_threshold: settings.hit_streak_threshold,
            miss_streak_threshold: settings.miss_streak_threshold,
            speed_increase_rate: settings.speed_increase_rate,
            max_speed_multiplier: settings.max_speed_multiplier,
            max_events: settings.max_events,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}
