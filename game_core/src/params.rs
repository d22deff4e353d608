/// Game tuning parameters for the paddle trainer
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Field
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    // Geometry, as fractions of the field (sizes are truncated to whole units)
    pub const BALL_SIZE_RATIO: f32 = 0.02; // of min(width, height)
    pub const PADDLE_WIDTH_RATIO: f32 = 0.02; // of width
    pub const PADDLE_HEIGHT_RATIO: f32 = 0.2; // of height

    // Speeds, in field units per tick
    pub const BALL_SPEED: f32 = 5.0;
    pub const PADDLE_SPEED: f32 = 5.0;

    // Ball launch
    pub const LAUNCH_ANGLE_MAX: f32 = std::f32::consts::FRAC_PI_4;
    pub const LAUNCH_MIN_COMPONENT: f32 = 0.1;
    pub const LAUNCH_MAX_ATTEMPTS: u32 = 64;
    pub const LAUNCH_FALLBACK_ANGLE: f32 = std::f32::consts::FRAC_PI_8;

    // Bounce
    pub const BOUNCE_JITTER: f32 = 0.1; // fraction of speed added to dy
    pub const BOUNCE_MIN_MAGNITUDE_SQ: f32 = 1e-6;

    // Difficulty hysteresis
    pub const MIN_DIFFICULTY: f32 = 1.0;
    pub const MAX_DIFFICULTY: f32 = 2.0;
    pub const DIFFICULTY_INCREASE_RATE: f32 = 0.001;
    pub const DIFFICULTY_DECREASE_RATE: f32 = 0.0005;
    pub const HIT_STREAK_THRESHOLD: u32 = 10;
    pub const MISS_STREAK_THRESHOLD: u32 = 5;

    // Speed ramp
    pub const SPEED_INCREASE_RATE: f32 = 0.1; // per consecutive hit
    pub const MAX_SPEED_MULTIPLIER: f32 = 2.0;

    // Reward shaping
    pub const REWARD_DISTANCE_WEIGHT: f32 = 0.05;
    pub const REWARD_JITTER_PENALTY: f32 = 0.02;
    pub const REWARD_CENTERING_WEIGHT: f32 = 0.05;
    pub const REWARD_OUT_OF_PLAY_PENALTY: f32 = 0.05;
    pub const REWARD_ALIGNMENT: f32 = 0.05;
    pub const REWARD_ENERGY_WEIGHT: f32 = 0.05;
    pub const REWARD_DEFENSIVE_WEIGHT: f32 = 0.05;
    pub const REWARD_HIT_BONUS: f32 = 0.5;
    pub const REWARD_SCORE: f32 = 2.0;
    /// Per-tick rewards at least this large are reported as events
    pub const REWARD_EVENT_THRESHOLD: f32 = 0.1;

    // Observation
    pub const OBSERVATION_LEN: usize = 11;
    pub const TICKS_SINCE_HIT_SCALE: f32 = 100.0;

    // Events
    pub const MAX_EVENTS: u32 = 32;
    pub const MAX_EVENTS_LIMIT: u32 = 4096;

    // Performance score weights
    pub const PERFORMANCE_SCORE_WEIGHT: f32 = 1.0;
    pub const PERFORMANCE_HITS_WEIGHT: f32 = 0.1;
}
