use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::Side;

/// Game score tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub left: u32,  // Left side score
    pub right: u32, // Right side score
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, side: Side) {
        match side {
            Side::Left => self.left += 1,
            Side::Right => self.right += 1,
        }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Random number generator
#[derive(Debug, Clone)]
pub struct GameRng(pub ChaCha8Rng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub(crate) fn to_state(&self) -> proto::RngState {
        proto::RngState {
            seed: self.0.get_seed(),
            stream: self.0.get_stream(),
            word_pos: self.0.get_word_pos(),
        }
    }

    pub(crate) fn from_state(state: &proto::RngState) -> Self {
        let mut rng = ChaCha8Rng::from_seed(state.seed);
        rng.set_stream(state.stream);
        rng.set_word_pos(state.word_pos);
        Self(rng)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Consecutive hit/miss counters driving the difficulty hysteresis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streaks {
    /// Ticks in a row with a paddle hit
    pub hits: u32,
    /// Ticks in a row without a paddle hit
    pub misses: u32,
}

impl Streaks {
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.misses = 0;
    }

    pub fn record_miss(&mut self) {
        self.hits = 0;
        self.misses += 1;
    }
}

/// Something worth showing the player that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Hit(Side),
    Scored(Side),
    WallBounce,
    Reward { side: Side, amount: f32 },
    /// Controller returned an out-of-range action (or none); held instead
    InvalidAction { side: Side, raw: Option<u8> },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::Hit(side) => write!(f, "Side {} hit the ball", side.number()),
            GameEvent::Scored(side) => write!(f, "Side {} scores!", side.number()),
            GameEvent::WallBounce => write!(f, "Ball bounced off a wall"),
            GameEvent::Reward { side, amount } => {
                write!(f, "Side {} reward: {:.2}", side.number(), amount)
            }
            GameEvent::InvalidAction { side, raw: Some(raw) } => write!(
                f,
                "Side {} returned invalid action {}, holding",
                side.number(),
                raw
            ),
            GameEvent::InvalidAction { side, raw: None } => {
                write!(f, "Side {} returned no action, holding", side.number())
            }
        }
    }
}

/// Events that occurred during this tick, capped at `capacity`
#[derive(Debug, Clone)]
pub struct Events {
    items: Vec<GameEvent>,
    capacity: usize,
    dropped: usize,
}

impl Events {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            dropped: 0,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.dropped = 0;
    }

    pub fn push(&mut self, event: GameEvent) {
        if self.items.len() < self.capacity {
            self.items.push(event);
        } else {
            self.dropped += 1;
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.items.truncate(capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Events discarded this tick because the list was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn contains(&self, event: &GameEvent) -> bool {
        self.items.contains(event)
    }

    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(ToString::to_string).collect()
    }
}

impl Default for Events {
    fn default() -> Self {
        Self::new(crate::Params::MAX_EVENTS as usize)
    }
}
