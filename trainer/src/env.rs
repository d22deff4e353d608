use std::time::Instant;

/// Clock the session reads; swapped for a fake in tests
pub trait Environment {
    /// Milliseconds since an arbitrary fixed point
    fn now(&self) -> u64;
}

/// Wall clock measured from construction
pub struct SystemEnv {
    start: Instant,
}

impl SystemEnv {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
