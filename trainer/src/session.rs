//! Training session: a simulation plus autosave, self-play and reporting

use std::fmt;
use std::path::PathBuf;

use game_core::{Config, ControllerRegistry, Score, Side, Simulation};

use crate::env::Environment;
use crate::saves::SaveStore;
use crate::TrainerError;

/// Schedule knobs for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingOptions {
    /// Ticks between self-play parameter copies
    pub self_play_interval: u64,
    /// Wall-clock milliseconds between autosaves
    pub autosave_interval_ms: u64,
    /// Ticks between console summaries
    pub summary_interval: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            self_play_interval: 1_000,
            autosave_interval_ms: 300_000,
            summary_interval: 60,
        }
    }
}

pub struct TrainingSession {
    env: Box<dyn Environment>,
    sim: Simulation,
    store: SaveStore,
    options: TrainingOptions,
    /// Number the next save will get
    generation: u32,
    last_autosave_ms: u64,
    ticks_since_sync: u64,
    pending_events: Vec<String>,
}

impl TrainingSession {
    /// Start fresh: every previous save in the store is deleted
    pub fn new(
        sim: Simulation,
        store: SaveStore,
        env: Box<dyn Environment>,
        options: TrainingOptions,
    ) -> Result<Self, TrainerError> {
        let removed = store.delete_all()?;
        tracing::info!(removed, dir = %store.dir().display(), "new session, previous saves deleted");
        Ok(Self::with_generation(sim, store, env, options, 1))
    }

    /// Continue from the latest save, or `None` when the store is empty
    pub fn resume(
        store: SaveStore,
        registry: &ControllerRegistry,
        env: Box<dyn Environment>,
        options: TrainingOptions,
    ) -> Result<Option<Self>, TrainerError> {
        let Some(latest) = store.latest()? else {
            return Ok(None);
        };
        let next = next_generation(latest)?;
        let bytes = store.read(latest)?;
        let sim = Simulation::from_bytes(&bytes, registry)?;
        tracing::info!(generation = latest, tick = sim.ticks(), "resumed from save");
        Ok(Some(Self::with_generation(sim, store, env, options, next)))
    }

    fn with_generation(
        sim: Simulation,
        store: SaveStore,
        env: Box<dyn Environment>,
        options: TrainingOptions,
        generation: u32,
    ) -> Self {
        let now = env.now();
        Self {
            env,
            sim,
            store,
            options,
            generation,
            last_autosave_ms: now,
            ticks_since_sync: 0,
            pending_events: Vec::new(),
        }
    }

    /// Advance one tick and run whatever is due
    pub fn step(&mut self) -> Result<(), TrainerError> {
        self.sim.tick();
        self.pending_events.extend(self.sim.events().messages());

        if self.options.summary_interval > 0 && self.sim.ticks() % self.options.summary_interval == 0 {
            self.report();
        }

        self.ticks_since_sync += 1;
        if self.ticks_since_sync >= self.options.self_play_interval {
            self.ticks_since_sync = 0;
            if let Err(err) = self.sim.sync_self_play() {
                tracing::warn!(error = %err, "self-play sync skipped");
            }
        }

        let now = self.env.now();
        if now.saturating_sub(self.last_autosave_ms) >= self.options.autosave_interval_ms {
            let path = self.save()?;
            tracing::info!(path = %path.display(), "autosaved");
            self.last_autosave_ms = now;
        }
        Ok(())
    }

    /// Swap tunables mid-session
    pub fn apply_config(&mut self, config: Config) -> Result<(), TrainerError> {
        self.sim.apply_config(config)?;
        Ok(())
    }

    pub fn run(&mut self, ticks: u64) -> Result<(), TrainerError> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Write the next generation
    pub fn save(&mut self) -> Result<PathBuf, TrainerError> {
        let next = next_generation(self.generation)?;
        let bytes = self.sim.to_bytes()?;
        let path = self.store.write(self.generation, &bytes)?;
        self.generation = next;
        Ok(path)
    }

    fn report(&mut self) {
        for event in self.pending_events.drain(..) {
            tracing::debug!("{event}");
        }
        tracing::info!(
            tick = self.sim.ticks(),
            reward_left = self.sim.total_reward(Side::Left),
            reward_right = self.sim.total_reward(Side::Right),
            difficulty = self.sim.difficulty(),
            "progress"
        );
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Events accumulated since the last summary
    pub fn pending_events(&self) -> &[String] {
        &self.pending_events
    }

    pub fn summary(&self) -> Summary {
        let sim = &self.sim;
        Summary {
            ticks: sim.ticks(),
            score: sim.score(),
            hits: [sim.hits(Side::Left), sim.hits(Side::Right)],
            rewards: [sim.total_reward(Side::Left), sim.total_reward(Side::Right)],
            difficulty: sim.difficulty(),
            performance_ratio: sim.performance_ratio(),
            learning_progress: sim.learning_progress(),
        }
    }
}

fn next_generation(generation: u32) -> Result<u32, TrainerError> {
    generation
        .checked_add(1)
        .ok_or(TrainerError::GenerationOverflow(generation))
}

/// End-of-run numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub ticks: u64,
    pub score: Score,
    pub hits: [u32; 2],
    pub rewards: [f32; 2],
    pub difficulty: f32,
    pub performance_ratio: f32,
    pub learning_progress: f32,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks:       {}", self.ticks)?;
        writeln!(f, "score:       {} - {}", self.score.left, self.score.right)?;
        writeln!(f, "hits:        {} - {}", self.hits[0], self.hits[1])?;
        writeln!(f, "reward:      {:.2} / {:.2}", self.rewards[0], self.rewards[1])?;
        writeln!(f, "difficulty:  {:.3}", self.difficulty)?;
        writeln!(f, "performance: {:.1}% left", self.performance_ratio * 100.0)?;
        write!(f, "progress:    {:.1}%", self.learning_progress * 100.0)
    }
}
