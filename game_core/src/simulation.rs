//! The two-paddle simulation
//!
//! [`Simulation`] owns every piece of session state and advances it one
//! deterministic tick at a time. A tick runs as a fixed sequence of phases
//! (action, motion, reward, collision, scoring, learning, difficulty), each a
//! method taking `&mut self`.

use crate::controller::{Controller, ControllerRegistry, Observation, Transition};
use crate::error::{ConfigError, ControllerError, SessionError};
use crate::params::Params;
use crate::systems::*;
use crate::{Action, Ball, Config, Events, Field, GameEvent, GameRng, Paddle, Score, Side, Streaks};

pub struct Simulation {
    config: Config,
    field: Field,
    ball: Ball,
    paddles: [Paddle; 2],
    controllers: [Box<dyn Controller>; 2],
    score: Score,
    rewards: [RewardLedger; 2],
    hits: [u32; 2],
    streaks: Streaks,
    difficulty: f32,
    last_hit: Option<Side>,
    ticks_since_last_hit: u32,
    last_speed_multiplier: f32,
    tick: u64,
    events: Events,
    rng: GameRng,
}

impl Simulation {
    /// Start a session with the ball launched from the center
    pub fn new(
        config: Config,
        seed: u64,
        left: Box<dyn Controller>,
        right: Box<dyn Controller>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let field = Field::new(config.width, config.height);
        let mut rng = GameRng::new(seed);
        let mut ball = Ball::new(&config);
        ball.reset(&field, config.ball_speed, &mut rng);
        let paddles = [
            Paddle::new(Side::Left, &config),
            Paddle::new(Side::Right, &config),
        ];
        let rewards = paddles.map(|paddle| RewardLedger {
            last_distance: paddle_ball_distance(&paddle, &ball),
            ..RewardLedger::default()
        });
        let events = Events::new(config.max_events as usize);

        tracing::info!(
            seed,
            left = left.kind(),
            right = right.kind(),
            width = config.width,
            height = config.height,
            "simulation created"
        );

        Ok(Self {
            config,
            field,
            ball,
            paddles,
            controllers: [left, right],
            score: Score::new(),
            rewards,
            hits: [0; 2],
            streaks: Streaks::default(),
            difficulty: Params::MIN_DIFFICULTY,
            last_hit: None,
            ticks_since_last_hit: 0,
            last_speed_multiplier: 1.0,
            tick: 0,
            events,
            rng,
        })
    }

    /// Advance one step
    pub fn tick(&mut self) {
        self.events.clear();

        let states = self.observations();
        let actions = self.action_phase(&states);
        self.motion_phase(&actions);
        let shaped = self.reward_phase(&actions);

        let mut bonus = [0.0f32; 2];
        let hit = self.collision_phase(&mut bonus);
        self.scoring_phase(&mut bonus);
        self.learning_phase(&states, &actions, &shaped, &bonus);
        self.difficulty_phase(hit.is_some());

        self.tick += 1;
    }

    fn action_phase(&mut self, states: &[Observation; 2]) -> [Action; 2] {
        let mut actions = [Action::Hold; 2];
        for side in Side::BOTH {
            let i = side.index();
            actions[i] = select_action(side, self.controllers[i].as_mut(), &states[i], &mut self.events);
        }
        actions
    }

    fn motion_phase(&mut self, actions: &[Action; 2]) {
        move_paddles(&mut self.paddles, actions, &self.field);
        move_ball(&mut self.ball);
        bounce_off_walls(&mut self.ball, &self.field, &mut self.events);
    }

    /// Shaping terms from the post-motion, pre-collision state
    fn reward_phase(&self, actions: &[Action; 2]) -> [RewardTerms; 2] {
        let prediction_x = self.paddles[Side::Left.index()].x;
        Side::BOTH.map(|side| {
            let i = side.index();
            shape_reward(
                &self.paddles[i],
                actions[i],
                &self.ball,
                &self.field,
                prediction_x,
                self.rewards[i].last_distance,
            )
        })
    }

    fn collision_phase(&mut self, bonus: &mut [f32; 2]) -> Option<Side> {
        let hit = resolve_paddle_hit(&mut self.ball, &self.paddles, &mut self.rng);
        match hit {
            Some(side) => {
                let i = side.index();
                self.streaks.record_hit();
                self.last_speed_multiplier =
                    ramp_ball_speed(&mut self.ball, &self.streaks, &self.config);
                bonus[i] += Params::REWARD_HIT_BONUS;
                self.last_hit = Some(side);
                self.hits[i] += 1;
                self.events.push(GameEvent::Hit(side));
                self.controllers[i].notify_rebound();
                tracing::debug!(%side, streak = self.streaks.hits, speed = self.ball.speed, "paddle hit");
            }
            None => self.streaks.record_miss(),
        }

        self.ticks_since_last_hit = self.ticks_since_last_hit.saturating_add(1);
        if any_paddle_overlaps(&self.ball, &self.paddles) {
            self.ticks_since_last_hit = 0;
        }
        hit
    }

    fn scoring_phase(&mut self, bonus: &mut [f32; 2]) {
        let Some(winner) = check_scoring(&self.ball, &self.field) else {
            return;
        };
        let loser = winner.opponent();

        self.score.increment(winner);
        bonus[winner.index()] += Params::REWARD_SCORE;
        bonus[loser.index()] -= Params::REWARD_SCORE;
        self.events.push(GameEvent::Scored(winner));
        self.controllers[loser.index()].reset_rebound_streak();
        self.ball.reset(&self.field, self.config.ball_speed, &mut self.rng);

        tracing::debug!(
            %winner,
            left = self.score.left,
            right = self.score.right,
            "point scored"
        );
    }

    fn learning_phase(
        &mut self,
        states: &[Observation; 2],
        actions: &[Action; 2],
        shaped: &[RewardTerms; 2],
        bonus: &[f32; 2],
    ) {
        let next_states = self.observations();

        for side in Side::BOTH {
            let i = side.index();
            let reward = shaped[i].total() + bonus[i];

            self.controllers[i].observe_transition(&Transition {
                state: states[i],
                action: actions[i].as_u8(),
                reward,
                next_state: next_states[i],
            });

            let ledger = &mut self.rewards[i];
            ledger.total += reward;
            ledger.terms += shaped[i];

            if reward.abs() >= Params::REWARD_EVENT_THRESHOLD {
                self.events.push(GameEvent::Reward { side, amount: reward });
            }
        }

        for (ledger, paddle) in self.rewards.iter_mut().zip(&self.paddles) {
            ledger.last_distance = paddle_ball_distance(paddle, &self.ball);
        }
    }

    fn difficulty_phase(&mut self, hit_occurred: bool) {
        update_difficulty(
            &mut self.difficulty,
            &mut self.ball,
            hit_occurred,
            &self.streaks,
            &self.config,
        );
    }

    fn observations(&self) -> [Observation; 2] {
        Side::BOTH.map(|side| self.observation(side))
    }

    /// Current state vector for `side`, as its controller would see it
    pub fn observation(&self, side: Side) -> Observation {
        let ctx = ObservationContext {
            ball: &self.ball,
            field: &self.field,
            prediction_x: self.paddles[Side::Left.index()].x,
            ticks_since_last_hit: self.ticks_since_last_hit,
            difficulty: self.difficulty,
            last_hit: self.last_hit,
        };
        build_observation(
            &self.paddles[side.index()],
            &self.paddles[side.opponent().index()],
            &ctx,
        )
    }

    /// Swap in new tunables without restarting the session
    pub fn apply_config(&mut self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;

        self.field = Field::new(config.width, config.height);
        self.ball.apply_config(&config);
        for paddle in &mut self.paddles {
            paddle.apply_config(&config);
        }
        self.events.set_capacity(config.max_events as usize);
        self.difficulty = self
            .difficulty
            .clamp(Params::MIN_DIFFICULTY, config.max_difficulty);
        self.last_speed_multiplier = self
            .last_speed_multiplier
            .clamp(1.0, config.max_speed_multiplier);
        self.config = config;

        tracing::info!(
            width = self.config.width,
            height = self.config.height,
            ball_speed = self.config.ball_speed,
            paddle_speed = self.config.paddle_speed,
            "config applied"
        );
        Ok(())
    }

    /// Copy the left controller's learned parameters into the right one.
    ///
    /// Returns `Ok(false)` when the left side has nothing to share.
    pub fn sync_self_play(&mut self) -> Result<bool, ControllerError> {
        let Some(params) = self.controllers[Side::Left.index()].parameters() else {
            return Ok(false);
        };
        self.controllers[Side::Right.index()].load_parameters(&params)?;
        tracing::info!(tick = self.tick, bytes = params.len(), "self-play parameters synced");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Read-only accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        &self.paddles[side.index()]
    }

    pub fn controller(&self, side: Side) -> &dyn Controller {
        self.controllers[side.index()].as_ref()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    /// Sum of every reward delivered to `side`, hit and score bonuses included
    pub fn total_reward(&self, side: Side) -> f32 {
        self.rewards[side.index()].total
    }

    /// Cumulative shaping terms for `side`
    pub fn reward_totals(&self, side: Side) -> RewardTerms {
        self.rewards[side.index()].terms
    }

    /// Events appended during the last tick
    pub fn events(&self) -> &Events {
        &self.events
    }

    pub fn hits(&self, side: Side) -> u32 {
        self.hits[side.index()]
    }

    pub fn streaks(&self) -> Streaks {
        self.streaks
    }

    /// Ticks advanced so far
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn ticks_since_last_hit(&self) -> u32 {
        self.ticks_since_last_hit
    }

    pub fn last_hit(&self) -> Option<Side> {
        self.last_hit
    }

    /// Speed multiplier applied on the most recent hit
    pub fn last_speed_multiplier(&self) -> f32 {
        self.last_speed_multiplier
    }

    pub fn performance_score(&self, side: Side) -> f32 {
        self.score.get(side) as f32 * Params::PERFORMANCE_SCORE_WEIGHT
            + self.hits(side) as f32 * Params::PERFORMANCE_HITS_WEIGHT
    }

    /// Left side's share of the combined performance score, 0.5 when both are zero
    pub fn performance_ratio(&self) -> f32 {
        let left = self.performance_score(Side::Left);
        let total = left + self.performance_score(Side::Right);
        if total > 0.0 {
            left / total
        } else {
            0.5
        }
    }

    /// Mean training progress of both controllers
    pub fn learning_progress(&self) -> f32 {
        self.controllers
            .iter()
            .map(|controller| controller.learning_progress())
            .sum::<f32>()
            / 2.0
    }

    /// Each controller's confidence, left first
    pub fn confidence(&self) -> [f32; 2] {
        [
            self.controllers[0].confidence(),
            self.controllers[1].confidence(),
        ]
    }

    /// Render-ready view of the current state
    pub fn frame(&self) -> proto::Frame {
        proto::Frame {
            tick: self.tick,
            field_width: self.field.width,
            field_height: self.field.height,
            left_paddle: self.paddles[0].aabb().to_box_state(),
            right_paddle: self.paddles[1].aabb().to_box_state(),
            ball: self.ball.aabb().to_box_state(),
            score_left: self.score.left,
            score_right: self.score.right,
            difficulty: self.difficulty,
            reward_left: self.rewards[0].total,
            reward_right: self.rewards[1].total,
            events: self.events.messages(),
        }
    }

    // ------------------------------------------------------------------
    // State injection for test harnesses
    // ------------------------------------------------------------------

    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        &mut self.paddles[side.index()]
    }

    // ------------------------------------------------------------------
    // Save / load
    // ------------------------------------------------------------------

    /// Serialize the whole session, controllers included
    pub fn to_bytes(&self) -> Result<Vec<u8>, SessionError> {
        let snapshot = proto::SessionSnapshot {
            version: proto::SNAPSHOT_VERSION,
            tick: self.tick,
            settings: self.config.to_settings(),
            ball: proto::BallState {
                x: self.ball.pos.x,
                y: self.ball.pos.y,
                dx: self.ball.vel.x,
                dy: self.ball.vel.y,
                speed: self.ball.speed,
            },
            left: self.side_state(Side::Left)?,
            right: self.side_state(Side::Right)?,
            difficulty: self.difficulty,
            consecutive_hits: self.streaks.hits,
            consecutive_misses: self.streaks.misses,
            last_hit: self.last_hit.map(|side| side.index() as u8),
            ticks_since_last_hit: self.ticks_since_last_hit,
            last_speed_multiplier: self.last_speed_multiplier,
            rng: self.rng.to_state(),
        };
        Ok(snapshot.to_bytes()?)
    }

    fn side_state(&self, side: Side) -> Result<proto::SideState, SessionError> {
        let i = side.index();
        let controller = &self.controllers[i];
        let data = controller.save_state().map_err(SessionError::ControllerSave)?;
        Ok(proto::SideState {
            score: self.score.get(side),
            hits: self.hits[i],
            total_reward: self.rewards[i].total,
            reward_terms: self.rewards[i].terms.to_array(),
            last_distance: self.rewards[i].last_distance,
            paddle_y: self.paddles[i].y,
            controller: proto::ControllerBlob {
                kind: controller.kind().to_string(),
                data,
            },
        })
    }

    /// Rebuild a session saved with [`Simulation::to_bytes`].
    ///
    /// Nothing is constructed unless every value checks out.
    pub fn from_bytes(bytes: &[u8], registry: &ControllerRegistry) -> Result<Self, SessionError> {
        let snapshot = proto::SessionSnapshot::from_bytes(bytes)?;

        let config = Config::from_settings(&snapshot.settings);
        config.validate()?;
        let field = Field::new(config.width, config.height);

        if !snapshot.difficulty.is_finite()
            || !(Params::MIN_DIFFICULTY..=config.max_difficulty).contains(&snapshot.difficulty)
        {
            return Err(SessionError::Corrupt(format!(
                "difficulty {} outside [{}, {}]",
                snapshot.difficulty,
                Params::MIN_DIFFICULTY,
                config.max_difficulty
            )));
        }

        let saved = snapshot.ball;
        if ![saved.x, saved.y, saved.dx, saved.dy, saved.speed]
            .iter()
            .all(|v| v.is_finite())
            || saved.speed <= 0.0
        {
            return Err(SessionError::Corrupt(format!("invalid ball state {saved:?}")));
        }
        let mut ball = Ball::new(&config);
        ball.pos = glam::Vec2::new(saved.x, saved.y);
        ball.vel = glam::Vec2::new(saved.dx, saved.dy);
        ball.speed = saved.speed;

        let last_hit = match snapshot.last_hit {
            None => None,
            Some(index) => Some(
                Side::from_index(index)
                    .ok_or_else(|| SessionError::Corrupt(format!("unknown last-hit side {index}")))?,
            ),
        };

        let mut paddles = [
            Paddle::new(Side::Left, &config),
            Paddle::new(Side::Right, &config),
        ];
        let sides = [&snapshot.left, &snapshot.right];
        for (paddle, state) in paddles.iter_mut().zip(sides) {
            let max_y = config.height - config.paddle_height();
            if !state.paddle_y.is_finite() || !(0.0..=max_y).contains(&state.paddle_y) {
                return Err(SessionError::Corrupt(format!(
                    "{} paddle y {} outside [0, {}]",
                    paddle.side, state.paddle_y, max_y
                )));
            }
            paddle.y = state.paddle_y;
        }

        let multiplier = snapshot.last_speed_multiplier;
        if !multiplier.is_finite() || !(1.0..=config.max_speed_multiplier).contains(&multiplier) {
            return Err(SessionError::Corrupt(format!(
                "speed multiplier {} outside [1, {}]",
                multiplier, config.max_speed_multiplier
            )));
        }
        let left_ledger = restore_ledger(Side::Left, &snapshot.left)?;
        let right_ledger = restore_ledger(Side::Right, &snapshot.right)?;

        let left = restore_controller(Side::Left, &snapshot.left.controller, registry)?;
        let right = restore_controller(Side::Right, &snapshot.right.controller, registry)?;

        tracing::info!(
            tick = snapshot.tick,
            left = left.kind(),
            right = right.kind(),
            score_left = snapshot.left.score,
            score_right = snapshot.right.score,
            "session restored"
        );

        Ok(Self {
            events: Events::new(config.max_events as usize),
            config,
            field,
            ball,
            paddles,
            controllers: [left, right],
            score: Score {
                left: snapshot.left.score,
                right: snapshot.right.score,
            },
            rewards: [left_ledger, right_ledger],
            hits: [snapshot.left.hits, snapshot.right.hits],
            streaks: Streaks {
                hits: snapshot.consecutive_hits,
                misses: snapshot.consecutive_misses,
            },
            difficulty: snapshot.difficulty,
            last_hit,
            ticks_since_last_hit: snapshot.ticks_since_last_hit,
            last_speed_multiplier: multiplier,
            tick: snapshot.tick,
            rng: GameRng::from_state(&snapshot.rng),
        })
    }
}

fn restore_ledger(side: Side, state: &proto::SideState) -> Result<RewardLedger, SessionError> {
    let finite = state.total_reward.is_finite()
        && state.reward_terms.iter().all(|term| term.is_finite())
        && state.last_distance.is_finite()
        && state.last_distance >= 0.0;
    if !finite {
        return Err(SessionError::Corrupt(format!(
            "invalid {side} reward state: total {}, last distance {}, terms {:?}",
            state.total_reward, state.last_distance, state.reward_terms
        )));
    }
    Ok(RewardLedger {
        total: state.total_reward,
        terms: RewardTerms::from_array(state.reward_terms),
        last_distance: state.last_distance,
    })
}

fn restore_controller(
    side: Side,
    blob: &proto::ControllerBlob,
    registry: &ControllerRegistry,
) -> Result<Box<dyn Controller>, SessionError> {
    registry
        .restore(&blob.kind, &blob.data)
        .ok_or_else(|| SessionError::UnknownController(blob.kind.clone()))?
        .map_err(|source| SessionError::Controller { side, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::{LearningController, ScriptedController};
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Always returns the same raw action
    struct Fixed(Option<u8>);

    impl Controller for Fixed {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn select_action(&mut self, _state: &Observation) -> Option<u8> {
            self.0
        }

        fn observe_transition(&mut self, _transition: &Transition) {}

        fn save_state(&self) -> Result<Vec<u8>, ControllerError> {
            Ok(self.0.into_iter().collect())
        }
    }

    /// Everything the simulation reported to a controller
    #[derive(Default)]
    struct Log {
        rewards: Vec<f32>,
        rebounds: u32,
        streak_resets: u32,
    }

    /// Holds and records every call into a shared log
    struct Recorder(Rc<RefCell<Log>>);

    impl Controller for Recorder {
        fn kind(&self) -> &'static str {
            "recorder"
        }

        fn select_action(&mut self, _state: &Observation) -> Option<u8> {
            Some(0)
        }

        fn observe_transition(&mut self, transition: &Transition) {
            self.0.borrow_mut().rewards.push(transition.reward);
        }

        fn save_state(&self) -> Result<Vec<u8>, ControllerError> {
            Ok(Vec::new())
        }

        fn notify_rebound(&mut self) {
            self.0.borrow_mut().rebounds += 1;
        }

        fn reset_rebound_streak(&mut self) {
            self.0.borrow_mut().streak_resets += 1;
        }
    }

    fn recorded_sim() -> (Simulation, [Rc<RefCell<Log>>; 2]) {
        let logs = [Rc::default(), Rc::default()];
        let sim = Simulation::new(
            Config::new(),
            11,
            Box::new(Recorder(Rc::clone(&logs[0]))),
            Box::new(Recorder(Rc::clone(&logs[1]))),
        )
        .expect("default config is valid");
        (sim, logs)
    }

    fn scripted_sim() -> Simulation {
        Simulation::new(
            Config::new(),
            5,
            Box::new(ScriptedController::new()),
            Box::new(ScriptedController::new()),
        )
        .expect("default config is valid")
    }

    fn hold_sim() -> Simulation {
        Simulation::new(
            Config::new(),
            7,
            Box::new(Fixed(Some(0))),
            Box::new(Fixed(Some(0))),
        )
        .expect("default config is valid")
    }

    #[test]
    fn test_new_session_starts_centered() {
        let sim = hold_sim();
        assert_eq!(sim.ball().pos, sim.field().center());
        assert!((sim.ball().vel.length() - sim.config().ball_speed).abs() < 1e-4);
        assert_eq!(sim.paddle(Side::Left).y, 240.0);
        assert_eq!(sim.paddle(Side::Right).x, 768.0);
        assert_eq!(sim.difficulty(), 1.0);
        assert_eq!(sim.ticks(), 0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = Config {
            ball_speed: 0.0,
            ..Config::new()
        };
        let result = Simulation::new(
            config,
            1,
            Box::new(Fixed(Some(0))),
            Box::new(Fixed(Some(0))),
        );
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange { field: "ball_speed", .. })
        ));
    }

    #[test]
    fn test_hit_grants_bonus_and_events() {
        let mut sim = hold_sim();
        let left = *sim.paddle(Side::Left);
        sim.ball_mut().pos = left.center();
        sim.ball_mut().vel = Vec2::new(-5.0, 0.0);

        sim.tick();

        assert_eq!(sim.hits(Side::Left), 1);
        assert_eq!(sim.last_hit(), Some(Side::Left));
        assert_eq!(sim.streaks().hits, 1);
        assert!((sim.last_speed_multiplier() - 1.1).abs() < 1e-6);
        assert!(sim.events().contains(&GameEvent::Hit(Side::Left)));
        assert!(sim.ball().vel.x > 0.0);
        assert_eq!(sim.ticks_since_last_hit(), 0);
        assert!(sim.total_reward(Side::Left) > 0.4);
        // Difficulty update overwrites the ramp: 5 * 1.0
        assert!((sim.ball().speed - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_hit_reward_uses_pre_bounce_ball() {
        let (mut sim, logs) = recorded_sim();
        let left = *sim.paddle(Side::Left);
        sim.ball_mut().pos = left.center();
        sim.ball_mut().vel = Vec2::new(-5.0, 0.0);
        let last_distance = sim.rewards[Side::Left.index()].last_distance;

        // Holding paddles and a mid-field ball: motion only advances the ball
        let mut moved = *sim.ball();
        moved.advance();
        let expected = shape_reward(
            &left,
            Action::Hold,
            &moved,
            sim.field(),
            left.x,
            last_distance,
        )
        .total()
            + Params::REWARD_HIT_BONUS;

        sim.tick();

        assert_eq!(sim.hits(Side::Left), 1);
        let log = logs[0].borrow();
        let rewards = &log.rewards;
        assert_eq!(rewards.len(), 1);
        assert!(
            (rewards[0] - expected).abs() < 1e-5,
            "delivered {} expected {}",
            rewards[0],
            expected
        );
    }

    #[test]
    fn test_hit_notifies_hitter_only() {
        let (mut sim, logs) = recorded_sim();
        let left = *sim.paddle(Side::Left);
        sim.ball_mut().pos = left.center();
        sim.ball_mut().vel = Vec2::new(-5.0, 0.0);

        sim.tick();

        assert_eq!(logs[0].borrow().rebounds, 1);
        assert_eq!(logs[1].borrow().rebounds, 0);
        assert_eq!(logs[0].borrow().streak_resets, 0);
        assert_eq!(logs[1].borrow().streak_resets, 0);
    }

    #[test]
    fn test_conceding_side_resets_rebound_streak() {
        let (mut sim, logs) = recorded_sim();
        sim.ball_mut().pos = Vec2::new(2.0, 100.0);
        sim.ball_mut().vel = Vec2::new(-5.0, 0.0);

        sim.tick();

        assert_eq!(sim.score(), Score { left: 0, right: 1 });
        assert_eq!(logs[0].borrow().streak_resets, 1, "left conceded");
        assert_eq!(logs[1].borrow().streak_resets, 0);
        assert_eq!(logs[0].borrow().rebounds, 0);
        assert_eq!(logs[1].borrow().rebounds, 0);
    }

    #[test]
    fn test_scoring_rewards_and_resets_ball() {
        let mut sim = hold_sim();
        // One tick first so the cached distances track the injected ball
        sim.ball_mut().pos = Vec2::new(7.0, 100.0);
        sim.ball_mut().vel = Vec2::new(-5.0, 0.0);
        sim.tick();
        assert_eq!(sim.score(), Score::new());
        let before = [sim.total_reward(Side::Left), sim.total_reward(Side::Right)];

        sim.tick();

        assert_eq!(sim.score(), Score { left: 0, right: 1 });
        assert!(sim.events().contains(&GameEvent::Scored(Side::Right)));
        assert_eq!(sim.ball().pos, sim.field().center());
        assert!(sim.total_reward(Side::Right) - before[1] > 1.0);
        assert!(sim.total_reward(Side::Left) - before[0] < -1.0);
        assert!(sim
            .events()
            .messages()
            .iter()
            .any(|message| message.starts_with("Side 2 reward:")));
    }

    #[test]
    fn test_invalid_action_holds() {
        let mut sim = Simulation::new(
            Config::new(),
            3,
            Box::new(Fixed(Some(9))),
            Box::new(Fixed(None)),
        )
        .expect("default config is valid");
        let before = (sim.paddle(Side::Left).y, sim.paddle(Side::Right).y);

        sim.tick();

        assert_eq!((sim.paddle(Side::Left).y, sim.paddle(Side::Right).y), before);
        assert!(sim.events().contains(&GameEvent::InvalidAction {
            side: Side::Left,
            raw: Some(9)
        }));
        assert!(sim.events().contains(&GameEvent::InvalidAction {
            side: Side::Right,
            raw: None
        }));
    }

    #[test]
    fn test_miss_streak_lowers_difficulty() {
        let mut sim = hold_sim();
        sim.difficulty = 1.5;
        sim.streaks.misses = 10;
        sim.ball_mut().pos = Vec2::new(400.0, 300.0);
        sim.ball_mut().vel = Vec2::new(1.0, 1.0);

        sim.tick();

        assert!((sim.difficulty() - 1.4995).abs() < 1e-6);
        assert!((sim.ball().speed - 5.0 * 1.4995).abs() < 1e-4);
    }

    #[test]
    fn test_events_cleared_each_tick() {
        let mut sim = hold_sim();
        sim.ball_mut().pos = Vec2::new(2.0, 100.0);
        sim.ball_mut().vel = Vec2::new(-5.0, 0.0);
        sim.tick();
        assert!(!sim.events().is_empty());

        sim.ball_mut().pos = Vec2::new(400.0, 300.0);
        sim.ball_mut().vel = Vec2::new(1.0, 1.0);
        sim.tick();
        assert!(!sim.events().contains(&GameEvent::Scored(Side::Right)));
    }

    #[test]
    fn test_apply_config_keeps_session() {
        let mut sim = hold_sim();
        sim.paddle_mut(Side::Right).y = 470.0;
        sim.score.increment(Side::Left);

        let config = Config {
            height: 400.0,
            paddle_speed: 8.0,
            ..Config::new()
        };
        sim.apply_config(config).expect("valid config");

        assert_eq!(sim.score().left, 1);
        assert_eq!(sim.paddle(Side::Right).height, 80.0);
        assert_eq!(sim.paddle(Side::Right).y, 320.0, "re-clamped to the smaller field");
        assert_eq!(sim.paddle(Side::Left).speed, 8.0);
        assert_eq!(sim.field().height, 400.0);
    }

    #[test]
    fn test_apply_config_rejects_invalid() {
        let mut sim = hold_sim();
        let config = Config {
            max_difficulty: 0.5,
            ..Config::new()
        };
        assert!(sim.apply_config(config).is_err());
        assert_eq!(sim.config(), &Config::new());
    }

    #[test]
    fn test_performance_ratio() {
        let mut sim = hold_sim();
        assert_eq!(sim.performance_ratio(), 0.5);

        sim.score.increment(Side::Left);
        sim.hits = [2, 0];
        assert!((sim.performance_score(Side::Left) - 1.2).abs() < 1e-6);
        assert_eq!(sim.performance_ratio(), 1.0);

        sim.score.increment(Side::Right);
        assert!((sim.performance_ratio() - 1.2 / 2.2).abs() < 1e-6);
    }

    #[test]
    fn test_self_play_sync_requires_parameters() {
        let mut sim = hold_sim();
        assert!(!sim.sync_self_play().expect("no parameters is not an error"));

        let mut sim = Simulation::new(
            Config::new(),
            5,
            Box::new(LearningController::new(1)),
            Box::new(LearningController::new(2)),
        )
        .expect("default config is valid");
        for _ in 0..50 {
            sim.tick();
        }
        assert!(sim.sync_self_play().expect("learning controllers share tables"));
        assert_eq!(
            sim.controller(Side::Left).parameters(),
            sim.controller(Side::Right).parameters()
        );
    }

    #[test]
    fn test_self_play_sync_into_incompatible_controller_fails() {
        let mut sim = Simulation::new(
            Config::new(),
            5,
            Box::new(LearningController::new(1)),
            Box::new(ScriptedController::new()),
        )
        .expect("default config is valid");
        assert!(matches!(
            sim.sync_self_play(),
            Err(ControllerError::IncompatibleParameters { kind: "scripted", .. })
        ));
    }

    #[test]
    fn test_frame_mirrors_state() {
        let mut sim = hold_sim();
        sim.tick();
        let frame = sim.frame();
        assert_eq!(frame.tick, 1);
        assert_eq!(frame.left_paddle.x, 16.0);
        assert_eq!(frame.left_paddle.height, 120.0);
        assert_eq!(frame.ball.width, 12.0);
        assert_eq!(frame.difficulty, sim.difficulty());
        assert_eq!(frame.reward_left, sim.total_reward(Side::Left));
        assert_eq!(frame.events, sim.events().messages());
    }

    #[test]
    fn test_unknown_controller_kind_fails_restore() {
        let sim = hold_sim();
        let bytes = sim.to_bytes().expect("fixed controllers save");
        let result = Simulation::from_bytes(&bytes, &ControllerRegistry::with_builtins());
        assert!(matches!(result, Err(SessionError::UnknownController(kind)) if kind == "fixed"));
    }

    #[test]
    fn test_corrupt_difficulty_rejected() {
        let mut sim = scripted_sim();
        sim.difficulty = 7.0;
        let bytes = sim.to_bytes().expect("scripted controllers save");
        let result = Simulation::from_bytes(&bytes, &ControllerRegistry::with_builtins());
        assert!(matches!(result, Err(SessionError::Corrupt(_))));
    }

    #[test]
    fn test_oversized_event_capacity_rejected_on_restore() {
        let mut sim = scripted_sim();
        sim.config.max_events = u32::MAX;
        let bytes = sim.to_bytes().expect("scripted controllers save");
        let result = Simulation::from_bytes(&bytes, &ControllerRegistry::with_builtins());
        assert!(matches!(
            result,
            Err(SessionError::Config(ConfigError::OutOfRange {
                field: "max_events",
                ..
            }))
        ));
    }

    #[test]
    fn test_non_finite_reward_state_rejected() {
        let mut sim = scripted_sim();
        sim.rewards[Side::Right.index()].total = f32::NAN;
        let bytes = sim.to_bytes().expect("scripted controllers save");
        let result = Simulation::from_bytes(&bytes, &ControllerRegistry::with_builtins());
        assert!(matches!(result, Err(SessionError::Corrupt(_))));

        let mut sim = scripted_sim();
        sim.rewards[Side::Left.index()].last_distance = f32::INFINITY;
        let bytes = sim.to_bytes().expect("scripted controllers save");
        let result = Simulation::from_bytes(&bytes, &ControllerRegistry::with_builtins());
        assert!(matches!(result, Err(SessionError::Corrupt(_))));
    }

    #[test]
    fn test_speed_multiplier_out_of_range_rejected() {
        let mut sim = scripted_sim();
        sim.last_speed_multiplier = 3.0;
        let bytes = sim.to_bytes().expect("scripted controllers save");
        let result = Simulation::from_bytes(&bytes, &ControllerRegistry::with_builtins());
        assert!(matches!(result, Err(SessionError::Corrupt(_))));
    }

    #[test]
    fn test_apply_config_keeps_saved_multiplier_in_range() {
        let mut sim = scripted_sim();
        sim.last_speed_multiplier = 2.0;
        let config = Config {
            max_speed_multiplier: 1.5,
            ..Config::new()
        };
        sim.apply_config(config).expect("valid config");
        assert_eq!(sim.last_speed_multiplier(), 1.5);

        let bytes = sim.to_bytes().expect("scripted controllers save");
        assert!(Simulation::from_bytes(&bytes, &ControllerRegistry::with_builtins()).is_ok());
    }

    #[test]
    fn test_truncated_bytes_rejected() {
        let sim = Simulation::new(
            Config::new(),
            5,
            Box::new(ScriptedController::new()),
            Box::new(ScriptedController::new()),
        )
        .expect("default config is valid");
        let bytes = sim.to_bytes().expect("scripted controllers save");
        let result = Simulation::from_bytes(&bytes[..bytes.len() / 2], &ControllerRegistry::default());
        assert!(matches!(result, Err(SessionError::Snapshot(_))));
    }
}
