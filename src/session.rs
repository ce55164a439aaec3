//! Session controller: start screen, play, game over
//!
//! Owns the tuning, the persisted high score and (while playing) the
//! simulation state. Presentation code drives it with commands and reads
//! a [`FrameView`] back each frame.

use serde::Serialize;

use crate::highscores::{HighScore, HighScoreStore};
use crate::sim::{
    self, ComboCelebration, EffectFlags, GameEvent, GameState, Particle, Projectile, Target,
    TickInput,
};
use crate::tuning::{Tuning, TuningError};

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Start,
    Playing,
    GameOver,
}

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Serialize)]
pub struct FrameView<'a> {
    pub phase: SessionPhase,
    pub score: u64,
    pub high_score: u64,
    pub new_high_score: bool,
    pub lives: u32,
    pub max_lives: u32,
    pub wave: u32,
    pub combo: u32,
    pub effects: EffectFlags,
    pub celebration: Option<ComboCelebration>,
    pub aim_x: f32,
    pub projectiles: &'a [Projectile],
    pub targets: &'a [Target],
    pub particles: &'a [Particle],
}

pub struct Session<S: HighScoreStore> {
    tuning: Tuning,
    high_score: HighScore<S>,
    phase: SessionPhase,
    game: GameState,
    pending_aim: Option<f32>,
    final_score: u64,
    new_high_score: bool,
}

impl<S: HighScoreStore> Session<S> {
    /// Validate the tuning, load the persisted high score and wait on the
    /// start screen
    pub fn new(tuning: Tuning, store: S) -> Result<Self, TuningError> {
        tuning.validate()?;
        let high_score = HighScore::load(store);
        let game = GameState::new(0, &tuning);
        Ok(Self {
            tuning,
            high_score,
            phase: SessionPhase::Start,
            game,
            pending_aim: None,
            final_score: 0,
            new_high_score: false,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    pub fn new_high_score(&self) -> bool {
        self.new_high_score
    }

    /// Score of the last finished run
    pub fn final_score(&self) -> u64 {
        self.final_score
    }

    pub fn store(&self) -> &S {
        self.high_score.store()
    }

    /// Begin a fresh run (from the start screen, or as a restart after game
    /// over). Ignored mid-run.
    pub fn start(&mut self, seed: u64) -> bool {
        if self.phase == SessionPhase::Playing {
            return false;
        }
        self.game = GameState::new(seed, &self.tuning);
        self.pending_aim = None;
        self.final_score = 0;
        self.new_high_score = false;
        self.phase = SessionPhase::Playing;
        log::info!("Run started with seed {}", seed);
        true
    }

    /// Abandon the current run (or leave the game-over screen)
    pub fn go_home(&mut self) -> bool {
        if self.phase == SessionPhase::Start {
            return false;
        }
        self.phase = SessionPhase::Start;
        self.game = GameState::new(0, &self.tuning);
        self.pending_aim = None;
        log::info!("Returned to start screen");
        true
    }

    /// Remember the pointer position for the next frame
    pub fn aim(&mut self, x: f32) {
        if self.phase == SessionPhase::Playing {
            self.pending_aim = Some(x);
        }
    }

    /// Fire from the latest aim; the projectile exists as soon as this returns
    pub fn fire(&mut self) -> bool {
        if self.phase != SessionPhase::Playing {
            return false;
        }
        if let Some(x) = self.pending_aim.take() {
            self.move_cannon(x);
        }
        sim::fire(&mut self.game, &self.tuning).is_some()
    }

    /// Run one frame of play
    pub fn frame(&mut self, dt_ms: f32) -> Vec<GameEvent> {
        if self.phase != SessionPhase::Playing {
            return Vec::new();
        }
        let input = TickInput {
            aim_x: self.pending_aim.take(),
        };
        let events = sim::tick(&mut self.game, &input, dt_ms, &self.tuning);

        for event in &events {
            log::debug!("{:?}", event);
            if let GameEvent::GameOver { final_score } = *event {
                self.finish(final_score);
            }
        }
        events
    }

    /// Let the autopilot aim and shoot, then run the frame
    pub fn autoplay_frame(&mut self, dt_ms: f32) -> Vec<GameEvent> {
        if self.phase == SessionPhase::Playing {
            if let Some(x) = sim::autopilot::choose_aim(&self.game, &self.tuning) {
                self.aim(x);
                self.fire();
            }
        }
        self.frame(dt_ms)
    }

    fn move_cannon(&mut self, x: f32) {
        self.game.aim_x = self
            .tuning
            .playfield
            .clamp_x(x, self.tuning.cannon_width / 2.0);
    }

    fn finish(&mut self, final_score: u64) {
        self.phase = SessionPhase::GameOver;
        self.final_score = final_score;
        self.new_high_score = self.high_score.submit(final_score);
        if self.new_high_score {
            log::info!("New high score: {}", final_score);
        }
    }

    pub fn view(&self) -> FrameView<'_> {
        let g = &self.game;
        FrameView {
            phase: self.phase,
            score: g.score,
            high_score: self.high_score.best(),
            new_high_score: self.new_high_score,
            lives: g.lives,
            max_lives: self.tuning.max_lives,
            wave: g.wave,
            combo: g.combo.count,
            effects: g.effects.flags(),
            celebration: g.celebration,
            aim_x: g.aim_x,
            projectiles: &g.projectiles,
            targets: &g.targets,
            particles: &g.particles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryStore;

    #[test]
    fn test_phase_transitions() {
        let mut session = Session::new(Tuning::default(), MemoryStore::default()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Start);
        assert!(!session.fire());
        assert!(session.frame(16.0).is_empty());
        assert!(!session.go_home());

        assert!(session.start(7));
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert!(!session.start(8));
        assert_eq!(session.game().seed, 7);

        assert!(session.go_home());
        assert_eq!(session.phase(), SessionPhase::Start);
    }

    #[test]
    fn test_start_resets_state() {
        let mut session = Session::new(Tuning::default(), MemoryStore::default()).unwrap();
        session.start(1);
        assert!(session.fire());
        session.frame(16.0);
        assert!(!session.game().projectiles.is_empty());

        session.go_home();
        session.start(2);
        assert_eq!(session.game().score, 0);
        assert_eq!(session.game().lives, 3);
        assert!(session.game().projectiles.is_empty());
        assert!(!session.new_high_score());
    }

    #[test]
    fn test_aim_applies_next_frame() {
        let mut session = Session::new(Tuning::default(), MemoryStore::default()).unwrap();
        session.start(1);
        session.aim(123.0);
        assert_eq!(session.game().aim_x, 400.0);
        session.frame(16.0);
        assert_eq!(session.game().aim_x, 123.0);
    }

    #[test]
    fn test_fire_uses_latest_aim() {
        let mut session = Session::new(Tuning::default(), MemoryStore::default()).unwrap();
        session.start(1);
        session.aim(100.0);
        assert!(session.fire());
        assert_eq!(session.game().projectiles[0].pos.x, 100.0);
        assert_eq!(session.game().aim_x, 100.0);

        // Out-of-range aim is clamped to the cannon margin
        session.go_home();
        session.start(2);
        session.aim(-50.0);
        session.fire();
        assert_eq!(session.game().projectiles[0].pos.x, 30.0);
    }

    #[test]
    fn test_rejects_invalid_tuning() {
        let mut tuning = Tuning::default();
        tuning.targets.clear();
        assert!(matches!(
            Session::new(tuning, MemoryStore::default()),
            Err(TuningError::EmptyTargetTable)
        ));
    }

    #[test]
    fn test_view_serializes() {
        let mut session = Session::new(Tuning::default(), MemoryStore::with_value("42")).unwrap();
        session.start(3);
        session.fire();
        let json = serde_json::to_string(&session.view()).unwrap();
        assert!(json.contains(r#""phase":"playing""#));
        assert!(json.contains(r#""high_score":42"#));
        assert!(json.contains(r#""projectiles":[{"id":1"#));
    }
}
