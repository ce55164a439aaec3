//! Fruit Expansion entry point
//!
//! On the web this boots the browser driver. Natively it runs a headless
//! autoplay session so the simulation can be exercised from a terminal.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already set: {}", e).into());
    }
    log::info!("Fruit Expansion starting...");
    fruit_expansion::platform::web::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fruit Expansion (native) starting...");

    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use fruit_expansion::platform::{GameLoop, LoopControl, ManualScheduler};
    use fruit_expansion::sim::GameEvent;
    use fruit_expansion::{FileStore, Session, SessionPhase, Tuning, TuningError};

    const FRAME_MS: f64 = 16.0;

    fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
        match std::env::var(key) {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid {}={:?}", key, raw);
                default
            }),
            Err(_) => default,
        }
    }

    fn load_tuning() -> Result<Tuning, TuningError> {
        match std::env::var("FRUIT_EXPANSION_TUNING") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path).map_err(|e| {
                    TuningError::Io {
                        path: path.clone(),
                        source: e,
                    }
                })?;
                log::info!("Loaded tuning from {}", path);
                Tuning::from_json(&json)
            }
            Err(_) => Ok(Tuning::default()),
        }
    }

    /// Autoplay one run (or until the time limit) and report the result
    pub fn run() -> Result<(), TuningError> {
        let tuning = load_tuning()?;
        let seed = env_or("FRUIT_EXPANSION_SEED", 42u64);
        let seconds = env_or("FRUIT_EXPANSION_SECONDS", 120.0f64);
        let save_path = env_or(
            "FRUIT_EXPANSION_SAVE",
            String::from("fruit_expansion_highscore.txt"),
        );

        let session = Rc::new(RefCell::new(Session::new(tuning, FileStore::new(save_path))?));
        log::info!("High score on file: {}", session.borrow().high_score());
        session.borrow_mut().start(seed);

        let mut game_loop = GameLoop::new(ManualScheduler::default());
        {
            let session = session.clone();
            game_loop.set_callback(move |dt| {
                let mut s = session.borrow_mut();
                for event in s.autoplay_frame(dt) {
                    match event {
                        GameEvent::LifeLost { remaining } => log::info!("Life lost, {} left", remaining),
                        GameEvent::PowerUpCollected { effect } => log::info!("Power-up: {:?}", effect),
                        _ => {}
                    }
                }
                if s.phase() == SessionPhase::Playing {
                    LoopControl::Continue
                } else {
                    LoopControl::Stop
                }
            });
        }

        let limit_ms = seconds * 1000.0;
        let mut now = 0.0;
        game_loop.start(now);
        while game_loop.is_running() && now < limit_ms {
            now += FRAME_MS;
            game_loop.on_frame(now);
        }
        game_loop.stop();

        let s = session.borrow();
        let g = s.game();
        if s.phase() == SessionPhase::GameOver {
            println!(
                "Game over after {:.1}s: score {}, wave {}{}",
                now / 1000.0,
                s.final_score(),
                g.wave,
                if s.new_high_score() { " (new high score!)" } else { "" }
            );
        } else {
            println!(
                "Stopped after {:.1}s: score {}, wave {}, lives {}",
                now / 1000.0,
                g.score,
                g.wave,
                g.lives
            );
        }
        Ok(())
    }
}
