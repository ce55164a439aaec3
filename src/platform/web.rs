//! Browser driver (web only)
//!
//! Wires DOM input to a [`Session`], runs it from requestAnimationFrame and
//! publishes the frame view as JSON on `window.fruitExpansionView` for the
//! page's renderer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

use super::frame::{FrameRequest, FrameScheduler, GameLoop, LoopControl};
use super::input::pointer_to_playfield;
use super::storage::LocalStorageStore;
use crate::session::Session;
use crate::tuning::Tuning;

const VIEW_PROPERTY: &str = "fruitExpansionView";

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// requestAnimationFrame-backed scheduler
pub struct RafScheduler {
    window: web_sys::Window,
    frame: FrameSlot,
}

impl RafScheduler {
    pub fn new(window: web_sys::Window, frame: FrameSlot) -> Self {
        Self { window, frame }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        let slot = self.frame.borrow();
        let closure = slot.as_ref()?;
        self.window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok()
            .map(FrameRequest)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let _ = self.window.cancel_animation_frame(request.0);
    }
}

type WebSession = Rc<RefCell<Session<LocalStorageStore>>>;

/// Running browser game; keep it alive for the page's lifetime
pub struct WebDriver {
    session: WebSession,
    game_loop: Rc<RefCell<GameLoop<RafScheduler>>>,
    frame: FrameSlot,
    alive: Rc<Cell<bool>>,
}

impl WebDriver {
    pub fn start(tuning: Tuning) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let playfield_width = tuning.playfield.width;
        let session = Session::new(tuning, LocalStorageStore)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let session = Rc::new(RefCell::new(session));
        let frame: FrameSlot = Rc::new(RefCell::new(None));
        let alive = Rc::new(Cell::new(true));
        let game_loop = Rc::new(RefCell::new(GameLoop::new(RafScheduler::new(
            window.clone(),
            frame.clone(),
        ))));

        // Per-frame work
        {
            let session = session.clone();
            let window = window.clone();
            game_loop.borrow_mut().set_callback(move |dt| {
                let mut s = session.borrow_mut();
                s.frame(dt);
                publish_view(&window, &s);
                LoopControl::Continue
            });
        }

        // rAF entry point, guarded so a late frame after teardown does nothing
        {
            let game_loop = game_loop.clone();
            let alive = alive.clone();
            *frame.borrow_mut() = Some(Closure::new(move |now: f64| {
                if !alive.get() {
                    return;
                }
                game_loop.borrow_mut().on_frame(now);
            }));
        }

        let driver = Self {
            session,
            game_loop,
            frame,
            alive,
        };
        driver.bind_pointer(&canvas, playfield_width);
        driver.bind_buttons(&document);

        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        driver.game_loop.borrow_mut().start(now);
        publish_view(&window, &driver.session.borrow());
        log::info!("Web driver started");
        Ok(driver)
    }

    fn bind_pointer(&self, canvas: &HtmlCanvasElement, playfield_width: f32) {
        // Mouse move
        {
            let session = self.session.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let x = pointer_to_playfield(
                    event.client_x() as f32,
                    rect.left() as f32,
                    rect.width() as f32,
                    playfield_width,
                );
                session.borrow_mut().aim(x);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let session = self.session.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = pointer_to_playfield(
                        touch.client_x() as f32,
                        rect.left() as f32,
                        rect.width() as f32,
                        playfield_width,
                    );
                    session.borrow_mut().aim(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click fires from the click position
        {
            let session = self.session.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let x = pointer_to_playfield(
                    event.client_x() as f32,
                    rect.left() as f32,
                    rect.width() as f32,
                    playfield_width,
                );
                let mut s = session.borrow_mut();
                s.aim(x);
                s.fire();
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Tap fires from the touch; no synthetic click follows
        {
            let session = self.session.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut s = session.borrow_mut();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = pointer_to_playfield(
                        touch.client_x() as f32,
                        rect.left() as f32,
                        rect.width() as f32,
                        playfield_width,
                    );
                    s.aim(x);
                }
                s.fire();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn bind_buttons(&self, document: &web_sys::Document) {
        for id in ["start-btn", "restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let session = self.session.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    let seed = js_sys::Date::now() as u64;
                    session.borrow_mut().start(seed);
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("home-btn") {
            let session = self.session.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                session.borrow_mut().go_home();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Stop the loop and release the frame closure. Must not be called from
    /// inside a frame.
    pub fn shutdown(&self) {
        self.alive.set(false);
        if let Ok(mut game_loop) = self.game_loop.try_borrow_mut() {
            game_loop.stop();
        }
        // Breaks the closure -> loop -> scheduler -> closure cycle
        self.frame.borrow_mut().take();
        log::info!("Web driver stopped");
    }
}

fn publish_view(window: &web_sys::Window, session: &Session<LocalStorageStore>) {
    match serde_json::to_string(&session.view()) {
        Ok(json) => {
            let _ = js_sys::Reflect::set(
                window,
                &JsValue::from_str(VIEW_PROPERTY),
                &JsValue::from_str(&json),
            );
        }
        Err(e) => log::warn!("Failed to encode frame view: {}", e),
    }
}

/// Boot the browser game and tear it down on `pagehide`
pub fn run() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let tuning = Tuning::default();
    let driver = Rc::new(WebDriver::start(tuning)?);

    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        driver.shutdown();
    });
    window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
