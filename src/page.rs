//! Page bootstrap: builds the app object, installs the window/document
//! listeners and drives every timer from the animation frame loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window, window};

use crate::config::Config;
use crate::frame::FrameLoop;
use crate::particles::canvas::ParticleSystem;
use crate::robot::dom::{self, DomRobot, RobotEvent};
use crate::robot::RobotManager;
use crate::sound::SoundManager;

struct App {
    robots: RobotManager<DomRobot>,
    particles: ParticleSystem,
    frame: Option<FrameLoop>,
}

impl App {
    fn tick(&mut self, now: f64) {
        self.robots.advance_to(now);
        self.particles.frame();
    }

    fn handle(&mut self, key: &str, event: RobotEvent) {
        // Bring the timer clock up to date so new timers start from the click.
        self.robots.advance_to(now_ms());
        match event {
            RobotEvent::Press(control) => {
                self.robots.press(key, control);
            }
            RobotEvent::HoverEnter => self.robots.add_hover_effect(key),
            RobotEvent::HoverLeave => self.robots.remove_hover_effect(key),
        }
    }

    fn shutdown(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.stop();
        }
        self.robots.stop_ambient_animation();
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
    // Listeners route through APP by robot key, so they outlive a stop/start cycle.
    static LISTENERS_BOUND: Cell<bool> = const { Cell::new(false) };
}

fn with_app(f: impl FnOnce(&mut App)) {
    APP.with(|cell| {
        if let Some(app) = cell.borrow_mut().as_mut() {
            f(app);
        }
    });
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Start once the document is parsed (immediately if it already is).
pub fn start(config: Config) -> Result<(), JsValue> {
    let _ = console_log::init_with_level(config.log_level());
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if doc.ready_state() == "loading" {
        let closure = Closure::once(move |_evt: web_sys::Event| {
            if let Err(e) = launch(config) {
                log::error!("Robot system error: {e:?}");
            }
        });
        doc.add_event_listener_with_callback("DOMContentLoaded", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    } else {
        launch(config)
    }
}

pub fn stop() {
    APP.with(|cell| {
        if let Some(mut app) = cell.borrow_mut().take() {
            app.shutdown();
            log::info!("Super Robot Team stopped");
        }
    });
}

fn launch(config: Config) -> Result<(), JsValue> {
    if APP.with(|cell| cell.borrow().is_some()) {
        log::warn!("Super Robot Team already running");
        return Ok(());
    }
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let mut robots = RobotManager::new(
        config.robots.clone(),
        Box::new(SoundManager::new()),
        SmallRng::from_entropy(),
        now_ms(),
    );
    let bind = !LISTENERS_BOUND.with(|b| b.replace(true));
    for (key, robot) in dom::discover(&doc)? {
        if bind {
            let k = key.clone();
            robot.bind_events(Rc::new(move |event| with_app(|app| app.handle(&k, event))))?;
        }
        robots.register(&key, robot);
    }
    robots.start_ambient_animation();

    let mut rng = SmallRng::from_entropy();
    let particles = ParticleSystem::init(&win, &doc, &config.particles, &mut rng)?;
    let count = robots.len();

    APP.with(|cell| {
        cell.replace(Some(App {
            robots,
            particles,
            frame: None,
        }))
    });

    if bind {
        bind_window_events(&win, &doc)?;
    }
    let frame = FrameLoop::start(|ts| with_app(|app| app.tick(ts)))?;
    with_app(|app| app.frame = Some(frame));

    log::info!("Super Robot Team initialized: {count} robot(s)");
    Ok(())
}

fn bind_window_events(win: &Window, doc: &Document) -> Result<(), JsValue> {
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            if let Some(w) = window() {
                with_app(|app| app.particles.resize(&w));
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::ErrorEvent| {
            log::error!("Robot system error: {}", evt.message());
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("error", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        // Pauses CSS animations only; the particle loop keeps its own schedule.
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let Some(doc) = window().and_then(|w| w.document()) else {
                return;
            };
            let state = if doc.hidden() { "paused" } else { "running" };
            if let Some(body) = doc.body() {
                let _ = body.style().set_property("animation-play-state", state);
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}
