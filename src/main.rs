//! Ski Sats entry point
//!
//! In the browser: wires DOM input, audio, HUD and page hooks around the
//! simulation and drives it from `requestAnimationFrame`. Natively: runs a
//! headless autopiloted run and prints its stats.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, CustomEventInit, KeyboardEvent, TouchEvent};

    use ski_sats::audio::{AudioManager, SoundEffect};
    use ski_sats::consts::NOMINAL_DT;
    use ski_sats::hud::HudView;
    use ski_sats::platform::{InputState, TouchSide};
    use ski_sats::share::{run_ended_payload, summary_line};
    use ski_sats::sim::{GameEvent, GamePhase, GameState, RunStats, tick};
    use ski_sats::{GameConfig, Settings, frame_dt};

    // Optional page renderer: `window.skiSatsRender(frame)` if the page defines it
    #[wasm_bindgen(inline_js = "
        export function has_renderer() {
            return typeof window.skiSatsRender === 'function';
        }

        export function render_frame(json) {
            try {
                window.skiSatsRender(JSON.parse(json));
            } catch (e) {
                console.warn('skiSatsRender failed:', e);
            }
        }
    ")]
    extern "C" {
        fn has_renderer() -> bool;
        fn render_frame(json: &str);
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        input: InputState,
        audio: AudioManager,
        events: Vec<GameEvent>,
        last_time: f64,
    }

    impl Game {
        fn new(settings: Settings, seed: u64) -> Self {
            let mut config = GameConfig::default();
            settings.apply_to(&mut config);
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                state: GameState::new(config, seed),
                settings,
                input: InputState::new(),
                audio,
                events: Vec::new(),
                last_time: 0.0,
            }
        }

        /// One tick per frame, then fan the tick's events out
        fn update(&mut self, dt: f32) {
            let input = self.input.snapshot();
            tick(&mut self.state, &input, frame_dt(dt), &mut self.events);
            self.input.end_frame();

            for event in std::mem::take(&mut self.events) {
                self.dispatch(&event);
            }

            if self.state.phase == GamePhase::Playing {
                self.audio
                    .set_swoosh(self.state.player.speed, self.state.config().player.max_speed);
            }
        }

        fn dispatch(&mut self, event: &GameEvent) {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play(effect);
            }
            match event {
                GameEvent::RunStarted { run, started_at, .. } => {
                    self.audio.resume();
                    self.audio.start_swoosh();
                    let detail = serde_json::json!({ "run": run, "startedAt": started_at });
                    dispatch_window_event("skisats-run-started", &detail);
                }
                GameEvent::RunEnded(stats) => {
                    self.audio.stop_swoosh();
                    dispatch_window_event("skisats-run-ended", &run_ended_detail(stats));
                }
                GameEvent::YetiAppeared => log::info!("The yeti is on the slope"),
                _ => {}
            }
        }

        /// Switch flat/3D view, persist it and tell the page's renderer
        fn toggle_view_mode(&mut self) {
            let mode = self.settings.toggle_view_mode();
            self.settings.apply_to_state(&mut self.state);
            self.settings.save();
            let detail = serde_json::json!({ "viewMode": mode });
            dispatch_window_event("skisats-view-mode", &detail);
        }

        fn render(&self) {
            if !has_renderer() {
                return;
            }
            match serde_json::to_string(&self.state.snapshot()) {
                Ok(json) => render_frame(&json),
                Err(e) => log::warn!("Frame snapshot failed to serialize: {}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let shake_scale = if self.settings.effective_camera_shake() { 1.0 } else { 0.0 };
            let hud = HudView::from_state(&self.state, shake_scale);

            let set_text = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    if el.text_content().as_deref() != Some(text) {
                        el.set_text_content(Some(text));
                    }
                }
            };
            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };

            set_text("#hud-distance .hud-value", &hud.distance);
            set_text("#hud-time .hud-value", &hud.time);
            set_text("#hud-sats .hud-value", &hud.sats.to_string());

            show("yeti-warning", hud.yeti_warning);
            show("start-prompt", hud.phase == GamePhase::Menu);
            show("game-over", hud.phase.is_terminal());

            if let Some(body) = document.body() {
                let _ = body.set_attribute("data-shake", &format!("{:.2}", hud.shake));
            }

            if hud.phase.is_terminal() {
                if let Some(stats) = self.state.last_run() {
                    set_text("#final-summary", &summary_line(stats));
                    set_text(
                        "#final-reason",
                        match hud.phase {
                            GamePhase::Caught => "The yeti got you!",
                            _ => "Wipeout!",
                        },
                    );
                }
            }
        }
    }

    fn run_ended_detail(stats: &RunStats) -> serde_json::Value {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default();
        run_ended_payload(stats, &origin)
    }

    /// Fire-and-forget `CustomEvent` on `window`
    fn dispatch_window_event(name: &str, detail: &serde_json::Value) {
        let Some(window) = web_sys::window() else { return };
        let detail = js_sys::JSON::parse(&detail.to_string()).unwrap_or(JsValue::NULL);
        let init = CustomEventInit::new();
        init.set_detail(&detail);
        match CustomEvent::new_with_event_init_dict(name, &init) {
            Ok(event) => {
                let _ = window.dispatch_event(&event);
            }
            Err(e) => log::warn!("Could not create {} event: {:?}", name, e),
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        log::info!("Ski Sats starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window; not running in a browser page");
            return;
        };

        if let Some(loading) = window.document().and_then(|d| d.get_element_by_id("loading")) {
            let _ = loading.set_attribute("class", "hidden");
        }

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(settings, seed)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, game.clone());
        setup_focus_handlers(&window, game.clone());

        request_animation_frame(game);

        log::info!("Ski Sats running!");
    }

    fn touch_side(window: &web_sys::Window, event: &TouchEvent) -> Option<TouchSide> {
        let touch = event.touches().get(0)?;
        let width = window.inner_width().ok()?.as_f64()? as f32;
        Some(TouchSide::from_position(touch.client_x() as f32, width))
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Keyboard down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if event.code() == "KeyV" && !event.repeat() {
                    g.toggle_view_mode();
                    return;
                }
                if g.input.key_down(&event.code(), event.repeat()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start (tap + steer)
        {
            let game = game.clone();
            let win = window.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(side) = touch_side(&win, &event) {
                    game.borrow_mut().input.touch_start(side);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let win = window.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(side) = touch_side(&win, &event) {
                    game.borrow_mut().input.touch_move(side);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end / cancel
        for name in ["touchend", "touchcancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if event.touches().length() == 0 {
                    game.borrow_mut().input.touch_end();
                }
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Window blur (click outside): drop held keys, optionally mute
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.input.release_all();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                    log::info!("Muted (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus back: restore the user's mute preference
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let muted = g.settings.muted;
                g.audio.set_muted(muted);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                NOMINAL_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::sync::mpsc;

    use ski_sats::GameConfig;
    use ski_sats::consts::NOMINAL_DT;
    use ski_sats::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    /// Look this far ahead for obstacles to dodge
    const LOOKAHEAD: f32 = 45.0;
    /// Drift back toward the center beyond this lateral offset
    const CENTER_BAND: f32 = 15.0;

    /// Steer away from the nearest obstacle in the skier's lane, else drift to the center
    pub fn autopilot(state: &GameState) -> TickInput {
        let player = &state.player;
        let config = state.config();
        let clearance = config.player.radius + config.obstacles.radius + 2.0;
        let edge = config.half_width() - clearance;

        let threat = state
            .world
            .obstacles()
            .iter()
            .filter(|o| o.pos.y > player.distance && o.pos.y - player.distance < LOOKAHEAD)
            .filter(|o| (o.pos.x - player.x).abs() < clearance)
            .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

        let (left, right) = match threat {
            Some(o) if o.pos.x >= player.x && player.x > -edge => (true, false),
            Some(_) => (false, true),
            None if player.x > CENTER_BAND => (true, false),
            None if player.x < -CENTER_BAND => (false, true),
            None => (false, false),
        };
        TickInput {
            left,
            right,
            confirm: false,
        }
    }

    pub fn run(seed: u64, seconds: f32) {
        let mut state = GameState::new(GameConfig::load(), seed);
        let (mut events, received) = mpsc::channel::<GameEvent>();

        let start = TickInput {
            confirm: true,
            ..Default::default()
        };
        tick(&mut state, &start, NOMINAL_DT, &mut events);

        let steps = (seconds.max(0.0) / NOMINAL_DT) as u64;
        for _ in 0..steps {
            let input = autopilot(&state);
            tick(&mut state, &input, NOMINAL_DT, &mut events);
            for event in received.try_iter() {
                match event {
                    GameEvent::CoinsCollected { .. } | GameEvent::ShrubThudded { .. } => {
                        log::debug!("{:?}", event)
                    }
                    _ => log::info!("{:?}", event),
                }
            }
            if state.phase != GamePhase::Playing {
                break;
            }
        }

        let result = match state.last_run() {
            Some(stats) => serde_json::to_value(stats),
            // Time limit reached with the skier still going
            None => Ok(serde_json::json!({
                "run": state.run,
                "distance": state.player.distance,
                "time": state.elapsed,
                "sats": state.sats,
                "reason": null,
            })),
        };
        match result.and_then(|v| serde_json::to_string_pretty(&v)) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Could not serialize run stats: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let seconds = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);

    log::info!("Ski Sats (headless) seed {} for up to {} s", seed, seconds);
    headless::run(seed, seconds);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
