//! Arcade Sim entry point
//!
//! Web: wires a 2D canvas, keyboard/touch listeners, buttons and DOM display
//! sinks around a `FrameScheduler`. The page picks the game with the canvas's
//! `data-game` attribute (`dodger`, `platformer` or `roulette`).
//!
//! Native: runs a short scripted headless session of each game and logs what
//! happened. Pass a tuning JSON path as the first argument to override the
//! defaults.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent,
        TouchEvent,
    };

    use arcade_sim::Tuning;
    use arcade_sim::consts::SWIPE_JUMP_THRESHOLD;
    use arcade_sim::persistence::BalanceStore;
    use arcade_sim::platform::storage::LocalStorage;
    use arcade_sim::platform::{InputState, Key, TouchTracker};
    use arcade_sim::renderer::{Color, Surface, TextAlign};
    use arcade_sim::sim::{
        Bet, Dodger, FrameOutcome, FrameScheduler, Game, GameEvent, MessageTone, OverlayKind,
        Platformer, Roulette,
    };

    const OVERLAYS: [&str; 3] = ["game-over-screen", "level-complete-screen", "win-screen"];

    /// `Surface` over a canvas 2D context
    struct CanvasSurface {
        ctx: CanvasRenderingContext2d,
        width: f64,
        height: f64,
    }

    impl Surface for CanvasSurface {
        fn clear(&mut self) {
            self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        }

        fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx
                .fill_rect(x as f64, y as f64, width as f64, height as f64);
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.begin_path();
            let _ = self
                .ctx
                .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU);
            self.ctx.fill();
        }

        fn fill_sector(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color) {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.begin_path();
            self.ctx.move_to(center.x as f64, center.y as f64);
            let _ = self.ctx.arc(
                center.x as f64,
                center.y as f64,
                radius as f64,
                start as f64,
                end as f64,
            );
            self.ctx.close_path();
            self.ctx.fill();
        }

        fn draw_text(
            &mut self,
            text: &str,
            pos: Vec2,
            rotation: f32,
            size_px: f32,
            align: TextAlign,
            color: Color,
        ) {
            self.ctx.save();
            let _ = self.ctx.translate(pos.x as f64, pos.y as f64);
            let _ = self.ctx.rotate(rotation as f64);
            self.ctx.set_font(&format!("bold {}px sans-serif", size_px));
            self.ctx.set_text_align(match align {
                TextAlign::Left => "left",
                TextAlign::Center => "center",
                TextAlign::Right => "right",
            });
            self.ctx.set_text_baseline("middle");
            self.ctx.set_fill_style_str(&color.to_css());
            let _ = self.ctx.fill_text(text, 0.0, 0.0);
            self.ctx.restore();
        }
    }

    /// One running game and the page state around it
    struct App<G: Game> {
        scheduler: FrameScheduler<G>,
        surface: CanvasSurface,
        input: InputState,
        touch: TouchTracker,
        /// An animation frame is queued
        running: bool,
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        let document = document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let tuning = match canvas.get_attribute("data-tuning") {
            Some(json) => Tuning::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring data-tuning: {}", e);
                Tuning::default()
            }),
            None => Tuning::default(),
        };
        let seed = js_sys::Date::now() as u64;
        let which = canvas
            .get_attribute("data-game")
            .unwrap_or_else(|| "dodger".to_owned());
        log::info!("Arcade Sim starting {} with seed {}", which, seed);

        match which.as_str() {
            "platformer" => {
                let t = &tuning.platformer;
                let app = start(&canvas, t.field_width, t.field_height, Platformer::new(t.clone()))?;
                setup_restart_button(app);
            }
            "roulette" => {
                let size = tuning.wheel.size;
                let store = match LocalStorage::open() {
                    Some(storage) => BalanceStore::new(Box::new(storage)),
                    None => {
                        log::warn!("localStorage unavailable, balance will not persist");
                        BalanceStore::in_memory()
                    }
                };
                let game = Roulette::seeded(tuning.wheel.clone(), store, seed);
                let app = start(&canvas, size, size, game)?;
                setup_roulette_controls(app);
            }
            _ => {
                let t = &tuning.dodger;
                let game = Dodger::seeded(t.clone(), seed);
                let app = start(&canvas, t.field_width, t.field_height, game)?;
                setup_next_level_button(app.clone());
                setup_restart_button(app);
            }
        }
        Ok(())
    }

    /// Size the canvas, hook up input and start the frame loop
    fn start<G: Game + 'static>(
        canvas: &HtmlCanvasElement,
        width: f32,
        height: f32,
        game: G,
    ) -> Result<Rc<RefCell<App<G>>>, JsValue> {
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let scheduler = FrameScheduler::new(game);
        apply_events(scheduler.game().hud());
        let app = Rc::new(RefCell::new(App {
            scheduler,
            surface: CanvasSurface {
                ctx,
                width: width as f64,
                height: height as f64,
            },
            input: InputState::default(),
            touch: TouchTracker::new(),
            running: true,
        }));

        setup_keyboard(app.clone())?;
        setup_touch(canvas, app.clone())?;
        request_animation_frame(app.clone());
        Ok(app)
    }

    fn request_animation_frame<G: Game + 'static>(app: Rc<RefCell<App<G>>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop<G: Game + 'static>(app: Rc<RefCell<App<G>>>, time: f64) {
        let outcome = {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            let outcome = a.scheduler.frame(time, &a.input, &mut a.surface);
            apply_events(a.scheduler.drain_events());
            if outcome != FrameOutcome::Continue {
                a.running = false;
            }
            outcome
        };

        match outcome {
            FrameOutcome::Continue => request_animation_frame(app),
            FrameOutcome::Halted(t) => log::info!("Loop stopped: {:?}", t.kind),
        }
    }

    /// Run an action that ends a halt, and restart the loop if it had stopped
    fn resume<G: Game + 'static>(app: &Rc<RefCell<App<G>>>, action: impl FnOnce(&mut G)) {
        let restart = {
            let mut a = app.borrow_mut();
            a.scheduler.resume_with(action);
            a.input = InputState::default();
            apply_events(a.scheduler.drain_events());
            !std::mem::replace(&mut a.running, true)
        };
        if restart {
            request_animation_frame(app.clone());
        }
    }

    fn setup_keyboard<G: Game + 'static>(app: Rc<RefCell<App<G>>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom_key(&event.key()) {
                    event.prevent_default();
                    app.borrow_mut().input.key_down(key);
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(key) = Key::from_dom_key(&event.key()) {
                app.borrow_mut().input.key_up(key);
            }
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// First touch point relative to the canvas
    fn touch_pos(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<Vec2> {
        let touch = event.touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some(Vec2::new(
            (touch.client_x() as f64 - rect.left()) as f32,
            (touch.client_y() as f64 - rect.top()) as f32,
        ))
    }

    fn setup_touch<G: Game + 'static>(
        canvas: &HtmlCanvasElement,
        app: Rc<RefCell<App<G>>>,
    ) -> Result<(), JsValue> {
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = touch_pos(&canvas_clone, &event) {
                    app.borrow_mut().touch.on_start(pos);
                }
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = touch_pos(&canvas_clone, &event) {
                    let mut guard = app.borrow_mut();
                    let a = &mut *guard;
                    if let Some(gesture) = a.touch.on_move(pos, &mut a.input) {
                        log::trace!("Swipe {:?} (threshold {})", gesture, SWIPE_JUMP_THRESHOLD);
                    }
                }
            });
            canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            a.touch.on_end(&mut a.input);
        });
        canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Call `handler` on clicks of the element with `id`, if the page has one
    fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id(id)) else {
            log::debug!("No #{} on this page", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
        if btn
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("Could not listen for clicks on #{}", id);
        }
        closure.forget();
    }

    fn setup_restart_button<G: Game + 'static>(app: Rc<RefCell<App<G>>>) {
        on_click("restart-btn", move || {
            resume(&app, G::reset);
            log::info!("Game restarted");
        });
    }

    fn setup_next_level_button(app: Rc<RefCell<App<Dodger>>>) {
        on_click("next-level-btn", move || resume(&app, Dodger::next_level));
    }

    /// Value of an `<input>` found by CSS selector
    fn input_value(document: &Document, selector: &str) -> Option<String> {
        document
            .query_selector(selector)
            .ok()??
            .dyn_into::<HtmlInputElement>()
            .ok()
            .map(|input| input.value())
    }

    fn setup_roulette_controls(app: Rc<RefCell<App<Roulette>>>) {
        {
            let app = app.clone();
            on_click("spinButton", move || {
                let Some(document) = document() else {
                    return;
                };
                let kind = input_value(&document, "input[name=\"betType\"]:checked")
                    .unwrap_or_else(|| "number".to_owned());
                let number = input_value(&document, "#betNumberInput")
                    .and_then(|v| v.trim().parse::<i64>().ok())
                    .unwrap_or(-1);
                let stake = input_value(&document, "#betInput")
                    .and_then(|v| v.trim().parse::<i64>().ok())
                    .unwrap_or(0);

                let mut a = app.borrow_mut();
                let outcome = Bet::from_form(&kind, number)
                    .and_then(|bet| a.scheduler.game_mut().activate(stake, bet));
                match outcome {
                    Ok(_) => {
                        apply_events(a.scheduler.game().hud());
                        show_message("Spinning...", MessageTone::Info);
                    }
                    Err(e) if e.is_user_facing() => {
                        log::info!("Bet rejected: {}", e);
                        show_message(&e.to_string(), MessageTone::Warning);
                    }
                    Err(e) => log::debug!("Ignored: {}", e),
                }
            });
        }

        on_click("resetButton", move || {
            let mut a = app.borrow_mut();
            let balance = a.scheduler.game_mut().reset_balance();
            apply_events(a.scheduler.game().hud());
            show_message(&format!("Balance reset to {}.", balance), MessageTone::Info);
        });
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_class(document: &Document, id: &str, class: &str, on: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    fn show_message(text: &str, tone: MessageTone) {
        apply_events(vec![GameEvent::Message {
            text: text.to_owned(),
            tone,
        }]);
    }

    fn overlay_id(kind: OverlayKind) -> &'static str {
        match kind {
            OverlayKind::GameOver => OVERLAYS[0],
            OverlayKind::LevelComplete => OVERLAYS[1],
            OverlayKind::Victory => OVERLAYS[2],
        }
    }

    /// Push simulation notifications into the page
    fn apply_events(events: Vec<GameEvent>) {
        let Some(document) = document() else {
            return;
        };
        for event in events {
            match event {
                GameEvent::ScoreChanged(score) => set_text(&document, "score", &score.to_string()),
                GameEvent::LivesChanged(lives) => set_text(&document, "lives", &lives.to_string()),
                GameEvent::LevelChanged(level) => set_text(&document, "level", &level.to_string()),
                GameEvent::BalanceChanged(balance) => {
                    set_text(&document, "balance", &balance.to_string())
                }
                GameEvent::InvulnerabilityChanged(on) => {
                    set_class(&document, "canvas", "invulnerable", on)
                }
                GameEvent::Banner { visible } => set_class(&document, "banner", "hidden", !visible),
                GameEvent::Overlay { kind, final_score } => {
                    set_text(&document, "final-score", &final_score.to_string());
                    set_class(&document, overlay_id(kind), "hidden", false);
                }
                GameEvent::OverlayHidden => {
                    for id in OVERLAYS {
                        set_class(&document, id, "hidden", true);
                    }
                }
                GameEvent::SpinResolved(result) => {
                    log::debug!("Resolved {:?}", result);
                }
                GameEvent::Message { text, tone } => {
                    set_text(&document, "result", &text);
                    for (class, t) in [
                        ("info", MessageTone::Info),
                        ("win", MessageTone::Win),
                        ("loss", MessageTone::Loss),
                        ("warning", MessageTone::Warning),
                    ] {
                        set_class(&document, "result", class, t == tone);
                    }
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Arcade Sim (native) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match headless::load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Cannot use tuning file {}: {}", path, e);
                return std::process::ExitCode::FAILURE;
            }
        },
        None => arcade_sim::Tuning::default(),
    };

    headless::run_dodger(&tuning);
    headless::run_platformer(&tuning);
    headless::run_roulette(&tuning);
    std::process::ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

/// Scripted sessions driven the same way the page drives them
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use arcade_sim::Tuning;
    use arcade_sim::consts::FRAME_MS;
    use arcade_sim::persistence::BalanceStore;
    use arcade_sim::platform::InputState;
    use arcade_sim::renderer::CommandBuffer;
    use arcade_sim::sim::{
        Bet, Category, Dodger, FrameOutcome, FrameScheduler, Game, GameEvent, Platformer, Roulette,
    };

    const SEED: u64 = 7;
    const MAX_FRAMES: u64 = 20_000;

    pub fn load_tuning(path: &str) -> Result<Tuning, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        Ok(Tuning::from_json(&json)?)
    }

    /// Run until halted or out of frames; `script` picks the input per frame
    fn drive<G: Game>(
        sched: &mut FrameScheduler<G>,
        mut script: impl FnMut(u64) -> InputState,
    ) -> (FrameOutcome, Vec<GameEvent>) {
        let mut surface = CommandBuffer::new();
        let mut events = Vec::new();
        let mut outcome = FrameOutcome::Continue;
        for frame in 0..MAX_FRAMES {
            let input = script(frame);
            outcome = sched.frame(frame as f64 * FRAME_MS, &input, &mut surface);
            surface.take();
            events.extend(sched.drain_events());
            if outcome != FrameOutcome::Continue {
                break;
            }
        }
        (outcome, events)
    }

    pub fn run_dodger(tuning: &Tuning) {
        let mut sched = FrameScheduler::new(Dodger::seeded(tuning.dodger.clone(), SEED));
        // Sweep back and forth across the field
        let (outcome, events) = drive(&mut sched, |frame| InputState {
            left: (frame / 90) % 2 == 0,
            right: (frame / 90) % 2 == 1,
            jump: false,
        });
        log::info!(
            "Dodger: {:?} after {} frames, score {}, lives {}, {} events",
            outcome,
            sched.frames(),
            sched.game().score(),
            sched.game().lives(),
            events.len()
        );
    }

    pub fn run_platformer(tuning: &Tuning) {
        let mut sched = FrameScheduler::new(Platformer::new(tuning.platformer.clone()));
        // Run right, hopping every second
        let (outcome, _) = drive(&mut sched, |frame| InputState {
            left: false,
            right: true,
            jump: frame % 60 == 0,
        });
        log::info!(
            "Platformer: {:?} after {} frames, level {}, score {}, lives {}",
            outcome,
            sched.frames(),
            sched.game().level_number(),
            sched.game().score(),
            sched.game().lives()
        );
    }

    pub fn run_roulette(tuning: &Tuning) {
        let game = Roulette::seeded(tuning.wheel.clone(), BalanceStore::in_memory(), SEED);
        let mut sched = FrameScheduler::new(game);
        let mut surface = CommandBuffer::new();
        let input = InputState::default();
        let mut now = 0.0;

        for (stake, bet) in [
            (10, Bet::Number(17)),
            (50, Bet::Color(Category::Red)),
            (5000, Bet::Color(Category::Black)),
        ] {
            if let Err(e) = sched.game_mut().activate(stake, bet) {
                log::info!("Roulette: {:?} for {} rejected: {}", bet, stake, e);
                continue;
            }
            while sched.game().is_spinning() {
                sched.frame(now, &input, &mut surface);
                surface.take();
                now += FRAME_MS;
            }
            for event in sched.drain_events() {
                if let GameEvent::Message { text, .. } = event {
                    log::info!("Roulette: {}", text);
                }
            }
            log::info!("Roulette balance {}", sched.game().balance());
        }
    }
}
