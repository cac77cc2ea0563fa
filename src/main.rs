//! Tilt Maze entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{DeviceOrientationEvent, Document, Element, HtmlElement, HtmlInputElement};

    use tilt_maze::Settings;
    use tilt_maze::platform::Orientation;
    use tilt_maze::sim::{FrameClock, GameStatus, Maze, SimulationContext, TickInput, tick};

    /// Game instance holding all state
    struct Game {
        maze: Maze,
        ctx: SimulationContext,
        settings: Settings,
        clock: FrameClock,
        input: TickInput,
        ball: Option<HtmlElement>,
        note: Option<Element>,
        joystick_head: Option<HtmlElement>,
        /// An animation-frame chain is scheduled
        running: bool,
    }

    impl Game {
        fn new(document: &Document) -> Self {
            let maze = Maze::classic();
            let ctx = SimulationContext::new(&maze);
            Self {
                maze,
                ctx,
                settings: Settings::load(),
                clock: FrameClock::new(),
                input: TickInput::default(),
                ball: None,
                note: document.get_element_by_id("note"),
                joystick_head: html_element(document, "joystick-head"),
                running: false,
            }
        }

        /// Run one simulation tick; returns whether another frame is needed
        fn frame(&mut self, time: f64) -> bool {
            let dt = self.clock.advance(time);
            // Acceleration and reset are one-shot; friction decays what was set
            let input = std::mem::take(&mut self.input);
            let outcome = tick(&mut self.ctx, &self.maze, &input, dt);

            if let Some(ball) = &self.ball {
                let r = self.maze.tuning().ball_radius();
                place(ball, outcome.body.pos - Vec2::splat(r), Vec2::splat(r * 2.0));
            }

            match outcome.status {
                GameStatus::InProgress => true,
                GameStatus::Won => {
                    self.show_note("You won!");
                    self.running = false;
                    false
                }
                GameStatus::Lost => {
                    self.show_note("You fell into a hole!");
                    self.running = false;
                    false
                }
            }
        }

        fn on_orientation(&mut self, reading: Orientation) {
            let accel = reading.to_acceleration(self.maze.tuning().max_acceleration, &self.settings);
            self.input.acceleration = Some(accel);

            if self.settings.show_joystick {
                if let Some(head) = &self.joystick_head {
                    let _ = head
                        .style()
                        .set_property("transform", &format!("translate({}px, {}px)", accel.x, accel.y));
                }
            }
        }

        /// Apply a changed preference and persist it
        fn update_settings(&mut self, change: impl FnOnce(&mut Settings)) {
            change(&mut self.settings);
            self.settings.save();
            if !self.settings.show_joystick {
                if let Some(head) = &self.joystick_head {
                    let _ = head.style().remove_property("transform");
                }
            }
        }

        fn restart(&mut self) {
            self.input.reset = true;
            self.clock.reset();
            self.show_note("Guide the ball through the maze!");
            if let Some(note) = &self.note {
                let _ = note.class_list().remove_1("show");
            }
        }

        fn show_note(&self, text: &str) {
            if let Some(note) = &self.note {
                note.set_text_content(Some(text));
                let _ = note.class_list().add_1("show");
            }
        }
    }

    fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn place(el: &HtmlElement, top_left: Vec2, size: Vec2) {
        let style = el.style();
        let _ = style.set_property("left", &format!("{}px", top_left.x));
        let _ = style.set_property("top", &format!("{}px", top_left.y));
        let _ = style.set_property("width", &format!("{}px", size.x));
        let _ = style.set_property("height", &format!("{}px", size.y));
    }

    fn create_div(document: &Document, parent: &Element, class: &str) -> Option<HtmlElement> {
        let el = document.create_element("div").ok()?;
        el.set_class_name(class);
        parent.append_child(&el).ok()?;
        el.dyn_into::<HtmlElement>().ok()
    }

    /// Lay out walls, holes and the ball inside `#maze`
    fn draw_maze(document: &Document, maze_el: &Element, game: &mut Game) {
        maze_el.set_inner_html("");
        let tuning = *game.maze.tuning();

        for unit in game.maze.wall_units() {
            let class = if unit.horizontal { "wall horizontal" } else { "wall vertical" };
            if let Some(el) = create_div(document, maze_el, class) {
                let bounds = unit.bounds(tuning.cap_radius());
                place(&el, bounds.min, bounds.max - bounds.min);
            }
        }

        for &hole in game.maze.holes() {
            if let Some(el) = create_div(document, maze_el, "hole") {
                let bounds = game.maze.hole_bounds(hole);
                place(&el, bounds.min, bounds.max - bounds.min);
            }
        }

        game.ball = create_div(document, maze_el, "ball");
        if let Some(ball) = &game.ball {
            let r = tuning.ball_radius();
            place(ball, game.ctx.body.pos - Vec2::splat(r), Vec2::splat(r * 2.0));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Tilt Maze starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(maze_el) = document.get_element_by_id("maze") else {
            log::error!("No #maze element");
            return;
        };

        let game = Rc::new(RefCell::new(Game::new(&document)));
        draw_maze(&document, &maze_el, &mut game.borrow_mut());

        setup_orientation(&window, game.clone());
        setup_restart(game.clone());
        setup_settings_controls(&document, &game);

        start(game);
        log::info!("Tilt Maze running!");
    }

    fn setup_orientation(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
            let reading = Orientation::new(
                event.beta().unwrap_or(0.0) as f32,
                event.gamma().unwrap_or(0.0) as f32,
            );
            game.borrow_mut().on_orientation(reading);
        });
        let _ = window.add_event_listener_with_callback_and_bool(
            "deviceorientation",
            closure.as_ref().unchecked_ref(),
            true,
        );
        closure.forget();
    }

    /// Clicking the note after the game ended starts a new one
    fn setup_restart(game: Rc<RefCell<Game>>) {
        let Some(note) = game.borrow().note.clone() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            if !game.borrow().ctx.status.is_terminal() {
                return;
            }
            game.borrow_mut().restart();
            start(game.clone());
        });
        let _ = note.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Wire the preference checkboxes and sensitivity slider, if present
    fn setup_settings_controls(document: &Document, game: &Rc<RefCell<Game>>) {
        bind_toggle(document, game, "invert-x", |s| s.invert_x, |s, on| s.invert_x = on);
        bind_toggle(document, game, "invert-y", |s| s.invert_y, |s, on| s.invert_y = on);
        bind_toggle(
            document,
            game,
            "show-joystick",
            |s| s.show_joystick,
            |s, on| s.show_joystick = on,
        );

        let Some(slider) = input_element(document, "sensitivity") else {
            return;
        };
        slider.set_value(&game.borrow().settings.sensitivity.to_string());
        let game = game.clone();
        let input = slider.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            match input.value().parse::<f32>() {
                Ok(value) => game.borrow_mut().update_settings(|s| s.sensitivity = value),
                Err(_) => log::warn!("Ignoring sensitivity {:?}", input.value()),
            }
        });
        let _ = slider.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn bind_toggle(
        document: &Document,
        game: &Rc<RefCell<Game>>,
        id: &str,
        get: fn(&Settings) -> bool,
        set: fn(&mut Settings, bool),
    ) {
        let Some(checkbox) = input_element(document, id) else {
            return;
        };
        checkbox.set_checked(get(&game.borrow().settings));
        let game = game.clone();
        let input = checkbox.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let on = input.checked();
            game.borrow_mut().update_settings(|s| set(s, on));
        });
        let _ = checkbox.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn input_element(document: &Document, id: &str) -> Option<HtmlInputElement> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    }

    fn start(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.running {
                return;
            }
            g.running = true;
        }
        request_animation_frame(game);
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let keep_going = game.borrow_mut().frame(time);
        // Terminal state: stop scheduling until restart
        if keep_going {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Frames the headless demo runs before giving up (five minutes at 60 Hz)
#[cfg(not(target_arch = "wasm32"))]
const DEMO_FRAMES: u64 = 60 * 60 * 5;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tilt_maze::consts::FRAME_DT;
    use tilt_maze::platform::WanderingTilt;
    use tilt_maze::sim::{Maze, MazeLayout, SimulationContext, TickInput, tick};
    use tilt_maze::{Settings, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Tilt Maze (native) starting headless demo...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match Tuning::load(std::path::Path::new(&path)) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    let maze = Maze::new(MazeLayout::classic(), tuning);
    if !maze.is_solvable() {
        log::warn!("Goal is walled off from the start");
    }

    let settings = Settings::load();
    let mut ctx = SimulationContext::new(&maze);
    let mut tilt = WanderingTilt::new(0x7117, 6.0);
    let mut collisions = 0;

    while ctx.frames < DEMO_FRAMES {
        let accel = tilt
            .next_reading()
            .to_acceleration(tuning.max_acceleration, &settings);
        let input = TickInput {
            acceleration: Some(accel),
            ..Default::default()
        };
        let outcome = tick(&mut ctx, &maze, &input, FRAME_DT);
        collisions += outcome.collisions;
        if outcome.status.is_terminal() {
            break;
        }
    }

    log::info!(
        "Demo finished: {:?} after {} frames, ball at ({:.1}, {:.1}), {} wall corrections",
        ctx.status,
        ctx.frames,
        ctx.body.pos.x,
        ctx.body.pos.y,
        collisions
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
