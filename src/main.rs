//! Conscious Pixel entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, MouseEvent, TouchEvent, Window};

    use conscious_pixel::renderer::{DomRenderer, PixelFrame, PixelRenderer};
    use conscious_pixel::settings::Settings;
    use conscious_pixel::sim::{
        ConnectionStatus, FrameInput, PixelState, PointerEvent, TouchGuard, Viewport, frame_delta,
        tick,
    };

    /// Class added to the logo while it is pressed in
    const DIPPED_CLASS: &str = "dipped";
    const DIP_MS: i32 = 200;

    /// App instance holding all state
    struct App {
        pixel: PixelState,
        renderer: DomRenderer,
        input: FrameInput,
        viewport: Viewport,
        settings: Settings,
        touch: TouchGuard,
        rng: Pcg32,
    }

    impl App {
        fn new(renderer: DomRenderer, viewport: Viewport, settings: Settings, seed: u64) -> Self {
            let mut rng = Pcg32::seed_from_u64(seed);
            Self {
                pixel: PixelState::new(viewport, &mut rng),
                renderer,
                input: FrameInput::default(),
                viewport,
                settings,
                touch: TouchGuard::default(),
                rng,
            }
        }

        fn push_pointer(&mut self, event: PointerEvent) {
            if self.settings.pointer_reactions {
                self.input.push(event);
            }
        }

        /// Mouse input, minus the copies a browser emulates after a tap
        fn push_mouse(&mut self, event: PointerEvent, time_stamp: f64) {
            if self.touch.accepts_mouse(time_stamp) {
                self.push_pointer(event);
            }
        }

        fn push_touch(&mut self, event: PointerEvent, time_stamp: f64) {
            self.touch.touched(time_stamp);
            self.push_pointer(event);
        }

        /// Advance one display frame and draw it
        fn frame(&mut self, time: f64) {
            let dt = frame_delta(&mut self.pixel, time);
            let dt = self.settings.effective_delta(dt);
            self.input.now_ms = time;

            tick(&mut self.pixel, &self.input, self.viewport, dt, &mut self.rng);
            self.input.clear();

            self.renderer.render(&PixelFrame::from_state(&self.pixel));
        }

        fn resize(&mut self, viewport: Viewport) {
            self.viewport = viewport;
            self.pixel.clamp_to(viewport);
        }
    }

    fn viewport_of(window: &Window) -> Viewport {
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport::new(
            dim(window.inner_width()) as f32,
            dim(window.inner_height()) as f32,
        )
    }

    fn touch_point(event: &TouchEvent) -> Option<Vec2> {
        event
            .touches()
            .get(0)
            .map(|t| Vec2::new(t.client_x() as f32, t.client_y() as f32))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        setup_logo_dip(&window, &document);

        let settings = Settings::load();
        if !settings.enabled {
            log::info!("Conscious pixel disabled in settings");
            return Ok(());
        }

        let renderer = DomRenderer::attach(&document)?;
        let viewport = viewport_of(&window);
        let seed = js_sys::Date::now() as u64;
        let probe = settings.probe_enabled.then(|| settings.probe_url.clone());

        let app = Rc::new(RefCell::new(App::new(renderer, viewport, settings, seed)));
        log::info!(
            "Conscious pixel created in {}x{} viewport",
            viewport.width,
            viewport.height
        );

        setup_input_handlers(&window, &document, app.clone());

        match probe {
            Some(url) => start_probe(app.clone(), url),
            None => app
                .borrow_mut()
                .pixel
                .set_connection(ConnectionStatus::Disconnected),
        }

        // The loop does not wait for the probe
        request_animation_frame(app);
        Ok(())
    }

    /// Run the connectivity probe in the background; the frame loop reads the result
    fn start_probe(app: Rc<RefCell<App>>, url: String) {
        wasm_bindgen_futures::spawn_local(async move {
            let status = conscious_pixel::probe::check(&url).await;
            app.borrow_mut().pixel.set_connection(status);
        });
    }

    fn setup_input_handlers(window: &Window, document: &Document, app: Rc<RefCell<App>>) {
        // Mouse move
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                app.borrow_mut()
                    .push_mouse(PointerEvent::Moved(pos), event.time_stamp());
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                app.borrow_mut()
                    .push_mouse(PointerEvent::Pressed(pos), event.time_stamp());
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                app.borrow_mut()
                    .push_mouse(PointerEvent::Released, event.time_stamp());
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer leaves the page
        if let Some(root) = document.document_element() {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().push_pointer(PointerEvent::Left);
            });
            let _ = root
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(pos) = touch_point(&event) {
                    app.borrow_mut()
                        .push_touch(PointerEvent::Pressed(pos), event.time_stamp());
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(pos) = touch_point(&event) {
                    app.borrow_mut()
                        .push_touch(PointerEvent::Moved(pos), event.time_stamp());
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end: finger lifted, nothing left to track
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut a = app.borrow_mut();
                a.push_touch(PointerEvent::Released, event.time_stamp());
                a.push_touch(PointerEvent::Left, event.time_stamp());
            });
            let _ = window
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let window_clone = window.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let viewport = viewport_of(&window_clone);
                app.borrow_mut().resize(viewport);
                log::debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Clicking the logo presses it in briefly
    fn setup_logo_dip(window: &Window, document: &Document) {
        let Some(logo) = document.query_selector(".illustration").ok().flatten() else {
            return;
        };

        let window = window.clone();
        let logo_clone = logo.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let _ = logo_clone.class_list().add_1(DIPPED_CLASS);

            let target = logo_clone.clone();
            let undo = Closure::once(move || {
                let _ = target.class_list().remove_1(DIPPED_CLASS);
            });
            if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                undo.as_ref().unchecked_ref(),
                DIP_MS,
            ) {
                log::warn!("Logo dip timer failed: {:?}", e);
            }
            undo.forget();
        });
        let _ = logo.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window, animation stopped");
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_app::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use conscious_pixel::consts::FRAME_MS;
    use conscious_pixel::renderer::{LogRenderer, PixelFrame, PixelRenderer};
    use conscious_pixel::settings::Settings;
    use conscious_pixel::sim::{
        ConnectionStatus, FrameInput, PixelState, PointerEvent, Viewport, frame_delta, tick,
    };
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    env_logger::init();
    log::info!("Conscious pixel (native) starting...");
    log::info!("Native mode runs a headless demo - serve the wasm build for the real thing");

    let settings = Settings::load();
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut rng = Pcg32::seed_from_u64(seed);
    let viewport = Viewport::new(1280.0, 720.0);
    let mut pixel = PixelState::new(viewport, &mut rng);
    let mut renderer = LogRenderer::new(60);

    // No fetch outside the browser
    pixel.set_connection(ConnectionStatus::Disconnected);

    let frames = 600u32;
    let mut input = FrameInput::default();
    let mut time = 0.0;
    for frame in 0..frames {
        time += FRAME_MS;
        input.now_ms = time;

        // Scripted pointer: approach the pixel, then poke it
        if settings.pointer_reactions {
            match frame {
                200 => input.push(PointerEvent::Moved(pixel.center() + Vec2::new(150.0, 0.0))),
                260 => input.push(PointerEvent::Moved(pixel.center() + Vec2::new(30.0, 0.0))),
                300 => input.push(PointerEvent::Pressed(pixel.center())),
                320 => input.push(PointerEvent::Released),
                400 => input.push(PointerEvent::Left),
                _ => {}
            }
        }

        let dt = settings.effective_delta(frame_delta(&mut pixel, time));
        tick(&mut pixel, &input, viewport, dt, &mut rng);
        input.clear();
        renderer.render(&PixelFrame::from_state(&pixel));
    }

    log::info!(
        "Simulated {} frames, final position ({:.1}, {:.1})",
        renderer.frames,
        pixel.pos.x,
        pixel.pos.y
    );
    match serde_json::to_string_pretty(&pixel) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not serialize final state: {}", e),
    }
}
