//! Browser runner: canvas setup, image loading, key events and the
//! requestAnimationFrame loop

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, HtmlImageElement, KeyboardEvent};

use crate::assets::{LoadEvent, LoadEventKind};
use crate::breakout::{self, ASSETS, BACKGROUND, Breakout};
use crate::renderer::Canvas2d;
use crate::sim::Engine;

struct App {
    engine: Engine,
    canvas: Canvas2d,
    /// Pending requestAnimationFrame handle
    frame_request: Option<i32>,
}

type Shared = Rc<RefCell<App>>;

pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    log::info!("Brickfall starting...");

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let config = breakout::config();
    let element: HtmlCanvasElement = match document.get_element_by_id("canvas") {
        Some(el) => el.dyn_into()?,
        None => {
            let el: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
            document.body().ok_or("no body")?.append_child(&el)?;
            el
        }
    };
    let mut canvas = Canvas2d::new(
        element,
        config.screen_width as u32,
        config.screen_height as u32,
    )?;
    canvas.viewport = breakout::viewport(&config);
    canvas.set_background(BACKGROUND)?;
    canvas.assets.on(LoadEventKind::Error, |event: &LoadEvent| {
        log::warn!("Asset load event: {event:?}");
    });

    let mut engine = Engine::new(config);
    Breakout::setup(&mut engine, super::clock_seed());

    let app = Rc::new(RefCell::new(App {
        engine,
        canvas,
        frame_request: None,
    }));

    install_key_listeners(&document, &app)?;
    install_visibility_listener(&document, &app)?;
    load_images(&app)?;
    Ok(())
}

/// Kick off every image fetch; the loop starts once the loader goes idle.
fn load_images(app: &Shared) -> Result<(), JsValue> {
    for &(key, url) in ASSETS {
        let image = HtmlImageElement::new()?;
        app.borrow_mut().canvas.assets.request(key, url);

        let onload = {
            let app = app.clone();
            let loaded = image.clone();
            Closure::<dyn FnMut()>::new(move || {
                let idle = app.borrow_mut().canvas.assets.complete(key, loaded.clone());
                if idle {
                    start(&app);
                }
            })
        };
        let onerror = {
            let app = app.clone();
            Closure::<dyn FnMut()>::new(move || {
                let idle = app.borrow_mut().canvas.assets.fail(key);
                if idle {
                    start(&app);
                }
            })
        };
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onload.forget();
        onerror.forget();
        image.set_src(url);
    }
    Ok(())
}

fn install_key_listeners(document: &Document, app: &Shared) -> Result<(), JsValue> {
    for (event, down) in [("keydown", true), ("keyup", false)] {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let handled = app
                .borrow_mut()
                .engine
                .input_mut()
                .handle_key(event.key_code(), down);
            if handled {
                event.prevent_default();
            }
        });
        document.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn start(app: &Shared) {
    {
        let mut a = app.borrow_mut();
        if a.engine.is_running() {
            return;
        }
        a.engine.start();
    }
    request_animation_frame(app);
}

/// Pause while the tab is hidden
fn install_visibility_listener(document: &Document, app: &Shared) -> Result<(), JsValue> {
    let app = app.clone();
    let doc = document.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        if doc.hidden() {
            stop(&app);
        } else if app.borrow().canvas.assets.is_idle() {
            start(&app);
        }
    });
    document.add_event_listener_with_callback(
        "visibilitychange",
        closure.as_ref().unchecked_ref(),
    )?;
    closure.forget();
    Ok(())
}

/// Stop the engine and cancel any pending frame.
fn stop(app: &Shared) {
    let mut a = app.borrow_mut();
    a.engine.stop();
    if let (Some(handle), Some(window)) = (a.frame_request.take(), web_sys::window()) {
        let _ = window.cancel_animation_frame(handle);
    }
}

fn request_animation_frame(app: &Shared) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let next = app.clone();
    let closure = Closure::once(move |time: f64| game_loop(&next, time));
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(handle) => app.borrow_mut().frame_request = Some(handle),
        Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
    }
    closure.forget();
}

fn game_loop(app: &Shared, time_ms: f64) {
    {
        let mut guard = app.borrow_mut();
        guard.frame_request = None;
        let App { engine, canvas, .. } = &mut *guard;
        if !engine.is_running() {
            return;
        }
        if let Err(e) = engine.frame(time_ms / 1000.0, canvas) {
            log::error!("Render failed: {e}");
            engine.stop();
            return;
        }
    }
    request_animation_frame(app);
}
