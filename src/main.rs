//! Brickfall entry point
//!
//! On the web the page calls into `wasm_main`. Native builds have no window:
//! they run one game headless with the autopilot at the paddle and report the
//! result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    brickfall::platform::web::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use brickfall::assets::LoadEventKind;
    use brickfall::breakout::{self, ASSETS, Breakout};
    use brickfall::renderer::RecordingCanvas;
    use brickfall::{Engine, platform};

    /// Five simulated minutes at 60 fps
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    env_logger::init();
    log::info!("Brickfall (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(platform::clock_seed);

    let config = breakout::config();
    let mut canvas: RecordingCanvas<()> =
        RecordingCanvas::new(config.screen_width, config.screen_height);
    canvas.viewport = breakout::viewport(&config);
    canvas.assets.on(LoadEventKind::LoadedAll, |_| log::info!("All assets ready"));
    for (key, url) in ASSETS {
        canvas.assets.request(key, url);
    }
    for (key, _) in ASSETS {
        canvas.assets.complete(key, ());
    }

    let frame_time = config.step as f64;
    let mut engine = Engine::new(config);
    let game = Breakout::setup(&mut engine, seed);
    engine.start();

    let mut frames = 0;
    while frames < MAX_FRAMES && game.outcome().is_none() {
        game.autopilot(&mut engine);
        if let Err(e) = engine.frame(frames as f64 * frame_time, &mut canvas) {
            log::error!("Render failed: {e}");
            break;
        }
        frames += 1;
    }
    engine.stop();

    let outcome = game
        .outcome()
        .map_or_else(|| "undecided".to_string(), |o| format!("{o:?}"));
    println!(
        "seed {seed}: {outcome} after {} steps, score {}, {} blocks left",
        engine.steps(),
        game.points(),
        game.scoreboard().blocks_left
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
