//! Brick breakout, scripted on top of the public engine API
//!
//! Paddle at the bottom, a 5x19 wall of bricks at the top. Bricks in lower
//! rows break in fewer hits and are worth less. Space launches the ball.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::f32::consts::PI;
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::WorldConfig;
use crate::error::AssetError;
use crate::input::keys;
use crate::renderer::{Canvas, TextStyle, Viewport};
use crate::sim::{Engine, EntityId, SceneObject, UpdateContext, World};

pub const WORLD_WIDTH: f32 = 21.0;
pub const WORLD_HEIGHT: f32 = 30.0;
pub const SCREEN_SIZE: f32 = 500.0;

pub const ROWS: usize = 5;
pub const COLS: usize = 19;
const BLOCK_SIZE: Vec2 = Vec2::new(1.0, 1.0);
const BLOCK_SPACING: Vec2 = Vec2::new(0.0, 0.5);
const BLOCK_ORIGIN: Vec2 = Vec2::new(1.0, 1.0);
const BLOCK_TEXTURES: [&str; 3] = ["block-green", "block-blue", "block-red"];
const BLOCK_HIT_TEXTURES: [&str; 3] = ["block-green-hit", "block-blue-hit", "block-red-hit"];

/// Paddle speed (units/s)
pub const PADDLE_SPEED: f32 = 10.0;
/// Ball speed right after launch (units/s)
pub const LAUNCH_SPEED: f32 = 20.0;

/// Texture key -> URL
pub const ASSETS: &[(&str, &str)] = &[
    ("ball", "assets/ball.png"),
    ("paddle", "assets/paddle.png"),
    ("block-blue", "assets/block-blue.png"),
    ("block-blue-hit", "assets/block-blue-hit.png"),
    ("block-red", "assets/block-red.png"),
    ("block-red-hit", "assets/block-red-hit.png"),
    ("block-green", "assets/block-green.png"),
    ("block-green-hit", "assets/block-green-hit.png"),
];
pub const BACKGROUND: &str = "assets/bg.jpg";

/// World and canvas setup for the game
pub fn config() -> WorldConfig {
    WorldConfig {
        width: WORLD_WIDTH,
        height: WORLD_HEIGHT,
        screen_width: SCREEN_SIZE,
        screen_height: SCREEN_SIZE,
        ..WorldConfig::default()
    }
}

pub fn viewport(config: &WorldConfig) -> Viewport {
    Viewport::fit(
        Vec2::new(config.width, config.height),
        Vec2::new(config.screen_width, config.screen_height),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy)]
struct Brick {
    health: i32,
    score: u64,
    hit_texture: &'static str,
}

/// Game state shared by the callbacks
#[derive(Debug, Default)]
pub struct Scoreboard {
    pub points: u64,
    pub blocks_left: usize,
    pub outcome: Option<Outcome>,
    bricks: HashMap<EntityId, Brick>,
}

impl Scoreboard {
    pub fn health(&self, block: EntityId) -> Option<i32> {
        self.bricks.get(&block).map(|b| b.health)
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    fps: u32,
    frames: u32,
    timer: f32,
}

pub struct Breakout {
    pub paddle: EntityId,
    pub ball: EntityId,
    pub blocks: Vec<EntityId>,
    state: Rc<RefCell<Scoreboard>>,
}

impl Breakout {
    /// Populate `engine` with the game. `seed` drives the launch angle.
    pub fn setup(engine: &mut Engine, seed: u64) -> Self {
        engine.input_mut().add_keys(&[
            ("left", keys::LEFT),
            ("up", keys::UP),
            ("right", keys::RIGHT),
            ("down", keys::DOWN),
            ("space", keys::SPACE),
        ]);
        let state = Rc::new(RefCell::new(Scoreboard::default()));
        let height = engine.config().height;

        let paddle = engine.create_game_object("paddle", 8.0, height - 2.0, 5.0, 2.0, "paddle");
        if let Some(p) = engine.entity_mut(paddle) {
            p.set_immovable(true);
            p.set_static(false);
            p.keep_within_bounds(true, true, true, true);
        }
        engine.set_update(paddle, |ctx: &mut UpdateContext<'_>| {
            let vx = if ctx.input.is_down("left") {
                -PADDLE_SPEED
            } else if ctx.input.is_down("right") {
                PADDLE_SPEED
            } else {
                0.0
            };
            if let Some(body) = ctx.body() {
                body.vel.x = vx;
            }
        });

        let ball = engine.create_game_object("ball", 10.15, height - 2.7, 0.7, 0.7, "ball");
        if let Some(b) = engine.entity_mut(ball) {
            b.set_bounce(true, true);
            b.set_immovable(false);
            b.set_static(false);
            b.keep_within_bounds(true, true, true, false);
        }

        let blocks = spawn_wall(engine, &mut state.borrow_mut());

        engine.add_collider("ball", "paddle");
        let board = state.clone();
        engine.add_collider_with("ball", "block", move |world, _, block| {
            hit_block(&board, world, block);
        });

        engine.add(score_overlay(state.clone()));
        engine.add(launch_trigger(ball, seed));
        engine.add(outcome_trigger(ball, height, state.clone()));
        engine.add(fps_counter());

        log::info!("Breakout ready: {} blocks, seed {}", blocks.len(), seed);
        Self {
            paddle,
            ball,
            blocks,
            state,
        }
    }

    pub fn scoreboard(&self) -> Ref<'_, Scoreboard> {
        self.state.borrow()
    }

    pub fn points(&self) -> u64 {
        self.state.borrow().points
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.borrow().outcome
    }

    /// Apply one ball hit to `block`, as the ball/block collider does.
    pub fn hit_block(&self, world: &mut World, block: EntityId) {
        hit_block(&self.state, world, block);
    }

    /// Demo mode: launch, then keep the paddle under the ball.
    pub fn autopilot(&self, engine: &mut Engine) {
        let (Some(ball), Some(paddle)) = (
            engine.world().body(self.ball).copied(),
            engine.world().body(self.paddle).copied(),
        ) else {
            return;
        };
        let input = engine.input_mut();
        let launched = ball.vel != Vec2::ZERO;
        input.handle_key(keys::SPACE, !launched);

        let offset = ball.center().x - paddle.center().x;
        // Dead zone keeps the paddle from jittering around the target
        let dead_zone = paddle.size.x * 0.2;
        input.handle_key(keys::LEFT, offset < -dead_zone);
        input.handle_key(keys::RIGHT, offset > dead_zone);
    }
}

fn spawn_wall(engine: &mut Engine, board: &mut Scoreboard) -> Vec<EntityId> {
    let mut blocks = Vec::with_capacity(ROWS * COLS);
    let mut y = BLOCK_ORIGIN.y;
    for row in 0..ROWS {
        let mut x = BLOCK_ORIGIN.x;
        for _ in 0..COLS {
            let texture = BLOCK_TEXTURES[row % BLOCK_TEXTURES.len()];
            let id = engine.create_game_object(texture, x, y, BLOCK_SIZE.x, BLOCK_SIZE.y, "block");
            if let Some(block) = engine.entity_mut(id) {
                block.set_immovable(true);
            }
            board.bricks.insert(
                id,
                Brick {
                    health: (ROWS - row) as i32,
                    score: 100 * (ROWS - row + 1) as u64,
                    hit_texture: BLOCK_HIT_TEXTURES[row % BLOCK_HIT_TEXTURES.len()],
                },
            );
            blocks.push(id);
            x += BLOCK_SIZE.x + BLOCK_SPACING.x;
        }
        y += BLOCK_SIZE.y + BLOCK_SPACING.y;
    }
    board.blocks_left = blocks.len();
    blocks
}

fn hit_block(state: &RefCell<Scoreboard>, world: &mut World, block: EntityId) {
    let mut board = state.borrow_mut();
    let Some(brick) = board.bricks.get_mut(&block) else {
        return;
    };
    brick.health -= 1;
    let brick = *brick;

    if brick.health <= 0 {
        world.remove(block);
        board.bricks.remove(&block);
        board.points += brick.score;
        board.blocks_left = board.blocks_left.saturating_sub(1);
        log::debug!("Block {block} destroyed, {} left", board.blocks_left);
    } else if let Some(entity) = world.get_mut(block) {
        entity.set_texture(brick.hit_texture);
    }
}

/// Angle in [pi/2, 5pi/6): straight up or leaning left
fn launch_angle(rng: &mut Pcg32) -> f32 {
    let (min, max) = (PI / 6.0, PI * 5.0 / 6.0);
    rng.random::<f32>() * ((max - min) / 2.0) + (min + max) / 2.0
}

fn launch_trigger(ball: EntityId, seed: u64) -> SceneObject {
    let mut rng = Pcg32::seed_from_u64(seed);
    SceneObject::new().with_update(move |ctx: &mut UpdateContext<'_>| {
        if !ctx.input.is_down("space") {
            return;
        }
        let angle = launch_angle(&mut rng);
        if let Some(body) = ctx.world.body_mut(ball) {
            body.vel = Vec2::new(angle.cos(), -angle.sin()) * LAUNCH_SPEED;
        }
        log::info!("Ball launched at {:.1} deg", angle.to_degrees());
        ctx.remove_self();
    })
}

fn outcome_trigger(ball: EntityId, height: f32, state: Rc<RefCell<Scoreboard>>) -> SceneObject {
    SceneObject::new().with_update(move |ctx: &mut UpdateContext<'_>| {
        let fell = ctx.world.body(ball).is_some_and(|b| b.pos.y >= height);
        let outcome = if state.borrow().blocks_left == 0 {
            Outcome::Won
        } else if fell {
            Outcome::Lost
        } else {
            return;
        };

        state.borrow_mut().outcome = Some(outcome);
        if let Some(entity) = ctx.world.get_mut(ball) {
            entity.set_static(true);
        }
        ctx.spawn(banner(outcome));
        ctx.remove_self();
        log::info!("Game over: {:?} with {} points", outcome, state.borrow().points);
    })
}

fn banner(outcome: Outcome) -> SceneObject {
    let (text, color) = match outcome {
        Outcome::Won => ("You win!", "#FFFFFF"),
        Outcome::Lost => ("You lose!", "#FF0000"),
    };
    let style = TextStyle::new(color, 50.0).centered();
    SceneObject::new().with_draw(
        move |_: &World, _: EntityId, canvas: &mut dyn Canvas| -> Result<(), AssetError> {
            let x = canvas.size().x / 2.0;
            canvas.draw_text(text, Vec2::new(x, 300.0), &style);
            Ok(())
        },
    )
}

fn score_overlay(state: Rc<RefCell<Scoreboard>>) -> SceneObject {
    let style = TextStyle::new("#FF0000", 25.0);
    SceneObject::new().with_draw(
        move |_: &World, _: EntityId, canvas: &mut dyn Canvas| -> Result<(), AssetError> {
            let y = canvas.size().y - 5.0;
            let text = format!("Score: {}", state.borrow().points);
            canvas.draw_text(&text, Vec2::new(5.0, y), &style);
            Ok(())
        },
    )
}

/// Counts rendered frames per simulated second
fn fps_counter() -> SceneObject {
    let counter = Rc::new(RefCell::new(FpsCounter::default()));
    let ticker = counter.clone();
    let style = TextStyle::new("#0F0", 10.0);
    SceneObject::new()
        .with_update(move |ctx: &mut UpdateContext<'_>| {
            let mut c = ticker.borrow_mut();
            if c.timer >= 1.0 {
                c.fps = c.frames;
                c.timer = 0.0;
                c.frames = 0;
            }
            c.timer += ctx.dt;
        })
        .with_draw(
            move |_: &World, _: EntityId, canvas: &mut dyn Canvas| -> Result<(), AssetError> {
                let mut c = counter.borrow_mut();
                canvas.draw_text(&format!("FPS: {}", c.fps), Vec2::new(5.0, 15.0), &style);
                c.frames += 1;
                Ok(())
            },
        )
}
