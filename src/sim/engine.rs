//! Engine: registries, the fixed-step loop and the render pass
//!
//! Registration is capability based: an object lands in the type index if it
//! has a type tag, in the update list if it has update behavior, in the render
//! list if it has a visual and in the body list if it has a body.

use crate::config::WorldConfig;
use crate::error::AssetError;
use crate::input::Input;
use crate::renderer::Canvas;

use super::body::Body;
use super::clock::FixedClock;
use super::collider::ColliderId;
use super::physics::Physics;
use super::scene_list::SceneList;
use super::world::{Entity, EntityId, World};

/// Per-tick game logic attached to an object
pub trait Behavior {
    fn update(&mut self, ctx: &mut UpdateContext<'_>);
}

impl<F: FnMut(&mut UpdateContext<'_>)> Behavior for F {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        self(ctx)
    }
}

/// Custom drawing for objects that are not plain sprites
pub trait Draw {
    fn draw(&mut self, world: &World, id: EntityId, canvas: &mut dyn Canvas)
    -> Result<(), AssetError>;
}

impl<F> Draw for F
where
    F: FnMut(&World, EntityId, &mut dyn Canvas) -> Result<(), AssetError>,
{
    fn draw(
        &mut self,
        world: &World,
        id: EntityId,
        canvas: &mut dyn Canvas,
    ) -> Result<(), AssetError> {
        self(world, id, canvas)
    }
}

/// What a behavior can see and do during one step.
pub struct UpdateContext<'a> {
    pub world: &'a mut World,
    pub input: &'a Input,
    /// The object this behavior belongs to
    pub id: EntityId,
    pub dt: f32,
    spawned: &'a mut Vec<SceneObject>,
}

impl UpdateContext<'_> {
    pub fn entity(&mut self) -> Option<&mut Entity> {
        self.world.get_mut(self.id)
    }

    pub fn body(&mut self) -> Option<&mut Body> {
        self.world.body_mut(self.id)
    }

    /// Queue an object for registration right after the update pass
    pub fn spawn(&mut self, object: SceneObject) {
        self.spawned.push(object);
    }

    pub fn remove_self(&mut self) {
        self.world.remove(self.id);
    }
}

enum Visual {
    /// The entity's texture stretched over its body
    Sprite,
    Custom(Box<dyn Draw>),
}

struct Subscriber {
    id: EntityId,
    behavior: Box<dyn Behavior>,
}

struct Drawable {
    id: EntityId,
    visual: Visual,
}

/// Bundle of capabilities handed to [`Engine::add`].
#[derive(Default)]
pub struct SceneObject {
    kind: Option<String>,
    texture: Option<String>,
    body: Option<Body>,
    update: Option<Box<dyn Behavior>>,
    visual: Option<Visual>,
}

impl SceneObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain game object: textured body in a type group, drawn as a sprite,
    /// with a no-op update.
    pub fn game_object(texture: &str, body: Body, kind: &str) -> Self {
        Self::new()
            .with_kind(kind)
            .with_texture(texture)
            .with_body(body)
            .with_update(|_: &mut UpdateContext<'_>| {})
            .with_sprite()
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_owned());
        self
    }

    pub fn with_texture(mut self, key: &str) -> Self {
        self.texture = Some(key.to_owned());
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_update(mut self, behavior: impl Behavior + 'static) -> Self {
        self.update = Some(Box::new(behavior));
        self
    }

    pub fn with_sprite(mut self) -> Self {
        self.visual = Some(Visual::Sprite);
        self
    }

    pub fn with_draw(mut self, draw: impl Draw + 'static) -> Self {
        self.visual = Some(Visual::Custom(Box::new(draw)));
        self
    }
}

pub struct Engine {
    config: WorldConfig,
    world: World,
    physics: Physics,
    input: Input,
    clock: FixedClock,
    update_list: SceneList<Subscriber>,
    render_list: SceneList<Drawable>,
    spawned: Vec<SceneObject>,
    running: bool,
    /// Timestamp of the previous frame callback (seconds)
    last_frame: Option<f64>,
    steps: u64,
}

impl Engine {
    pub fn new(config: WorldConfig) -> Self {
        let clock =
            FixedClock::new(config.step).with_limits(config.max_substeps, config.max_frame_time);
        Self {
            world: World::new(),
            physics: Physics::new(config.width, config.height),
            input: Input::new(),
            clock,
            update_list: SceneList::new(),
            render_list: SceneList::new(),
            spawned: Vec::new(),
            running: false,
            last_frame: None,
            steps: 0,
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut Physics {
        &mut self.physics
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.world.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.world.get_mut(id)
    }

    /// Fixed steps run so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Create a sprite with a body and register it everywhere it belongs.
    pub fn create_game_object(
        &mut self,
        texture: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        kind: &str,
    ) -> EntityId {
        self.add(SceneObject::game_object(
            texture,
            Body::new(x, y, width, height),
            kind,
        ))
    }

    /// Register an object according to the capabilities it carries.
    pub fn add(&mut self, object: SceneObject) -> EntityId {
        let SceneObject {
            kind,
            texture,
            body,
            update,
            visual,
        } = object;
        let has_body = body.is_some();
        let id = self.world.spawn(kind, texture, body);

        if let Some(behavior) = update {
            self.update_list.push(Subscriber { id, behavior });
        }
        if let Some(visual) = visual {
            self.render_list.push(Drawable { id, visual });
        }
        if has_body {
            self.physics.add_body(id);
        }
        log::debug!("Registered entity {id}");
        id
    }

    pub fn add_many(&mut self, objects: impl IntoIterator<Item = SceneObject>) -> Vec<EntityId> {
        objects.into_iter().map(|o| self.add(o)).collect()
    }

    /// Replace an object's update behavior, subscribing it if it had none.
    pub fn set_update(&mut self, id: EntityId, behavior: impl Behavior + 'static) {
        let behavior: Box<dyn Behavior> = Box::new(behavior);
        if let Some(sub) = self.update_list.iter_mut().find(|s| s.id == id) {
            sub.behavior = behavior;
        } else {
            self.update_list.push(Subscriber { id, behavior });
        }
    }

    /// Standing collision rule between two type groups, without a callback
    pub fn add_collider(&mut self, group_a: &str, group_b: &str) -> ColliderId {
        self.register_collider(group_a, group_b, None)
    }

    /// Standing collision rule whose callback runs after separation
    pub fn add_collider_with(
        &mut self,
        group_a: &str,
        group_b: &str,
        on_hit: impl FnMut(&mut World, EntityId, EntityId) + 'static,
    ) -> ColliderId {
        self.register_collider(group_a, group_b, Some(Box::new(on_hit)))
    }

    fn register_collider(
        &mut self,
        group_a: &str,
        group_b: &str,
        on_hit: Option<super::collider::HitCallback>,
    ) -> ColliderId {
        self.world.ensure_group(group_a);
        self.world.ensure_group(group_b);
        log::debug!("Collider {group_a} x {group_b}");
        self.physics.add_collider(group_a, group_b, on_hit)
    }

    pub fn remove_collider(&mut self, id: ColliderId) -> bool {
        self.physics.remove_collider(id)
    }

    /// Flag an object dead. See [`World::remove`].
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.world.remove(id)
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_frame = None;
        self.input.listen();
        log::info!("Engine started");
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.input.stop_listening();
        log::info!("Engine stopped after {} steps", self.steps);
    }

    /// Animation-frame callback: catch up the simulation, then render once.
    ///
    /// `now` is a monotonic timestamp in seconds. Returns the number of fixed
    /// steps that ran. Does nothing while stopped.
    pub fn frame(&mut self, now: f64, canvas: &mut dyn Canvas) -> Result<u32, AssetError> {
        if !self.running {
            return Ok(0);
        }
        let elapsed = self.last_frame.map_or(0.0, |last| (now - last) as f32);
        self.last_frame = Some(now);

        let steps = self.advance(elapsed);
        self.render(canvas)?;
        Ok(steps)
    }

    /// Bank wall-clock time and run whatever fixed steps are due.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        let steps = self.clock.advance(elapsed);
        for _ in 0..steps {
            self.step(self.clock.step());
        }
        steps
    }

    /// One simulation step: updates in registration order, then physics.
    pub fn step(&mut self, dt: f32) {
        let world = &mut self.world;
        world.sweep();
        self.update_list.kill_where(|s| !world.is_alive(s.id));
        self.update_list.sweep();

        for sub in self.update_list.iter_mut() {
            if !world.is_alive(sub.id) {
                continue;
            }
            let mut ctx = UpdateContext {
                world: &mut *world,
                input: &self.input,
                id: sub.id,
                dt,
                spawned: &mut self.spawned,
            };
            sub.behavior.update(&mut ctx);
        }

        for object in std::mem::take(&mut self.spawned) {
            self.add(object);
        }

        self.physics.update(&mut self.world, dt);
        self.steps += 1;
        log::trace!("Step {} done", self.steps);
    }

    /// Clear the canvas and draw the render list in order.
    pub fn render(&mut self, canvas: &mut dyn Canvas) -> Result<(), AssetError> {
        let world = &self.world;
        self.render_list.kill_where(|d| !world.is_alive(d.id));
        self.render_list.sweep();

        canvas.clear();
        for drawable in self.render_list.iter_mut() {
            match &mut drawable.visual {
                Visual::Sprite => {
                    let Some(entity) = world.get(drawable.id) else {
                        continue;
                    };
                    if let (Some(key), Some(body)) = (entity.texture(), entity.body()) {
                        canvas.draw_image(key, body.rect())?;
                    }
                }
                Visual::Custom(draw) => draw.draw(world, drawable.id, canvas)?,
            }
        }
        Ok(())
    }

    /// Live entries in the update list
    pub fn update_count(&self) -> usize {
        self.update_list.len()
    }

    /// Live entries in the render list
    pub fn render_count(&self) -> usize {
        self.render_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingCanvas;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine() -> Engine {
        Engine::new(WorldConfig {
            width: 21.0,
            height: 30.0,
            ..WorldConfig::default()
        })
    }

    fn canvas_with(keys: &[&str]) -> RecordingCanvas<()> {
        let mut canvas = RecordingCanvas::new(500.0, 500.0);
        for key in keys {
            canvas.assets.request(key, "");
            canvas.assets.complete(key, ());
        }
        canvas
    }

    #[test]
    fn test_registration_follows_capabilities() {
        let mut engine = engine();
        engine.create_game_object("ball", 1.0, 1.0, 1.0, 1.0, "ball");
        engine.add(SceneObject::new().with_update(|_: &mut UpdateContext<'_>| {}));
        engine.add(SceneObject::new().with_draw(
            |_: &World, _: EntityId, _: &mut dyn Canvas| -> Result<(), AssetError> { Ok(()) },
        ));
        engine.add(SceneObject::new());

        assert_eq!(engine.world().group_len("ball"), 1);
        assert_eq!(engine.update_count(), 2);
        assert_eq!(engine.render_count(), 2);
        assert_eq!(engine.physics().body_count(), 1);
        assert_eq!(engine.world().len(), 4);
    }

    #[test]
    fn test_updates_run_in_order_before_physics() {
        let mut engine = engine();
        let order = Rc::new(RefCell::new(Vec::new()));

        let ball = engine.create_game_object("ball", 1.0, 1.0, 1.0, 1.0, "ball");
        let log = order.clone();
        engine.set_update(ball, move |ctx: &mut UpdateContext<'_>| {
            // Physics has not moved the body yet this step
            log.borrow_mut().push(ctx.body().unwrap().pos.x);
            ctx.body().unwrap().vel = Vec2::new(2.0, 0.0);
        });
        let log = order.clone();
        engine.add(SceneObject::new().with_update(move |_: &mut UpdateContext<'_>| {
            log.borrow_mut().push(-1.0)
        }));

        engine.step(0.5);
        engine.step(0.5);
        assert_eq!(*order.borrow(), vec![1.0, -1.0, 2.0, -1.0]);
        assert_eq!(engine.steps(), 2);
    }

    #[test]
    fn test_removed_object_stops_updating_and_drawing() {
        let mut engine = engine();
        let mut canvas = canvas_with(&["block"]);
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();

        let block = engine.create_game_object("block", 1.0, 1.0, 1.0, 1.0, "block");
        engine.set_update(block, move |_: &mut UpdateContext<'_>| *counter.borrow_mut() += 1);
        engine.step(0.01);
        engine.render(&mut canvas).unwrap();
        assert_eq!(canvas.images().count(), 1);

        engine.remove(block);
        assert_eq!(engine.world().group_len("block"), 0);
        // Other registries drop it lazily
        assert_eq!(engine.physics().body_count(), 1);

        engine.step(0.01);
        engine.render(&mut canvas).unwrap();
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(canvas.images().count(), 0);
        assert_eq!(engine.physics().body_count(), 0);
        assert_eq!(engine.update_count(), 0);
        assert_eq!(engine.render_count(), 0);
    }

    #[test]
    fn test_collision_callback_removes_block_once() {
        let mut engine = engine();
        let ball = engine.create_game_object("ball", 1.5, 1.5, 1.0, 1.0, "ball");
        engine.entity_mut(ball).unwrap().set_immovable(false);
        engine.create_game_object("block", 1.0, 1.0, 2.0, 2.0, "block");
        engine.create_game_object("block", 10.0, 10.0, 2.0, 2.0, "block");

        let hits = Rc::new(RefCell::new(Vec::new()));
        let log = hits.clone();
        engine.add_collider_with("ball", "block", |world, _, block| {
            world.remove(block);
        });
        engine.add_collider_with("ball", "block", move |_, a, b| log.borrow_mut().push((a, b)));

        engine.step(0.0);
        assert_eq!(engine.world().group_len("block"), 1);
        assert!(hits.borrow().is_empty());
    }

    #[test]
    fn test_collider_before_any_member_sees_later_members() {
        let mut engine = engine();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        engine.add_collider_with("ball", "paddle", move |_, _, _| *counter.borrow_mut() += 1);

        let ball = engine.create_game_object("ball", 9.0, 27.5, 1.0, 1.0, "ball");
        engine.entity_mut(ball).unwrap().set_immovable(false);
        engine.create_game_object("paddle", 8.0, 28.0, 5.0, 2.0, "paddle");

        engine.step(0.0);
        assert_eq!(*hits.borrow(), 1);
        let body = engine.world().body(ball).unwrap();
        assert!((body.bottom() - 28.0).abs() < 1e-4);
    }

    #[test]
    fn test_frame_runs_fixed_steps_then_renders_once() {
        let mut engine = engine();
        let mut canvas = canvas_with(&["ball"]);
        let ball = engine.create_game_object("ball", 0.0, 0.0, 1.0, 1.0, "ball");
        engine.entity_mut(ball).unwrap().set_velocity(60.0, 0.0);

        // Stopped engines do nothing
        assert_eq!(engine.frame(0.0, &mut canvas), Ok(0));

        engine.start();
        engine.start();
        assert_eq!(engine.frame(10.0, &mut canvas), Ok(0));
        let step = engine.config().step as f64;
        assert_eq!(engine.frame(10.0 + 2.5 * step, &mut canvas), Ok(2));
        assert_eq!(canvas.images().count(), 1);
        // Integration always uses the fixed step
        let x = engine.world().body(ball).unwrap().pos.x;
        assert!((x - 2.0).abs() < 1e-3);

        engine.stop();
        engine.stop();
        assert_eq!(engine.frame(20.0, &mut canvas), Ok(0));
    }

    #[test]
    fn test_render_fails_on_missing_asset() {
        let mut engine = engine();
        let mut canvas = canvas_with(&[]);
        engine.create_game_object("ghost", 0.0, 0.0, 1.0, 1.0, "thing");
        assert_eq!(
            engine.render(&mut canvas),
            Err(AssetError::NotFound("ghost".into()))
        );
    }

    #[test]
    fn test_behavior_can_spawn_and_remove_itself() {
        let mut engine = engine();
        engine.add(SceneObject::new().with_update(|ctx: &mut UpdateContext<'_>| {
            ctx.spawn(SceneObject::new().with_kind("spawned"));
            ctx.remove_self();
        }));

        engine.step(0.01);
        assert_eq!(engine.world().group_len("spawned"), 1);
        engine.step(0.01);
        assert_eq!(engine.world().group_len("spawned"), 1);
        assert_eq!(engine.update_count(), 0);
    }

    #[test]
    #[should_panic(expected = "unsupported collision pairing")]
    fn test_two_immovable_groups_abort() {
        let mut engine = engine();
        engine.create_game_object("a", 0.0, 0.0, 2.0, 2.0, "wall");
        engine.create_game_object("b", 1.0, 1.0, 2.0, 2.0, "block");
        engine.add_collider("wall", "block");
        engine.step(0.0);
    }
}
