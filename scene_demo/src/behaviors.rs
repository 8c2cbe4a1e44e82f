//! Gameplay behaviors used by the demo scenes

use scene_engine::prelude::*;

/// Moves its entity at a constant velocity on the fixed step
#[derive(Debug, Default)]
pub struct Mover {
    velocity: Vec3,
}

impl Behavior for Mover {
    fn fixed_update(&mut self, ctx: &mut BehaviorContext<'_>) {
        let step = ctx.frame().fixed_delta;
        ctx.move_by(self.velocity * step);
    }

    fn on_collision_start(&mut self, ctx: &mut BehaviorContext<'_>, _other: EntityId) {
        log::info!("{} landed at {:?}", ctx.name(), ctx.world_position());
        self.velocity = Vec3::zeros();
    }
}

impl RegisteredBehavior for Mover {
    const TYPE_NAME: &'static str = "Mover";
    const MODULE: &'static str = "demo";

    fn create() -> Self {
        Self::default()
    }

    fn schema() -> FieldSchema<Self> {
        FieldSchema::<Self>::new(Self::TYPE_NAME).vec3("velocity", |m, v| m.velocity = v)
    }
}

/// Spins its entity around the Y axis
#[derive(Debug)]
pub struct Spinner {
    degrees_per_second: f32,
}

impl Behavior for Spinner {
    fn update(&mut self, ctx: &mut BehaviorContext<'_>, dt: f32) {
        ctx.rotate_by_degrees(Vec3::new(0.0, self.degrees_per_second * dt, 0.0));
    }
}

impl RegisteredBehavior for Spinner {
    const TYPE_NAME: &'static str = "Spinner";
    const MODULE: &'static str = "demo";

    fn create() -> Self {
        Self {
            degrees_per_second: 90.0,
        }
    }

    fn schema() -> FieldSchema<Self> {
        FieldSchema::<Self>::new(Self::TYPE_NAME).float("speed", |s, v| s.degrees_per_second = v)
    }
}

/// Logs every contact its entity takes part in
#[derive(Debug, Default)]
pub struct ContactLogger;

impl ContactLogger {
    fn other(ctx: &BehaviorContext<'_>, other: EntityId) -> String {
        ctx.world()
            .entity(other)
            .map_or_else(|| format!("{other:?}"), |e| e.name().to_string())
    }
}

impl Behavior for ContactLogger {
    fn on_scene_load(&mut self, ctx: &mut BehaviorContext<'_>, scene: &SceneInfo) {
        log::info!("{} woke up in {scene}", ctx.name());
    }

    fn on_collision_start(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        log::info!("{} hit {}", ctx.name(), Self::other(ctx, other));
    }

    fn on_collision(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        log::trace!("{} resting on {}", ctx.name(), Self::other(ctx, other));
    }

    fn on_collision_exit(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        log::info!("{} left {}", ctx.name(), Self::other(ctx, other));
    }

    fn on_trigger_start(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        log::info!("{} entered trigger {}", ctx.name(), Self::other(ctx, other));
    }

    fn on_trigger_exit(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        log::info!("{} exited trigger {}", ctx.name(), Self::other(ctx, other));
    }
}

impl RegisteredBehavior for ContactLogger {
    const TYPE_NAME: &'static str = "ContactLogger";
    const MODULE: &'static str = "demo";

    fn create() -> Self {
        Self
    }
}

/// Switches to another scene after a number of frames, or when Enter is
/// pressed
#[derive(Debug, Default)]
pub struct SceneSwitcher {
    target: String,
    after_frames: i64,
    elapsed: i64,
}

impl Behavior for SceneSwitcher {
    fn update(&mut self, ctx: &mut BehaviorContext<'_>, _dt: f32) {
        self.elapsed += 1;
        let timed_out = self.after_frames > 0 && self.elapsed == self.after_frames;
        if timed_out || ctx.input().get_key_down(KeyCode::Enter) {
            log::info!("Switching to '{}' after {} frames", self.target, self.elapsed);
            ctx.request_scene(self.target.as_str());
        }
    }
}

impl RegisteredBehavior for SceneSwitcher {
    const TYPE_NAME: &'static str = "SceneSwitcher";
    const MODULE: &'static str = "demo";

    fn create() -> Self {
        Self::default()
    }

    fn schema() -> FieldSchema<Self> {
        FieldSchema::<Self>::new(Self::TYPE_NAME)
            .text("target", |s, v| s.target = v)
            .int("after_frames", |s, v| s.after_frames = v)
    }
}

/// Registry with the engine built-ins and the demo behaviors
pub fn registry() -> BehaviorRegistry {
    let mut registry = BehaviorRegistry::with_builtins();
    registry
        .register::<Mover>()
        .register::<Spinner>()
        .register::<ContactLogger>()
        .register::<SceneSwitcher>();
    registry
}
