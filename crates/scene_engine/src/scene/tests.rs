//! Scenario tests driving the scene manager through whole frames

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::core::{EngineConfig, ExecutionMode};
use crate::ecs::components::{Camera, CubeCollider};
use crate::ecs::{Behavior, BehaviorContext, BehaviorRegistry, EntityId, FieldSchema, RegisteredBehavior};
use crate::foundation::math::{Mat4, Vec3};
use crate::foundation::time::ManualClock;
use crate::input::InputState;
use crate::render::{Material, MaterialLibrary};
use crate::scene::{
    ComponentDesc, EntityNode, LoadWarning, MemorySceneSource, SceneDocument, SceneError,
    SceneInfo, SceneManager, SceneRef, SceneState,
};

thread_local! {
    static EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn record(event: String) {
    EVENTS.with(|e| e.borrow_mut().push(event));
}

fn take_events() -> Vec<String> {
    EVENTS.with(|e| std::mem::take(&mut *e.borrow_mut()))
}

fn take_matching(needle: &str) -> Vec<String> {
    take_events().into_iter().filter(|e| e.contains(needle)).collect()
}

fn other_name(ctx: &BehaviorContext<'_>, other: EntityId) -> String {
    ctx.world()
        .entity(other)
        .map_or_else(|| "?".to_string(), |e| e.name().to_string())
}

/// Writes every hook it receives to the event log
#[derive(Default)]
struct Recorder {
    label: String,
}

impl Recorder {
    fn log(&self, event: &str) {
        record(format!("{}:{event}", self.label));
    }
}

impl Behavior for Recorder {
    fn update(&mut self, _ctx: &mut BehaviorContext<'_>, _dt: f32) {
        self.log("update");
    }

    fn fixed_update(&mut self, _ctx: &mut BehaviorContext<'_>) {
        self.log("fixed");
    }

    fn on_scene_load(&mut self, _ctx: &mut BehaviorContext<'_>, scene: &SceneInfo) {
        self.log(&format!("load:{}", scene.name()));
    }

    fn on_scene_unload(&mut self, _ctx: &mut BehaviorContext<'_>, scene: &SceneInfo) {
        self.log(&format!("unload:{}", scene.name()));
    }

    fn on_collision_start(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        self.log(&format!("collision_start:{}", other_name(ctx, other)));
    }

    fn on_collision(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        self.log(&format!("collision:{}", other_name(ctx, other)));
    }

    fn on_collision_exit(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        self.log(&format!("collision_exit:{}", other_name(ctx, other)));
    }

    fn on_trigger_start(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        self.log(&format!("trigger_start:{}", other_name(ctx, other)));
    }

    fn on_trigger(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        self.log(&format!("trigger:{}", other_name(ctx, other)));
    }

    fn on_trigger_exit(&mut self, ctx: &mut BehaviorContext<'_>, other: EntityId) {
        self.log(&format!("trigger_exit:{}", other_name(ctx, other)));
    }
}

impl RegisteredBehavior for Recorder {
    const TYPE_NAME: &'static str = "Recorder";
    const MODULE: &'static str = "test";

    fn create() -> Self {
        Self::default()
    }

    fn schema() -> FieldSchema<Self> {
        FieldSchema::<Self>::new(Self::TYPE_NAME).text("label", |r, v| r.label = v)
    }
}

/// Updates in editor mode too
#[derive(Default)]
struct EditorWatcher {
    label: String,
}

impl Behavior for EditorWatcher {
    fn runs_in_editor(&self) -> bool {
        true
    }

    fn update(&mut self, _ctx: &mut BehaviorContext<'_>, _dt: f32) {
        record(format!("{}:editor_update", self.label));
    }
}

impl RegisteredBehavior for EditorWatcher {
    const TYPE_NAME: &'static str = "EditorWatcher";

    fn create() -> Self {
        Self::default()
    }

    fn schema() -> FieldSchema<Self> {
        FieldSchema::<Self>::new(Self::TYPE_NAME).text("label", |p, v| p.label = v)
    }
}

/// Requests a scene change on its first update
#[derive(Default)]
struct Switcher {
    target: String,
    sent: bool,
}

impl Behavior for Switcher {
    fn update(&mut self, ctx: &mut BehaviorContext<'_>, _dt: f32) {
        if !self.sent {
            ctx.request_scene(self.target.as_str());
            self.sent = true;
        }
    }
}

impl RegisteredBehavior for Switcher {
    const TYPE_NAME: &'static str = "Switcher";

    fn create() -> Self {
        Self::default()
    }

    fn schema() -> FieldSchema<Self> {
        FieldSchema::<Self>::new(Self::TYPE_NAME).text("target", |s, v| s.target = v)
    }
}

#[derive(Default)]
struct CountingMaterial {
    applied: Cell<u32>,
}

impl Material for CountingMaterial {
    fn apply(&self, _view: &Mat4, _projection: &Mat4) {
        self.applied.set(self.applied.get() + 1);
    }
}

fn recorder(label: &str) -> ComponentDesc {
    ComponentDesc::new("Recorder").with_field("label", label)
}

fn recorded(name: &str, pos: [f32; 3]) -> EntityNode {
    EntityNode::new(name, pos).with_component(recorder(name))
}

fn collider_node(name: &str, x: f32, trigger: bool) -> EntityNode {
    EntityNode::new(name, [x, 0.0, 0.0])
        .with_component(ComponentDesc::new("CubeCollider").with_field("trigger_collider", trigger))
        .with_component(recorder(name))
}

fn scene(objects: Vec<EntityNode>) -> SceneDocument {
    SceneDocument { objects }
}

fn manager_with(config: &EngineConfig, source: MemorySceneSource) -> (SceneManager, ManualClock) {
    take_events();
    let mut registry = BehaviorRegistry::with_builtins();
    registry
        .register::<Recorder>()
        .register::<EditorWatcher>()
        .register::<Switcher>();
    let clock = ManualClock::new();
    let manager = SceneManager::new(config, Box::new(source), registry)
        .unwrap()
        .with_clock(clock.clone());
    (manager, clock)
}

fn manager(source: MemorySceneSource) -> (SceneManager, ManualClock) {
    manager_with(&EngineConfig::default(), source)
}

fn move_to(manager: &mut SceneManager, name: &str, x: f32) {
    let id = manager.world().find_by_name(name).unwrap();
    manager
        .world_mut()
        .entity_mut(id)
        .unwrap()
        .transform_mut()
        .set_local_position(Vec3::new(x, 0.0, 0.0));
}

#[test]
fn test_unload_hooks_run_before_new_scene_loads() {
    let source = MemorySceneSource::new()
        .with_scene("first", scene(vec![recorded("a", [0.0; 3])]))
        .with_scene("second", scene(vec![recorded("b", [0.0; 3])]));
    let (mut manager, _clock) = manager(source);
    assert_eq!(manager.state(), &SceneState::Unloaded);

    manager.load_scene(0).unwrap();
    let old = manager.world().find_by_name("a").unwrap();
    assert_eq!(take_events(), ["a:load:first"]);

    let report = manager.load_scene("second").unwrap();
    assert_eq!(take_events(), ["a:unload:first", "b:load:second"]);
    assert_eq!(report.scene, SceneInfo::new("second", 1));
    assert_eq!(manager.active_scene().map(ToString::to_string).as_deref(), Some("second|1"));
    assert!(manager.world().entity(old).is_none());
}

#[test]
fn test_fixed_steps_follow_accumulated_time() {
    let source = MemorySceneSource::new().with_scene("s", scene(vec![recorded("a", [0.0; 3])]));
    let (mut manager, clock) = manager(source);
    manager.load_scene(0).unwrap();
    let input = InputState::default();

    clock.advance(Duration::from_millis(50));
    let stats = manager.tick(&input);
    assert_eq!(stats.fixed_steps, 2);
    assert_eq!(take_matching(":fixed").len(), 2);

    // 10ms left over plus 10ms makes one more step
    clock.advance(Duration::from_millis(10));
    assert_eq!(manager.tick(&input).fixed_steps, 1);

    clock.advance(Duration::from_millis(5));
    assert_eq!(manager.tick(&input).fixed_steps, 0);

    // A long stall is drained in full
    clock.advance(Duration::from_millis(205));
    assert_eq!(manager.tick(&input).fixed_steps, 10);
}

#[test]
fn test_fixed_steps_converge_to_elapsed_time() {
    let source = MemorySceneSource::new().with_scene("s", scene(Vec::new()));
    let (mut manager, clock) = manager(source);
    manager.load_scene(0).unwrap();
    let input = InputState::default();

    let mut steps = 0;
    for _ in 0..300 {
        clock.advance(Duration::from_micros(16_667));
        steps += manager.tick(&input).fixed_steps;
    }
    let expected = 300.0 * 0.016_667 * 50.0;
    assert!((f64::from(steps) - expected).abs() <= 1.0);
}

#[test]
fn test_collision_enter_stay_exit_sequence() {
    let source = MemorySceneSource::new().with_scene(
        "arena",
        scene(vec![collider_node("a", 0.0, false), collider_node("b", 5.0, false)]),
    );
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();
    let input = InputState::default();

    manager.tick(&input);
    assert!(take_matching("collision").is_empty());

    move_to(&mut manager, "b", 0.5);
    assert_eq!(manager.tick(&input).collision_events, 1);
    assert_eq!(take_matching("collision"), ["a:collision_start:b", "b:collision_start:a"]);

    manager.tick(&input);
    assert_eq!(take_matching("collision"), ["a:collision:b", "b:collision:a"]);

    move_to(&mut manager, "b", 5.0);
    manager.tick(&input);
    assert_eq!(take_matching("collision"), ["a:collision_exit:b", "b:collision_exit:a"]);

    manager.tick(&input);
    assert!(take_matching("collision").is_empty());
}

#[test]
fn test_touching_faces_count_as_overlap() {
    let source = MemorySceneSource::new().with_scene(
        "arena",
        scene(vec![collider_node("a", 0.0, false), collider_node("b", 1.0, false)]),
    );
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();

    manager.tick(&InputState::default());
    assert_eq!(take_matching("collision"), ["a:collision_start:b", "b:collision_start:a"]);
}

#[test]
fn test_trigger_contacts_use_trigger_hooks() {
    let source = MemorySceneSource::new().with_scene(
        "arena",
        scene(vec![collider_node("zone", 0.0, true), collider_node("player", 0.2, false)]),
    );
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();
    let input = InputState::default();

    manager.tick(&input);
    let events = take_events();
    assert!(events.iter().all(|e| !e.contains("collision")));
    assert_eq!(
        events.into_iter().filter(|e| e.contains("trigger")).collect::<Vec<_>>(),
        ["zone:trigger_start:player", "player:trigger_start:zone"]
    );

    manager.tick(&input);
    assert_eq!(take_matching("trigger"), ["zone:trigger:player", "player:trigger:zone"]);
}

#[test]
fn test_disabled_collider_leaves_contact() {
    let source = MemorySceneSource::new().with_scene(
        "arena",
        scene(vec![collider_node("a", 0.0, false), collider_node("b", 0.5, false)]),
    );
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();
    let input = InputState::default();

    manager.tick(&input);
    take_events();

    let b = manager.world().find_by_name("b").unwrap();
    manager.world_mut().entity_mut(b).unwrap().set_enabled(false);
    manager.tick(&input);
    assert_eq!(take_matching("collision"), ["a:collision_exit:b", "b:collision_exit:a"]);
}

#[test]
fn test_scene_reload_resets_contacts() {
    let source = MemorySceneSource::new().with_scene(
        "arena",
        scene(vec![collider_node("a", 0.0, false), collider_node("b", 0.5, false)]),
    );
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();
    let input = InputState::default();

    manager.tick(&input);
    manager.load_scene(0).unwrap();
    take_events();

    // Reused slots may reorder the pair, so compare as a set
    manager.tick(&input);
    let mut events = take_matching("collision");
    events.sort();
    assert_eq!(events, ["a:collision_start:b", "b:collision_start:a"]);
}

#[test]
fn test_non_boolean_active_flag_is_reported() {
    let source = MemorySceneSource::new().with_scene(
        "s",
        scene(vec![
            EntityNode::new("odd", [0.0; 3]).with_component(recorder("odd").with_active(1_i64)),
            EntityNode::new("off", [0.0; 3]).with_component(recorder("off").with_active(false)),
        ]),
    );
    let (mut manager, _clock) = manager(source);

    let report = manager.load_scene(0).unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        &report.warnings[0],
        LoadWarning::InvalidActiveFlag { entity, .. } if entity == "odd"
    ));

    take_events();
    manager.tick(&InputState::default());
    assert_eq!(take_matching("update"), ["odd:update"]);
}

#[test]
fn test_unknown_behavior_is_skipped() {
    let source = MemorySceneSource::new().with_scene(
        "s",
        scene(vec![EntityNode::new("e", [0.0; 3])
            .with_component(ComponentDesc::new("Ghost"))
            .with_component(recorder("e"))
            .with_component(ComponentDesc::new("Recorder").in_module("other"))]),
    );
    let (mut manager, _clock) = manager(source);

    let report = manager.load_scene(0).unwrap();
    assert_eq!(report.entities, 1);
    assert_eq!(report.warnings.len(), 2);
    assert!(report
        .warnings
        .iter()
        .all(|w| matches!(w, LoadWarning::UnresolvedBehavior { .. })));

    let id = manager.world().find_by_name("e").unwrap();
    assert_eq!(manager.world().entity(id).unwrap().components().len(), 1);
}

#[test]
fn test_rejected_field_keeps_component() {
    let source = MemorySceneSource::new().with_scene(
        "s",
        scene(vec![EntityNode::new("e", [0.0; 3]).with_component(
            ComponentDesc::new("CubeCollider")
                .with_field("trigger_collider", "yes")
                .with_field("scale_factor", Vec3::new(2.0, 2.0, 2.0)),
        )]),
    );
    let (mut manager, _clock) = manager(source);

    let report = manager.load_scene(0).unwrap();
    assert!(matches!(report.warnings.as_slice(), [LoadWarning::RejectedField { .. }]));

    let id = manager.world().find_by_name("e").unwrap();
    let collider = manager.world().entity(id).unwrap().get_component::<CubeCollider>().unwrap();
    assert_eq!(collider.scale_factor, Vec3::new(2.0, 2.0, 2.0));
    assert!(!collider.trigger);
}

#[test]
fn test_unknown_scene_leaves_active_scene() {
    let source = MemorySceneSource::new().with_scene("first", scene(vec![recorded("a", [0.0; 3])]));
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();
    take_events();

    assert!(matches!(
        manager.load_scene("nowhere"),
        Err(SceneError::NotFound(SceneRef::Name(_)))
    ));
    assert!(matches!(manager.load_scene(7), Err(SceneError::NotFound(SceneRef::Index(7)))));

    assert_eq!(manager.active_scene(), Some(&SceneInfo::new("first", 0)));
    assert!(manager.world().find_by_name("a").is_some());
    assert!(take_events().is_empty());
}

#[test]
fn test_malformed_scene_leaves_active_scene() {
    let source = MemorySceneSource::new()
        .with_scene("first", scene(vec![recorded("a", [0.0; 3])]))
        .with_ron("broken", "(objects: [(name: \"x\", pos: (0, 0, 0)");
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();
    take_events();

    assert!(matches!(manager.load_scene("broken"), Err(SceneError::Malformed { .. })));
    assert_eq!(manager.active_scene(), Some(&SceneInfo::new("first", 0)));
    assert_eq!(manager.world().len(), 1);
    assert!(take_events().is_empty());
}

#[test]
fn test_update_order_is_reversed_post_order() {
    let source = MemorySceneSource::new().with_scene(
        "s",
        scene(vec![
            recorded("r1", [0.0; 3])
                .with_child(recorded("c1", [0.0; 3]))
                .with_child(recorded("c2", [0.0; 3])),
            recorded("r2", [0.0; 3]),
        ]),
    );
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();

    let names: Vec<&str> = manager.world().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["r2", "r1", "c2", "c1"]);

    take_events();
    manager.tick(&InputState::default());
    assert_eq!(take_matching("update"), ["r2:update", "r1:update", "c2:update", "c1:update"]);
}

#[test]
fn test_children_are_parented_in_world_space() {
    let source = MemorySceneSource::new().with_scene(
        "s",
        scene(vec![EntityNode::new("root", [1.0, 0.0, 0.0])
            .with_child(EntityNode::new("mid", [0.0, 2.0, 0.0]).with_child(EntityNode::new("leaf", [0.0, 0.0, 3.0])))]),
    );
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();

    let world = manager.world();
    let leaf = world.find_by_name("leaf").unwrap();
    let mid = world.find_by_name("mid").unwrap();
    assert_eq!(world.parent_of(leaf), Some(mid));
    let position = world.world_position(leaf).unwrap();
    assert!((position - Vec3::new(1.0, 2.0, 3.0)).norm() < 1e-5);
}

#[test]
fn test_hierarchy_of_parentless_entities_is_flat() {
    let source = MemorySceneSource::new().with_scene(
        "s",
        scene(vec![
            EntityNode::new("a", [0.0; 3]),
            EntityNode::new("b", [0.0; 3]),
            EntityNode::new("c", [0.0; 3]).with_child(EntityNode::new("d", [0.0; 3])),
        ]),
    );
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();

    let tree = manager.get_by_hierarchy();
    assert_eq!(tree.children().len(), 3);
    assert_eq!(tree.len(), 4);
    let c = manager.world().find_by_name("c").unwrap();
    assert_eq!(tree.child(c).unwrap().children().len(), 1);
}

#[test]
fn test_get_objects_with_component() {
    let source = MemorySceneSource::new().with_scene(
        "s",
        scene(vec![
            collider_node("a", 0.0, false),
            recorded("plain", [0.0; 3]),
            collider_node("b", 9.0, false),
        ]),
    );
    let (mut manager, _clock) = manager(source);
    manager.load_scene(0).unwrap();

    let names: Vec<String> = manager
        .get_objects_with_component::<CubeCollider>()
        .into_iter()
        .map(|id| manager.world().entity(id).unwrap().name().to_string())
        .collect();
    assert_eq!(names, ["b", "a"]);
}

#[test]
fn test_scene_request_applies_after_frame() {
    let source = MemorySceneSource::new()
        .with_scene(
            "first",
            scene(vec![EntityNode::new("a", [0.0; 3])
                .with_component(ComponentDesc::new("Switcher").with_field("target", "second"))
                .with_component(recorder("a"))]),
        )
        .with_scene("second", scene(vec![recorded("b", [0.0; 3])]));
    let (mut manager, _clock) = manager(source);
    manager.load_scene("first").unwrap();
    take_events();

    let stats = manager.tick(&InputState::default());
    assert_eq!(take_events(), ["a:update", "a:unload:first", "b:load:second"]);
    assert!(matches!(stats.scene_change, Some(Ok(ref report)) if report.scene.name() == "second"));
    assert_eq!(manager.active_scene(), Some(&SceneInfo::new("second", 1)));
}

#[test]
fn test_editor_mode_skips_scene_hooks_and_runtime_updates() {
    let config = EngineConfig::default().with_execution_mode(ExecutionMode::Editor);
    let source = MemorySceneSource::new().with_scene(
        "s",
        scene(vec![EntityNode::new("e", [0.0; 3])
            .with_component(recorder("e"))
            .with_component(ComponentDesc::new("EditorWatcher").with_field("label", "e"))]),
    );
    let (mut manager, _clock) = manager_with(&config, source);

    manager.load_scene(0).unwrap();
    assert!(take_events().is_empty());

    manager.tick(&InputState::default());
    assert_eq!(take_events(), ["e:editor_update"]);
}

#[test]
fn test_materials_applied_for_enabled_entities() {
    let base = Rc::new(CountingMaterial::default());
    let metal = Rc::new(CountingMaterial::default());
    let mut materials = MaterialLibrary::new();
    materials.insert("base_mat", base.clone()).insert("metal", metal.clone());

    let source = MemorySceneSource::new().with_scene(
        "s",
        scene(vec![
            EntityNode::new("plain", [0.0; 3]),
            EntityNode::new("shiny", [0.0; 3]).with_material("metal"),
            EntityNode::new("odd", [0.0; 3]).with_material("velvet"),
        ]),
    );
    let (manager, _clock) = manager(source);
    let mut manager = manager.with_materials(materials);

    let report = manager.load_scene(0).unwrap();
    assert_eq!(
        report.warnings,
        [LoadWarning::UnknownMaterial {
            entity: "odd".to_string(),
            material: "velvet".to_string(),
        }]
    );

    let input = InputState::default();
    manager.tick(&input);
    assert_eq!((base.applied.get(), metal.applied.get()), (2, 1));

    let odd = manager.world().find_by_name("odd").unwrap();
    manager.world_mut().entity_mut(odd).unwrap().set_enabled(false);
    manager.tick(&input);
    assert_eq!((base.applied.get(), metal.applied.get()), (3, 2));
}

#[test]
fn test_first_enabled_camera_becomes_active() {
    let source = MemorySceneSource::new()
        .with_scene(
            "cams",
            scene(vec![
                EntityNode::new("off", [0.0; 3])
                    .with_component(ComponentDesc::new("Camera").with_active(false)),
                EntityNode::new("main", [0.0, 0.0, -5.0])
                    .with_component(recorder("main"))
                    .with_component(ComponentDesc::new("Camera").with_field("fov", 45.0)),
                EntityNode::new("spare", [0.0; 3]).with_component(ComponentDesc::new("Camera")),
            ]),
        )
        .with_scene("empty", scene(Vec::new()));
    let (mut manager, _clock) = manager(source);

    manager.load_scene("cams").unwrap();
    let main = manager.world().find_by_name("main").unwrap();
    assert_eq!(manager.active_camera(), Some((main, 1)));

    let camera = manager.world().entity(main).unwrap().get_component::<Camera>().unwrap();
    assert!((camera.fov - 45.0).abs() < f32::EPSILON);

    manager.load_scene("empty").unwrap();
    assert_eq!(manager.active_camera(), None);
}
