//! Scene manager
//!
//! Owns the active world and drives it:
//!
//! ```text
//! Unloaded --load_scene--> Loading --instantiated--> Active --load_scene--> Loading ...
//! ```
//!
//! Each [`tick`](SceneManager::tick) runs one frame:
//!
//! 1. sample the clock and feed the fixed-step accumulator
//! 2. `on_frame_start` for every registered kind
//! 3. variable-rate update pass (materials applied, then `update`)
//! 4. zero or more fixed passes (`fixed_update`)
//! 5. collision pass (detection, then enter/stay/exit dispatch)
//! 6. `on_frame_end` for every registered kind
//! 7. a scene change requested by a behavior during the frame, if any

use std::time::Duration;

use crate::core::{EngineConfig, ExecutionMode};
use crate::ecs::components::Camera;
use crate::ecs::{
    Behavior, BehaviorRegistry, DispatchFilter, EntityId, FrameHookContext, FrameInfo, PassEntry,
    World,
};
use crate::foundation::time::{Clock, FixedTimestep, SystemClock};
use crate::input::InputState;
use crate::physics::{
    ColliderKind, ColliderRef, ColliderSample, CollisionEvent, CollisionWorld, ContactKind,
    ContactPhase,
};
use crate::render::{MaterialHandle, MaterialLibrary, RenderView};
use crate::scene::{
    EntityNode, HierarchyTree, LoadReport, LoadWarning, SceneError, SceneEntry, SceneInfo,
    SceneRef, SceneSource,
};

/// Lifecycle state of the scene manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneState {
    /// No scene has been loaded yet
    Unloaded,
    /// A scene is being instantiated
    Loading(SceneInfo),
    /// A scene is loaded and ticking
    Active(SceneInfo),
}

/// What happened during one tick
#[derive(Debug, Default)]
pub struct FrameStats {
    /// Frame counter
    pub frame: u64,
    /// Seconds since the previous tick
    pub delta: f32,
    /// Fixed passes run this tick
    pub fixed_steps: u32,
    /// Collision events delivered this tick
    pub collision_events: usize,
    /// Result of a scene change requested during the tick
    pub scene_change: Option<Result<LoadReport, SceneError>>,
}

/// Loads scenes and runs the frame loop over the active one
pub struct SceneManager {
    mode: ExecutionMode,
    default_material: String,
    source: Box<dyn SceneSource>,
    scenes: Vec<SceneEntry>,
    registry: BehaviorRegistry,
    materials: MaterialLibrary,
    world: World,
    collisions: CollisionWorld,
    state: SceneState,
    clock: Box<dyn Clock>,
    last_sample: Duration,
    timestep: FixedTimestep,
    frame: u64,
    active_camera: Option<(EntityId, usize)>,
    aspect_ratio: f32,
    editor_view: RenderView,
    pending_scene: Option<SceneRef>,
}

impl SceneManager {
    /// Create a scene manager and discover the source's scenes. No scene is
    /// loaded yet.
    pub fn new(
        config: &EngineConfig,
        source: Box<dyn SceneSource>,
        registry: BehaviorRegistry,
    ) -> Result<Self, SceneError> {
        let scenes = source.discover()?;
        log::info!(
            "Scene manager ready: {} scenes, {} behavior types, {:?} mode",
            scenes.len(),
            registry.iter().count(),
            config.execution_mode
        );

        let clock: Box<dyn Clock> = Box::new(SystemClock::new());
        Ok(Self {
            mode: config.execution_mode,
            default_material: config.default_material.clone(),
            source,
            scenes,
            registry,
            materials: MaterialLibrary::new(),
            world: World::new(),
            collisions: CollisionWorld::new(),
            state: SceneState::Unloaded,
            last_sample: clock.now(),
            clock,
            timestep: FixedTimestep::from_hz(config.fixed_update_hz),
            frame: 0,
            active_camera: None,
            aspect_ratio: 16.0 / 9.0,
            editor_view: RenderView::default(),
            pending_scene: None,
        })
    }

    /// Builder pattern: Replace the time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.last_sample = clock.now();
        self.clock = Box::new(clock);
        self
    }

    /// Builder pattern: Replace the material table
    pub fn with_materials(mut self, materials: MaterialLibrary) -> Self {
        self.materials = materials;
        self
    }

    //--- Accessors -----------------------------------------------------------

    /// Lifecycle state
    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// The active scene, if any
    pub fn active_scene(&self) -> Option<&SceneInfo> {
        match &self.state {
            SceneState::Active(info) => Some(info),
            _ => None,
        }
    }

    /// Discovered scene names in index order
    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.iter().map(|e| e.name.as_str())
    }

    /// Number of discovered scenes
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Runtime or editor
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// The active world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The active world, mutably
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Collision buffers
    pub fn collisions(&self) -> &CollisionWorld {
        &self.collisions
    }

    /// Behavior registry
    pub fn registry(&self) -> &BehaviorRegistry {
        &self.registry
    }

    /// Behavior registry, mutably (register kinds before loading scenes)
    pub fn registry_mut(&mut self) -> &mut BehaviorRegistry {
        &mut self.registry
    }

    /// Material table
    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    /// Entity and slot of the active camera
    pub fn active_camera(&self) -> Option<(EntityId, usize)> {
        self.active_camera
    }

    /// Frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Set the window size used for the camera projection
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    /// View used in editor mode, supplied by the editor's own camera
    pub fn set_editor_view(&mut self, view: RenderView) {
        self.editor_view = view;
    }

    /// Active entities carrying an enabled behavior of type `T`
    pub fn get_objects_with_component<T: Behavior>(&self) -> Vec<EntityId> {
        self.world.get_objects_with_component::<T>()
    }

    /// Parent/child tree of the active entities
    pub fn get_by_hierarchy(&self) -> HierarchyTree {
        self.world.hierarchy()
    }

    /// Ask for a scene change after the current (or next) tick completes
    pub fn request_scene(&mut self, scene: impl Into<SceneRef>) {
        self.pending_scene = Some(scene.into());
    }

    //--- Loading -------------------------------------------------------------

    /// Replace the active scene.
    ///
    /// An unknown scene or a document that fails to parse is reported
    /// before anything is touched, leaving the current scene active.
    pub fn load_scene(&mut self, scene: impl Into<SceneRef>) -> Result<LoadReport, SceneError> {
        let scene = scene.into();
        let Some(index) = self.scene_index(&scene) else {
            log::error!("Cannot load scene {scene}: no such scene");
            return Err(SceneError::NotFound(scene));
        };
        let entry = self.scenes[index].clone();
        let document = self.source.resolve_scene(&entry).map_err(|err| {
            log::error!("Cannot load scene {scene}: {err}");
            err
        })?;
        let info = SceneInfo::new(entry.name, index);

        if let SceneState::Active(previous) = self.state.clone() {
            if !self.mode.is_editor() {
                self.dispatch_scene_hook(&previous, |b, ctx, scene| b.on_scene_unload(ctx, scene));
            }
        }

        self.state = SceneState::Loading(info.clone());
        self.world.clear();
        self.collisions.clear();
        self.active_camera = None;

        let mut warnings = Vec::new();
        let mut flat = Vec::with_capacity(document.node_count());
        for node in &document.objects {
            self.instantiate(node, None, &mut flat, &mut warnings);
        }
        flat.reverse();
        let entities = flat.len();
        self.world.set_order(flat);
        self.state = SceneState::Active(info.clone());

        if !self.mode.is_editor() {
            self.dispatch_scene_hook(&info, |b, ctx, scene| b.on_scene_load(ctx, scene));
        }

        log::info!(
            "Loaded scene {info}: {entities} entities, {} warnings",
            warnings.len()
        );
        Ok(LoadReport {
            scene: info,
            entities,
            warnings,
        })
    }

    fn scene_index(&self, scene: &SceneRef) -> Option<usize> {
        match scene {
            SceneRef::Index(index) => (*index < self.scenes.len()).then_some(*index),
            SceneRef::Name(name) => self.scenes.iter().position(|e| e.name == *name),
        }
    }

    fn instantiate(
        &mut self,
        node: &EntityNode,
        parent: Option<EntityId>,
        flat: &mut Vec<EntityId>,
        warnings: &mut Vec<LoadWarning>,
    ) {
        let transform = node.transform();
        let id = match parent {
            Some(parent) => match self.world.insert_child(&node.name, transform.clone(), parent) {
                Ok(id) => id,
                Err(err) => {
                    log::error!("{}: {err}; attached at the root instead", node.name);
                    self.world.insert(&node.name, transform)
                }
            },
            None => self.world.insert(&node.name, transform),
        };

        let material = self.resolve_material(node, warnings);
        let mut camera_slot = None;
        if let Some(entity) = self.world.entity_mut(id) {
            entity.set_material(material);

            for desc in &node.components {
                let registration = match self.registry.resolve(desc.module.as_deref(), &desc.type_name) {
                    Ok(registration) => registration,
                    Err(source) => {
                        log::warn!("{}: {source}; component skipped", node.name);
                        warnings.push(LoadWarning::UnresolvedBehavior {
                            entity: node.name.clone(),
                            source,
                        });
                        continue;
                    }
                };

                let built = registration.build(&desc.fields);
                for source in built.rejected {
                    log::warn!("{}: {source}", node.name);
                    warnings.push(LoadWarning::RejectedField {
                        entity: node.name.clone(),
                        source,
                    });
                }

                let slot = entity.add_boxed_component(built.behavior);
                if let (Some(active), Some(component)) = (&desc.active, entity.component_slot_mut(slot)) {
                    if let Err(source) = component.set_enabled_value(active) {
                        warnings.push(LoadWarning::InvalidActiveFlag {
                            entity: node.name.clone(),
                            source,
                        });
                    }
                }

                if camera_slot.is_none() {
                    camera_slot = entity
                        .component_slot(slot)
                        .filter(|c| c.is_enabled() && c.is::<Camera>())
                        .map(|_| slot);
                }
            }
        }

        if self.active_camera.is_none() {
            if let Some(slot) = camera_slot {
                log::debug!("Active camera: {}", node.name);
                self.active_camera = Some((id, slot));
            }
        }

        for child in &node.children {
            self.instantiate(child, Some(id), flat, warnings);
        }
        flat.push(id);
    }

    fn resolve_material(
        &self,
        node: &EntityNode,
        warnings: &mut Vec<LoadWarning>,
    ) -> Option<MaterialHandle> {
        if let Some(name) = &node.material {
            if let Some(material) = self.materials.get(name) {
                return Some(material);
            }
            log::warn!("{}: unknown material '{name}', using '{}'", node.name, self.default_material);
            warnings.push(LoadWarning::UnknownMaterial {
                entity: node.name.clone(),
                material: name.clone(),
            });
        }

        let fallback = self.materials.get(&self.default_material);
        if fallback.is_none() && !self.materials.is_empty() {
            log::warn!(
                "{}: default material '{}' is not registered",
                node.name,
                self.default_material
            );
            warnings.push(LoadWarning::MissingDefaultMaterial {
                entity: node.name.clone(),
                material: self.default_material.clone(),
            });
        }
        fallback
    }

    fn dispatch_scene_hook<F>(&mut self, scene: &SceneInfo, mut hook: F)
    where
        F: FnMut(&mut dyn Behavior, &mut crate::ecs::BehaviorContext<'_>, &SceneInfo),
    {
        let input = InputState::default();
        let frame = self.frame_info(0.0, &input, RenderView::default());
        let mut request = self.pending_scene.take();
        for entry in self.world.snapshot_pass(DispatchFilter::All, false) {
            self.world
                .dispatch(&entry, &frame, &mut request, |b, ctx| hook(b, ctx, scene));
        }
        self.pending_scene = request;
    }

    //--- Frame loop ----------------------------------------------------------

    /// Run one frame
    pub fn tick(&mut self, input: &InputState) -> FrameStats {
        let now = self.clock.now();
        let elapsed = now.saturating_sub(self.last_sample);
        self.last_sample = now;
        self.timestep.accumulate(elapsed);
        self.frame += 1;

        let mut stats = FrameStats {
            frame: self.frame,
            delta: elapsed.as_secs_f32(),
            ..Default::default()
        };

        self.registry.frame_start(&mut FrameHookContext {
            frame: self.frame,
            collisions: &mut self.collisions,
        });

        let view = self.current_view();
        let frame = self.frame_info(stats.delta, input, view);
        let mut request = self.pending_scene.take();

        self.update_pass(&frame, &mut request);

        while self.timestep.try_step() {
            for entry in self.world.snapshot_pass(DispatchFilter::Enabled, false) {
                self.world
                    .dispatch(&entry, &frame, &mut request, |b, ctx| b.fixed_update(ctx));
            }
            stats.fixed_steps += 1;
        }

        stats.collision_events = self.collision_pass(&frame, &mut request);

        self.registry.frame_end(&mut FrameHookContext {
            frame: self.frame,
            collisions: &mut self.collisions,
        });

        if let Some(scene) = request {
            log::debug!("Applying scene change to {scene}");
            stats.scene_change = Some(self.load_scene(scene));
        }
        stats
    }

    fn frame_info<'a>(&self, delta: f32, input: &'a InputState, view: RenderView) -> FrameInfo<'a> {
        FrameInfo {
            frame: self.frame,
            delta,
            fixed_delta: self.timestep.step().as_secs_f32(),
            mode: self.mode,
            input,
            view,
        }
    }

    fn update_pass(&mut self, frame: &FrameInfo<'_>, request: &mut Option<SceneRef>) {
        let delta = frame.delta;
        for entry in self.world.snapshot_pass(DispatchFilter::Update(self.mode), true) {
            if let Some(material) = self.world.entity(entry.entity).and_then(|e| e.material()) {
                material.apply(&frame.view.view, &frame.view.projection);
            }
            self.world
                .dispatch(&entry, frame, request, |b, ctx| b.update(ctx, delta));
        }
    }

    fn current_view(&self) -> RenderView {
        if self.mode.is_editor() {
            return self.editor_view;
        }
        let camera = self.active_camera.and_then(|(id, slot)| {
            let entity = self.world.entity(id)?;
            let camera = entity.component_slot(slot)?.downcast_ref::<Camera>()?;
            let position = self.world.world_position(id)?;
            let rotation = self.world.world_rotation(id)?;
            Some(camera.render_view(&position, &rotation, self.aspect_ratio))
        });
        camera.unwrap_or_else(|| RenderView::fallback(self.aspect_ratio))
    }

    fn collect_colliders(&self) -> Vec<(ColliderKind, ColliderSample)> {
        let mut samples = Vec::new();
        for entity in self.world.iter().filter(|e| e.is_enabled()) {
            let Some(position) = self.world.world_position(entity.id()) else {
                continue;
            };
            for (slot, component) in entity.components().iter().enumerate() {
                if !component.is_enabled() {
                    continue;
                }
                if let Some(collider) = component.behavior().as_collider() {
                    samples.push((
                        collider.collider_kind(),
                        ColliderSample {
                            collider: ColliderRef {
                                entity: entity.id(),
                                slot,
                            },
                            bounds: collider.bounds(&position),
                            trigger: collider.is_trigger(),
                        },
                    ));
                }
            }
        }
        samples
    }

    fn collision_pass(&mut self, frame: &FrameInfo<'_>, request: &mut Option<SceneRef>) -> usize {
        let samples = self.collect_colliders();

        let mut kinds = self.collisions.kinds();
        for &(kind, _) in &samples {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        let mut events = Vec::new();
        for kind in kinds {
            let of_kind: Vec<ColliderSample> = samples
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, sample)| *sample)
                .collect();
            self.collisions.detect(kind, self.frame, &of_kind);
            events.extend(self.collisions.events(kind));
        }

        for event in &events {
            self.deliver(event, frame, request);
        }
        events.len()
    }

    fn deliver(&mut self, event: &CollisionEvent, frame: &FrameInfo<'_>, request: &mut Option<SceneRef>) {
        let (a, b) = (event.pair.a.entity, event.pair.b.entity);
        for (target, other) in [(a, b), (b, a)] {
            let Some(entry) = PassEntry::all(&self.world, target) else {
                continue;
            };
            let (contact, phase) = (event.contact, event.phase);
            self.world.dispatch(&entry, frame, request, |behavior, ctx| {
                match (contact, phase) {
                    (ContactKind::Solid, ContactPhase::Enter) => behavior.on_collision_start(ctx, other),
                    (ContactKind::Solid, ContactPhase::Stay) => behavior.on_collision(ctx, other),
                    (ContactKind::Solid, ContactPhase::Exit) => behavior.on_collision_exit(ctx, other),
                    (ContactKind::Trigger, ContactPhase::Enter) => behavior.on_trigger_start(ctx, other),
                    (ContactKind::Trigger, ContactPhase::Stay) => behavior.on_trigger(ctx, other),
                    (ContactKind::Trigger, ContactPhase::Exit) => behavior.on_trigger_exit(ctx, other),
                }
            });
        }
    }
}
