//! Behavior registry
//!
//! Scene documents name behaviors by `(module, type)`. The registry maps
//! those names to factories populated at startup, so a missing kind is found
//! while loading the scene rather than at first use.

use std::collections::BTreeMap;

use crate::ecs::components::{Camera, CubeCollider};
use crate::ecs::{Behavior, FieldError, FieldSchema, FieldType, FieldValue, FrameHookContext};

/// Module name used when a registration does not specify one
pub const DEFAULT_MODULE: &str = "core";

/// A behavior kind that can be created from a scene document
pub trait RegisteredBehavior: Behavior + Sized {
    /// Type identifier used in scene documents
    const TYPE_NAME: &'static str;

    /// Module namespace of the type identifier
    const MODULE: &'static str = DEFAULT_MODULE;

    /// Instance with default field values
    fn create() -> Self;

    /// Fields a scene document may set
    fn schema() -> FieldSchema<Self> {
        FieldSchema::<Self>::new(Self::TYPE_NAME)
    }

    /// Runs once per frame for this kind before any behavior updates
    fn on_frame_start(_ctx: &mut FrameHookContext<'_>) {}

    /// Runs once per frame for this kind after the collision pass
    fn on_frame_end(_ctx: &mut FrameHookContext<'_>) {}
}

/// Result of building a behavior from document fields
pub struct BuiltBehavior {
    /// The new behavior
    pub behavior: Box<dyn Behavior>,
    /// Fields that could not be applied; the rest were
    pub rejected: Vec<FieldError>,
}

/// Factory and hooks for one registered kind
#[derive(Clone)]
pub struct BehaviorRegistration {
    type_name: &'static str,
    module: &'static str,
    fields: Vec<(&'static str, FieldType)>,
    build: fn(&BTreeMap<String, FieldValue>) -> BuiltBehavior,
    frame_start: fn(&mut FrameHookContext<'_>),
    frame_end: fn(&mut FrameHookContext<'_>),
}

impl BehaviorRegistration {
    fn of<T: RegisteredBehavior>() -> Self {
        Self {
            type_name: T::TYPE_NAME,
            module: T::MODULE,
            fields: T::schema().descriptors(),
            build: build_registered::<T>,
            frame_start: T::on_frame_start,
            frame_end: T::on_frame_end,
        }
    }

    /// Type identifier
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Module namespace
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Declared fields
    pub fn fields(&self) -> &[(&'static str, FieldType)] {
        &self.fields
    }

    /// Create an instance and apply `fields` to it
    pub fn build(&self, fields: &BTreeMap<String, FieldValue>) -> BuiltBehavior {
        (self.build)(fields)
    }
}

fn build_registered<T: RegisteredBehavior>(fields: &BTreeMap<String, FieldValue>) -> BuiltBehavior {
    let mut behavior = T::create();
    let schema = T::schema();
    let rejected = fields
        .iter()
        .filter_map(|(name, value)| schema.apply(&mut behavior, name, value).err())
        .collect();
    BuiltBehavior {
        behavior: Box::new(behavior),
        rejected,
    }
}

/// Lookup failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No kind with this type identifier is registered
    #[error("unknown behavior type '{type_name}'")]
    UnknownType {
        /// Requested type identifier
        type_name: String,
    },

    /// The type exists but under another module
    #[error("behavior type '{type_name}' is registered in module '{registered}', not '{requested}'")]
    WrongModule {
        /// Requested type identifier
        type_name: String,
        /// Module named by the document
        requested: String,
        /// Module the type was registered under
        registered: &'static str,
    },

    /// No module was given and the type exists in several
    #[error("behavior type '{type_name}' is ambiguous, registered in modules {modules:?}")]
    Ambiguous {
        /// Requested type identifier
        type_name: String,
        /// Every module registering the type
        modules: Vec<&'static str>,
    },
}

/// Type identifier to factory table
#[derive(Clone, Default)]
pub struct BehaviorRegistry {
    entries: Vec<BehaviorRegistration>,
}

impl BehaviorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the engine's built-in kinds (`CubeCollider`, `Camera`)
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<CubeCollider>();
        registry.register::<Camera>();
        registry
    }

    /// Register `T`. Registering the same `(module, type)` pair again
    /// replaces the earlier entry; the same type identifier in another module
    /// is a separate kind.
    pub fn register<T: RegisteredBehavior>(&mut self) -> &mut Self {
        let registration = BehaviorRegistration::of::<T>();
        let existing = self
            .entries
            .iter_mut()
            .find(|e| e.module == T::MODULE && e.type_name == T::TYPE_NAME);
        match existing {
            Some(existing) => {
                log::warn!(
                    "Behavior type '{}::{}' registered twice, replacing",
                    T::MODULE,
                    T::TYPE_NAME
                );
                *existing = registration;
            }
            None => {
                log::debug!("Registered behavior type '{}::{}'", T::MODULE, T::TYPE_NAME);
                self.entries.push(registration);
            }
        }
        self
    }

    /// Find the factory for a document's `(module, type)` pair. Without a
    /// module the type identifier must be registered in exactly one module.
    pub fn resolve(
        &self,
        module: Option<&str>,
        type_name: &str,
    ) -> Result<&BehaviorRegistration, RegistryError> {
        let mut candidates = self.entries.iter().filter(|e| e.type_name == type_name);

        if let Some(requested) = module {
            return match candidates.clone().find(|e| e.module == requested) {
                Some(entry) => Ok(entry),
                None => match candidates.next() {
                    Some(other) => Err(RegistryError::WrongModule {
                        type_name: type_name.to_string(),
                        requested: requested.to_string(),
                        registered: other.module,
                    }),
                    None => Err(RegistryError::UnknownType {
                        type_name: type_name.to_string(),
                    }),
                },
            };
        }

        let entry = candidates.next().ok_or_else(|| RegistryError::UnknownType {
            type_name: type_name.to_string(),
        })?;
        if candidates.next().is_some() {
            return Err(RegistryError::Ambiguous {
                type_name: type_name.to_string(),
                modules: self.modules_of(type_name),
            });
        }
        Ok(entry)
    }

    fn modules_of(&self, type_name: &str) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| e.type_name == type_name)
            .map(|e| e.module)
            .collect()
    }

    /// Whether a type identifier is registered in any module
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.iter().any(|e| e.type_name == type_name)
    }

    /// Registrations in registration order
    pub fn iter(&self) -> impl Iterator<Item = &BehaviorRegistration> {
        self.entries.iter()
    }

    /// Run every kind's `on_frame_start`
    pub fn frame_start(&self, ctx: &mut FrameHookContext<'_>) {
        for entry in &self.entries {
            (entry.frame_start)(ctx);
        }
    }

    /// Run every kind's `on_frame_end`
    pub fn frame_end(&self, ctx: &mut FrameHookContext<'_>) {
        for entry in &self.entries {
            (entry.frame_end)(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::CollisionWorld;
    use std::cell::Cell;

    thread_local! {
        static FRAME_STARTS: Cell<u32> = const { Cell::new(0) };
    }

    #[derive(Debug, Default)]
    struct Spinner {
        speed: f32,
        label: String,
    }

    impl Behavior for Spinner {}

    impl RegisteredBehavior for Spinner {
        const TYPE_NAME: &'static str = "Spinner";
        const MODULE: &'static str = "game";

        fn create() -> Self {
            Self { speed: 1.0, label: String::new() }
        }

        fn schema() -> FieldSchema<Self> {
            FieldSchema::<Self>::new(Self::TYPE_NAME)
                .float("speed", |s, v| s.speed = v)
                .text("label", |s, v| s.label = v)
        }

        fn on_frame_start(_ctx: &mut FrameHookContext<'_>) {
            FRAME_STARTS.with(|c| c.set(c.get() + 1));
        }
    }

    fn fields(pairs: &[(&str, FieldValue)]) -> BTreeMap<String, FieldValue> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_build_applies_fields_and_reports_rejects() {
        let mut registry = BehaviorRegistry::new();
        registry.register::<Spinner>();

        let built = registry.resolve(Some("game"), "Spinner").unwrap().build(&fields(&[
            ("speed", FieldValue::Float(3.0)),
            ("label", FieldValue::Int(2)),
            ("colour", FieldValue::Text("red".into())),
        ]));

        assert_eq!(built.rejected.len(), 2);
        let behavior: &dyn Behavior = built.behavior.as_ref();
        let spinner = behavior.as_any().downcast_ref::<Spinner>().unwrap();
        assert_eq!(spinner.speed, 3.0);
        assert_eq!(spinner.label, "");
    }

    #[test]
    fn test_resolve_checks_module() {
        let mut registry = BehaviorRegistry::new();
        registry.register::<Spinner>();

        assert!(registry.resolve(None, "Spinner").is_ok());
        assert!(matches!(
            registry.resolve(Some("core"), "Spinner"),
            Err(RegistryError::WrongModule { registered: "game", .. })
        ));
        assert!(matches!(
            registry.resolve(None, "Missing"),
            Err(RegistryError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_duplicate_registration_replaces() {
        let mut registry = BehaviorRegistry::new();
        registry.register::<Spinner>().register::<Spinner>();
        assert_eq!(registry.iter().count(), 1);
    }

    #[derive(Debug, Default)]
    struct DemoSpinner {
        turns: i64,
    }

    impl Behavior for DemoSpinner {}

    impl RegisteredBehavior for DemoSpinner {
        const TYPE_NAME: &'static str = "Spinner";
        const MODULE: &'static str = "demo";

        fn create() -> Self {
            Self::default()
        }

        fn schema() -> FieldSchema<Self> {
            FieldSchema::<Self>::new(Self::TYPE_NAME).int("turns", |s, v| s.turns = v)
        }
    }

    #[test]
    fn test_same_type_name_in_two_modules() {
        let mut registry = BehaviorRegistry::new();
        registry.register::<Spinner>().register::<DemoSpinner>();
        assert_eq!(registry.iter().count(), 2);

        let game = registry.resolve(Some("game"), "Spinner").unwrap();
        assert_eq!(game.module(), "game");
        let demo = registry.resolve(Some("demo"), "Spinner").unwrap();
        assert_eq!(demo.module(), "demo");

        let built = demo.build(&fields(&[("turns", FieldValue::Int(4))]));
        assert!(built.rejected.is_empty());
        let behavior: &dyn Behavior = built.behavior.as_ref();
        assert_eq!(behavior.as_any().downcast_ref::<DemoSpinner>().unwrap().turns, 4);

        match registry.resolve(None, "Spinner") {
            Err(RegistryError::Ambiguous { modules, .. }) => assert_eq!(modules, ["game", "demo"]),
            _ => panic!("expected an ambiguous lookup"),
        }
        assert!(matches!(
            registry.resolve(Some("core"), "Spinner"),
            Err(RegistryError::WrongModule { .. })
        ));
    }

    #[test]
    fn test_frame_hooks_run_once_per_kind() {
        let mut registry = BehaviorRegistry::with_builtins();
        registry.register::<Spinner>();
        let mut collisions = CollisionWorld::new();

        FRAME_STARTS.with(|c| c.set(0));
        registry.frame_start(&mut FrameHookContext { frame: 1, collisions: &mut collisions });
        assert_eq!(FRAME_STARTS.with(Cell::get), 1);
    }

    #[test]
    fn test_builtins_expose_field_descriptors() {
        let registry = BehaviorRegistry::with_builtins();
        let collider = registry.resolve(None, CubeCollider::TYPE_NAME).unwrap();
        let names: Vec<_> = collider.fields().iter().map(|(n, _)| *n).collect();
        assert!(names.contains(&"trigger_collider"));
        assert!(registry.contains(Camera::TYPE_NAME));
    }
}
