//! Entity / behavior model
//!
//! Entities live in a [`World`] and own a [`Transform`] plus an ordered list
//! of [`Behavior`]s. Behaviors are created from scene documents through the
//! [`BehaviorRegistry`] and configured through their [`FieldSchema`].

pub mod component;
pub mod components;
pub mod context;
pub mod entity;
pub mod fields;
pub mod registry;
pub mod transform;
pub mod world;

pub use component::{AsAny, Behavior, ComponentError, ComponentSlot};
pub use context::{BehaviorContext, FrameHookContext, FrameInfo, Siblings};
pub use entity::{Entity, EntityId};
pub use fields::{FieldError, FieldSchema, FieldType, FieldValue};
pub use registry::{
    BehaviorRegistration, BehaviorRegistry, BuiltBehavior, RegisteredBehavior, RegistryError,
    DEFAULT_MODULE,
};
pub use transform::{Transform, TransformLookup};
pub use world::{HierarchyError, World};

pub(crate) use world::{DispatchFilter, PassEntry};
