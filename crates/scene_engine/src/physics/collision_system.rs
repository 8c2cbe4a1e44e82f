//! Frame-scoped collision state
//!
//! A [`CollisionWorld`] keeps, per collider kind, the set of overlapping
//! pairs seen this frame and the set seen last frame, separately for solid
//! and trigger contacts. Comparing the two sets yields enter / stay / exit
//! transitions:
//!
//! | last frame | this frame | event |
//! |------------|------------|-------|
//! | no         | yes        | enter |
//! | yes        | yes        | stay  |
//! | yes        | no         | exit  |
//!
//! Pair sets are ordered so event delivery is deterministic.

use std::collections::BTreeSet;

use crate::ecs::EntityId;
use crate::physics::{Aabb, ColliderKind};

/// One collider: the entity and the index of the behavior slot holding it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderRef {
    /// Owning entity
    pub entity: EntityId,
    /// Index into the entity's component list
    pub slot: usize,
}

/// Unordered pair of colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionPair {
    /// Smaller collider of the pair
    pub a: ColliderRef,
    /// Larger collider of the pair
    pub b: ColliderRef,
}

impl CollisionPair {
    /// Create a new collision pair (always stores the smaller collider first)
    pub fn new(first: ColliderRef, second: ColliderRef) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }

    /// Whether either side belongs to `entity`
    pub fn involves(&self, entity: EntityId) -> bool {
        self.a.entity == entity || self.b.entity == entity
    }
}

/// Solid contacts use the collision hooks, trigger contacts the trigger hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Neither collider is a trigger
    Solid,
    /// At least one collider is a trigger
    Trigger,
}

/// Transition of a pair between last frame and this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    /// Overlapping now, not last frame
    Enter,
    /// Overlapping in both frames
    Stay,
    /// Overlapping last frame, not now
    Exit,
}

/// One pair transition to deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    /// The colliders involved
    pub pair: CollisionPair,
    /// Solid or trigger
    pub contact: ContactKind,
    /// Enter, stay or exit
    pub phase: ContactPhase,
}

/// Collider state sampled for the pairwise test
#[derive(Debug, Clone, Copy)]
pub struct ColliderSample {
    /// Which collider
    pub collider: ColliderRef,
    /// World-space bounds
    pub bounds: Aabb,
    /// Trigger flag
    pub trigger: bool,
}

#[derive(Debug, Default)]
struct PairBuffers {
    this_frame: BTreeSet<CollisionPair>,
    last_frame: BTreeSet<CollisionPair>,
}

impl PairBuffers {
    fn rotate(&mut self) {
        std::mem::swap(&mut self.this_frame, &mut self.last_frame);
        self.this_frame.clear();
    }

    fn clear(&mut self) {
        self.this_frame.clear();
        self.last_frame.clear();
    }

    fn events(&self, contact: ContactKind, out: &mut Vec<CollisionEvent>) {
        for pair in self.this_frame.union(&self.last_frame) {
            let phase = match (self.last_frame.contains(pair), self.this_frame.contains(pair)) {
                (false, true) => ContactPhase::Enter,
                (true, true) => ContactPhase::Stay,
                (true, false) => ContactPhase::Exit,
                (false, false) => continue,
            };
            out.push(CollisionEvent { pair: *pair, contact, phase });
        }
    }
}

#[derive(Debug)]
struct KindBuffers {
    kind: ColliderKind,
    rotated_at: Option<u64>,
    solid: PairBuffers,
    trigger: PairBuffers,
}

impl KindBuffers {
    fn new(kind: ColliderKind) -> Self {
        Self {
            kind,
            rotated_at: None,
            solid: PairBuffers::default(),
            trigger: PairBuffers::default(),
        }
    }
}

/// Per-kind collision buffers owned by the scene manager
#[derive(Debug, Default)]
pub struct CollisionWorld {
    kinds: Vec<KindBuffers>,
}

impl CollisionWorld {
    /// Create empty collision buffers
    pub fn new() -> Self {
        Self::default()
    }

    fn buffers_mut(&mut self, kind: ColliderKind) -> &mut KindBuffers {
        let index = match self.kinds.iter().position(|k| k.kind == kind) {
            Some(index) => index,
            None => {
                self.kinds.push(KindBuffers::new(kind));
                self.kinds.len() - 1
            }
        };
        &mut self.kinds[index]
    }

    fn buffers(&self, kind: ColliderKind) -> Option<&KindBuffers> {
        self.kinds.iter().find(|k| k.kind == kind)
    }

    /// Move this frame's pairs into last frame and start an empty frame.
    ///
    /// Idempotent within one frame: only the first call for a given `frame`
    /// rotates.
    pub fn begin_frame(&mut self, kind: ColliderKind, frame: u64) {
        let buffers = self.buffers_mut(kind);
        if buffers.rotated_at == Some(frame) {
            return;
        }
        buffers.solid.rotate();
        buffers.trigger.rotate();
        buffers.rotated_at = Some(frame);
    }

    /// Record an overlapping pair for this frame
    pub fn record(&mut self, kind: ColliderKind, pair: CollisionPair, contact: ContactKind) {
        let buffers = self.buffers_mut(kind);
        match contact {
            ContactKind::Solid => buffers.solid.this_frame.insert(pair),
            ContactKind::Trigger => buffers.trigger.this_frame.insert(pair),
        };
    }

    /// Naive pairwise test over every collider of one kind.
    ///
    /// Colliders on the same entity are never paired. A pair is a trigger
    /// contact if either side is a trigger.
    pub fn detect(&mut self, kind: ColliderKind, frame: u64, samples: &[ColliderSample]) {
        self.begin_frame(kind, frame);

        for (i, first) in samples.iter().enumerate() {
            for second in &samples[i + 1..] {
                if first.collider.entity == second.collider.entity {
                    continue;
                }
                if !first.bounds.intersects(&second.bounds) {
                    continue;
                }
                let contact = if first.trigger || second.trigger {
                    ContactKind::Trigger
                } else {
                    ContactKind::Solid
                };
                self.record(kind, CollisionPair::new(first.collider, second.collider), contact);
            }
        }
    }

    /// Transitions for one kind: solid pairs first, then triggers
    pub fn events(&self, kind: ColliderKind) -> Vec<CollisionEvent> {
        let mut out = Vec::new();
        if let Some(buffers) = self.buffers(kind) {
            buffers.solid.events(ContactKind::Solid, &mut out);
            buffers.trigger.events(ContactKind::Trigger, &mut out);
        }
        out
    }

    /// Whether the pair overlaps this frame (either contact kind)
    pub fn is_overlapping(&self, kind: ColliderKind, pair: &CollisionPair) -> bool {
        self.buffers(kind).is_some_and(|b| {
            b.solid.this_frame.contains(pair) || b.trigger.this_frame.contains(pair)
        })
    }

    /// Number of pairs overlapping this frame
    pub fn overlap_count(&self, kind: ColliderKind) -> usize {
        self.buffers(kind)
            .map_or(0, |b| b.solid.this_frame.len() + b.trigger.this_frame.len())
    }

    /// Kinds that have buffers, in first-seen order
    pub fn kinds(&self) -> Vec<ColliderKind> {
        self.kinds.iter().map(|k| k.kind).collect()
    }

    /// Drop every recorded pair of every kind
    pub fn clear(&mut self) {
        for buffers in &mut self.kinds {
            buffers.solid.clear();
            buffers.trigger.clear();
        }
    }
}
