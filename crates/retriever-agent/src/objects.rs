//! Throwable objects and the registry of live ones.

use std::collections::BTreeMap;
use std::fmt;

use retriever_sim::{BodyHandle, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallKind {
    #[default]
    TennisBall,
    Football,
    BeachBall,
}

impl BallKind {
    pub const ALL: [BallKind; 3] = [BallKind::TennisBall, BallKind::Football, BallKind::BeachBall];

    /// Parse a lowercase kind name; unknown names fall back to [`BallKind::TennisBall`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "football" => BallKind::Football,
            "beachball" => BallKind::BeachBall,
            _ => BallKind::TennisBall,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BallKind::TennisBall => "tennisball",
            BallKind::Football => "football",
            BallKind::BeachBall => "beachball",
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            BallKind::TennisBall => 0.1,
            BallKind::Football | BallKind::BeachBall => 0.3,
        }
    }

    pub fn mass(self) -> f32 {
        match self {
            BallKind::TennisBall => 5.0,
            BallKind::Football => 12.0,
            BallKind::BeachBall => 3.0,
        }
    }

    pub fn restitution(self) -> f32 {
        match self {
            BallKind::TennisBall => 0.3,
            BallKind::Football => 0.1,
            BallKind::BeachBall => 0.8,
        }
    }
}

/// Who currently owns an object's transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Simulated by the physics world through `body`.
    Free,
    /// Kinematically attached under the agent's mouth anchor.
    Carried,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowableObject {
    pub id: ObjectId,
    pub kind: BallKind,
    pub node: NodeId,
    pub radius: f32,
    /// Present iff the object is free.
    pub body: Option<BodyHandle>,
    pub is_ball: bool,
}

impl ThrowableObject {
    pub fn ownership(&self) -> Ownership {
        if self.body.is_some() {
            Ownership::Free
        } else {
            Ownership::Carried
        }
    }
}

/// The live set. Objects leave it only through disposal.
#[derive(Debug, Default, Clone)]
pub struct ObjectRegistry {
    objects: BTreeMap<ObjectId, ThrowableObject>,
    next_id: u64,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&ThrowableObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut ThrowableObject> {
        self.objects.get_mut(&id)
    }

    /// Register a new object; the registry assigns its id.
    pub fn insert(
        &mut self,
        kind: BallKind,
        node: NodeId,
        radius: f32,
        body: Option<BodyHandle>,
    ) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            ThrowableObject {
                id,
                kind,
                node,
                radius,
                body,
                is_ball: true,
            },
        );
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<ThrowableObject> {
        self.objects.remove(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThrowableObject> + '_ {
        self.objects.values()
    }

    /// Objects currently simulated by physics.
    pub fn free(&self) -> impl Iterator<Item = &ThrowableObject> + '_ {
        self.objects.values().filter(|o| o.body.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_parse_case_insensitively_with_fallback() {
        for kind in BallKind::ALL {
            assert_eq!(BallKind::from_name(kind.name()), kind);
        }
        assert_eq!(BallKind::from_name("BeachBall"), BallKind::BeachBall);
        assert_eq!(BallKind::from_name("frisbee"), BallKind::TennisBall);
    }

    #[test]
    fn registry_assigns_increasing_ids() {
        let mut registry = ObjectRegistry::new();
        let a = registry.insert(BallKind::TennisBall, NodeId(1), 0.1, None);
        let b = registry.insert(BallKind::Football, NodeId(2), 0.3, Some(BodyHandle(7)));
        assert!(a < b);
        assert_eq!(registry.free().count(), 1);
        assert_eq!(registry.get(a).map(|o| o.ownership()), Some(Ownership::Carried));
        assert!(registry.remove(a).is_some());
        assert!(!registry.contains(a));
    }
}
