//! Skeleton and clip set the agent body is built from, plus mouth anchor resolution.

use glam::Vec3;
use retriever_sim::{Clip, NodeId, NodeKind, SceneGraph, Transform};
use tracing::{debug, warn};

/// Joints preferred for the mouth anchor, best first.
pub const MOUTH_JOINTS: [&str; 4] = [
    "SnoutLower_metarig",
    "SnoutUpper_metarig",
    "spine011_metarig",
    "spine010_metarig",
];

/// Name fragments accepted when none of [`MOUTH_JOINTS`] exists.
pub const MOUTH_JOINT_HINTS: [&str; 2] = ["Snout", "spine011"];

pub const MOUTH_JOINT_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.1);
pub const MOUTH_ROOT_FALLBACK: Vec3 = Vec3::new(0.0, 0.35, 0.4);

#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    pub name: String,
    /// Index of the parent joint in [`AgentRig::joints`]; `None` hangs it under the agent root.
    pub parent: Option<usize>,
    pub offset: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentRig {
    pub joints: Vec<JointSpec>,
    pub clips: Vec<Clip>,
}

impl AgentRig {
    /// The quadruped rig: a spine chain ending in the snout joints, with idle and run clips.
    pub fn dog() -> Self {
        let chain: [(&str, Option<usize>, Vec3); 7] = [
            ("root_metarig", None, Vec3::ZERO),
            ("spine_metarig", Some(0), Vec3::new(0.0, 9.0, -4.0)),
            ("spine004_metarig", Some(1), Vec3::new(0.0, 1.0, 4.0)),
            ("spine010_metarig", Some(2), Vec3::new(0.0, 2.0, 3.0)),
            ("spine011_metarig", Some(3), Vec3::new(0.0, 1.0, 1.5)),
            ("SnoutUpper_metarig", Some(4), Vec3::new(0.0, 0.5, 1.5)),
            ("SnoutLower_metarig", Some(4), Vec3::new(0.0, -0.5, 1.2)),
        ];
        Self {
            joints: chain
                .into_iter()
                .map(|(name, parent, offset)| JointSpec {
                    name: name.to_string(),
                    parent,
                    offset,
                })
                .collect(),
            clips: vec![
                Clip::new("Idle1", 3.0),
                Clip::new("IdleEarTwitch", 2.5),
                Clip::new("IdleSit", 2.0),
                Clip::new("RunCycle", 0.6),
                Clip::new("WalkCycle", 1.0),
            ],
        }
    }

    /// Spawn the joints under `agent` and return their node ids in rig order.
    pub fn instantiate(&self, scene: &mut SceneGraph, agent: NodeId) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = Vec::with_capacity(self.joints.len());
        for joint in &self.joints {
            let parent = joint
                .parent
                .and_then(|i| nodes.get(i).copied())
                .unwrap_or(agent);
            nodes.push(scene.spawn(
                joint.name.clone(),
                NodeKind::Joint,
                Some(parent),
                Transform::from_translation(joint.offset),
            ));
        }
        nodes
    }
}

/// Create the mouth anchor node below the best matching joint of `agent`.
///
/// Returns the anchor and whether the root fallback had to be used.
pub fn resolve_mouth_anchor(scene: &mut SceneGraph, agent: NodeId) -> (NodeId, bool) {
    let is_joint = |kind: NodeKind| kind == NodeKind::Joint;
    let exact = MOUTH_JOINTS.iter().find_map(|wanted| {
        scene.find(agent, |n| is_joint(n.kind) && n.name == *wanted)
    });
    let joint = exact.or_else(|| {
        scene.find(agent, |n| {
            is_joint(n.kind) && MOUTH_JOINT_HINTS.iter().any(|hint| n.name.contains(hint))
        })
    });

    match joint {
        Some(joint) => {
            let name = scene.node(joint).map(|n| n.name.clone()).unwrap_or_default();
            debug!(joint = %name, "mouth anchor attached to joint");
            let anchor = scene.spawn(
                "mouth_anchor",
                NodeKind::Group,
                Some(joint),
                Transform::from_translation(MOUTH_JOINT_OFFSET),
            );
            (anchor, false)
        }
        None => {
            warn!("no mouth joint found, anchoring under the agent root");
            let anchor = scene.spawn(
                "mouth_anchor",
                NodeKind::Group,
                Some(agent),
                Transform::from_translation(MOUTH_ROOT_FALLBACK),
            );
            (anchor, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_with(rig: &AgentRig) -> (SceneGraph, NodeId) {
        let mut scene = SceneGraph::new();
        let agent = scene.spawn("agent", NodeKind::Group, None, Transform::IDENTITY);
        rig.instantiate(&mut scene, agent);
        (scene, agent)
    }

    fn parent_name(scene: &SceneGraph, node: NodeId) -> String {
        let parent = scene.node(node).and_then(|n| n.parent()).unwrap();
        scene.node(parent).unwrap().name.clone()
    }

    #[test]
    fn prefers_the_lower_snout() {
        let (mut scene, agent) = agent_with(&AgentRig::dog());
        let (anchor, fallback) = resolve_mouth_anchor(&mut scene, agent);
        assert!(!fallback);
        assert_eq!(parent_name(&scene, anchor), "SnoutLower_metarig");
        assert_eq!(scene.local(anchor).unwrap().translation, MOUTH_JOINT_OFFSET);
    }

    #[test]
    fn falls_back_to_name_hints_then_root() {
        let hinted = AgentRig {
            joints: vec![JointSpec {
                name: "Head_Snout_tip".into(),
                parent: None,
                offset: Vec3::Y,
            }],
            clips: Vec::new(),
        };
        let (mut scene, agent) = agent_with(&hinted);
        let (anchor, fallback) = resolve_mouth_anchor(&mut scene, agent);
        assert!(!fallback);
        assert_eq!(parent_name(&scene, anchor), "Head_Snout_tip");

        let (mut scene, agent) = agent_with(&AgentRig::default());
        let (anchor, fallback) = resolve_mouth_anchor(&mut scene, agent);
        assert!(fallback);
        assert_eq!(parent_name(&scene, anchor), "agent");
        assert_eq!(scene.local(anchor).unwrap().translation, MOUTH_ROOT_FALLBACK);
    }
}
