//! Nearest-target selection with hysteresis.

use crate::objects::ObjectId;

/// An eligible object (live, not about to fall, not on cooldown) and its ground distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: ObjectId,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetChoice {
    Keep(ObjectId),
    Switch {
        from: Option<ObjectId>,
        to: ObjectId,
    },
    /// No eligible object; any current target is dropped.
    None,
}

impl TargetChoice {
    pub fn target(self) -> Option<ObjectId> {
        match self {
            TargetChoice::Keep(id) | TargetChoice::Switch { to: id, .. } => Some(id),
            TargetChoice::None => None,
        }
    }
}

/// Pick the nearest candidate unless the current target is within `threshold` of it.
///
/// `current` is the current target's candidate entry when it is still eligible; ties on
/// distance go to the candidate seen first.
pub fn select_target(
    candidates: impl IntoIterator<Item = Candidate>,
    current: Option<Candidate>,
    previous: Option<ObjectId>,
    threshold: f32,
) -> TargetChoice {
    let closest = candidates
        .into_iter()
        .fold(None::<Candidate>, |best, c| match best {
            Some(b) if b.distance <= c.distance => Some(b),
            _ => Some(c),
        });
    let Some(closest) = closest else {
        return TargetChoice::None;
    };

    if let Some(current) = current {
        if current.distance <= closest.distance + threshold {
            return TargetChoice::Keep(current.id);
        }
    }
    if previous == Some(closest.id) {
        return TargetChoice::Keep(closest.id);
    }
    TargetChoice::Switch {
        from: previous,
        to: closest.id,
    }
}
