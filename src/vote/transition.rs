use crate::models::vote::{VoteCall, VoteDirection};

/// What a click on a vote arrow does, given the viewer's current vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No vote yet; cast one.
    Cast(VoteDirection),
    /// Same arrow clicked again; take the vote back.
    Retract(VoteDirection),
    /// Opposite arrow clicked; drop the old vote and cast the new one.
    Switch {
        from: VoteDirection,
        to: VoteDirection,
    },
}

impl VoteTransition {
    pub fn plan(current: Option<VoteDirection>, requested: VoteDirection) -> Self {
        match current {
            None => VoteTransition::Cast(requested),
            Some(existing) if existing == requested => VoteTransition::Retract(existing),
            Some(existing) => VoteTransition::Switch {
                from: existing,
                to: requested,
            },
        }
    }

    /// The vote held before the click.
    pub fn origin(&self) -> Option<VoteDirection> {
        match *self {
            VoteTransition::Cast(_) => None,
            VoteTransition::Retract(direction) => Some(direction),
            VoteTransition::Switch { from, .. } => Some(from),
        }
    }

    /// The vote held once the click is confirmed.
    pub fn target(&self) -> Option<VoteDirection> {
        match *self {
            VoteTransition::Cast(direction) => Some(direction),
            VoteTransition::Retract(_) => None,
            VoteTransition::Switch { to, .. } => Some(to),
        }
    }

    pub fn delta(&self) -> i64 {
        match *self {
            VoteTransition::Cast(direction) => direction.weight(),
            VoteTransition::Retract(direction) => -direction.weight(),
            VoteTransition::Switch { from, to } => to.weight() - from.weight(),
        }
    }

    /// Backend requests, in the order they must be sent.
    pub fn calls(&self) -> Vec<VoteCall> {
        match *self {
            VoteTransition::Cast(direction) => vec![VoteCall::record(direction)],
            VoteTransition::Retract(direction) => vec![VoteCall::retract(direction)],
            VoteTransition::Switch { from, to } => {
                vec![VoteCall::retract(from), VoteCall::record(to)]
            }
        }
    }
}
