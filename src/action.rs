use std::fmt::{Debug, Formatter};
use serde::{Deserialize, Serialize};

/// The two policy types on the board track. Doubles as the parameter of the
/// discard and enact actions.
#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    Liberal,
    Fascist,
}

impl Debug for Policy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::Liberal => f.write_str("liberal"),
            Policy::Fascist => f.write_str("fascist"),
        }
    }
}

/// The five action kinds, used as the key of the legal-action mapping.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Propose,
    Vote,
    DiscardPolicy,
    EnactPolicy,
    Kill,
}

/// A single move in the game. The first field of every variant is the acting
/// seat, so an action is self-describing and the engine can check it against
/// the legal set of that seat.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Action {
    /// President proposes a chancellor candidate.
    Propose(usize, usize),
    /// An alive seat casts a ballot on the pending proposal.
    Vote(usize, bool),
    /// President discards one of the three drawn policies by type.
    DiscardPolicy(usize, Policy),
    /// Chancellor enacts one of the two remaining policies.
    EnactPolicy(usize, Policy),
    /// President eliminates a seat once the kill power is unlocked.
    Kill(usize, usize),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Propose(_, _) => ActionKind::Propose,
            Action::Vote(_, _) => ActionKind::Vote,
            Action::DiscardPolicy(_, _) => ActionKind::DiscardPolicy,
            Action::EnactPolicy(_, _) => ActionKind::EnactPolicy,
            Action::Kill(_, _) => ActionKind::Kill,
        }
    }

    /// The seat performing this action.
    pub fn seat(&self) -> usize {
        match self {
            Action::Propose(seat, _)
            | Action::Vote(seat, _)
            | Action::DiscardPolicy(seat, _)
            | Action::EnactPolicy(seat, _)
            | Action::Kill(seat, _) => *seat,
        }
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Propose(seat, target) => {
                f.write_fmt(format_args!("Seat {seat} proposes {target} as chancellor"))
            }
            Action::Vote(seat, ballot) => {
                let word = if *ballot { "ja" } else { "nein" };
                f.write_fmt(format_args!("Seat {seat} votes {word}"))
            }
            Action::DiscardPolicy(seat, policy) => {
                f.write_fmt(format_args!("Seat {seat} discards a {policy:?} policy"))
            }
            Action::EnactPolicy(seat, policy) => {
                f.write_fmt(format_args!("Seat {seat} enacts a {policy:?} policy"))
            }
            Action::Kill(seat, target) => {
                f.write_fmt(format_args!("Seat {seat} kills seat {target}"))
            }
        }
    }
}
