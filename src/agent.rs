use std::fmt::{Debug, Formatter};
use serde::{Deserialize, Serialize};

use crate::action::Policy;
use crate::{GameError, NUM_SEATS};

/// Secret role dealt to a seat at game construction.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Liberal,
    Fascist,
    Hitler,
}

/// The two sides of the game. Hitler plays on the fascist team.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Liberal,
    Fascist,
}

impl Role {
    pub fn team(&self) -> Team {
        match self {
            Role::Liberal => Team::Liberal,
            Role::Fascist | Role::Hitler => Team::Fascist,
        }
    }
}

impl Team {
    /// The team a freshly enacted policy belongs to.
    pub fn of_policy(policy: Policy) -> Team {
        match policy {
            Policy::Liberal => Team::Liberal,
            Policy::Fascist => Team::Fascist,
        }
    }
}

/// What a seat is allowed to know about the other seats' roles.
///
/// Liberals know nothing. The fascist knows which seat is Hitler. Hitler
/// knows which seat is the fascist - a 5-player-only rule; in larger games
/// Hitler is kept in the dark, but with five players the deal always reveals
/// the ally.
#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeView {
    /// Seat of the known co-conspirator, if any.
    pub known_seat: Option<usize>,
    /// Whether the known seat is Hitler (true for the fascist's view, false
    /// for Hitler's view of the fascist).
    pub known_seat_is_hitler: bool,
}

impl KnowledgeView {
    const EMPTY: KnowledgeView = KnowledgeView {
        known_seat: None,
        known_seat_is_hitler: false,
    };
}

impl Debug for KnowledgeView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.known_seat {
            None => f.write_str("knows nothing"),
            Some(seat) if self.known_seat_is_hitler => {
                f.write_fmt(format_args!("knows seat {seat} is hitler"))
            }
            Some(seat) => f.write_fmt(format_args!("knows seat {seat} is the fascist")),
        }
    }
}

/// A seat together with its role and its immutable knowledge view.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Agent {
    pub seat: usize,
    pub role: Role,
    pub knowledge: KnowledgeView,
}

impl Agent {
    /// Build an agent and derive its knowledge view.
    ///
    /// `conspirator` is the other fascist-team seat and is required for the
    /// fascist (Hitler's seat) and for Hitler (the fascist's seat). Liberals
    /// must not be given one.
    pub fn new(role: Role, seat: usize, conspirator: Option<usize>) -> Result<Agent, GameError> {
        if seat >= NUM_SEATS {
            return Err(GameError::InvalidRoleAssignment {
                seat,
                reason: format!("seat must be in [0,{}]", NUM_SEATS - 1),
            });
        }

        let knowledge = match role {
            Role::Liberal => {
                if conspirator.is_some() {
                    return Err(GameError::InvalidRoleAssignment {
                        seat,
                        reason: "a liberal has no co-conspirator".to_string(),
                    });
                }
                KnowledgeView::EMPTY
            }
            Role::Fascist | Role::Hitler => {
                let known_seat = conspirator.ok_or_else(|| GameError::InvalidRoleAssignment {
                    seat,
                    reason: "fascist-team roles require a co-conspirator seat".to_string(),
                })?;

                if known_seat >= NUM_SEATS {
                    return Err(GameError::InvalidRoleAssignment {
                        seat,
                        reason: format!("co-conspirator seat {known_seat} is out of range"),
                    });
                }

                if known_seat == seat {
                    return Err(GameError::InvalidRoleAssignment {
                        seat,
                        reason: "a seat cannot be its own co-conspirator".to_string(),
                    });
                }

                KnowledgeView {
                    known_seat: Some(known_seat),
                    known_seat_is_hitler: role == Role::Fascist,
                }
            }
        };

        Ok(Agent { seat, role, knowledge })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liberal_knows_nothing() {
        let agent = Agent::new(Role::Liberal, 0, None).unwrap();
        assert_eq!(agent.knowledge.known_seat, None);
        assert!(!agent.knowledge.known_seat_is_hitler);
    }

    #[test]
    fn fascist_knows_hitler() {
        let agent = Agent::new(Role::Fascist, 3, Some(1)).unwrap();
        assert_eq!(agent.knowledge.known_seat, Some(1));
        assert!(agent.knowledge.known_seat_is_hitler);
    }

    #[test]
    fn hitler_knows_fascist_but_not_as_hitler() {
        let agent = Agent::new(Role::Hitler, 1, Some(3)).unwrap();
        assert_eq!(agent.knowledge.known_seat, Some(3));
        assert!(!agent.knowledge.known_seat_is_hitler);
    }

    #[test]
    fn fascist_without_conspirator_is_rejected() {
        assert!(matches!(
            Agent::new(Role::Fascist, 3, None),
            Err(GameError::InvalidRoleAssignment { seat: 3, .. })
        ));
    }

    #[test]
    fn out_of_range_seats_are_rejected() {
        assert!(Agent::new(Role::Liberal, 5, None).is_err());
        assert!(Agent::new(Role::Hitler, 1, Some(7)).is_err());
        assert!(Agent::new(Role::Hitler, 1, Some(1)).is_err());
    }

    #[test]
    fn liberal_with_conspirator_is_rejected() {
        assert!(Agent::new(Role::Liberal, 0, Some(2)).is_err());
    }

    #[test]
    fn hitler_is_on_the_fascist_team() {
        assert_eq!(Role::Hitler.team(), Team::Fascist);
        assert_eq!(Role::Fascist.team(), Team::Fascist);
        assert_eq!(Role::Liberal.team(), Team::Liberal);
    }
}
