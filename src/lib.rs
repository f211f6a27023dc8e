pub mod action;
pub mod agent;
pub mod ai;
pub mod env;
pub mod reward;

pub use action::{Action, ActionKind, Policy};
pub use agent::{Agent, KnowledgeView, Role, Team};
pub use ai::generate_graph;
pub use ai::GraphNode;
pub use env::{ObservableState, SecretHitlerEnv};
pub use reward::{reward, RewardVector};

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use thiserror::Error;

/// This crate only models the 5-player game: three liberals, one fascist,
/// one Hitler.
pub const NUM_SEATS: usize = 5;

/// 6 liberal + 11 fascist policies.
const FULL_DRAW_PILE: u8 = 17;

/// Enacting this many liberal policies wins the game for the liberals.
const LIBERAL_TRACK: u8 = 5;

/// Enacting this many fascist policies wins the game for the fascists.
const FASCIST_TRACK: u8 = 6;

#[derive(Debug, Error)]
pub enum GameError {
    /// A seat or its co-conspirator was invalid at construction time.
    #[error("invalid role assignment for seat {seat}: {reason}")]
    InvalidRoleAssignment { seat: usize, reason: String },

    /// The action is not in the acting seat's current legal set. The state
    /// is left unmodified.
    #[error("illegal action: {reason}")]
    IllegalAction { reason: String },

    /// The state matched no phase. This is a defect in the engine or its
    /// caller, never a normal outcome.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// The turn protocol, derived purely from state - never stored.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    Nominate,
    Vote,
    Discard,
    Enact,
    Kill,
}

/// Authoritative 5-player game state.
///
/// A value type: [`SecretHitler::apply_action`] works on a copy and returns
/// the successor, so callers can keep prior states for replay or look-ahead.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretHitler {
    // fixed at construction, never observable
    pub(crate) hitler: usize,
    pub(crate) fascist: usize,

    pub(crate) president: usize,
    pub(crate) chancellor: Option<usize>,
    pub(crate) proposed_chancellor: Option<usize>,

    pub(crate) enacted_liberal: u8,
    pub(crate) enacted_fascist: u8,
    pub(crate) draw_pile: u8,

    // round-scoped
    pub(crate) ballots: Vec<(usize, bool)>,
    pub(crate) discard_done: bool,
    pub(crate) enact_done: bool,

    pub(crate) alive: [bool; NUM_SEATS],
    pub(crate) winner: Option<Team>,

    // transition events, cleared at the start of every apply_action and read
    // by the reward function
    pub(crate) vote_passed_by: Option<usize>,
    pub(crate) just_enacted: Option<Policy>,
}

impl Debug for SecretHitler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(
            format!(
                "P {} | C {:?} | C? {:?} | L {} F {} | pile {}\n",
                self.president,
                self.chancellor,
                self.proposed_chancellor,
                self.enacted_liberal,
                self.enacted_fascist,
                self.draw_pile
            )
            .as_str(),
        )?;
        for seat in 0..NUM_SEATS {
            let status = if self.alive[seat] { "alive" } else { "dead" };
            f.write_str(format!("\tseat {seat}: {status}\n").as_str())?;
        }
        Ok(())
    }
}

impl SecretHitler {
    /// Start a fresh game with the given fixed role seats.
    pub fn new(hitler: usize, fascist: usize) -> Result<Self, GameError> {
        if hitler >= NUM_SEATS {
            return Err(GameError::InvalidRoleAssignment {
                seat: hitler,
                reason: "hitler seat is out of range".to_string(),
            });
        }
        if fascist >= NUM_SEATS {
            return Err(GameError::InvalidRoleAssignment {
                seat: fascist,
                reason: "fascist seat is out of range".to_string(),
            });
        }
        if hitler == fascist {
            return Err(GameError::InvalidRoleAssignment {
                seat: hitler,
                reason: "hitler and fascist must be different seats".to_string(),
            });
        }

        Ok(Self {
            hitler,
            fascist,
            president: 0,
            chancellor: None,
            proposed_chancellor: None,
            enacted_liberal: 0,
            enacted_fascist: 0,
            draw_pile: FULL_DRAW_PILE,
            ballots: Vec::with_capacity(NUM_SEATS),
            discard_done: false,
            enact_done: false,
            alive: [true; NUM_SEATS],
            winner: None,
            vote_passed_by: None,
            just_enacted: None,
        })
    }

    pub fn president(&self) -> usize {
        self.president
    }

    pub fn chancellor(&self) -> Option<usize> {
        self.chancellor
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    pub fn terminated(&self) -> bool {
        self.winner.is_some()
    }

    pub fn is_alive(&self, seat: usize) -> bool {
        seat < NUM_SEATS && self.alive[seat]
    }

    pub fn alive_seats(&self) -> Vec<usize> {
        (0..NUM_SEATS).filter(|&seat| self.alive[seat]).collect()
    }

    pub fn team_of(&self, seat: usize) -> Team {
        if seat == self.hitler || seat == self.fascist {
            Team::Fascist
        } else {
            Team::Liberal
        }
    }

    fn alive_count(&self) -> usize {
        self.alive.iter().filter(|&&alive| alive).count()
    }

    fn next_alive_seat(&self, from: usize) -> usize {
        let mut idx = (from + 1) % NUM_SEATS;
        while !self.alive[idx] {
            idx = (idx + 1) % NUM_SEATS;
        }
        idx
    }

    fn has_voted(&self, seat: usize) -> bool {
        self.ballots.iter().any(|&(voter, _)| voter == seat)
    }

    /// Derive the active phase, or `None` once the game is over.
    ///
    /// The conditions are checked in protocol order and are exhaustive for
    /// every state the engine can produce; anything else is a corrupted
    /// state and fails loudly.
    pub fn phase(&self) -> Result<Option<Phase>, GameError> {
        if self.winner.is_some() {
            return Ok(None);
        }

        if self.chancellor.is_none() && self.proposed_chancellor.is_none() {
            return Ok(Some(Phase::Nominate));
        }

        if self.proposed_chancellor.is_some() && self.chancellor.is_none() {
            return Ok(Some(Phase::Vote));
        }

        if self.chancellor.is_some() && self.proposed_chancellor.is_none() && !self.discard_done {
            return Ok(Some(Phase::Discard));
        }

        if self.chancellor.is_some()
            && self.proposed_chancellor.is_none()
            && self.discard_done
            && !self.enact_done
        {
            return Ok(Some(Phase::Enact));
        }

        if self.enact_done && (self.enacted_fascist == 4 || self.enacted_fascist == 5) {
            return Ok(Some(Phase::Kill));
        }

        Err(GameError::InvariantViolation(format!(
            "no phase matches: chancellor {:?}, proposed {:?}, discard {}, enact {}, fascist {}",
            self.chancellor,
            self.proposed_chancellor,
            self.discard_done,
            self.enact_done,
            self.enacted_fascist
        )))
    }

    /// The legal actions for `seat` right now, keyed by action kind.
    ///
    /// The map holds a single entry for the active phase. An empty parameter
    /// list means the phase is live but this seat is not authorized (or has
    /// no valid targets); an empty map means the game is over.
    pub fn legal_actions(&self, seat: usize) -> Result<BTreeMap<ActionKind, Vec<Action>>, GameError> {
        if seat >= NUM_SEATS {
            return Err(GameError::IllegalAction {
                reason: format!("seat {seat} is out of range"),
            });
        }

        let mut legal = BTreeMap::new();

        let phase = match self.phase()? {
            Some(phase) => phase,
            None => return Ok(legal),
        };

        match phase {
            Phase::Nominate => {
                let mut targets = vec![];
                if seat == self.president {
                    for target in 0..NUM_SEATS {
                        if target != self.president && self.alive[target] {
                            targets.push(Action::Propose(seat, target));
                        }
                    }
                }
                legal.insert(ActionKind::Propose, targets);
            }
            Phase::Vote => {
                let mut ballots = vec![];
                if self.alive[seat] && !self.has_voted(seat) {
                    ballots.push(Action::Vote(seat, false));
                    ballots.push(Action::Vote(seat, true));
                }
                legal.insert(ActionKind::Vote, ballots);
            }
            Phase::Discard => {
                let mut choices = vec![];
                if seat == self.president {
                    choices.push(Action::DiscardPolicy(seat, Policy::Liberal));
                    choices.push(Action::DiscardPolicy(seat, Policy::Fascist));
                }
                legal.insert(ActionKind::DiscardPolicy, choices);
            }
            Phase::Enact => {
                let mut choices = vec![];
                if Some(seat) == self.chancellor {
                    choices.push(Action::EnactPolicy(seat, Policy::Liberal));
                    choices.push(Action::EnactPolicy(seat, Policy::Fascist));
                }
                legal.insert(ActionKind::EnactPolicy, choices);
            }
            Phase::Kill => {
                let mut targets = vec![];
                if seat == self.president {
                    for target in 0..NUM_SEATS {
                        if target != self.president && self.alive[target] {
                            targets.push(Action::Kill(seat, target));
                        }
                    }
                }
                legal.insert(ActionKind::Kill, targets);
            }
        }

        Ok(legal)
    }

    /// Apply an action, returning the successor state. The receiver is never
    /// modified; an illegal action leaves no trace.
    pub fn apply_action(&self, action: Action) -> Result<SecretHitler, GameError> {
        let legal = self.legal_actions(action.seat())?;
        let permitted = legal
            .get(&action.kind())
            .map_or(false, |choices| choices.contains(&action));

        if !permitted {
            return Err(GameError::IllegalAction {
                reason: format!("{action:?} is not in the legal set of seat {}", action.seat()),
            });
        }

        let mut game = self.clone();
        game.vote_passed_by = None;
        game.just_enacted = None;

        match action {
            Action::Propose(_, target) => {
                game.proposed_chancellor = Some(target);
                game.discard_done = false;
                game.enact_done = false;
                game.ballots.clear();
            }
            Action::Vote(seat, ballot) => {
                game.ballots.push((seat, ballot));

                if game.ballots.len() == game.alive_count() {
                    let yes = game.ballots.iter().filter(|&&(_, b)| b).count();
                    let no = game.ballots.len() - yes;

                    if yes > no {
                        game.chancellor = game.proposed_chancellor.take();
                        game.vote_passed_by = Some(game.president);
                    } else {
                        // a tie fails the proposal too
                        game.proposed_chancellor = None;
                        game.president = game.next_alive_seat(game.president);
                    }

                    game.ballots.clear();
                }
            }
            Action::DiscardPolicy(_, _) => {
                // the reshuffle itself is out of scope; the pile is simply
                // topped back up when fewer than three cards remain
                if game.draw_pile < 3 {
                    game.draw_pile = FULL_DRAW_PILE;
                }
                game.draw_pile -= 3;
                game.discard_done = true;
            }
            Action::EnactPolicy(_, policy) => {
                match policy {
                    Policy::Liberal => game.enacted_liberal += 1,
                    Policy::Fascist => game.enacted_fascist += 1,
                }
                game.just_enacted = Some(policy);
                game.enact_done = true;

                if game.enacted_liberal == LIBERAL_TRACK {
                    game.winner = Some(Team::Liberal);
                } else if game.enacted_fascist == FASCIST_TRACK {
                    game.winner = Some(Team::Fascist);
                } else if game.enacted_fascist != 4 && game.enacted_fascist != 5 {
                    // kill power pending keeps the sitting government in place
                    game.advance_round();
                }
            }
            Action::Kill(_, target) => {
                game.alive[target] = false;

                if target == game.hitler {
                    game.winner = Some(Team::Liberal);
                } else {
                    game.advance_round();
                }
            }
        }

        Ok(game)
    }

    /// Close out the round: presidency moves to the next living seat and the
    /// government is dissolved.
    fn advance_round(&mut self) {
        self.president = self.next_alive_seat(self.president);
        self.chancellor = None;
        self.proposed_chancellor = None;
    }

    /// Project the state down to what every seat may see.
    pub fn observe(&self) -> ObservableState {
        ObservableState {
            president: one_hot(Some(self.president)),
            chancellor: one_hot(self.chancellor),
            chancellor_proposed: self.proposed_chancellor.is_some(),
            proposed_chancellor: one_hot(self.proposed_chancellor),
            enacted_liberal: self.enacted_liberal,
            enacted_fascist: self.enacted_fascist,
            draw_pile: self.draw_pile,
        }
    }
}

fn one_hot(seat: Option<usize>) -> [u8; NUM_SEATS] {
    let mut encoded = [0u8; NUM_SEATS];
    if let Some(seat) = seat {
        encoded[seat] = 1;
    }
    encoded
}

#[cfg(test)]
mod tests {
    use crate::action::Action::{DiscardPolicy, EnactPolicy, Kill, Propose, Vote};
    use crate::action::{Action, ActionKind, Policy};
    use crate::agent::Team;
    use crate::reward::reward;
    use crate::{GameError, Phase, SecretHitler};

    // hitler = 1, fascist = 3, as in the reference scenario
    fn game() -> SecretHitler {
        SecretHitler::new(1, 3).unwrap()
    }

    fn legal(game: &SecretHitler, seat: usize) -> Vec<Action> {
        game.legal_actions(seat)
            .unwrap()
            .into_values()
            .flatten()
            .collect()
    }

    fn try_action(game: SecretHitler, action: Action) -> SecretHitler {
        match game.apply_action(action) {
            Ok(game) => game,
            Err(err) => {
                panic!("failed to apply action: {:?}", err)
            }
        }
    }

    fn vote_all(mut game: SecretHitler, ballot: bool) -> SecretHitler {
        for seat in game.alive_seats() {
            game = try_action(game, Vote(seat, ballot));
        }
        game
    }

    /// Walk a fresh game into the discard phase with chancellor `target`.
    fn elect(target: usize) -> SecretHitler {
        let g = game();
        let president = g.president;
        let g = try_action(g, Propose(president, target));
        vote_all(g, true)
    }

    #[test]
    fn nominate_targets_exclude_president() {
        let g = game();
        let actions = legal(&g, 0);

        assert_eq!(actions.len(), 4);
        assert!(!actions.contains(&Propose(0, 0)));
        for target in 1..5 {
            assert!(actions.contains(&Propose(0, target)));
        }
    }

    #[test]
    fn only_president_may_nominate() {
        let g = game();

        for seat in 1..5 {
            let map = g.legal_actions(seat).unwrap();
            // the phase key is present but the seat has nothing to do
            assert!(map[&ActionKind::Propose].is_empty());
        }
    }

    #[test]
    fn self_nomination_is_illegal() {
        let g = game();
        assert!(matches!(
            g.apply_action(Propose(0, 0)),
            Err(GameError::IllegalAction { .. })
        ));
    }

    #[test]
    fn dead_seats_are_not_nomination_targets() {
        let mut g = game();
        g.alive[2] = false;

        let actions = legal(&g, 0);
        assert!(!actions.contains(&Propose(0, 2)));
        assert_eq!(actions.len(), 3);
    }

    #[test]
    fn unanimous_vote_elects_the_nominee() {
        let g = try_action(game(), Propose(0, 2));
        assert_eq!(g.phase().unwrap(), Some(Phase::Vote));

        let g = vote_all(g, true);

        assert_eq!(g.chancellor, Some(2));
        assert_eq!(g.proposed_chancellor, None);
        assert!(g.ballots.is_empty());
        assert_eq!(g.vote_passed_by, Some(0));
        assert_eq!(g.president, 0);
    }

    #[test]
    fn majority_false_fails_the_proposal_and_advances_the_president() {
        let g = try_action(game(), Propose(0, 2));
        let g = vote_all(g, false);

        assert_eq!(g.chancellor, None);
        assert_eq!(g.proposed_chancellor, None);
        assert!(g.ballots.is_empty());
        assert_eq!(g.president, 1);
        assert_eq!(g.phase().unwrap(), Some(Phase::Nominate));
    }

    #[test]
    fn tied_vote_fails_the_proposal() {
        let mut g = game();
        g.alive[4] = false;

        let g = try_action(g, Propose(0, 2));
        let g = try_action(g, Vote(0, true));
        let g = try_action(g, Vote(1, true));
        let g = try_action(g, Vote(2, false));
        let g = try_action(g, Vote(3, false));

        assert_eq!(g.chancellor, None);
        assert_eq!(g.president, 1);
        assert!(g.ballots.is_empty());
    }

    #[test]
    fn failed_vote_president_rotation_skips_dead_seats() {
        let mut g = game();
        g.alive[1] = false;

        let g = try_action(g, Propose(0, 2));
        let g = vote_all(g, false);

        assert_eq!(g.president, 2);
    }

    #[test]
    fn duplicate_ballots_are_rejected() {
        let g = try_action(game(), Propose(0, 2));
        let g = try_action(g, Vote(1, true));

        assert!(matches!(
            g.apply_action(Vote(1, false)),
            Err(GameError::IllegalAction { .. })
        ));

        // and the resolver already excludes the seat
        assert!(legal(&g, 1).is_empty());
    }

    #[test]
    fn dead_seats_may_not_vote() {
        let mut g = game();
        g.alive[4] = false;
        let g = try_action(g, Propose(0, 2));

        assert!(legal(&g, 4).is_empty());
        assert!(g.apply_action(Vote(4, true)).is_err());
    }

    #[test]
    fn discard_draws_three_from_the_pile() {
        let g = elect(2);
        assert_eq!(g.phase().unwrap(), Some(Phase::Discard));

        // only the president may discard
        assert!(legal(&g, 2).is_empty());

        let g = try_action(g, DiscardPolicy(0, Policy::Fascist));
        assert_eq!(g.draw_pile, 14);
        assert!(g.discard_done);
        assert_eq!(g.phase().unwrap(), Some(Phase::Enact));
    }

    #[test]
    fn exhausted_pile_refills_before_drawing() {
        let mut g = elect(2);
        g.draw_pile = 2;

        let g = try_action(g, DiscardPolicy(0, Policy::Liberal));
        assert_eq!(g.draw_pile, 14);
    }

    #[test]
    fn enact_advances_the_round() {
        let g = elect(2);
        let g = try_action(g, DiscardPolicy(0, Policy::Fascist));

        // only the chancellor may enact
        assert!(legal(&g, 0).is_empty());

        let g = try_action(g, EnactPolicy(2, Policy::Liberal));

        assert_eq!(g.enacted_liberal, 1);
        assert_eq!(g.just_enacted, Some(Policy::Liberal));
        assert_eq!(g.president, 1);
        assert_eq!(g.chancellor, None);
        assert_eq!(g.phase().unwrap(), Some(Phase::Nominate));
    }

    // the full reference scenario: hitler = 1, fascist = 3, president = 0
    #[test]
    fn reference_round() {
        let g = game();
        let g = try_action(g, Propose(0, 2));
        assert_eq!(g.proposed_chancellor, Some(2));

        let g = vote_all(g, true);
        assert_eq!(g.chancellor, Some(2));
        assert_eq!(g.proposed_chancellor, None);
        assert_eq!(reward(&g), [1, 0, 0, 0, 0]);

        let g = try_action(g, DiscardPolicy(0, Policy::Fascist));
        assert_eq!(g.draw_pile, 14);
        assert!(g.discard_done);
        assert_eq!(reward(&g), [0; 5]);

        let g = try_action(g, EnactPolicy(2, Policy::Liberal));
        assert_eq!(g.enacted_liberal, 1);
        assert_eq!(reward(&g), [10, -10, 10, -10, 10]);
        assert_eq!(g.president, 1);
        assert_eq!(g.chancellor, None);
    }

    #[test]
    fn fourth_fascist_policy_unlocks_the_kill_power() {
        let mut g = elect(2);
        g.enacted_fascist = 3;

        let g = try_action(g, DiscardPolicy(0, Policy::Liberal));
        let g = try_action(g, EnactPolicy(2, Policy::Fascist));

        assert_eq!(g.enacted_fascist, 4);
        assert_eq!(g.phase().unwrap(), Some(Phase::Kill));
        // the sitting government stays put until the power is used
        assert_eq!(g.president, 0);
        assert_eq!(g.chancellor, Some(2));

        let actions = legal(&g, 0);
        assert_eq!(actions.len(), 4);
        assert!(!actions.contains(&Kill(0, 0)));

        // nobody else may use it
        assert!(legal(&g, 2).is_empty());
    }

    #[test]
    fn killing_a_regular_seat_ends_the_round() {
        let mut g = elect(2);
        g.enacted_fascist = 3;
        let g = try_action(g, DiscardPolicy(0, Policy::Liberal));
        let g = try_action(g, EnactPolicy(2, Policy::Fascist));

        let g = try_action(g, Kill(0, 4));

        assert!(!g.alive[4]);
        assert_eq!(g.alive_seats().len(), 4);
        assert!(!g.terminated());
        assert_eq!(g.president, 1);
        assert_eq!(g.chancellor, None);
        assert_eq!(g.phase().unwrap(), Some(Phase::Nominate));
    }

    #[test]
    fn killing_hitler_wins_for_the_liberals() {
        let mut g = elect(2);
        g.enacted_fascist = 3;
        let g = try_action(g, DiscardPolicy(0, Policy::Liberal));
        let g = try_action(g, EnactPolicy(2, Policy::Fascist));

        let g = try_action(g, Kill(0, 1));

        assert!(g.terminated());
        assert_eq!(g.winner, Some(Team::Liberal));
        assert!(!g.alive[1]);
        assert_eq!(reward(&g), [100, -100, 100, -100, 100]);
    }

    #[test]
    fn fifth_liberal_policy_ends_the_game() {
        let mut g = elect(2);
        g.enacted_liberal = 4;
        let g = try_action(g, DiscardPolicy(0, Policy::Fascist));
        let g = try_action(g, EnactPolicy(2, Policy::Liberal));

        assert!(g.terminated());
        assert_eq!(g.winner, Some(Team::Liberal));
        // the final policy stacks the policy and victory bonuses
        assert_eq!(reward(&g), [110, -110, 110, -110, 110]);
    }

    #[test]
    fn sixth_fascist_policy_ends_the_game() {
        let mut g = elect(2);
        g.enacted_fascist = 5;
        let g = try_action(g, DiscardPolicy(0, Policy::Liberal));
        let g = try_action(g, EnactPolicy(2, Policy::Fascist));

        assert!(g.terminated());
        assert_eq!(g.winner, Some(Team::Fascist));
        assert_eq!(reward(&g), [-110, 110, -110, 110, -110]);
    }

    #[test]
    fn terminated_games_have_no_legal_actions() {
        let mut g = game();
        g.winner = Some(Team::Liberal);

        for seat in 0..5 {
            assert!(g.legal_actions(seat).unwrap().is_empty());
        }
        assert!(g.apply_action(Propose(0, 2)).is_err());
    }

    #[test]
    fn corrupted_state_fails_loudly() {
        let mut g = game();
        g.chancellor = Some(2);
        g.proposed_chancellor = Some(3);

        assert!(matches!(g.phase(), Err(GameError::InvariantViolation(_))));
        assert!(matches!(
            g.legal_actions(0),
            Err(GameError::InvariantViolation(_))
        ));
    }

    #[test]
    fn apply_action_leaves_the_prior_state_untouched() {
        let g = game();
        let snapshot = g.clone();

        let _next = g.apply_action(Propose(0, 2)).unwrap();
        assert_eq!(g, snapshot);

        let _err = g.apply_action(Propose(0, 0));
        assert_eq!(g, snapshot);
    }

    #[test]
    fn out_of_range_seat_is_rejected() {
        let g = game();
        assert!(matches!(
            g.legal_actions(5),
            Err(GameError::IllegalAction { .. })
        ));
    }

    #[test]
    fn fresh_proposal_clears_the_previous_rounds_flags() {
        let g = elect(2);
        let g = try_action(g, DiscardPolicy(0, Policy::Fascist));
        let g = try_action(g, EnactPolicy(2, Policy::Fascist));
        assert!(g.discard_done && g.enact_done);

        let g = try_action(g, Propose(1, 2));
        assert!(!g.discard_done);
        assert!(!g.enact_done);
        assert!(g.ballots.is_empty());
    }
}
