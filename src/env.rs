use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind};
use crate::agent::{Agent, KnowledgeView, Role};
use crate::reward::{reward, RewardVector};
use crate::{GameError, SecretHitler, NUM_SEATS};

/// What every seat is allowed to see: the public board, nothing about roles.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ObservableState {
    pub president: [u8; NUM_SEATS],
    /// All-zero while no chancellor is elected.
    pub chancellor: [u8; NUM_SEATS],
    pub chancellor_proposed: bool,
    pub proposed_chancellor: [u8; NUM_SEATS],
    pub enacted_liberal: u8,
    pub enacted_fascist: u8,
    pub draw_pile: u8,
}

/// The environment facade: the only boundary external drivers use.
///
/// Roles are fixed once at construction; `reset` replaces the game state
/// wholesale but keeps the seating. One instance owns one game - the state
/// is never shared.
pub struct SecretHitlerEnv {
    game: SecretHitler,
    initial: SecretHitler,
    agents: Vec<Agent>,
}

impl SecretHitlerEnv {
    /// Seat the five players. `hitler` and `fascist` must be distinct seats
    /// in `[0,4]`; the remaining three seats are liberals.
    pub fn new(hitler: usize, fascist: usize) -> Result<Self, GameError> {
        let game = SecretHitler::new(hitler, fascist)?;

        let mut agents = Vec::with_capacity(NUM_SEATS);
        for seat in 0..NUM_SEATS {
            let agent = if seat == hitler {
                Agent::new(Role::Hitler, seat, Some(fascist))?
            } else if seat == fascist {
                Agent::new(Role::Fascist, seat, Some(hitler))?
            } else {
                Agent::new(Role::Liberal, seat, None)?
            };
            agents.push(agent);
        }

        Ok(Self {
            initial: game.clone(),
            game,
            agents,
        })
    }

    /// Throw away the current game and start over from the fixed initial
    /// configuration: president 0, no government, empty tracks, full pile,
    /// everyone alive.
    pub fn reset(&mut self) -> ObservableState {
        self.game = self.initial.clone();
        self.game.observe()
    }

    /// Validate and apply one action.
    ///
    /// Returns the new observable state, the per-seat reward vector and the
    /// termination flag. A rejected action leaves the environment unchanged.
    pub fn step(&mut self, action: Action) -> Result<(ObservableState, RewardVector, bool), GameError> {
        let next = self.game.apply_action(action)?;
        let rewards = reward(&next);
        self.game = next;

        Ok((self.game.observe(), rewards, self.game.terminated()))
    }

    /// The legal actions of `seat`, straight from the resolver. Drivers call
    /// this before `step` to discover whose turn it is and what they may do.
    pub fn legal_actions(&self, seat: usize) -> Result<BTreeMap<ActionKind, Vec<Action>>, GameError> {
        self.game.legal_actions(seat)
    }

    /// The private knowledge view of `seat`, never part of the observable
    /// state.
    pub fn knowledge(&self, seat: usize) -> Result<&KnowledgeView, GameError> {
        self.agents
            .get(seat)
            .map(|agent| &agent.knowledge)
            .ok_or_else(|| GameError::IllegalAction {
                reason: format!("seat {seat} is out of range"),
            })
    }

    /// Read access to the underlying game, for drivers that want to report
    /// winners or the alive roster.
    pub fn game(&self) -> &SecretHitler {
        &self.game
    }
}
