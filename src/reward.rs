use crate::agent::Team;
use crate::{SecretHitler, NUM_SEATS};

/// One scalar per seat, produced by every `step`.
pub type RewardVector = [i32; NUM_SEATS];

/// Successful nomination: the sitting president is credited.
const VOTE_PASSED: i32 = 1;

/// Enacted policy: every seat scores by team, sign by policy type.
const POLICY_ENACTED: i32 = 10;

/// Game over: every seat scores by the winning team.
const GAME_WON: i32 = 100;

/// Score the transition that produced `state`.
///
/// Pure over the post-transition state. The three contributions are
/// independent and additive: the final policy of a game pays out both the
/// policy and the victory bonus in the same step.
pub fn reward(state: &SecretHitler) -> RewardVector {
    let mut rewards = [0i32; NUM_SEATS];

    if let Some(president) = state.vote_passed_by {
        rewards[president] += VOTE_PASSED;
    }

    if let Some(policy) = state.just_enacted {
        let scoring_team = Team::of_policy(policy);
        for (seat, reward) in rewards.iter_mut().enumerate() {
            if state.team_of(seat) == scoring_team {
                *reward += POLICY_ENACTED;
            } else {
                *reward -= POLICY_ENACTED;
            }
        }
    }

    if let Some(winner) = state.winner {
        for (seat, reward) in rewards.iter_mut().enumerate() {
            if state.team_of(seat) == winner {
                *reward += GAME_WON;
            } else {
                *reward -= GAME_WON;
            }
        }
    }

    rewards
}
