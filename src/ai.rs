// uniform random playouts and a bounded-depth game-tree explorer

use petgraph::graph::{Graph, NodeIndex};
use rand::Rng;

use crate::action::Action;
use crate::agent::Team;
use crate::env::ObservableState;
use crate::reward::{reward, RewardVector};
use crate::{GameError, SecretHitler, NUM_SEATS};

/// Random play finishes in far fewer steps; hitting this cap means the
/// engine stopped making progress.
const MAX_ROLLOUT_STEPS: usize = 10_000;

/// Outcome of a single random playout.
#[derive(Clone, Debug)]
pub struct Rollout {
    pub winner: Team,
    pub steps: usize,
    /// Per-seat return accumulated over every step of the playout.
    pub returns: RewardVector,
}

/// Every action any seat may take right now, across the whole table.
fn all_legal_actions(game: &SecretHitler) -> Result<Vec<Action>, GameError> {
    let mut actions = Vec::with_capacity(NUM_SEATS * 2);
    for seat in 0..NUM_SEATS {
        for (_, mut choices) in game.legal_actions(seat)? {
            actions.append(&mut choices);
        }
    }
    Ok(actions)
}

/// Play the game out to termination with uniformly random choices.
pub fn rollout<R: Rng + Sized>(game: &SecretHitler, rng: &mut R) -> Result<Rollout, GameError> {
    let mut game = game.clone();
    let mut returns = [0i32; NUM_SEATS];

    if let Some(winner) = game.winner() {
        return Ok(Rollout { winner, steps: 0, returns });
    }

    for step in 1..=MAX_ROLLOUT_STEPS {
        let mut actions = all_legal_actions(&game)?;
        if actions.is_empty() {
            return Err(GameError::InvariantViolation(
                "non-terminal state offered no actions".to_string(),
            ));
        }

        let random_index = rng.gen_range(0..actions.len());
        let random_action = actions.remove(random_index);

        game = game.apply_action(random_action)?;

        for (acc, step_reward) in returns.iter_mut().zip(reward(&game)) {
            *acc += step_reward;
        }

        if let Some(winner) = game.winner() {
            return Ok(Rollout { winner, steps: step, returns });
        }
    }

    Err(GameError::InvariantViolation(format!(
        "rollout did not terminate within {MAX_ROLLOUT_STEPS} steps"
    )))
}

/// A node of the explored game tree: the public projection of the state it
/// stands for.
#[derive(Clone, Debug)]
pub struct GraphNode {
    pub observed: ObservableState,
    pub terminal: bool,
}

/// Expand the tree of reachable states up to `depth` actions ahead, edges
/// labelled with the action taken. Useful for look-ahead search and for
/// eyeballing the turn protocol.
pub fn generate_graph(game: &SecretHitler, depth: usize) -> Result<Graph<GraphNode, Action>, GameError> {
    let mut graph = Graph::new();
    let root = graph.add_node(GraphNode {
        observed: game.observe(),
        terminal: game.terminated(),
    });

    expand(&mut graph, root, game, depth)?;

    Ok(graph)
}

fn expand(
    graph: &mut Graph<GraphNode, Action>,
    node: NodeIndex,
    game: &SecretHitler,
    depth: usize,
) -> Result<(), GameError> {
    if depth == 0 || game.terminated() {
        return Ok(());
    }

    for action in all_legal_actions(game)? {
        let next = game.apply_action(action.clone())?;
        let child = graph.add_node(GraphNode {
            observed: next.observe(),
            terminal: next.terminated(),
        });
        graph.add_edge(node, child, action);

        expand(graph, child, &next, depth - 1)?;
    }

    Ok(())
}
