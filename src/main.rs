use std::error::Error;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::Serialize;

use secret_hitler_rs::{Action, SecretHitlerEnv, Team, NUM_SEATS};

const EPISODES: usize = 100;
const MAX_STEPS: usize = 10_000;

/// One CSV row per finished episode.
#[derive(Serialize)]
struct EpisodeRecord {
    episode: usize,
    hitler: usize,
    fascist: usize,
    winner: String,
    steps: usize,
    return_0: i32,
    return_1: i32,
    return_2: i32,
    return_3: i32,
    return_4: i32,
}

fn main() -> Result<(), Box<dyn Error>> {
    let seed = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u64>())
        .transpose()?
        .unwrap_or(82);

    let mut rng = Pcg64::seed_from_u64(seed);
    let mut writer = csv::Writer::from_path("episodes.csv")?;

    for episode in 0..EPISODES {
        // deal roles in random seat order, like shuffling the role cards
        let mut seats: Vec<usize> = (0..NUM_SEATS).collect();
        seats.shuffle(&mut rng);
        let (hitler, fascist) = (seats[0], seats[1]);

        let mut env = SecretHitlerEnv::new(hitler, fascist)?;
        let obs = env.reset();

        if episode == 0 {
            println!("initial state: {}", serde_json::to_string(&obs)?);
            for seat in 0..NUM_SEATS {
                println!("seat {seat} {:?}", env.knowledge(seat)?);
            }
        }

        let mut returns = [0i32; NUM_SEATS];
        let mut steps = 0usize;
        let mut done = false;

        'episode: for _ in 0..MAX_STEPS {
            for seat in 0..NUM_SEATS {
                let legal = env.legal_actions(seat)?;
                let choices: Vec<Action> = legal.into_values().flatten().collect();
                if choices.is_empty() {
                    continue;
                }

                let random_index = rng.gen_range(0..choices.len());
                let (_, rewards, terminated) = env.step(choices[random_index].clone())?;
                steps += 1;

                for (acc, reward) in returns.iter_mut().zip(rewards) {
                    *acc += reward;
                }

                if terminated {
                    done = true;
                    break 'episode;
                }
            }
        }

        if !done {
            eprintln!("episode {episode} hit the step cap without terminating");
        }

        let winner = match env.game().winner() {
            Some(Team::Liberal) => "liberal",
            Some(Team::Fascist) => "fascist",
            None => "none",
        };

        println!(
            "episode {episode}: {winner} win after {steps} steps (hitler {hitler}, fascist {fascist}), returns {returns:?}"
        );

        writer.serialize(EpisodeRecord {
            episode,
            hitler,
            fascist,
            winner: winner.to_string(),
            steps,
            return_0: returns[0],
            return_1: returns[1],
            return_2: returns[2],
            return_3: returns[3],
            return_4: returns[4],
        })?;
    }

    writer.flush()?;

    Ok(())
}
