//! Corridor DQN Example
//!
//! The agent starts in the middle of a one-dimensional corridor and has to
//! walk to the right end. Reaching the right end pays 1, the left end pays
//! nothing, and every episode is capped at 50 steps.
//!
//! `cargo run --example corridor`

use ndarray::{array, Array1};
use tdq::action_space::Discrete;
use tdq::config::TrainerConfig;
use tdq::error::Result;
use tdq::network::NeuralNetwork;
use tdq::trainer::Trainer;
use tracing::info;

const LENGTH: usize = 10;
const MAX_STEPS: usize = 50;

struct Corridor {
    position: usize,
}

impl Corridor {
    fn new() -> Self {
        Corridor { position: LENGTH / 2 }
    }

    fn observe(&self) -> Array1<f32> {
        let x = self.position as f32 / (LENGTH - 1) as f32;
        array![x, 1.0 - x]
    }

    fn reset(&mut self) -> Array1<f32> {
        self.position = LENGTH / 2;
        self.observe()
    }

    /// Action 0 moves left, action 1 moves right.
    fn step(&mut self, action: usize) -> (Array1<f32>, f32, bool) {
        if action == 0 {
            self.position = self.position.saturating_sub(1);
        } else {
            self.position = (self.position + 1).min(LENGTH - 1);
        }

        let (reward, done) = match self.position {
            0 => (0.0, true),
            p if p == LENGTH - 1 => (1.0, true),
            _ => (0.0, false),
        };
        (self.observe(), reward, done)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = TrainerConfig::builder()
        .replay_capacity(5_000)
        .batch_size(32)
        .lr(1e-3)
        .epsilon(1.0, 0.05, 3_000)
        .train_interval(1)
        .gamma(0.95)
        .grad_clip(1.0)
        .target_update_interval(200)
        .double(true)
        .seed(7)
        .build()?;
    let network = NeuralNetwork::q_network(&[2, 32, 32, 2])?;
    let mut trainer = Trainer::new(config, Discrete::with_seed(2, 7)?, network)?;
    let mut env = Corridor::new();

    let episodes = 300;
    let mut successes = 0;
    let mut losses = Vec::new();

    for episode in 0..episodes {
        let mut state = env.reset();
        let mut reward_sum = 0.0;

        for _ in 0..MAX_STEPS {
            let action = trainer.choose_action(state.view())?;
            let (next_state, reward, done) = env.step(action);
            reward_sum += reward;

            trainer.push(state, action, next_state.clone(), reward, done)?;
            if let Some(step) = trainer.train_step()? {
                losses.push(step.loss);
            }

            state = next_state;
            if done {
                break;
            }
        }

        if reward_sum > 0.0 {
            successes += 1;
        }

        if (episode + 1) % 50 == 0 {
            let recent = &losses[losses.len().saturating_sub(500)..];
            let mean_loss = if recent.is_empty() {
                0.0
            } else {
                recent.iter().sum::<f32>() / recent.len() as f32
            };
            info!(
                episode = episode + 1,
                successes,
                epsilon = trainer.epsilon(),
                mean_loss,
                "training progress"
            );
            successes = 0;
        }
    }

    // Greedy rollout from the start position
    let mut state = env.reset();
    let mut path = vec![env.position];
    for _ in 0..MAX_STEPS {
        let action = trainer.greedy_action(state.view())?;
        let (next_state, _, done) = env.step(action);
        path.push(env.position);
        state = next_state;
        if done {
            break;
        }
    }
    info!(?path, reached_goal = env.position == LENGTH - 1, "greedy rollout");

    Ok(())
}
