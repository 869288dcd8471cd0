//! Dueling DQN agent for image-like observations
//!
//! This library provides the pieces a Deep Q-Learning training loop is built
//! from:
//! - A dueling convolutional Q-network ([`DuelingQNetwork`]) that splits into
//!   value and advantage streams and recombines them into per-action Q-values
//! - An agent wrapper ([`DqnAgent`]) exposing greedy action queries, a
//!   training update against caller-computed TD targets, weight transfer to a
//!   target network, and numbered checkpointing
//! - A fixed-capacity experience replay buffer ([`ReplayBuffer`]) serving
//!   uniform random minibatches
//!
//! The environment, exploration policy, and the loop itself stay with the
//! caller.
//!
//! # Example
//!
//! ```rust
//! use burn::tensor::{Int, Tensor};
//! use pixel_dqn::{
//!     default_device, DqnAgent, DqnConfig, DuelingNetworkConfig, InferenceBackend,
//!     ReplayBuffer, TrainingBackend,
//! };
//!
//! let device = default_device();
//! let net_config = DuelingNetworkConfig::new(36, 36, 4);
//!
//! // Online network trains; the target network provides stable TD targets
//! let mut online = DqnAgent::<TrainingBackend>::new(
//!     net_config.clone(),
//!     DqnConfig::default(),
//!     "online",
//!     None,
//!     device.clone(),
//! )
//! .unwrap();
//! let mut target = DqnAgent::<TrainingBackend>::new(
//!     net_config,
//!     DqnConfig::default(),
//!     "target",
//!     None,
//!     device.clone(),
//! )
//! .unwrap();
//!
//! // Environment interaction (elsewhere) pushes transitions into the buffer
//! let mut buffer = ReplayBuffer::<InferenceBackend>::new(1024);
//! for step in 0..8 {
//!     let state = Tensor::zeros([1, 36, 36], &device);
//!     let next_state = Tensor::ones([1, 36, 36], &device);
//!     buffer.add(state, step % 4, 1.0, next_state, step == 7);
//! }
//!
//! // Sample a minibatch and compute TD targets from the target network
//! let batch = buffer.sample(4);
//! let next_states: Tensor<InferenceBackend, 4> =
//!     Tensor::from_data(batch.next_states, &device);
//! let (_, next_q) = target.action_and_q(next_states);
//!
//! let gamma = 0.99;
//! let rewards: Vec<f32> = batch.rewards.iter::<f32>().collect();
//! let terminals: Vec<bool> = batch.terminals.iter::<bool>().collect();
//! let targets: Vec<f32> = rewards
//!     .iter()
//!     .zip(&terminals)
//!     .zip(&next_q)
//!     .map(|((&r, &t), &q)| if t { r } else { r + gamma * q })
//!     .collect();
//!
//! // One optimization step on the online network
//! let states: Tensor<TrainingBackend, 4> = Tensor::from_data(batch.states, &device);
//! let actions: Tensor<TrainingBackend, 1, Int> = Tensor::from_data(batch.actions, &device);
//! let targets: Tensor<TrainingBackend, 1> = Tensor::from_floats(targets.as_slice(), &device);
//! online.train(states, actions, targets);
//!
//! // Periodically refresh the target network from the online one
//! target.transfer_weights_from(&online).unwrap();
//! ```

pub mod backend;
pub mod buffer;
pub mod config;
pub mod dqn;
pub mod error;
pub mod metrics;
pub mod network;
pub mod persistence;

pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use buffer::{ReplayBuffer, TransitionBatch};
pub use config::DqnConfig;
pub use dqn::{ActionSelection, DqnAgent};
pub use error::{DqnError, Result};
pub use metrics::TrainingStats;
pub use network::{DuelingNetworkConfig, DuelingQNetwork};
pub use persistence::{CheckpointMetadata, Checkpointer, load_network};
