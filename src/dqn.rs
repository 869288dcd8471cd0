//! Dueling DQN agent
//!
//! This module wires the dueling Q-network to an Adam optimizer and exposes
//! the operations a DQN training loop needs: greedy action queries, one
//! training step against caller-computed TD targets, weight transfer into a
//! target network, and periodic checkpointing.
//!
//! The agent does not own an environment, an exploration policy, or the
//! training loop itself; those live with the caller. A typical setup runs two
//! agents of identical architecture, an online network that trains and a
//! target network that is refreshed from it every few thousand steps:
//!
//! ```rust,ignore
//! let mut online = DqnAgent::<TrainingBackend>::new(
//!     net_config.clone(), config.clone(), "online", Some("runs/exp1".into()), device.clone())?;
//! let mut target = DqnAgent::<TrainingBackend>::new(
//!     net_config, config, "target", None, device)?;
//!
//! // ... training loop: buffer.sample, compute TD targets from `target`,
//! // online.train(...), and periodically:
//! target.transfer_weights_from(&online)?;
//! online.save()?;
//! ```

use burn::{
    module::{AutodiffModule, Module},
    nn::loss::{MseLoss, Reduction},
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{ElementConversion, Int, Tensor, TensorData, backend::AutodiffBackend},
};
use std::path::PathBuf;

use crate::config::DqnConfig;
use crate::error::{DqnError, Result};
use crate::metrics::TrainingStats;
use crate::network::{DuelingNetworkConfig, DuelingQNetwork};
use crate::persistence::Checkpointer;

/// Greedy action choice for a batch of states
///
/// A batch holding exactly one state yields a bare action index; a larger (or
/// empty) batch yields one index per state. The two cases are distinct
/// variants rather than a one-element vector, so callers handling the
/// single-state case never unwrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSelection {
    /// The greedy action for a single-state batch
    Single(usize),

    /// The greedy actions for a multi-state batch, one per state
    Batch(Vec<usize>),
}

/// Dueling DQN agent
///
/// Owns a [`DuelingQNetwork`], its Adam optimizer, a namespace identifier
/// (so several agents, e.g. online and target, can coexist and be told apart
/// in checkpoints and logs), an optional checkpoint store, and rolling
/// training statistics.
///
/// All operations are synchronous and run to completion; mutation goes
/// through `&mut self`, so shared use across threads requires external
/// locking by the caller.
///
/// # Type Parameters
///
/// * `B` - Autodiff backend for gradient computation
pub struct DqnAgent<B: AutodiffBackend> {
    /// Dueling Q-network
    network: DuelingQNetwork<B>,

    /// Adam optimizer for the network parameters
    optim: OptimizerAdaptor<Adam, DuelingQNetwork<B>, B>,

    /// Network architecture, kept for transfer validation and checkpoints
    network_config: DuelingNetworkConfig,

    /// Training hyperparameters
    config: DqnConfig,

    /// Namespace identifier (e.g. "online", "target")
    name: String,

    /// Checkpoint store, present when a checkpoint directory was configured
    checkpointer: Option<Checkpointer>,

    /// Rolling statistics over training updates
    stats: TrainingStats,

    /// Device for tensor operations
    device: B::Device,
}

impl<B: AutodiffBackend> DqnAgent<B> {
    /// Create a new agent
    ///
    /// Validates both configurations and claims the checkpoint directory
    /// before any network parameter is initialized, so a path collision can
    /// never waste work or clobber a previous run.
    ///
    /// # Arguments
    ///
    /// * `network_config` - Network architecture
    /// * `config` - Training hyperparameters
    /// * `name` - Namespace identifier for this network
    /// * `checkpoint_dir` - Directory for snapshots; `None` disables saving
    /// * `device` - Device for computation
    ///
    /// # Errors
    ///
    /// Returns [`DqnError::InvalidArgument`] if either configuration is
    /// invalid and [`DqnError::AlreadyExists`] if the checkpoint directory
    /// already exists.
    pub fn new(
        network_config: DuelingNetworkConfig,
        config: DqnConfig,
        name: impl Into<String>,
        checkpoint_dir: Option<PathBuf>,
        device: B::Device,
    ) -> Result<Self> {
        network_config.validate()?;
        config.validate()?;

        let checkpointer = match checkpoint_dir {
            Some(dir) => Some(Checkpointer::create(dir)?),
            None => None,
        };

        let network = network_config.init::<B>(&device);
        let optim = AdamConfig::new().init();
        let stats = TrainingStats::new(config.stats_window);

        Ok(Self {
            network,
            optim,
            network_config,
            config,
            name: name.into(),
            checkpointer,
            stats,
            device,
        })
    }

    /// Compute Q-values for a batch of states
    ///
    /// Runs the forward pass in no-grad mode on the inner backend.
    ///
    /// # Arguments
    ///
    /// * `states` - Batch of observations, `[batch, 1, H, W]`
    ///
    /// # Returns
    ///
    /// Q-values `[batch, num_actions]`.
    pub fn q_values(&self, states: Tensor<B::InnerBackend, 4>) -> Tensor<B::InnerBackend, 2> {
        self.network.clone().valid().forward(states)
    }

    /// Get the greedy action and its Q-value for every state in a batch
    ///
    /// Ties in the maximum resolve to the lowest action index, consistently
    /// for both the returned action and its Q-value.
    ///
    /// # Arguments
    ///
    /// * `states` - Non-empty batch of observations, `[batch, 1, H, W]`
    ///
    /// # Returns
    ///
    /// Two aligned vectors: the greedy action index and its Q-value, one
    /// entry per state.
    pub fn action_and_q(&self, states: Tensor<B::InnerBackend, 4>) -> (Vec<usize>, Vec<f32>) {
        let q_values = self.q_values(states);

        let actions: Vec<usize> = q_values
            .clone()
            .argmax(1)
            .squeeze::<1>(1)
            .into_data()
            .iter::<i64>()
            .map(|a| a as usize)
            .collect();
        let best_q: Vec<f32> = q_values
            .max_dim(1)
            .squeeze::<1>(1)
            .into_data()
            .iter::<f32>()
            .collect();

        (actions, best_q)
    }

    /// Get the greedy action for every state in a batch
    ///
    /// Returns [`ActionSelection::Single`] when the batch holds exactly one
    /// state and [`ActionSelection::Batch`] otherwise.
    ///
    /// # Arguments
    ///
    /// * `states` - Non-empty batch of observations, `[batch, 1, H, W]`
    pub fn action(&self, states: Tensor<B::InnerBackend, 4>) -> ActionSelection {
        let (actions, _) = self.action_and_q(states);

        if actions.len() == 1 {
            ActionSelection::Single(actions[0])
        } else {
            ActionSelection::Batch(actions)
        }
    }

    /// Get the greedy action for a single observation
    ///
    /// Convenience wrapper over [`action`](Self::action) for rollout loops
    /// that step one observation at a time.
    ///
    /// # Arguments
    ///
    /// * `state` - A single observation, `[1, H, W]`
    pub fn best_action(&self, state: Tensor<B::InnerBackend, 3>) -> usize {
        let states: Tensor<B::InnerBackend, 4> = state.unsqueeze_dim(0);
        let (actions, _) = self.action_and_q(states);
        actions[0]
    }

    /// Perform one training update against caller-computed TD targets
    ///
    /// Computes Q-values for the batch, selects each row's Q at the taken
    /// action through a one-hot mask (a batched, differentiable selection),
    /// and takes one Adam step on the mean squared error between the selected
    /// Q-values and the targets. All network parameters are updated in place;
    /// the loss and the mean selected Q are recorded into [`stats`](Self::stats).
    ///
    /// Inputs are assumed well formed with a matching leading dimension; the
    /// TD targets themselves (reward plus discounted future value) are the
    /// caller's to compute, typically from a target agent's
    /// [`action_and_q`](Self::action_and_q) on the successor states.
    ///
    /// # Arguments
    ///
    /// * `states` - Batch of observations, `[batch, 1, H, W]`
    /// * `actions` - Action index taken in each state, `[batch]`
    /// * `targets` - TD target per state, `[batch]`
    pub fn train(
        &mut self,
        states: Tensor<B, 4>,
        actions: Tensor<B, 1, Int>,
        targets: Tensor<B, 1>,
    ) {
        let q_values = self.network.forward(states);

        // Select Q[action] per row; the mask is constant so gradients flow
        // only through the chosen entries
        let mask = self.one_hot_mask(&actions);
        let selected = (q_values * mask).sum_dim(1).squeeze::<1>(1);

        let loss = MseLoss::new().forward(selected.clone(), targets, Reduction::Mean);
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optim
            .step(self.config.learning_rate, self.network.clone(), grads);

        let loss_value = loss.into_scalar().elem::<f32>();
        let mean_q = selected.mean().into_scalar().elem::<f32>();
        self.stats.record_update(loss_value, mean_q);
    }

    /// Build a `[batch, num_actions]` one-hot mask from action indices
    fn one_hot_mask(&self, actions: &Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let num_actions = self.network_config.num_actions;
        let indices: Vec<i64> = actions.to_data().iter::<i64>().collect();

        let mut mask = vec![0.0f32; indices.len() * num_actions];
        for (row, &action) in indices.iter().enumerate() {
            mask[row * num_actions + action as usize] = 1.0;
        }

        Tensor::from_data(
            TensorData::new(mask, [indices.len(), num_actions]),
            &self.device,
        )
    }

    /// Overwrite this agent's network parameters with another agent's
    ///
    /// Used to refresh a target network from the online network. The source
    /// parameters are exported as a named record and loaded into this
    /// network, so parameters pair by module structure rather than by
    /// position, and the replacement lands as a single swap: a reader of
    /// `&self` can never observe a half-copied network.
    ///
    /// The optimizer state of this agent is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DqnError::InvalidArgument`] if the two agents were built
    /// with different network architectures.
    pub fn transfer_weights_from(&mut self, source: &Self) -> Result<()> {
        if self.network_config != source.network_config {
            return Err(DqnError::InvalidArgument(format!(
                "cannot transfer weights between different architectures: \
                 {:?} vs {:?}",
                source.network_config, self.network_config
            )));
        }

        let record = source.network.clone().into_record();
        self.network = self.network.clone().load_record(record);
        Ok(())
    }

    /// Persist a snapshot of the network parameters
    ///
    /// Writes a checkpoint tagged with the monotonically increasing save
    /// counter. A silent no-op when the agent was created without a
    /// checkpoint directory.
    ///
    /// # Errors
    ///
    /// Returns [`DqnError::Io`], [`DqnError::Serialization`], or
    /// [`DqnError::Record`] if the snapshot cannot be written.
    pub fn save(&mut self) -> Result<()> {
        if let Some(checkpointer) = self.checkpointer.as_mut() {
            checkpointer.save(&self.network, &self.name, &self.network_config, &self.config)?;
        }
        Ok(())
    }

    /// Get the number of snapshots written so far
    ///
    /// Always 0 when no checkpoint directory was configured.
    pub fn save_count(&self) -> usize {
        self.checkpointer.as_ref().map_or(0, Checkpointer::save_count)
    }

    /// Get a reference to the Q-network
    pub fn network(&self) -> &DuelingQNetwork<B> {
        &self.network
    }

    /// Get the namespace identifier of this agent
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the training hyperparameters
    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    /// Get the network architecture
    pub fn network_config(&self) -> &DuelingNetworkConfig {
        &self.network_config
    }

    /// Get the rolling training statistics
    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{InferenceBackend, TrainingBackend, default_device};
    use burn::backend::ndarray::NdArrayDevice;
    use burn::tensor::Distribution;
    use tempfile::TempDir;

    const TEST_SIZE: usize = 36;
    const NUM_ACTIONS: usize = 4;

    fn test_agent(name: &str) -> DqnAgent<TrainingBackend> {
        let device = default_device();
        let network_config = DuelingNetworkConfig::new(TEST_SIZE, TEST_SIZE, NUM_ACTIONS);
        DqnAgent::new(network_config, DqnConfig::default(), name, None, device).unwrap()
    }

    fn random_states(batch: usize, device: &NdArrayDevice) -> Tensor<InferenceBackend, 4> {
        Tensor::random(
            [batch, 1, TEST_SIZE, TEST_SIZE],
            Distribution::Uniform(0.0, 1.0),
            device,
        )
    }

    #[test]
    fn test_agent_creation() {
        let agent = test_agent("online");
        assert_eq!(agent.name(), "online");
        assert_eq!(agent.save_count(), 0);
        assert_eq!(agent.stats().total_updates(), 0);
    }

    #[test]
    fn test_creation_rejects_invalid_network_config() {
        let device = default_device();
        // Observation too small for the conv stack
        let network_config = DuelingNetworkConfig::new(4, 4, NUM_ACTIONS);
        let result = DqnAgent::<TrainingBackend>::new(
            network_config,
            DqnConfig::default(),
            "online",
            None,
            device,
        );
        assert!(matches!(result, Err(DqnError::InvalidArgument(_))));
    }

    #[test]
    fn test_creation_rejects_existing_checkpoint_dir() {
        let tmp = TempDir::new().unwrap();
        let device = default_device();
        let network_config = DuelingNetworkConfig::new(TEST_SIZE, TEST_SIZE, NUM_ACTIONS);

        let result = DqnAgent::<TrainingBackend>::new(
            network_config,
            DqnConfig::default(),
            "online",
            Some(tmp.path().to_path_buf()),
            device,
        );
        assert!(matches!(result, Err(DqnError::AlreadyExists(_))));
    }

    #[test]
    fn test_action_and_q_shapes() {
        let agent = test_agent("online");
        let device = default_device();

        let (actions, q_values) = agent.action_and_q(random_states(3, &device));
        assert_eq!(actions.len(), 3);
        assert_eq!(q_values.len(), 3);
        for action in actions {
            assert!(action < NUM_ACTIONS);
        }
        for q in q_values {
            assert!(q.is_finite());
        }
    }

    #[test]
    fn test_action_and_q_matches_q_values() {
        let agent = test_agent("online");
        let device = default_device();
        let states = random_states(5, &device);

        let q_all: Vec<f32> = agent
            .q_values(states.clone())
            .into_data()
            .iter::<f32>()
            .collect();
        let (actions, best_q) = agent.action_and_q(states);

        for row in 0..5 {
            let row_q = &q_all[row * NUM_ACTIONS..(row + 1) * NUM_ACTIONS];
            // Reported action attains the reported Q, and nothing beats it
            assert_eq!(row_q[actions[row]], best_q[row]);
            for &q in row_q {
                assert!(q <= best_q[row]);
            }
            // First-maximum tie convention: no earlier action attains the max
            for &q in &row_q[..actions[row]] {
                assert!(q < best_q[row]);
            }
        }
    }

    #[test]
    fn test_action_single_state_returns_single() {
        let agent = test_agent("online");
        let device = default_device();

        match agent.action(random_states(1, &device)) {
            ActionSelection::Single(action) => assert!(action < NUM_ACTIONS),
            ActionSelection::Batch(_) => panic!("one-state batch must yield Single"),
        }
    }

    #[test]
    fn test_action_multi_state_returns_batch() {
        let agent = test_agent("online");
        let device = default_device();

        match agent.action(random_states(2, &device)) {
            ActionSelection::Batch(actions) => assert_eq!(actions.len(), 2),
            ActionSelection::Single(_) => panic!("two-state batch must yield Batch"),
        }
    }

    #[test]
    fn test_best_action_single_observation() {
        let agent = test_agent("online");
        let device = default_device();

        let state = Tensor::<InferenceBackend, 3>::zeros([1, TEST_SIZE, TEST_SIZE], &device);
        let action = agent.best_action(state);
        assert!(action < NUM_ACTIONS);
    }

    #[test]
    fn test_train_records_stats() {
        let mut agent = test_agent("online");
        let device = default_device();

        let states = Tensor::random(
            [4, 1, TEST_SIZE, TEST_SIZE],
            Distribution::Uniform(0.0, 1.0),
            &device,
        );
        let actions = Tensor::from_ints([0, 1, 2, 3], &device);
        let targets = Tensor::from_floats([1.0, -1.0, 0.5, 0.0], &device);

        agent.train(states, actions, targets);

        assert_eq!(agent.stats().total_updates(), 1);
        assert!(agent.stats().mean_loss().is_finite());
        assert!(agent.stats().mean_q().is_finite());
    }

    #[test]
    fn test_train_moves_q_toward_targets() {
        let mut agent = test_agent("online");
        let device = default_device();

        let states = Tensor::random(
            [4, 1, TEST_SIZE, TEST_SIZE],
            Distribution::Uniform(0.0, 1.0),
            &device,
        );
        let actions: Vec<i32> = vec![0, 1, 2, 3];
        let targets: Vec<f32> = vec![1.0, -1.0, 0.5, 0.0];

        agent.train(
            states.clone(),
            Tensor::from_ints(actions.as_slice(), &device),
            Tensor::from_floats(targets.as_slice(), &device),
        );
        let initial_loss = agent.stats().mean_loss();

        for _ in 0..30 {
            agent.train(
                states.clone(),
                Tensor::from_ints(actions.as_slice(), &device),
                Tensor::from_floats(targets.as_slice(), &device),
            );
        }
        // The rolling mean still contains the first loss, so it only drops
        // below the initial reading if later updates actually improved
        let final_loss = agent.stats().mean_loss();

        assert!(
            final_loss < initial_loss,
            "repeated updates on a fixed batch should reduce the loss \
             (initial {initial_loss}, final {final_loss})"
        );
    }

    #[test]
    fn test_transfer_makes_outputs_identical() {
        let mut target = test_agent("target");
        let online = test_agent("online");
        let device = default_device();

        target.transfer_weights_from(&online).unwrap();

        let states = random_states(3, &device);
        let (online_actions, online_q) = online.action_and_q(states.clone());
        let (target_actions, target_q) = target.action_and_q(states);

        assert_eq!(online_actions, target_actions);
        // Bit-identical, not merely close
        assert_eq!(online_q, target_q);
    }

    #[test]
    fn test_transfer_rejects_mismatched_architecture() {
        let device = default_device();
        let online = test_agent("online");
        let mut target = DqnAgent::<TrainingBackend>::new(
            DuelingNetworkConfig::new(TEST_SIZE, TEST_SIZE, NUM_ACTIONS + 1),
            DqnConfig::default(),
            "target",
            None,
            device,
        )
        .unwrap();

        let result = target.transfer_weights_from(&online);
        assert!(matches!(result, Err(DqnError::InvalidArgument(_))));
    }

    #[test]
    fn test_save_without_directory_is_noop() {
        let mut agent = test_agent("online");
        agent.save().unwrap();
        agent.save().unwrap();
        assert_eq!(agent.save_count(), 0);
    }

    #[test]
    fn test_save_increments_counter_and_writes_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("run");
        let device = default_device();

        let mut agent = DqnAgent::<TrainingBackend>::new(
            DuelingNetworkConfig::new(TEST_SIZE, TEST_SIZE, NUM_ACTIONS),
            DqnConfig::default(),
            "online",
            Some(dir.clone()),
            device,
        )
        .unwrap();

        agent.save().unwrap();
        agent.save().unwrap();

        assert_eq!(agent.save_count(), 2);
        assert!(dir.join("model-0.mpk").is_file());
        assert!(dir.join("model-1.mpk").is_file());
    }
}
