//! Experience replay buffer for DQN training
//!
//! This module implements a fixed-capacity circular buffer of environment
//! transitions. New transitions overwrite the oldest ones once the buffer is
//! full, and training minibatches are drawn uniformly at random without
//! replacement.

use burn::tensor::{Tensor, TensorData, backend::Backend};
use rand::seq::index;

/// A minibatch sampled from the replay buffer
///
/// Five aligned columns of equal length, each stacked along a new leading
/// batch axis. The columns are plain [`TensorData`] so the caller can
/// materialize them on whichever backend the training step runs on.
#[derive(Debug, Clone)]
pub struct TransitionBatch {
    /// Observations before the action, `[batch, 1, H, W]`
    pub states: TensorData,

    /// Action indices taken, `[batch]` (int)
    pub actions: TensorData,

    /// Rewards received, `[batch]`
    pub rewards: TensorData,

    /// Observations after the action, `[batch, 1, H, W]`
    pub next_states: TensorData,

    /// Episode termination flags, `[batch]` (bool)
    pub terminals: TensorData,
}

impl TransitionBatch {
    /// Number of transitions in the batch
    pub fn len(&self) -> usize {
        self.actions.shape[0]
    }

    /// Check if the batch contains no transitions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn empty() -> Self {
        Self {
            states: TensorData::new(Vec::<f32>::new(), [0, 1, 0, 0]),
            actions: TensorData::new(Vec::<i64>::new(), [0]),
            rewards: TensorData::new(Vec::<f32>::new(), [0]),
            next_states: TensorData::new(Vec::<f32>::new(), [0, 1, 0, 0]),
            terminals: TensorData::new(Vec::<bool>::new(), [0]),
        }
    }
}

/// Fixed-capacity circular replay buffer
///
/// Stores transitions as parallel columns (one per field) and serves uniform
/// random minibatches for training. Adding never fails: once the buffer
/// reaches capacity, each new transition silently replaces the oldest one.
///
/// The buffer is exclusively owned and mutated through `&mut self`; callers
/// that need concurrent access must provide their own synchronization.
///
/// # Type Parameters
///
/// * `B` - The Burn backend the stored observation tensors live on
///
/// # Example
///
/// ```rust
/// use pixel_dqn::ReplayBuffer;
/// use burn::backend::ndarray::{NdArray, NdArrayDevice};
/// use burn::tensor::Tensor;
///
/// type Backend = NdArray<f32>;
///
/// let device = NdArrayDevice::default();
/// let mut buffer = ReplayBuffer::<Backend>::new(128);
///
/// let state = Tensor::zeros([1, 8, 8], &device);
/// let next_state = Tensor::zeros([1, 8, 8], &device);
/// buffer.add(state, 0, 1.0, next_state, false);
///
/// assert_eq!(buffer.len(), 1);
/// assert!(!buffer.is_full());
/// ```
pub struct ReplayBuffer<B: Backend> {
    /// Stored observations, `[1, H, W]` each
    states: Vec<Tensor<B, 3>>,

    /// Action indices taken
    actions: Vec<usize>,

    /// Rewards received
    rewards: Vec<f32>,

    /// Observations after the action
    next_states: Vec<Tensor<B, 3>>,

    /// Episode termination flags
    terminals: Vec<bool>,

    /// Next slot to overwrite once the buffer is full
    cursor: usize,

    /// Maximum number of stored transitions
    capacity: usize,
}

impl<B: Backend> ReplayBuffer<B> {
    /// Create a new replay buffer with the given capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of transitions to keep
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay buffer capacity must be positive");

        Self {
            states: Vec::with_capacity(capacity),
            actions: Vec::with_capacity(capacity),
            rewards: Vec::with_capacity(capacity),
            next_states: Vec::with_capacity(capacity),
            terminals: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Add a transition to the buffer
    ///
    /// Writes into the slot at the current cursor, overwriting the oldest
    /// transition once the buffer is full, and advances the cursor modulo
    /// capacity. Always succeeds.
    ///
    /// # Arguments
    ///
    /// * `state` - Observation before the action, `[1, H, W]`
    /// * `action` - Action index taken
    /// * `reward` - Reward received
    /// * `next_state` - Observation after the action, `[1, H, W]`
    /// * `terminal` - Whether the episode ended on this transition
    pub fn add(
        &mut self,
        state: Tensor<B, 3>,
        action: usize,
        reward: f32,
        next_state: Tensor<B, 3>,
        terminal: bool,
    ) {
        if self.states.len() < self.capacity {
            self.states.push(state);
            self.actions.push(action);
            self.rewards.push(reward);
            self.next_states.push(next_state);
            self.terminals.push(terminal);
        } else {
            self.states[self.cursor] = state;
            self.actions[self.cursor] = action;
            self.rewards[self.cursor] = reward;
            self.next_states[self.cursor] = next_state;
            self.terminals[self.cursor] = terminal;
        }

        self.cursor = (self.cursor + 1) % self.capacity;
    }

    /// Sample a random minibatch of transitions
    ///
    /// Draws `min(n, len)` distinct indices uniformly at random, so a single
    /// batch never contains the same transition twice. Each call uses fresh
    /// randomness from the thread-local generator; repeated calls are
    /// independent.
    ///
    /// Requesting more transitions than the buffer holds is not an error: the
    /// batch is simply shorter. Sampling from an empty buffer returns an
    /// empty batch.
    ///
    /// # Arguments
    ///
    /// * `n` - Requested batch size
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixel_dqn::ReplayBuffer;
    /// use burn::backend::ndarray::{NdArray, NdArrayDevice};
    /// use burn::tensor::Tensor;
    ///
    /// type Backend = NdArray<f32>;
    ///
    /// let device = NdArrayDevice::default();
    /// let mut buffer = ReplayBuffer::<Backend>::new(16);
    /// for i in 0..10 {
    ///     let state = Tensor::zeros([1, 8, 8], &device);
    ///     let next_state = Tensor::zeros([1, 8, 8], &device);
    ///     buffer.add(state, i % 4, 0.0, next_state, false);
    /// }
    ///
    /// assert_eq!(buffer.sample(4).len(), 4);
    /// // Oversized requests degrade to the available count
    /// assert_eq!(buffer.sample(32).len(), 10);
    /// ```
    pub fn sample(&self, n: usize) -> TransitionBatch {
        let k = n.min(self.len());
        if k == 0 {
            return TransitionBatch::empty();
        }

        let mut rng = rand::thread_rng();
        let picked: Vec<usize> = index::sample(&mut rng, self.len(), k).into_vec();

        let actions: Vec<i64> = picked.iter().map(|&i| self.actions[i] as i64).collect();
        let rewards: Vec<f32> = picked.iter().map(|&i| self.rewards[i]).collect();
        let terminals: Vec<bool> = picked.iter().map(|&i| self.terminals[i]).collect();

        TransitionBatch {
            states: Self::stack(&self.states, &picked),
            actions: TensorData::new(actions, [k]),
            rewards: TensorData::new(rewards, [k]),
            next_states: Self::stack(&self.next_states, &picked),
            terminals: TensorData::new(terminals, [k]),
        }
    }

    /// Stack the selected observations along a new leading batch axis
    fn stack(column: &[Tensor<B, 3>], picked: &[usize]) -> TensorData {
        let mut batch: Tensor<B, 4> = column[picked[0]].clone().unsqueeze_dim(0);
        for &i in &picked[1..] {
            let item: Tensor<B, 4> = column[i].clone().unsqueeze_dim(0);
            batch = Tensor::cat(vec![batch, item], 0);
        }
        batch.into_data()
    }

    /// Get the number of stored transitions
    ///
    /// Never exceeds the capacity and never decreases.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if the buffer contains no transitions
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Check if the buffer has reached capacity
    ///
    /// Once full, every `add` overwrites the oldest stored transition.
    pub fn is_full(&self) -> bool {
        self.states.len() == self.capacity
    }

    /// Get the maximum number of stored transitions
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
