//! Dueling Q-value network for image-like observations
//!
//! This module implements a convolutional neural network that maps a batch of
//! single-plane image observations to one Q-value per discrete action, using
//! the dueling decomposition: a shared convolutional trunk feeds two parallel
//! dense streams, one estimating the state value and one estimating per-action
//! advantages, which are recombined into Q-values.
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 1, H, W]
//!   ↓ Conv2d(1→32, k=8, s=4) + ReLU
//!   ↓ Conv2d(32→64, k=4, s=2) + ReLU
//!   ↓ Conv2d(64→64, k=3, s=1) + ReLU
//!   ↓ Flatten: [batch, 64*H'*W']
//!   ↓ Split
//!   ├─→ Value:     Linear(→ 512) + ReLU → Linear(512 → 1)
//!   └─→ Advantage: Linear(→ 512) + ReLU → Linear(512 → num_actions)
//!   ↓ Combine
//!   Q[a] = value + (advantage[a] - mean(advantage))
//! ```
//!
//! Subtracting the mean advantage makes the decomposition identifiable:
//! without it, any constant could move freely between the value and advantage
//! streams without changing Q.
//!
//! # Example
//!
//! ```rust
//! use pixel_dqn::{DuelingNetworkConfig, DuelingQNetwork};
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! // Network for 84x84 observations and 4 actions
//! let device = NdArrayDevice::default();
//! let config = DuelingNetworkConfig::new(84, 84, 4);
//! let network = config.init::<Backend>(&device);
//!
//! let states = Tensor::zeros([2, 1, 84, 84], &device);
//! let q_values = network.forward(states);
//!
//! assert_eq!(q_values.dims(), [2, 4]); // [batch, num_actions]
//! ```

use burn::{
    module::Module,
    nn::{
        Linear, LinearConfig,
        conv::{Conv2d, Conv2dConfig},
    },
    tensor::{Tensor, activation::relu, backend::Backend},
};
use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};

/// Kernel sizes of the three convolutional stages
const CONV_KERNELS: [usize; 3] = [8, 4, 3];

/// Strides of the three convolutional stages
const CONV_STRIDES: [usize; 3] = [4, 2, 1];

/// Configuration for the dueling Q-network
///
/// Use [`DuelingNetworkConfig::new`] for the standard architecture; only the
/// observation size and the action count vary between environments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelingNetworkConfig {
    /// Observation height in pixels
    pub height: usize,

    /// Observation width in pixels
    pub width: usize,

    /// Number of discrete actions the network scores
    pub num_actions: usize,

    /// Output channels of the three convolutional stages (default: [32, 64, 64])
    pub conv_channels: [usize; 3],

    /// Hidden dimension of the value and advantage streams (default: 512)
    pub hidden_dim: usize,
}

impl DuelingNetworkConfig {
    /// Create a new configuration with the standard channel and hidden sizes
    ///
    /// # Arguments
    ///
    /// * `height` - Observation height in pixels
    /// * `width` - Observation width in pixels
    /// * `num_actions` - Number of discrete actions
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixel_dqn::DuelingNetworkConfig;
    ///
    /// let config = DuelingNetworkConfig::new(84, 84, 6);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(height: usize, width: usize, num_actions: usize) -> Self {
        Self {
            height,
            width,
            num_actions,
            conv_channels: [32, 64, 64],
            hidden_dim: 512,
        }
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    ///
    /// Returns [`DqnError::InvalidArgument`] if the action count, channel
    /// sizes, or hidden dimension are zero, or if the observation is too small
    /// to survive the convolutional stack.
    pub fn validate(&self) -> Result<()> {
        if self.num_actions == 0 {
            return Err(DqnError::InvalidArgument(
                "num_actions must be at least 1".to_string(),
            ));
        }

        if self.conv_channels.iter().any(|&c| c == 0) {
            return Err(DqnError::InvalidArgument(format!(
                "conv_channels must all be positive, got {:?}",
                self.conv_channels
            )));
        }

        if self.hidden_dim == 0 {
            return Err(DqnError::InvalidArgument(
                "hidden_dim must be at least 1".to_string(),
            ));
        }

        self.conv_output_dims().map(|_| ())
    }

    /// Spatial dimensions after the three convolutional stages
    ///
    /// Each stage uses valid padding: `out = (in - kernel) / stride + 1`.
    fn conv_output_dims(&self) -> Result<(usize, usize)> {
        let mut height = self.height;
        let mut width = self.width;

        for (stage, (&kernel, &stride)) in
            CONV_KERNELS.iter().zip(CONV_STRIDES.iter()).enumerate()
        {
            if height < kernel || width < kernel {
                return Err(DqnError::InvalidArgument(format!(
                    "observation {}x{} is too small: conv stage {} needs at least \
                     {kernel}x{kernel} input, got {height}x{width}",
                    self.height,
                    self.width,
                    stage + 1,
                )));
            }
            height = (height - kernel) / stride + 1;
            width = (width - kernel) / stride + 1;
        }

        Ok((height, width))
    }

    /// Initialize the dueling Q-network from this configuration
    ///
    /// # Arguments
    ///
    /// * `device` - The device to place the network on
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid; call [`validate`](Self::validate)
    /// first when the configuration comes from untrusted input.
    pub fn init<B: Backend>(&self, device: &B::Device) -> DuelingQNetwork<B> {
        let (out_height, out_width) = self
            .conv_output_dims()
            .expect("invalid dueling network configuration");
        let flattened_dim = self.conv_channels[2] * out_height * out_width;

        DuelingQNetwork {
            conv1: Conv2dConfig::new([1, self.conv_channels[0]], [CONV_KERNELS[0]; 2])
                .with_stride([CONV_STRIDES[0]; 2])
                .init(device),
            conv2: Conv2dConfig::new(
                [self.conv_channels[0], self.conv_channels[1]],
                [CONV_KERNELS[1]; 2],
            )
            .with_stride([CONV_STRIDES[1]; 2])
            .init(device),
            conv3: Conv2dConfig::new(
                [self.conv_channels[1], self.conv_channels[2]],
                [CONV_KERNELS[2]; 2],
            )
            .with_stride([CONV_STRIDES[2]; 2])
            .init(device),
            value_hid: LinearConfig::new(flattened_dim, self.hidden_dim).init(device),
            advantage_hid: LinearConfig::new(flattened_dim, self.hidden_dim).init(device),
            value_head: LinearConfig::new(self.hidden_dim, 1).init(device),
            advantage_head: LinearConfig::new(self.hidden_dim, self.num_actions).init(device),
        }
    }
}

/// Dueling convolutional Q-network
///
/// Processes single-plane image observations through a shared convolutional
/// trunk, then through separate value and advantage streams whose outputs are
/// recombined into per-action Q-values.
///
/// The network is generic over the backend, so the same module definition
/// serves training (`Autodiff<NdArray<f32>>`) and inference (`NdArray<f32>`).
/// Parameters are addressed by module field name in Burn's record system,
/// which is what checkpointing and weight transfer rely on.
#[derive(Module, Debug)]
pub struct DuelingQNetwork<B: Backend> {
    /// First convolutional stage: 1 → 32 channels, 8x8 kernel, stride 4
    conv1: Conv2d<B>,
    /// Second convolutional stage: 32 → 64 channels, 4x4 kernel, stride 2
    conv2: Conv2d<B>,
    /// Third convolutional stage: 64 → 64 channels, 3x3 kernel, stride 1
    conv3: Conv2d<B>,
    /// Hidden dense stage of the value stream
    value_hid: Linear<B>,
    /// Hidden dense stage of the advantage stream
    advantage_hid: Linear<B>,
    /// Value projection: hidden → 1 scalar per state
    value_head: Linear<B>,
    /// Advantage projection: hidden → one scalar per action
    advantage_head: Linear<B>,
}

impl<B: Backend> DuelingQNetwork<B> {
    /// Forward pass through the network
    ///
    /// # Arguments
    ///
    /// * `states` - Batch of observations with shape `[batch, 1, height, width]`
    ///
    /// # Returns
    ///
    /// Q-values with shape `[batch, num_actions]`, already combined from the
    /// value and advantage streams.
    pub fn forward(&self, states: Tensor<B, 4>) -> Tensor<B, 2> {
        // Convolutional trunk
        let x = relu(self.conv1.forward(states));
        let x = relu(self.conv2.forward(x));
        let x = relu(self.conv3.forward(x));

        // Flatten: [batch, C, H', W'] → [batch, C*H'*W']
        let [batch_size, channels, height, width] = x.dims();
        let x = x.reshape([batch_size, channels * height * width]);

        // Parallel dense streams
        let value = self.value_head.forward(relu(self.value_hid.forward(x.clone())));
        let advantage = self
            .advantage_head
            .forward(relu(self.advantage_hid.forward(x)));

        dueling_q(value, advantage)
    }
}

/// Combine value and advantage streams into Q-values
///
/// `Q[a] = value + (advantage[a] - mean(advantage))`, with the mean taken per
/// state over the action axis.
///
/// # Arguments
///
/// * `value` - State values `[batch, 1]`
/// * `advantage` - Per-action advantages `[batch, num_actions]`
fn dueling_q<B: Backend>(value: Tensor<B, 2>, advantage: Tensor<B, 2>) -> Tensor<B, 2> {
    let advantage_mean = advantage.clone().mean_dim(1); // [batch, 1]
    value + (advantage - advantage_mean)
}
