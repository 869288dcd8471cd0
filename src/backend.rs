//! Backend type aliases and device management
//!
//! This module provides convenient type aliases for the Burn backends used in
//! training and inference, as well as a helper for obtaining the default
//! device. The device value is the execution context of the library: it is
//! created by the caller and passed explicitly into every constructor, so no
//! hidden process-wide runtime state exists.
//!
//! # Backend Selection
//!
//! - **TrainingBackend**: Autodiff-enabled NdArray backend for training (CPU)
//! - **InferenceBackend**: Plain NdArray backend for inference and replay
//!   storage (CPU)
//!
//! The NdArray backend is sufficient for the network sizes this crate builds.
//! GPU support (via the Wgpu backend) could be added later if training at
//! larger observation resolutions becomes a bottleneck.
//!
//! # Example
//!
//! ```rust
//! use pixel_dqn::{default_device, TrainingBackend};
//!
//! let device = default_device();
//! // Use with agent and buffer constructors
//! // let agent = DqnAgent::<TrainingBackend>::new(..., device);
//! ```

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

/// Backend type for training (with autodiff)
///
/// This is the backend the agent trains on. It includes automatic
/// differentiation support needed for gradient-based optimization.
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend type for inference (without autodiff)
///
/// Used for greedy action queries and replay buffer storage, where gradient
/// tracking is unnecessary overhead.
pub type InferenceBackend = NdArray<f32>;

/// Get the default device for computation
///
/// Returns the default NdArray device (CPU). Safe to call multiple times.
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}
