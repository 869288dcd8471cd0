//! Training hyperparameter configuration

use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};

/// Configuration for the DQN training update
///
/// The network architecture itself is configured separately through
/// [`crate::DuelingNetworkConfig`]; this struct only carries the knobs of the
/// optimization step.
///
/// # Example
///
/// ```rust
/// use pixel_dqn::DqnConfig;
///
/// // Use default hyperparameters
/// let config = DqnConfig::default();
///
/// // Or customize specific parameters
/// let config = DqnConfig {
///     learning_rate: 1e-4,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqnConfig {
    /// Learning rate for the Adam optimizer
    ///
    /// All other Adam parameters (beta1, beta2, epsilon) stay at their
    /// defaults.
    ///
    /// Default: 1e-3
    pub learning_rate: f64,

    /// Window size for the rolling training statistics kept by the agent
    ///
    /// Default: 100
    pub stats_window: usize,
}

impl DqnConfig {
    /// Create a new configuration with default hyperparameters
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixel_dqn::DqnConfig;
    ///
    /// let config = DqnConfig::new();
    /// assert_eq!(config.learning_rate, 1e-3);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    ///
    /// Returns [`DqnError::InvalidArgument`] if any parameter is outside its
    /// valid range.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixel_dqn::DqnConfig;
    ///
    /// let mut config = DqnConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.learning_rate = -0.1;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.learning_rate <= 0.0 {
            return Err(DqnError::InvalidArgument(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }

        if self.stats_window == 0 {
            return Err(DqnError::InvalidArgument(
                "stats_window must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            stats_window: 100,
        }
    }
}
