//! Training statistics tracking
//!
//! Rolling-window tracking of the training signals produced by the DQN
//! update: the MSE loss and the mean Q-value of the selected actions.

use std::collections::VecDeque;

/// Training statistics tracker with rolling averages
///
/// Tracks per-update metrics using a rolling window so that long runs report
/// recent behavior rather than an average over the whole history.
///
/// # Example
///
/// ```rust
/// use pixel_dqn::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// stats.record_update(0.02, 1.8);
///
/// assert_eq!(stats.total_updates(), 1);
/// assert!((stats.mean_loss() - 0.02).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Training losses (rolling window)
    losses: VecDeque<f32>,

    /// Mean Q-values of the trained actions (rolling window)
    q_values: VecDeque<f32>,

    /// Total number of training updates performed
    total_updates: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a new training statistics tracker
    ///
    /// # Arguments
    ///
    /// * `window_size` - Number of recent updates to keep for rolling averages
    pub fn new(window_size: usize) -> Self {
        Self {
            losses: VecDeque::with_capacity(window_size),
            q_values: VecDeque::with_capacity(window_size),
            total_updates: 0,
            window_size,
        }
    }

    /// Record a training update
    ///
    /// # Arguments
    ///
    /// * `loss` - MSE loss of the update
    /// * `mean_q` - Mean Q-value of the actions trained in the batch
    pub fn record_update(&mut self, loss: f32, mean_q: f32) {
        Self::push_window(&mut self.losses, loss, self.window_size);
        Self::push_window(&mut self.q_values, mean_q, self.window_size);
        self.total_updates += 1;
    }

    /// Get the mean loss over the rolling window
    ///
    /// Returns 0.0 if no updates have been recorded.
    pub fn mean_loss(&self) -> f32 {
        Self::mean(&self.losses)
    }

    /// Get the mean Q-value over the rolling window
    ///
    /// Returns 0.0 if no updates have been recorded.
    pub fn mean_q(&self) -> f32 {
        Self::mean(&self.q_values)
    }

    /// Get the total number of training updates recorded
    pub fn total_updates(&self) -> usize {
        self.total_updates
    }

    /// Get the window size for rolling averages
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Format a summary of the current statistics
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixel_dqn::TrainingStats;
    ///
    /// let mut stats = TrainingStats::new(100);
    /// stats.record_update(0.02, 1.8);
    ///
    /// println!("{}", stats.format_summary());
    /// // Output: Updates: 1 | Loss: 0.0200 | Q: 1.8000
    /// ```
    pub fn format_summary(&self) -> String {
        format!(
            "Updates: {} | Loss: {:.4} | Q: {:.4}",
            self.total_updates,
            self.mean_loss(),
            self.mean_q(),
        )
    }

    fn push_window(window: &mut VecDeque<f32>, value: f32, size: usize) {
        if window.len() == size {
            window.pop_front();
        }
        window.push_back(value);
    }

    fn mean(window: &VecDeque<f32>) -> f32 {
        if window.is_empty() {
            0.0
        } else {
            window.iter().sum::<f32>() / window.len() as f32
        }
    }
}
