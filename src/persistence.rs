//! Checkpoint store for trained networks
//!
//! This module persists network snapshots, tagged with a monotonically
//! increasing save counter, into a directory dedicated to one training run.
//! It uses Burn's Record system for the weights and a JSON sidecar for the
//! metadata needed to reconstruct the network.
//!
//! Each snapshot consists of two files:
//! - `model-<n>.mpk` - network weights (Burn record format)
//! - `model-<n>.meta.json` - metadata as JSON

use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DqnConfig;
use crate::error::{DqnError, Result};
use crate::network::{DuelingNetworkConfig, DuelingQNetwork};

/// Metadata saved alongside each network snapshot
///
/// Contains everything needed to rebuild the network and identify where the
/// snapshot came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Network architecture the weights belong to
    pub network: DuelingNetworkConfig,

    /// Training hyperparameters in effect when the snapshot was taken
    pub agent: DqnConfig,

    /// Namespace identifier of the network (e.g. "online", "target")
    pub name: String,

    /// Position of this snapshot in the save sequence, starting at 0
    pub save_index: usize,

    /// Crate version that wrote the snapshot, for compatibility checking
    pub version: String,
}

/// Numbered checkpoint writer for one training run
///
/// Owns the checkpoint directory and the save counter. Creating the store
/// fails if the directory already exists, so a new run can never silently
/// overwrite the results of a previous one.
///
/// # Example
///
/// ```rust,ignore
/// use pixel_dqn::Checkpointer;
///
/// let mut checkpointer = Checkpointer::create("runs/exp1")?;
/// checkpointer.save(&network, "online", &network_config, &config)?;
/// assert_eq!(checkpointer.save_count(), 1);
/// ```
#[derive(Debug)]
pub struct Checkpointer {
    /// Directory the snapshots are written into
    dir: PathBuf,

    /// Number of snapshots written so far; also the tag of the next one
    save_count: usize,
}

impl Checkpointer {
    /// Create the checkpoint directory and an empty store for it
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory to create; parent directories are created as needed
    ///
    /// # Errors
    ///
    /// Returns [`DqnError::AlreadyExists`] if the path already exists, and
    /// [`DqnError::Io`] if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if dir.exists() {
            return Err(DqnError::AlreadyExists(dir));
        }
        fs::create_dir_all(&dir)?;

        Ok(Self { dir, save_count: 0 })
    }

    /// Persist a network snapshot tagged with the current save counter
    ///
    /// Writes the weights and the metadata sidecar, then increments the
    /// counter. Tags are dense and strictly increasing: `model-0`, `model-1`,
    /// and so on.
    ///
    /// # Arguments
    ///
    /// * `network` - The network whose parameters are persisted
    /// * `name` - Namespace identifier recorded in the metadata
    /// * `network_config` - Architecture recorded in the metadata
    /// * `config` - Training hyperparameters recorded in the metadata
    ///
    /// # Returns
    ///
    /// The snapshot path (without the weight file's `.mpk` extension).
    pub fn save<B: Backend>(
        &mut self,
        network: &DuelingQNetwork<B>,
        name: &str,
        network_config: &DuelingNetworkConfig,
        config: &DqnConfig,
    ) -> Result<PathBuf> {
        let path = self.dir.join(format!("model-{}", self.save_count));

        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder.record(network.clone().into_record(), path.clone())?;

        let metadata = CheckpointMetadata {
            network: network_config.clone(),
            agent: config.clone(),
            name: name.to_string(),
            save_index: self.save_count,
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        let meta_path = path.with_extension("meta.json");
        let meta_json = serde_json::to_string_pretty(&metadata)?;
        fs::write(&meta_path, meta_json)?;

        self.save_count += 1;
        Ok(path)
    }

    /// Get the number of snapshots written so far
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    /// Get the directory the snapshots are written into
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Load a network snapshot from a file
///
/// Reads the metadata sidecar first, rebuilds the network from the recorded
/// architecture, then loads the weights into it.
///
/// # Arguments
///
/// * `path` - Snapshot path as returned by [`Checkpointer::save`]
///   (without the `.mpk` extension)
/// * `device` - Device to place the restored network on
///
/// # Returns
///
/// The restored network together with its metadata.
pub fn load_network<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(DuelingQNetwork<B>, CheckpointMetadata)> {
    let meta_path = path.with_extension("meta.json");
    let meta_json = fs::read_to_string(&meta_path)?;
    let metadata: CheckpointMetadata = serde_json::from_str(&meta_json)?;

    let network = metadata.network.init::<B>(device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder.load(path.to_path_buf(), device)?;
    let network = network.load_record(record);

    Ok((network, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use burn::tensor::Tensor;
    use tempfile::TempDir;

    type TestBackend = NdArray<f32>;

    const TEST_SIZE: usize = 36;

    fn test_network(device: &NdArrayDevice) -> (DuelingQNetwork<TestBackend>, DuelingNetworkConfig)
    {
        let config = DuelingNetworkConfig::new(TEST_SIZE, TEST_SIZE, 4);
        (config.init::<TestBackend>(device), config)
    }

    #[test]
    fn test_create_makes_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("run");

        let checkpointer = Checkpointer::create(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(checkpointer.save_count(), 0);
    }

    #[test]
    fn test_create_rejects_existing_directory() {
        let tmp = TempDir::new().unwrap();

        let result = Checkpointer::create(tmp.path());
        assert!(matches!(result, Err(DqnError::AlreadyExists(_))));
    }

    #[test]
    fn test_save_writes_numbered_snapshots() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("run");
        let device = NdArrayDevice::default();
        let (network, net_config) = test_network(&device);

        let mut checkpointer = Checkpointer::create(&dir).unwrap();
        let config = DqnConfig::default();

        let first = checkpointer
            .save(&network, "online", &net_config, &config)
            .unwrap();
        let second = checkpointer
            .save(&network, "online", &net_config, &config)
            .unwrap();

        assert_eq!(checkpointer.save_count(), 2);
        assert!(first.ends_with("model-0"));
        assert!(second.ends_with("model-1"));
        assert!(dir.join("model-0.mpk").is_file());
        assert!(dir.join("model-0.meta.json").is_file());
        assert!(dir.join("model-1.mpk").is_file());
    }

    #[test]
    fn test_metadata_records_run_details() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("run");
        let device = NdArrayDevice::default();
        let (network, net_config) = test_network(&device);

        let mut checkpointer = Checkpointer::create(&dir).unwrap();
        let path = checkpointer
            .save(&network, "online", &net_config, &DqnConfig::default())
            .unwrap();

        let meta_json = fs::read_to_string(path.with_extension("meta.json")).unwrap();
        let metadata: CheckpointMetadata = serde_json::from_str(&meta_json).unwrap();

        assert_eq!(metadata.name, "online");
        assert_eq!(metadata.save_index, 0);
        assert_eq!(metadata.network, net_config);
        assert_eq!(metadata.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_load_restores_identical_outputs() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("run");
        let device = NdArrayDevice::default();
        let (network, net_config) = test_network(&device);

        let mut checkpointer = Checkpointer::create(&dir).unwrap();
        let path = checkpointer
            .save(&network, "online", &net_config, &DqnConfig::default())
            .unwrap();

        let (restored, metadata) = load_network::<TestBackend>(&path, &device).unwrap();
        assert_eq!(metadata.network, net_config);

        let states = Tensor::ones([2, 1, TEST_SIZE, TEST_SIZE], &device);
        let original_q: Vec<f32> = network
            .forward(states.clone())
            .into_data()
            .iter::<f32>()
            .collect();
        let restored_q: Vec<f32> = restored
            .forward(states)
            .into_data()
            .iter::<f32>()
            .collect();

        assert_eq!(original_q, restored_q);
    }

    #[test]
    fn test_load_missing_snapshot_fails() {
        let tmp = TempDir::new().unwrap();
        let device = NdArrayDevice::default();

        let result = load_network::<TestBackend>(&tmp.path().join("model-0"), &device);
        assert!(result.is_err());
    }
}
