// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder,
// plus the JSON run configs that go with them.
//
// File layout:
//   checkpoints/
//     model_best.mpk       ← weights of the lowest-loss epoch
//     train_config.json    ← options the model was trained with
//     metrics.csv          ← written by MetricsLogger
//   data/
//     prepare_config.json  ← shape the tensors were built with
//
// CompactRecorder appends its own extension (.mpk), so paths
// handed to save_model / load_model carry no extension.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    backend::NdArray,
    record::{CompactRecorder, FileRecorder, Recorder},
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::model::SentimentModel;

/// Stem of the best-model checkpoint inside the checkpoint directory.
pub const BEST_MODEL: &str = "model_best";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// `{dir}/model_best`, without extension.
    pub fn best_model_path(&self) -> PathBuf {
        self.dir.join(BEST_MODEL)
    }

    /// Extension CompactRecorder gives its files. It does not depend
    /// on the backend, so any backend can answer.
    pub fn record_extension() -> &'static str {
        <CompactRecorder as FileRecorder<NdArray>>::file_extension()
    }

    /// True when a record exists for the extension-less `path`.
    pub fn has_record(path: &Path) -> bool {
        path.with_extension(Self::record_extension()).is_file()
    }

    pub fn save_model<B: Backend>(&self, model: &SentimentModel<B>, path: &Path) -> Result<()> {
        CompactRecorder::new()
            .record(model.clone().into_record(), path.to_path_buf())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint '{}'", path.display());
        Ok(())
    }

    /// Restore weights into `model`, which must have the saved architecture.
    pub fn load_model<B: Backend>(
        &self,
        model: SentimentModel<B>,
        path: &Path,
        device: &B::Device,
    ) -> Result<SentimentModel<B>> {
        tracing::info!("Loading checkpoint '{}'", path.display());

        let record = CompactRecorder::new()
            .load(path.to_path_buf(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Has a training epoch completed?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Write `{dir}/{name}.json`.
    pub fn save_config<T: Serialize>(&self, name: &str, cfg: &T) -> Result<()> {
        save_json(&self.dir.join(format!("{name}.json")), cfg)
    }
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Cannot write config to '{}'", path.display()))?;
    tracing::debug!("Saved config to '{}'", path.display());
    Ok(())
}

#[cfg(test)]
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid config '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::SentimentModelConfig;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Dummy {
        epochs: usize,
        lr: f64,
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().join("ckpt")).unwrap();

        let cfg = Dummy { epochs: 3, lr: 0.01 };
        manager.save_config("train_config", &cfg).unwrap();
        let back: Dummy = load_json(&dir.path().join("ckpt/train_config.json")).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_json::<Dummy>(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_model_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();

        let config = SentimentModelConfig::new(10, 4, 2, 3);
        let model = config.init::<NdArray>(&device);
        let path = manager.best_model_path();
        assert!(!CheckpointManager::has_record(&path));

        manager.save_model(&model, &path).unwrap();
        assert!(CheckpointManager::has_record(&path));
        assert_eq!(CheckpointManager::record_extension(), "mpk");
        assert!(path.with_extension("mpk").is_file());

        let fresh = config.init::<NdArray>(&device);
        let loaded = manager.load_model(fresh, &path, &device).unwrap();

        let original: Vec<f32> = model.embedding.weight.val().into_data().to_vec().unwrap();
        let restored: Vec<f32> = loaded.embedding.weight.val().into_data().to_vec().unwrap();
        assert_eq!(original.len(), restored.len());
        for (a, b) in original.iter().zip(&restored) {
            // CompactRecorder stores half precision
            assert!((a - b).abs() < 1e-2);
        }
    }
}
