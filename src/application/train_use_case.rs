// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run on the prepared tensors:
//
//   Step 1: Load + shuffle training tensors   (Layer 6 + 4)
//   Step 2: Flatten and mask                  (Layer 5 - ml)
//   Step 3: Load the local word vectors       (Layer 6 - infra)
//   Step 4: Build trainer, callbacks, Ctrl-C  (Layer 5 + 6)
//   Step 5: Fit (interruption is not fatal)   (Layer 5 - ml)
//   Step 6: Reload best weights, score test   (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{Context, Result};
use ndarray::{Array1, Zip};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{splitter::shuffle_paired, word_vectors::WordVectorBox};
use crate::domain::{
    document::{Representation, Split},
    error::TrainError,
    traits::Persistable,
};
use crate::infra::{
    checkpoint::{CheckpointManager, BEST_MODEL},
    metrics::MetricsLogger,
    signal::{spawn_ctrl_c_listener, StopSignal},
    store::DatasetStore,
};
use crate::ml::{
    callbacks::{EarlyStopping, ModelCheckpoint, TrainingCallback},
    model::SentimentModelConfig,
    trainer::{BurnTrainer, FitInputs, FitOptions, ModelTrainer},
};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

// ─── Training Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Directory holding the prepared IMDB_* tensors
    pub data_dir:         String,
    /// Persisted local word vectors (embedding initialisation)
    pub vectors_box:      String,
    pub checkpoint_dir:   String,
    pub batch_size:       usize,
    pub epochs:           usize,
    pub patience:         usize,
    pub validation_split: f64,
    pub lr:               f64,
    pub hidden_size:      usize,
    pub dropout:          f64,
    pub seed:             u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:         ".".to_string(),
            vectors_box:      "./data/wv/IMDB-GloVe-300dim-wordvectors.bin".to_string(),
            checkpoint_dir:   "checkpoints".to_string(),
            batch_size:       28,
            epochs:           100,
            patience:         30,
            validation_split: 0.35,
            lr:               0.01,
            hidden_size:      64,
            dropout:          0.5,
            seed:             42,
        }
    }
}

impl TrainConfig {
    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            validation_split: self.validation_split,
            batch_size:       self.batch_size,
            epochs:           self.epochs,
            learning_rate:    self.lr,
            seed:             self.seed,
        }
    }
}

/// Fraction of predictions on the same side of 0.5 as their label.
pub fn accuracy(probabilities: &Array1<f32>, labels: &Array1<f32>) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let mut hits = 0usize;
    Zip::from(probabilities).and(labels).for_each(|&p, &y| {
        if (p > 0.5) == (y > 0.5) {
            hits += 1;
        }
    });
    hits as f64 / labels.len() as f64
}

/// Fit, tolerating a user interrupt, then reload the best checkpoint
/// and score `test`. Returns the test accuracy.
///
/// When no checkpoint was written (interrupted before the first
/// epoch ended) the weights currently in memory are scored instead.
pub fn fit_and_evaluate<T: ModelTrainer>(
    trainer:   &mut T,
    train:     &FitInputs,
    test:      &FitInputs,
    options:   &FitOptions,
    callbacks: &mut [Box<dyn TrainingCallback>],
    stop:      &StopSignal,
    best:      &Path,
) -> Result<f64> {
    match trainer.fit(train, options, callbacks, stop) {
        Ok(report) => {
            if report.stopped_early {
                tracing::info!("Early stopping after {} epoch(s)", report.epochs_run());
            }
        }
        Err(TrainError::Interrupted { epochs_completed }) => {
            tracing::warn!("Training stopped early! ({} epoch(s) completed)", epochs_completed);
        }
        Err(e) => return Err(e.into()),
    }

    if CheckpointManager::has_record(best) {
        tracing::info!("Loading best weights");
        trainer.load_weights(best)?;
    } else {
        tracing::warn!("No checkpoint at '{}', evaluating current weights", best.display());
    }

    tracing::info!("Testing model...");
    let probabilities = trainer.predict(&test.text, &test.weights, options.batch_size)?;
    let acc = accuracy(&probabilities, &test.labels);

    tracing::info!("Test accuracy: {:.2}%", acc * 100.0);
    tracing::info!("Test error:    {:.2}%", (1.0 - acc) * 100.0);
    Ok(acc)
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<f64> {
        let cfg = &self.config;
        let store = DatasetStore::new(&cfg.data_dir);

        // ── Step 1: Training tensors ──────────────────────────────────────────
        tracing::info!("Loading training data");
        let train = store.load(Split::Train, Representation::Local)?;
        let features_shape = train.features.dim();

        tracing::info!("Shuffling training data");
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let (features, labels) = shuffle_paired(&train.features, &train.labels, &mut rng);

        // ── Step 2: Flatten + mask ────────────────────────────────────────────
        let train_inputs = FitInputs::from_features(&features, labels);
        drop(features);

        tracing::info!("Loading testing data");
        let test = store.load(Split::Test, Representation::Local)?;
        let test_inputs = FitInputs::from_features(&test.features, test.labels);

        // ── Step 3: Word vectors ──────────────────────────────────────────────
        tracing::info!("Loading IMDB trained word vectors");
        let vectors = WordVectorBox::load(Path::new(&cfg.vectors_box))?;

        // ── Step 4: Trainer + callbacks ───────────────────────────────────────
        let (_, sentences, words) = features_shape;
        let model_cfg = SentimentModelConfig::new(vectors.len(), vectors.dimension(), sentences, words)
            .with_hidden_size(cfg.hidden_size)
            .with_dropout(cfg.dropout);

        let checkpoints = CheckpointManager::new(&cfg.checkpoint_dir)?;
        checkpoints.save_config("train_config", cfg)?;
        let best = checkpoints.best_model_path();
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        let mut trainer = BurnTrainer::<MyBackend>::new(
            &model_cfg,
            Some(vectors.matrix()),
            checkpoints,
            device,
        )
        .with_metrics(metrics);
        drop(vectors);

        let mut callbacks: Vec<Box<dyn TrainingCallback>> = vec![
            Box::new(EarlyStopping::new(cfg.patience)),
            Box::new(ModelCheckpoint::new(best.clone(), true)),
        ];

        let stop = StopSignal::new();
        spawn_ctrl_c_listener(stop.clone()).context("Cannot install Ctrl+C handler")?;

        // ── Step 5 + 6 ────────────────────────────────────────────────────────
        tracing::info!("Training model ({} checkpoint '{}')", BEST_MODEL, best.display());
        fit_and_evaluate(
            &mut trainer,
            &train_inputs,
            &test_inputs,
            &cfg.fit_options(),
            &mut callbacks,
            &stop,
            &best,
        )
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::trainer::FitReport;
    use ndarray::{array, Array2};

    /// Trainer double: scripted fit outcome, fixed predictions.
    struct ScriptedTrainer {
        interrupt: bool,
        loaded: bool,
        predictions: Array1<f32>,
    }

    impl ModelTrainer for ScriptedTrainer {
        fn fit(
            &mut self,
            _inputs: &FitInputs,
            _options: &FitOptions,
            _callbacks: &mut [Box<dyn TrainingCallback>],
            _stop: &StopSignal,
        ) -> Result<FitReport, TrainError> {
            if self.interrupt {
                Err(TrainError::Interrupted { epochs_completed: 2 })
            } else {
                Ok(FitReport { history: Vec::new(), stopped_early: false })
            }
        }

        fn load_weights(&mut self, _path: &Path) -> Result<(), TrainError> {
            self.loaded = true;
            Ok(())
        }

        fn predict(
            &self,
            _text: &Array2<u32>,
            _weights: &Array2<f32>,
            _batch_size: usize,
        ) -> Result<Array1<f32>, TrainError> {
            Ok(self.predictions.clone())
        }
    }

    fn inputs(labels: Array1<f32>) -> FitInputs {
        let n = labels.len();
        FitInputs {
            text: Array2::ones((n, 2)),
            weights: Array2::ones((n, 2)),
            labels,
        }
    }

    #[test]
    fn test_accuracy() {
        let p = array![0.9, 0.2, 0.6, 0.4];
        let y = array![1.0, 0.0, 0.0, 0.0];
        assert_eq!(accuracy(&p, &y), 0.75);
        assert_eq!(accuracy(&Array1::zeros(0), &Array1::zeros(0)), 0.0);
    }

    fn interrupted_run(best: &Path) -> (ScriptedTrainer, f64) {
        let mut trainer = ScriptedTrainer {
            interrupt: true,
            loaded: false,
            predictions: array![0.8, 0.1],
        };
        let acc = fit_and_evaluate(
            &mut trainer,
            &inputs(array![1.0, 0.0]),
            &inputs(array![1.0, 1.0]),
            &TrainConfig::default().fit_options(),
            &mut [],
            &StopSignal::new(),
            best,
        )
        .unwrap();
        (trainer, acc)
    }

    #[test]
    fn test_interrupt_still_evaluates() {
        let dir = tempfile::tempdir().unwrap();
        let best = dir.path().join(BEST_MODEL);
        std::fs::write(best.with_extension(CheckpointManager::record_extension()), b"").unwrap();

        let (trainer, acc) = interrupted_run(&best);
        assert!(trainer.loaded);
        assert_eq!(acc, 0.5);
    }

    #[test]
    fn test_interrupt_before_first_checkpoint_scores_current_weights() {
        let dir = tempfile::tempdir().unwrap();
        let best = dir.path().join(BEST_MODEL);

        let (trainer, acc) = interrupted_run(&best);
        assert!(!trainer.loaded);
        assert_eq!(acc, 0.5);
    }

    #[test]
    fn test_other_training_errors_propagate() {
        struct Failing;
        impl ModelTrainer for Failing {
            fn fit(
                &mut self,
                _: &FitInputs,
                _: &FitOptions,
                _: &mut [Box<dyn TrainingCallback>],
                _: &StopSignal,
            ) -> Result<FitReport, TrainError> {
                Err(TrainError::InvalidInput("empty".into()))
            }
            fn load_weights(&mut self, _: &Path) -> Result<(), TrainError> {
                panic!("must not reload after a failed fit")
            }
            fn predict(&self, _: &Array2<u32>, _: &Array2<f32>, _: usize) -> Result<Array1<f32>, TrainError> {
                unreachable!()
            }
        }

        let result = fit_and_evaluate(
            &mut Failing,
            &inputs(array![1.0]),
            &inputs(array![1.0]),
            &TrainConfig::default().fit_options(),
            &mut [],
            &StopSignal::new(),
            Path::new("model_best"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let cfg = TrainConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.batch_size, 28);
        assert_eq!(back.validation_split, 0.35);
        assert_eq!(back.patience, 30);
    }
}
