// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam,
// behind the `ModelTrainer` seam the application layer drives.
//
// Per epoch:
//   1. one pass over the training batches (shuffled)
//   2. one pass over the held-out tail (model.valid(), no dropout)
//   3. metrics → tracing + metrics.csv
//   4. callbacks decide whether to checkpoint and/or stop
//
// A StopSignal (set by Ctrl-C) is polled between batches; when it
// fires, fit returns TrainError::Interrupted and whatever the
// checkpoint callback saved so far stays on disk.
//
// Backends:
//   - training runs on B (an AutodiffBackend)
//   - model.valid() returns the model on B::InnerBackend, so the
//     validation batcher is built for the inner backend too
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::path::Path;

use burn::{
    data::dataloader::{batcher::Batcher, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{activation::sigmoid, backend::AutodiffBackend},
};
use ndarray::{Array1, Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::SentimentBatcher,
    dataset::{flatten_reviews, to_samples, token_mask, SentimentDataset},
    splitter::split_off_validation,
};
use crate::domain::error::TrainError;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
    signal::StopSignal,
};
use crate::ml::callbacks::{CallbackAction, TrainingCallback};
use crate::ml::model::{SentimentModel, SentimentModelConfig};

/// Named model inputs: `text` word indices, `weights` token mask,
/// `labels` targets (1.0 = positive).
#[derive(Debug, Clone)]
pub struct FitInputs {
    pub text:    Array2<u32>,
    pub weights: Array2<f32>,
    pub labels:  Array1<f32>,
}

impl FitInputs {
    /// Flatten [docs, sentences, words] features and derive the token mask.
    pub fn from_features(features: &Array3<u32>, labels: Array1<f32>) -> Self {
        let text = flatten_reviews(features);
        let weights = token_mask(&text);
        Self { text, weights, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitOptions {
    /// Fraction of the (already shuffled) inputs held out from the tail
    pub validation_split: f64,
    pub batch_size:       usize,
    pub epochs:           usize,
    pub learning_rate:    f64,
    /// Seed for per-epoch batch shuffling
    pub seed:             u64,
}

#[derive(Debug, Clone)]
pub struct FitReport {
    pub history:      Vec<EpochMetrics>,
    pub stopped_early: bool,
}

impl FitReport {
    pub fn epochs_run(&self) -> usize {
        self.history.len()
    }
}

/// The training collaborator: fit with callbacks, reload weights, predict.
pub trait ModelTrainer {
    fn fit(
        &mut self,
        inputs:    &FitInputs,
        options:   &FitOptions,
        callbacks: &mut [Box<dyn TrainingCallback>],
        stop:      &StopSignal,
    ) -> Result<FitReport, TrainError>;

    /// Replace the current weights with the record at `path` (no extension).
    fn load_weights(&mut self, path: &Path) -> Result<(), TrainError>;

    /// Positive-class probability per row.
    fn predict(
        &self,
        text:       &Array2<u32>,
        weights:    &Array2<f32>,
        batch_size: usize,
    ) -> Result<Array1<f32>, TrainError>;
}

pub struct BurnTrainer<B: AutodiffBackend> {
    model:       SentimentModel<B>,
    device:      B::Device,
    checkpoints: CheckpointManager,
    metrics:     Option<MetricsLogger>,
}

impl<B: AutodiffBackend> BurnTrainer<B> {
    pub fn new(
        model_cfg:   &SentimentModelConfig,
        embeddings:  Option<&Array2<f32>>,
        checkpoints: CheckpointManager,
        device:      B::Device,
    ) -> Self {
        let model = match embeddings {
            Some(matrix) => model_cfg.init_with_embeddings(matrix, &device),
            None => model_cfg.init(&device),
        };
        tracing::info!(
            "Model ready: vocab={}, dim={}, hidden={}",
            model_cfg.vocab_size,
            model_cfg.embedding_dim,
            model_cfg.hidden_size
        );
        Self { model, device, checkpoints, metrics: None }
    }

    /// Also append every epoch's metrics to `logger`.
    pub fn with_metrics(mut self, logger: MetricsLogger) -> Self {
        tracing::info!("Epoch metrics -> '{}'", logger.csv_path().display());
        self.metrics = Some(logger);
        self
    }
}

fn mean_or_nan(sum: f64, n: usize) -> f64 {
    if n > 0 { sum / n as f64 } else { f64::NAN }
}

impl<B: AutodiffBackend> ModelTrainer for BurnTrainer<B> {
    fn fit(
        &mut self,
        inputs:    &FitInputs,
        options:   &FitOptions,
        callbacks: &mut [Box<dyn TrainingCallback>],
        stop:      &StopSignal,
    ) -> Result<FitReport, TrainError> {
        if inputs.is_empty() {
            return Err(TrainError::InvalidInput("no training samples".into()));
        }
        if inputs.text.nrows() != inputs.len() || inputs.weights.dim() != inputs.text.dim() {
            return Err(TrainError::InvalidInput(format!(
                "text {:?}, weights {:?} and {} labels disagree",
                inputs.text.dim(),
                inputs.weights.dim(),
                inputs.len()
            )));
        }
        if options.batch_size == 0 {
            return Err(TrainError::InvalidInput("batch size must be positive".into()));
        }

        let samples = to_samples(&inputs.text, &inputs.weights, Some(&inputs.labels));
        let (train, val) = split_off_validation(samples, options.validation_split);
        tracing::info!("Fitting on {} samples, validating on {}", train.len(), val.len());

        // ── Data loaders ──────────────────────────────────────────────────────
        let train_loader = DataLoaderBuilder::new(SentimentBatcher::<B>::new(self.device.clone()))
            .batch_size(options.batch_size)
            .shuffle(options.seed)
            .num_workers(1)
            .build(SentimentDataset::new(train));

        let val_loader = DataLoaderBuilder::new(SentimentBatcher::<B::InnerBackend>::new(self.device.clone()))
            .batch_size(options.batch_size)
            .num_workers(1)
            .build(SentimentDataset::new(val));

        let mut optim = AdamConfig::new().with_epsilon(1e-8).init();
        let mut model = self.model.clone();
        let mut history = Vec::new();
        let mut stopped_early = false;

        // ── Epoch loop ────────────────────────────────────────────────────────
        for epoch in 1..=options.epochs {
            let mut train_loss_sum = 0.0f64;
            let mut train_batches = 0usize;

            for batch in train_loader.iter() {
                if stop.is_stop_requested() {
                    self.model = model;
                    return Err(TrainError::Interrupted { epochs_completed: epoch - 1 });
                }

                let (loss, _) = model.forward_loss(batch.text, batch.weights, batch.labels);
                train_loss_sum += loss.clone().into_scalar().elem::<f64>();
                train_batches += 1;

                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optim.step(options.learning_rate, model, grads);
            }

            // ── Validation phase ──────────────────────────────────────────────
            let model_valid = model.valid();
            let mut val_loss_sum = 0.0f64;
            let mut val_batches = 0usize;
            let mut correct = 0usize;
            let mut total = 0usize;

            for batch in val_loader.iter() {
                let (loss, logits) =
                    model_valid.forward_loss(batch.text, batch.weights, batch.labels.clone());
                val_loss_sum += loss.into_scalar().elem::<f64>();
                val_batches += 1;

                total += batch.labels.dims()[0];
                let hits: i64 = logits
                    .greater_elem(0.0)
                    .int()
                    .equal(batch.labels)
                    .int()
                    .sum()
                    .into_scalar()
                    .elem::<i64>();
                correct += hits as usize;
            }

            let metrics = EpochMetrics::new(
                epoch,
                mean_or_nan(train_loss_sum, train_batches),
                mean_or_nan(val_loss_sum, val_batches),
                if total > 0 { correct as f64 / total as f64 } else { 0.0 },
            );
            tracing::info!(
                "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
                epoch,
                options.epochs,
                metrics.train_loss,
                metrics.val_loss,
                metrics.val_acc * 100.0
            );
            if let Some(logger) = &self.metrics {
                if let Err(e) = logger.log(&metrics) {
                    tracing::warn!("Cannot write metrics: {:#}", e);
                }
            }
            history.push(metrics);

            // ── Callbacks ─────────────────────────────────────────────────────
            let action = callbacks
                .iter_mut()
                .fold(CallbackAction::default(), |acc, cb| acc.merge(cb.on_epoch_end(&metrics)));

            if let Some(path) = &action.save_to {
                self.checkpoints
                    .save_model(&model, path)
                    .map_err(|e| TrainError::Checkpoint(format!("{e:#}")))?;
            }
            if action.stop {
                stopped_early = true;
                break;
            }
        }

        self.model = model;
        tracing::info!("Training complete after {} epoch(s)", history.len());
        Ok(FitReport { history, stopped_early })
    }

    fn load_weights(&mut self, path: &Path) -> Result<(), TrainError> {
        self.model = self
            .checkpoints
            .load_model(self.model.clone(), path, &self.device)
            .map_err(|e| TrainError::Checkpoint(format!("{e:#}")))?;
        Ok(())
    }

    fn predict(
        &self,
        text:       &Array2<u32>,
        weights:    &Array2<f32>,
        batch_size: usize,
    ) -> Result<Array1<f32>, TrainError> {
        if batch_size == 0 {
            return Err(TrainError::InvalidInput("batch size must be positive".into()));
        }
        if weights.dim() != text.dim() {
            return Err(TrainError::InvalidInput(format!(
                "text {:?} and weights {:?} disagree",
                text.dim(),
                weights.dim()
            )));
        }

        let model = self.model.valid();
        let batcher = SentimentBatcher::<B::InnerBackend>::new(self.device.clone());
        let samples = to_samples(text, weights, None);

        let mut probabilities = Vec::with_capacity(samples.len());
        for chunk in samples.chunks(batch_size) {
            let batch = batcher.batch(chunk.to_vec());
            let probs = sigmoid(model.forward(batch.text, batch.weights));
            let values: Vec<f32> = probs
                .into_data()
                .convert::<f32>()
                .to_vec()
                .map_err(|e| TrainError::InvalidInput(format!("{e:?}")))?;
            probabilities.extend(values);
        }

        Ok(Array1::from(probabilities))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::callbacks::{EarlyStopping, ModelCheckpoint};
    use burn::backend::{Autodiff, NdArray};
    use ndarray::array;

    type B = Autodiff<NdArray>;

    fn toy_inputs() -> FitInputs {
        // 1 sentence x 2 words; index 1 marks positive, 2 negative
        let features = array![
            [[1, 1]], [[2, 2]], [[0, 1]], [[0, 2]],
            [[1, 1]], [[2, 2]], [[0, 1]], [[0, 2]],
        ];
        let labels = array![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        FitInputs::from_features(&features, labels)
    }

    fn options(epochs: usize) -> FitOptions {
        FitOptions {
            validation_split: 0.25,
            batch_size: 2,
            epochs,
            learning_rate: 0.01,
            seed: 7,
        }
    }

    fn trainer(dir: &Path) -> BurnTrainer<B> {
        let cfg = SentimentModelConfig::new(3, 4, 1, 2).with_hidden_size(4);
        let checkpoints = CheckpointManager::new(dir).unwrap();
        BurnTrainer::new(&cfg, None, checkpoints, Default::default())
    }

    #[test]
    fn test_inputs_from_features() {
        let inputs = toy_inputs();
        assert_eq!(inputs.len(), 8);
        assert_eq!(inputs.text.dim(), (8, 2));
        assert_eq!(inputs.weights.row(2).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_fit_checkpoints_and_predicts() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = trainer(dir.path());
        let best = dir.path().join("model_best");

        let mut callbacks: Vec<Box<dyn TrainingCallback>> = vec![
            Box::new(EarlyStopping::new(5)),
            Box::new(ModelCheckpoint::new(best.clone(), true)),
        ];
        let report = trainer
            .fit(&toy_inputs(), &options(2), &mut callbacks, &StopSignal::new())
            .unwrap();

        assert_eq!(report.epochs_run(), 2);
        assert!(!report.stopped_early);
        assert!(CheckpointManager::has_record(&best));

        trainer.load_weights(&best).unwrap();
        let inputs = toy_inputs();
        let probs = trainer.predict(&inputs.text, &inputs.weights, 3).unwrap();
        assert_eq!(probs.len(), 8);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_early_stopping_ends_fit() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = trainer(dir.path());
        let mut callbacks: Vec<Box<dyn TrainingCallback>> = vec![Box::new(EarlyStopping::new(0))];

        let report = trainer
            .fit(&toy_inputs(), &options(10), &mut callbacks, &StopSignal::new())
            .unwrap();
        assert_eq!(report.epochs_run(), 1);
        assert!(report.stopped_early);
    }

    #[test]
    fn test_stop_signal_interrupts() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = trainer(dir.path());
        let stop = StopSignal::new();
        stop.request_stop();

        let err = trainer.fit(&toy_inputs(), &options(3), &mut [], &stop).unwrap_err();
        assert!(matches!(err, TrainError::Interrupted { epochs_completed: 0 }));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = trainer(dir.path());
        let empty = FitInputs {
            text: Array2::zeros((0, 2)),
            weights: Array2::zeros((0, 2)),
            labels: Array1::zeros(0),
        };
        let err = trainer.fit(&empty, &options(1), &mut [], &StopSignal::new()).unwrap_err();
        assert!(matches!(err, TrainError::InvalidInput(_)));
    }

    #[test]
    fn test_missing_checkpoint_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = trainer(dir.path());
        let err = trainer.load_weights(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, TrainError::Checkpoint(_)));
    }
}
