// ============================================================
// Layer 5 — Training Callbacks
// ============================================================
// Hooks run after every epoch. Each callback inspects the
// epoch's metrics and answers with an action:
//
//   EarlyStopping   → stop when the monitored loss has not
//                     improved for `patience` epochs
//   ModelCheckpoint → save the model (every epoch, or only
//                     when the monitored loss improves)
//
// The trainer merges the actions of all callbacks and performs
// the save / stop itself, so callbacks never touch the model.

use std::path::PathBuf;

use crate::infra::metrics::EpochMetrics;

/// What the trainer should do after an epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallbackAction {
    pub stop: bool,
    pub save_to: Option<PathBuf>,
}

impl CallbackAction {
    pub fn merge(self, other: CallbackAction) -> CallbackAction {
        CallbackAction {
            stop: self.stop || other.stop,
            save_to: self.save_to.or(other.save_to),
        }
    }
}

pub trait TrainingCallback {
    fn on_epoch_end(&mut self, metrics: &EpochMetrics) -> CallbackAction;
}

/// Validation loss when there is one, training loss otherwise.
pub fn monitored_loss(metrics: &EpochMetrics) -> f64 {
    if metrics.val_loss.is_finite() {
        metrics.val_loss
    } else {
        metrics.train_loss
    }
}

// ─── EarlyStopping ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best: f64,
    wait: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best: f64::INFINITY,
            wait: 0,
        }
    }
}

impl TrainingCallback for EarlyStopping {
    fn on_epoch_end(&mut self, metrics: &EpochMetrics) -> CallbackAction {
        let loss = monitored_loss(metrics);
        if loss < self.best {
            self.best = loss;
            self.wait = 0;
        } else {
            self.wait += 1;
        }

        let stop = self.wait >= self.patience;
        if stop {
            tracing::info!(
                "Epoch {}: no improvement for {} epoch(s), stopping (best loss {:.4})",
                metrics.epoch,
                self.wait,
                self.best
            );
        }
        CallbackAction { stop, save_to: None }
    }
}

// ─── ModelCheckpoint ──────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ModelCheckpoint {
    path: PathBuf,
    save_best_only: bool,
    best: f64,
}

impl ModelCheckpoint {
    pub fn new(path: impl Into<PathBuf>, save_best_only: bool) -> Self {
        Self {
            path: path.into(),
            save_best_only,
            best: f64::INFINITY,
        }
    }
}

impl TrainingCallback for ModelCheckpoint {
    fn on_epoch_end(&mut self, metrics: &EpochMetrics) -> CallbackAction {
        let loss = monitored_loss(metrics);
        let improved = loss < self.best;
        if improved {
            tracing::info!(
                "Epoch {}: loss improved from {:.4} to {:.4}, saving model",
                metrics.epoch,
                self.best,
                loss
            );
            self.best = loss;
        }

        let save = improved || !self.save_best_only;
        CallbackAction {
            stop: false,
            save_to: save.then(|| self.path.clone()),
        }
    }
}
