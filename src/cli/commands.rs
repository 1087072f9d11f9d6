// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `prepare` and `train`, and all
// their configurable flags. Defaults match PrepareConfig /
// TrainConfig defaults.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{prepare_use_case::PrepareConfig, train_use_case::TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Turn the IMDB corpus into fixed-shape word-index tensors
    Prepare(PrepareArgs),

    /// Train the sentiment model on prepared tensors and score the test split
    Train(TrainArgs),
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Corpus root containing train/ and test/
    #[arg(long, default_value = "./datasets/aclImdb/aclImdb")]
    pub data_dir: String,

    /// Directory holding download.sh, run if the corpus is missing
    #[arg(long, default_value = "./datasets/aclImdb")]
    pub download_dir: String,

    /// Corpus-trained embedding file (`token v1 .. vd` per line)
    #[arg(long, default_value = "./data/wv/IMDB-GloVe-300dim.txt")]
    pub vectors: String,

    /// General-purpose embedding file
    #[arg(long, default_value = "./data/wv/glove.42B.300d.120000.txt")]
    pub global_vectors: String,

    /// Where the IMDB_* tensor files are written
    #[arg(long, default_value = ".")]
    pub out_dir: String,

    #[arg(long, default_value_t = 50)]
    pub words_per_sentence: usize,

    #[arg(long, default_value_t = 50)]
    pub sentences_per_paragraph: usize,

    /// Pad at the end instead of the start (content left-aligned)
    #[arg(long)]
    pub prepend: bool,

    /// Shuffle each split with this seed before saving
    #[arg(long)]
    pub shuffle_seed: Option<u64>,
}

impl From<PrepareArgs> for PrepareConfig {
    fn from(a: PrepareArgs) -> Self {
        PrepareConfig {
            data_dir:                a.data_dir,
            download_dir:            a.download_dir,
            vectors:                 a.vectors,
            global_vectors:          a.global_vectors,
            out_dir:                 a.out_dir,
            words_per_sentence:      a.words_per_sentence,
            sentences_per_paragraph: a.sentences_per_paragraph,
            prepend:                 a.prepend,
            shuffle_seed:            a.shuffle_seed,
            ..PrepareConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory holding the prepared IMDB_* tensors
    #[arg(long, default_value = ".")]
    pub data_dir: String,

    /// Persisted local word vectors written by `prepare`
    #[arg(long, default_value = "./data/wv/IMDB-GloVe-300dim-wordvectors.bin")]
    pub vectors_box: String,

    /// Directory for model_best, train_config.json and metrics.csv
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value_t = 28)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    /// Epochs without validation-loss improvement before stopping
    #[arg(long, default_value_t = 30)]
    pub patience: usize,

    /// Tail fraction of the shuffled training set held out for validation
    #[arg(long, default_value_t = 0.35)]
    pub validation_split: f64,

    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// Width of the per-sentence dense layer
    #[arg(long, default_value_t = 64)]
    pub hidden_size: usize,

    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Seed for the training-set shuffle and batch order
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:         a.data_dir,
            vectors_box:      a.vectors_box,
            checkpoint_dir:   a.checkpoint_dir,
            batch_size:       a.batch_size,
            epochs:           a.epochs,
            patience:         a.patience,
            validation_split: a.validation_split,
            lr:               a.lr,
            hidden_size:      a.hidden_size,
            dropout:          a.dropout,
            seed:             a.seed,
        }
    }
}
