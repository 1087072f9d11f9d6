// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Turns the raw review corpus into fixed-shape tensors:
//
//   Step 1: Ensure the corpus is on disk     (Layer 4 + 6)
//   Step 2: Build + persist both vector sets (Layer 4 + 6)
//   Step 3: Load and segment every class     (Layer 4 - data)
//   Step 4: Index, normalise, stack, label   (Layer 4 - data)
//   Step 5: Optional pairwise shuffle        (Layer 4 - data)
//   Step 6: Persist tensors + config         (Layer 6 - infra)
//
// Nothing is written in step 6 unless every (split, representation)
// pair was assembled, so a failure never leaves a partial dataset.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{
    dataset::{block_labels, SplitTensors},
    loader::{ensure_corpus, CorpusLoader},
    normalizer::{normalize_paragraphs, stack_paragraphs, ParagraphShape},
    parallel::RayonMapper,
    segmenter::RuleSegmenter,
    splitter::shuffle_paired,
    word_vectors::{BuildOptions, WordVectorBox, WordVectorSource},
};
use crate::domain::{
    document::{Paragraph, Polarity, Representation, Split},
    error::VectorError,
    traits::Persistable,
};
use crate::infra::{
    checkpoint::save_json,
    fetcher::ScriptFetcher,
    store::{vectors_blob_path, DatasetStore},
};

// ─── Preparation Configuration ───────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Corpus root holding train/ and test/
    pub data_dir:                String,
    /// Directory holding the download script
    pub download_dir:            String,
    pub download_script:         String,
    /// Corpus-trained embedding file
    pub vectors:                 String,
    /// General-purpose embedding file
    pub global_vectors:          String,
    pub out_dir:                 String,
    pub words_per_sentence:      usize,
    pub sentences_per_paragraph: usize,
    pub prepend:                 bool,
    /// Shuffle each split before saving when set
    pub shuffle_seed:            Option<u64>,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            data_dir:                "./datasets/aclImdb/aclImdb".to_string(),
            download_dir:            "./datasets/aclImdb".to_string(),
            download_script:         "download.sh".to_string(),
            vectors:                 "./data/wv/IMDB-GloVe-300dim.txt".to_string(),
            global_vectors:          "./data/wv/glove.42B.300d.120000.txt".to_string(),
            out_dir:                 ".".to_string(),
            words_per_sentence:      50,
            sentences_per_paragraph: 50,
            prepend:                 false,
            shuffle_seed:            None,
        }
    }
}

impl PrepareConfig {
    pub fn shape(&self) -> ParagraphShape {
        ParagraphShape {
            sentences_per_paragraph: self.sentences_per_paragraph,
            words_per_sentence:      self.words_per_sentence,
            prepend:                 self.prepend,
        }
    }
}

/// Options every vector set is built with: pad row, unit-norm rows.
pub fn vector_build_options() -> BuildOptions {
    BuildOptions::new(true, false, true)
}

/// One split's segmented documents, positives first.
pub struct SegmentedSplit {
    pub split:     Split,
    pub documents: Vec<Paragraph>,
    pub positives: usize,
    pub negatives: usize,
}

impl SegmentedSplit {
    pub fn new(split: Split, positives: Vec<Paragraph>, negatives: Vec<Paragraph>) -> Self {
        let (p, n) = (positives.len(), negatives.len());
        let mut documents = positives;
        documents.extend(negatives);
        Self { split, documents, positives: p, negatives: n }
    }
}

/// Index, normalise and stack one split under one vector set.
pub fn assemble_split(
    segmented: &SegmentedSplit,
    representation: Representation,
    vectors: &WordVectorBox,
    shape: &ParagraphShape,
) -> Result<SplitTensors, VectorError> {
    let indexed = vectors
        .indices_of(&segmented.documents)
        .collect::<Result<Vec<_>, _>>()?;
    let normalized = normalize_paragraphs(&indexed, shape);

    Ok(SplitTensors {
        split: segmented.split,
        representation,
        features: stack_paragraphs(&normalized, shape),
        labels: block_labels(segmented.positives, segmented.negatives),
    })
}

/// Shuffle features and labels together. The seed depends only on
/// the split, so both representations of a split get the same order.
pub fn shuffle_split(set: SplitTensors, seed: u64) -> SplitTensors {
    let split_seed = seed.wrapping_add(set.split as u64);
    let mut rng = StdRng::seed_from_u64(split_seed);
    let (features, labels) = shuffle_paired(&set.features, &set.labels, &mut rng);
    SplitTensors { features, labels, ..set }
}

// ─── PrepareUseCase ───────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        let shape = cfg.shape();

        // ── Step 1: Corpus on disk ────────────────────────────────────────────
        tracing::info!("Checking data integrity...");
        let fetcher = ScriptFetcher::new(&cfg.download_dir, &cfg.download_script);
        ensure_corpus(Path::new(&cfg.data_dir), &fetcher)?;

        // ── Step 2: Word vectors ──────────────────────────────────────────────
        let local = build_and_save(&cfg.vectors)?;
        let global = build_and_save(&cfg.global_vectors)?;

        // ── Step 3: Load + segment ────────────────────────────────────────────
        let mapper = RayonMapper;
        let segmenter = RuleSegmenter::new();
        let loader = CorpusLoader::new(&cfg.data_dir, &mapper);

        let mut splits = Vec::with_capacity(Split::ALL.len());
        for split in Split::ALL {
            tracing::info!("Getting {} examples", split);
            let negatives = loader.load_segmented(split, Polarity::Negative, &segmenter)?;
            let positives = loader.load_segmented(split, Polarity::Positive, &segmenter)?;
            splits.push(SegmentedSplit::new(split, positives, negatives));
        }

        // ── Step 4 + 5: Assemble every (split, representation) ────────────────
        let mut sets = Vec::with_capacity(splits.len() * Representation::ALL.len());
        for segmented in &splits {
            for (representation, vectors) in [
                (Representation::Local, &local),
                (Representation::Global, &global),
            ] {
                tracing::info!("Normalizing {} inputs ({} vectors)", segmented.split, representation);
                let set = assemble_split(segmented, representation, vectors, &shape)
                    .with_context(|| format!("Cannot index {} documents", segmented.split))?;
                let set = match cfg.shuffle_seed {
                    Some(seed) => shuffle_split(set, seed),
                    None => set,
                };
                tracing::info!("  --> {:?} features, {} labels", set.features.dim(), set.len());
                sets.push(set);
            }
        }

        // ── Step 6: Persist ───────────────────────────────────────────────────
        tracing::info!("Saving...");
        let store = DatasetStore::new(&cfg.out_dir);
        store.save_all(&sets)?;
        save_json(&store.dir().join("prepare_config.json"), cfg)?;

        tracing::info!("Prepared {} tensor sets in '{}'", sets.len(), cfg.out_dir);
        Ok(())
    }
}

/// Build one vector set and persist it next to its source file.
fn build_and_save(source: &str) -> Result<WordVectorBox> {
    let path = PathBuf::from(source);
    let vectors = WordVectorSource::file(&path)
        .build(vector_build_options())
        .with_context(|| format!("Cannot build word vectors from '{}'", source))?;
    vectors.save(&vectors_blob_path(&path))?;
    Ok(vectors)
}
