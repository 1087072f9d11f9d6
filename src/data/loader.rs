// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads the labelled review corpus from its directory layout:
//
//   <root>/
//     train/
//       pos/*.txt
//       neg/*.txt
//     test/
//       pos/*.txt
//       neg/*.txt
//
// One review per file. Files are read and cleaned through a
// ParallelMapper, then segmented into sentences of tokens
// through a Segmenter — both injected by the caller.
//
// If the layout is incomplete, `ensure_corpus` asks a
// CorpusFetcher to repair it exactly once before giving up.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::data::preprocessor::Preprocessor;
use crate::domain::document::{Paragraph, Polarity, Review, Split};
use crate::domain::error::CorpusError;
use crate::domain::traits::{CorpusFetcher, ParallelMapper, Segmenter};

/// Progress is logged once per this many documents
pub const LOG_EVERY: usize = 1000;

/// `<root>/<split>/<class>`
pub fn class_dir(root: &Path, split: Split, polarity: Polarity) -> PathBuf {
    root.join(split.dir_name()).join(polarity.dir_name())
}

/// Verify that every `<split>/<class>` directory exists.
pub fn check_integrity(root: &Path) -> Result<(), CorpusError> {
    if !root.is_dir() {
        return Err(CorpusError::Integrity(root.to_path_buf()));
    }
    for split in Split::ALL {
        for polarity in [Polarity::Positive, Polarity::Negative] {
            let dir = class_dir(root, split, polarity);
            if !dir.is_dir() {
                return Err(CorpusError::Integrity(dir));
            }
        }
    }
    Ok(())
}

/// Check the layout; on failure fetch once and check again.
pub fn ensure_corpus<F: CorpusFetcher>(root: &Path, fetcher: &F) -> Result<(), CorpusError> {
    match check_integrity(root) {
        Ok(()) => Ok(()),
        Err(CorpusError::Integrity(missing)) => {
            tracing::warn!(
                "Corpus incomplete ('{}' missing), attempting download",
                missing.display()
            );
            fetcher.fetch()?;
            check_integrity(root)
        }
        Err(e) => Err(e),
    }
}

/// Loads and segments reviews from a corpus root.
pub struct CorpusLoader<'a, M: ParallelMapper> {
    root: PathBuf,
    mapper: &'a M,
    preprocessor: Preprocessor,
}

impl<'a, M: ParallelMapper> CorpusLoader<'a, M> {
    pub fn new(root: impl Into<PathBuf>, mapper: &'a M) -> Self {
        Self {
            root: root.into(),
            mapper,
            preprocessor: Preprocessor::new(),
        }
    }

    /// All `*.txt` files of one class, sorted by file name.
    pub fn list_files(&self, split: Split, polarity: Polarity) -> Result<Vec<PathBuf>, CorpusError> {
        let dir = class_dir(&self.root, split, polarity);
        let entries = fs::read_dir(&dir).map_err(|source| CorpusError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| CorpusError::Io {
                    path: dir.clone(),
                    source,
                })?
                .path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("txt") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Read and clean every review of one class.
    pub fn load(&self, split: Split, polarity: Polarity) -> Result<Vec<Review>, CorpusError> {
        let files = self.list_files(split, polarity)?;
        let total = files.len();
        let done = AtomicUsize::new(0);
        let preprocessor = &self.preprocessor;

        tracing::info!("Reading {} {}/{} reviews", total, split, polarity.dir_name());

        let reviews = self.mapper.map(files, |path| {
            let review = read_review(&path, polarity, preprocessor);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if n % LOG_EVERY == 0 {
                tracing::info!("Reading: {} of {}", n, total);
            }
            review
        });

        reviews.into_iter().collect()
    }

    /// Segment reviews into sentences of tokens, preserving order.
    pub fn segment<S: Segmenter>(&self, reviews: &[Review], segmenter: &S) -> Result<Vec<Paragraph>, CorpusError> {
        let total = reviews.len();
        let done = AtomicUsize::new(0);

        let paragraphs = self.mapper.map(reviews.iter().collect::<Vec<&Review>>(), |review| {
            let paragraph = segmenter.segment(&review.text).map_err(|e| match e {
                CorpusError::Segmentation { message, .. } => CorpusError::Segmentation {
                    source_name: review.source.clone(),
                    message,
                },
                other => other,
            });
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if n % LOG_EVERY == 0 {
                tracing::info!("Segmenting: {} of {}", n, total);
            }
            paragraph
        });

        paragraphs.into_iter().collect()
    }

    /// Load then segment one class.
    pub fn load_segmented<S: Segmenter>(
        &self,
        split: Split,
        polarity: Polarity,
        segmenter: &S,
    ) -> Result<Vec<Paragraph>, CorpusError> {
        let reviews = self.load(split, polarity)?;
        self.segment(&reviews, segmenter)
    }
}

/// Read one file and clean it into a Review.
fn read_review(path: &Path, polarity: Polarity, preprocessor: &Preprocessor) -> Result<Review, CorpusError> {
    let raw = fs::read(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // Use the filename as the source identifier
    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(Review::new(source, polarity, preprocessor.clean_review(&raw)))
}
