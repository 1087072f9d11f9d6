// ============================================================
// Layer 6 — Dataset Store
// ============================================================
// Persists assembled tensors and word-vector tables with
// bincode.
//
// File naming convention:
//   <out_dir>/
//     IMDB_train_glove_X.bin          ← local features  [N, S, W]
//     IMDB_train_glove_y.bin          ← labels          [N]
//     IMDB_train_global_glove_X.bin   ← global features
//     IMDB_train_global_glove_y.bin
//     IMDB_test_...                   ← same for test
//
//   <vectors dir>/
//     <stem>-wordvectors.bin          ← WordVectorBox blob
//
// Reference: bincode crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use ndarray::{Array1, Array3};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use crate::data::{dataset::SplitTensors, word_vectors::WordVectorBox};
use crate::domain::document::{Representation, Split};
use crate::domain::traits::Persistable;

/// Write any serde value to `path` as bincode.
pub fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Cannot create '{}'", path.display()))?;
    bincode::serialize_into(BufWriter::new(file), value)
        .with_context(|| format!("Cannot serialise to '{}'", path.display()))
}

/// Read a serde value written by [`write_bincode`].
pub fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Cannot open '{}'", path.display()))?;
    bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("Cannot deserialise '{}'", path.display()))
}

// ─── Word vector blobs ────────────────────────────────────────────────────────

/// `data/wv/name.txt` → `data/wv/name-wordvectors.bin`
pub fn vectors_blob_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("vectors");
    source.with_file_name(format!("{stem}-wordvectors.bin"))
}

impl Persistable for WordVectorBox {
    fn save(&self, path: &Path) -> Result<()> {
        write_bincode(path, self)?;
        tracing::info!("Saved word vectors ({} tokens) to '{}'", self.len(), path.display());
        Ok(())
    }

    fn load(path: &Path) -> Result<Self> {
        let wv: WordVectorBox = read_bincode(path)
            .with_context(|| format!("Cannot load word vectors from '{}'", path.display()))?;
        tracing::info!("Loaded word vectors ({} tokens) from '{}'", wv.len(), path.display());
        Ok(wv)
    }
}

// ─── Tensors ──────────────────────────────────────────────────────────────────

/// Reads and writes the per-split tensors in one directory.
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn features_path(&self, split: Split, repr: Representation) -> PathBuf {
        self.dir.join(format!("IMDB_{}_{}_X.bin", split, repr))
    }

    pub fn labels_path(&self, split: Split, repr: Representation) -> PathBuf {
        self.dir.join(format!("IMDB_{}_{}_y.bin", split, repr))
    }

    /// Persist every tensor set. Call only once all sets are assembled.
    pub fn save_all(&self, sets: &[SplitTensors]) -> Result<()> {
        for set in sets {
            let x_path = self.features_path(set.split, set.representation);
            let y_path = self.labels_path(set.split, set.representation);
            write_bincode(&x_path, &set.features)?;
            write_bincode(&y_path, &set.labels)?;
            tracing::info!(
                "Saved {} {} tensors {:?} → '{}'",
                set.split,
                set.representation,
                set.features.shape(),
                x_path.display()
            );
        }
        Ok(())
    }

    pub fn load(&self, split: Split, repr: Representation) -> Result<SplitTensors> {
        let features: Array3<u32> = read_bincode(&self.features_path(split, repr))?;
        let labels: Array1<f32> = read_bincode(&self.labels_path(split, repr))?;

        anyhow::ensure!(
            features.shape()[0] == labels.len(),
            "{split} {repr}: {} feature rows but {} labels",
            features.shape()[0],
            labels.len()
        );

        Ok(SplitTensors {
            split,
            representation: repr,
            features,
            labels,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::word_vectors::{BuildOptions, WordVectorSource};
    use crate::domain::document::Paragraph;
    use ndarray::array;

    #[test]
    fn test_blob_path_sits_next_to_source() {
        assert_eq!(
            vectors_blob_path(Path::new("data/wv/IMDB-GloVe-300dim.txt")),
            PathBuf::from("data/wv/IMDB-GloVe-300dim-wordvectors.bin")
        );
    }

    #[test]
    fn test_word_vectors_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wv.bin");

        let wv = WordVectorSource::text("good 1 0\nbad 0 1\nfilm 3 4\n")
            .build(BuildOptions::new(true, false, true))
            .unwrap();
        wv.save(&path).unwrap();
        let loaded = WordVectorBox::load(&path).unwrap();

        let words = |ws: &[&str]| ws.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        let docs: Vec<Paragraph> = vec![
            vec![words(&["good", "film"]), words(&["unseen", "bad"])],
            vec![words(&["film"])],
        ];

        let before: Vec<_> = wv.indices_of(&docs).map(Result::unwrap).collect();
        let after: Vec<_> = loaded.indices_of(&docs).map(Result::unwrap).collect();
        assert_eq!(before, after);
        assert_eq!(wv.matrix(), loaded.matrix());
        assert_eq!(wv.len(), loaded.len());
    }

    #[test]
    fn test_tensors_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path());

        let set = SplitTensors {
            split: Split::Test,
            representation: Representation::Global,
            features: array![[[0, 1], [2, 3]], [[4, 5], [0, 0]]],
            labels: array![1.0, 0.0],
        };
        store.save_all(std::slice::from_ref(&set)).unwrap();

        assert!(dir.path().join("IMDB_test_global_glove_X.bin").exists());
        assert!(dir.path().join("IMDB_test_global_glove_y.bin").exists());

        let loaded = store.load(Split::Test, Representation::Global).unwrap();
        assert_eq!(loaded.features, set.features);
        assert_eq!(loaded.labels, set.labels);
    }

    #[test]
    fn test_missing_tensor_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path());
        assert!(store.load(Split::Train, Representation::Local).is_err());
    }
}
