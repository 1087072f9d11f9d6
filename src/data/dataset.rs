use burn::data::dataset::Dataset;
use ndarray::{Array1, Array2, Array3, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::data::word_vectors::PAD_INDEX;
use crate::domain::document::{Polarity, Representation, Split};

/// Rectangular features + labels for one (split, representation) pair.
/// Features: [documents, sentences, words] word indices.
#[derive(Debug, Clone)]
pub struct SplitTensors {
    pub split: Split,
    pub representation: Representation,
    pub features: Array3<u32>,
    pub labels: Array1<f32>,
}

impl SplitTensors {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Labels for `positives` positive reviews followed by `negatives` negative ones.
pub fn block_labels(positives: usize, negatives: usize) -> Array1<f32> {
    std::iter::repeat(Polarity::Positive.label())
        .take(positives)
        .chain(std::iter::repeat(Polarity::Negative.label()).take(negatives))
        .collect()
}

/// [docs, sentences, words] → [docs, sentences * words], row-major.
/// The model rebuilds the sentence axis from its configured shape.
pub fn flatten_reviews(features: &Array3<u32>) -> Array2<u32> {
    let (docs, sentences, words) = features.dim();
    Array2::from_shape_fn((docs, sentences * words), |(d, i)| {
        features[[d, i / words, i % words]]
    })
}

/// 1.0 for a real token, 0.0 for padding.
pub fn token_mask(text: &Array2<u32>) -> Array2<f32> {
    text.mapv(|i| if i > PAD_INDEX { 1.0 } else { 0.0 })
}

/// One flattened review, as the model sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSample {
    pub text: Vec<u32>,
    pub weights: Vec<f32>,
    pub label: f32,
}

impl SentimentSample {
    pub fn new(text: ArrayView1<'_, u32>, weights: ArrayView1<'_, f32>, label: f32) -> Self {
        Self {
            text: text.to_vec(),
            weights: weights.to_vec(),
            label,
        }
    }
}

/// Pair up rows of `text` and `weights` with `labels`.
/// Without labels (prediction) every sample gets 0.0.
pub fn to_samples(text: &Array2<u32>, weights: &Array2<f32>, labels: Option<&Array1<f32>>) -> Vec<SentimentSample> {
    text.rows()
        .into_iter()
        .zip(weights.rows())
        .enumerate()
        .map(|(i, (t, w))| {
            let label = labels.map_or(0.0, |l| l[i]);
            SentimentSample::new(t, w, label)
        })
        .collect()
}

pub struct SentimentDataset {
    samples: Vec<SentimentSample>,
}

impl SentimentDataset {
    pub fn new(samples: Vec<SentimentSample>) -> Self { Self { samples } }
}

impl Dataset<SentimentSample> for SentimentDataset {
    fn get(&self, index: usize) -> Option<SentimentSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_block_labels_use_each_block_size() {
        let labels = block_labels(3, 2);
        assert_eq!(labels, array![1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_flatten_is_row_major() {
        let features = array![[[0, 4], [5, 0]], [[0, 0], [0, 9]]];
        let flat = flatten_reviews(&features);
        assert_eq!(flat, array![[0, 4, 5, 0], [0, 0, 0, 9]]);
    }

    #[test]
    fn test_mask_marks_real_tokens() {
        let text = array![[0, 4, 5, 0]];
        assert_eq!(token_mask(&text), array![[0.0, 1.0, 1.0, 0.0]]);
    }

    #[test]
    fn test_samples_pair_rows_with_labels() {
        let text = array![[0, 4], [7, 0]];
        let weights = token_mask(&text);
        let labels = array![1.0, 0.0];

        let samples = to_samples(&text, &weights, Some(&labels));
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].text, vec![7, 0]);
        assert_eq!(samples[1].weights, vec![1.0, 0.0]);
        assert_eq!(samples[0].label, 1.0);
        assert_eq!(samples[1].label, 0.0);

        let unlabelled = to_samples(&text, &weights, None);
        assert!(unlabelled.iter().all(|s| s.label == 0.0));
    }

    #[test]
    fn test_dataset_access() {
        let text = array![[1, 2]];
        let samples = to_samples(&text, &token_mask(&text), None);
        let ds = SentimentDataset::new(samples);
        assert_eq!(ds.len(), 1);
        assert!(ds.get(1).is_none());
        assert_eq!(ds.get(0).unwrap().text, vec![1, 2]);
    }
}
