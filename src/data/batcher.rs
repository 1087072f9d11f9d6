// ============================================================
// Layer 4 — Sentiment Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec of
// SentimentSamples into tensors.
//
// How batching works here:
//   Input:  Vec of N samples, each with L = sentences * words
//           indices (already rectangular)
//   Output: text    [N, L] Int
//           weights [N, L] Float   (1 = real token, 0 = pad)
//           labels  [N]    Int     (1 = positive)
//
// All samples share one length because the normaliser padded
// every review to the same shape, so no dynamic padding here.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SentimentSample;

/// A batch of reviews ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct SentimentBatch<B: Backend> {
    /// Word indices — shape: [batch_size, seq_len]
    pub text: Tensor<B, 2, Int>,

    /// Token mask — shape: [batch_size, seq_len]
    pub weights: Tensor<B, 2>,

    /// Targets — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created in the right place.
#[derive(Clone, Debug)]
pub struct SentimentBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SentimentBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SentimentSample, SentimentBatch<B>> for SentimentBatcher<B> {
    fn batch(&self, items: Vec<SentimentSample>) -> SentimentBatch<B> {
        let batch_size = items.len();
        let seq_len = items.first().map_or(0, |s| s.text.len());

        let text_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.text.iter().map(|&x| x as i32))
            .collect();

        let weights_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.weights.iter().copied())
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| if s.label > 0.5 { 1 } else { 0 })
            .collect();

        let text = Tensor::<B, 1, Int>::from_ints(text_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let weights = Tensor::<B, 1>::from_floats(weights_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        SentimentBatch { text, weights, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let batcher = SentimentBatcher::<NdArray>::new(device);

        let items = vec![
            SentimentSample { text: vec![0, 3, 4, 0], weights: vec![0.0, 1.0, 1.0, 0.0], label: 1.0 },
            SentimentSample { text: vec![0, 0, 0, 7], weights: vec![0.0, 0.0, 0.0, 1.0], label: 0.0 },
        ];
        let batch = batcher.batch(items);

        assert_eq!(batch.text.dims(), [2, 4]);
        assert_eq!(batch.weights.dims(), [2, 4]);
        assert_eq!(batch.labels.dims(), [2]);

        let labels: Vec<i64> = batch
            .labels
            .into_data()
            .convert::<i64>()
            .to_vec()
            .unwrap();
        assert_eq!(labels, vec![1, 0]);
    }
}
