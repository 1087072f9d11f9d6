// ============================================================
// Layer 5 — Sentiment Model
// ============================================================
// Hierarchical bag-of-embeddings classifier:
//
//   text [b, S*W] ─► Embedding ─► [b, S, W, D]
//                  ─► masked mean over words  ─► [b, S, D]
//                  ─► Linear + ReLU + Dropout ─► [b, S, H]
//                  ─► mean over sentences     ─► [b, H]
//                  ─► Linear                  ─► [b] logit
//
// The token mask (`weights`) keeps padding out of the word
// average; a fully padded sentence averages to zero.
//
// The embedding table can be seeded from a word-vector matrix so
// row i of the matrix is the vector of word index i.

use burn::{
    module::Param,
    nn::{
        loss::BinaryCrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::{activation::relu, TensorData},
};
use ndarray::Array2;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct SentimentModelConfig {
    pub vocab_size:              usize,
    pub embedding_dim:           usize,
    pub sentences_per_paragraph: usize,
    pub words_per_sentence:      usize,
    #[config(default = 64)]
    pub hidden_size:             usize,
    #[config(default = 0.5)]
    pub dropout:                 f64,
}

impl SentimentModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SentimentModel<B> {
        SentimentModel {
            embedding:      EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device),
            sentence_dense: LinearConfig::new(self.embedding_dim, self.hidden_size).init(device),
            output:         LinearConfig::new(self.hidden_size, 1).init(device),
            dropout:        DropoutConfig::new(self.dropout).init(),
            sentences:      self.sentences_per_paragraph,
            words:          self.words_per_sentence,
        }
    }

    /// Like `init`, with the embedding table replaced by `matrix`
    /// ([vocab_size, embedding_dim]).
    pub fn init_with_embeddings<B: Backend>(
        &self,
        matrix: &Array2<f32>,
        device: &B::Device,
    ) -> SentimentModel<B> {
        let mut model = self.init(device);
        let (rows, cols) = matrix.dim();
        let data = TensorData::new(matrix.iter().copied().collect::<Vec<f32>>(), [rows, cols]);
        model.embedding.weight = Param::from_tensor(Tensor::from_data(data, device));
        model
    }
}

#[derive(Module, Debug)]
pub struct SentimentModel<B: Backend> {
    pub embedding:      Embedding<B>,
    pub sentence_dense: Linear<B>,
    pub output:         Linear<B>,
    pub dropout:        Dropout,
    pub sentences:      usize,
    pub words:          usize,
}

impl<B: Backend> SentimentModel<B> {
    /// text, weights: [batch, sentences * words] → logits: [batch]
    pub fn forward(&self, text: Tensor<B, 2, Int>, weights: Tensor<B, 2>) -> Tensor<B, 1> {
        let [batch, _] = text.dims();
        let (s, w) = (self.sentences, self.words);

        let emb = self.embedding.forward(text); // [b, S*W, D]
        let [_, _, d] = emb.dims();
        let emb = emb.reshape([batch, s, w, d]);

        let mask = weights.reshape([batch, s, w, 1]);
        let summed = (emb * mask.clone().expand([batch, s, w, d])).sum_dim(2); // [b, S, 1, D]
        let counts = mask.sum_dim(2).clamp_min(1.0); // [b, S, 1, 1]
        let sentence_vecs = (summed / counts.expand([batch, s, 1, d])).reshape([batch, s, d]);

        let hidden = self.dropout.forward(relu(self.sentence_dense.forward(sentence_vecs)));
        let [_, _, h] = hidden.dims();
        let review = hidden.mean_dim(1).reshape([batch, h]);

        self.output.forward(review).reshape([batch])
    }

    /// Mean binary cross-entropy on logits, plus the logits.
    pub fn forward_loss(
        &self,
        text:    Tensor<B, 2, Int>,
        weights: Tensor<B, 2>,
        labels:  Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let logits = self.forward(text, weights);
        let bce = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&logits.device());
        let loss = bce.forward(logits.clone(), labels);
        (loss, logits)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::ElementConversion};
    use ndarray::array;

    type B = NdArray;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model = SentimentModelConfig::new(10, 4, 2, 3)
            .with_hidden_size(5)
            .init::<B>(&device);

        let text = Tensor::<B, 2, Int>::from_ints([[0, 1, 2, 0, 0, 3], [4, 5, 6, 7, 8, 9]], &device);
        let weights = Tensor::<B, 2>::from_floats(
            [[0.0, 1.0, 1.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0, 1.0, 1.0, 1.0]],
            &device,
        );
        let logits = model.forward(text, weights);
        assert_eq!(logits.dims(), [2]);
    }

    #[test]
    fn test_loss_is_finite_on_fully_padded_review() {
        let device = Default::default();
        let model = SentimentModelConfig::new(4, 2, 1, 2).init::<B>(&device);

        let text = Tensor::<B, 2, Int>::from_ints([[0, 0]], &device);
        let weights = Tensor::<B, 2>::zeros([1, 2], &device);
        let labels = Tensor::<B, 1, Int>::from_ints([1], &device);

        let (loss, _) = model.forward_loss(text, weights, labels);
        let value: f32 = loss.into_scalar().elem();
        assert!(value.is_finite());
    }

    #[test]
    fn test_embeddings_seeded_from_matrix() {
        let device = Default::default();
        let matrix = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let model = SentimentModelConfig::new(3, 2, 1, 1)
            .init_with_embeddings::<B>(&matrix, &device);

        let weight: Vec<f32> = model.embedding.weight.val().into_data().to_vec().unwrap();
        assert_eq!(weight, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }
}
