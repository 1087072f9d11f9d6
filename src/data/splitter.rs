// ============================================================
// Layer 4 — Shuffling and Validation Split
// ============================================================
// Reviews are assembled positive-block-then-negative-block, so
// they must be shuffled before training. Features and labels
// live in separate arrays; both are reordered with ONE
// permutation so every (review, label) pair survives.
//
// The validation set is the LAST `validation_fraction` of the
// (already shuffled) samples. Splitting does not shuffle again.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation
//            ndarray crate documentation (select)

use ndarray::{Array, Array1, Axis, RemoveAxis};
use rand::{seq::SliceRandom, Rng};

/// A uniformly random permutation of `0..n`.
pub fn permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}

/// Reorder features (along axis 0) and labels with the same permutation.
///
/// # Panics
/// Panics if features and labels disagree on the number of samples.
pub fn shuffle_paired<A, D, L, R>(
    features: &Array<A, D>,
    labels: &Array1<L>,
    rng: &mut R,
) -> (Array<A, D>, Array1<L>)
where
    A: Clone,
    D: RemoveAxis,
    L: Clone,
    R: Rng + ?Sized,
{
    let n = features.len_of(Axis(0));
    assert_eq!(
        n,
        labels.len(),
        "features ({}) and labels ({}) must have the same number of samples",
        n,
        labels.len()
    );

    let order = permutation(n, rng);
    (
        features.select(Axis(0), &order),
        labels.select(Axis(0), &order),
    )
}

/// Split `samples` into (train, validation), the validation part
/// being the last `validation_fraction` of the input.
pub fn split_off_validation<T>(mut samples: Vec<T>, validation_fraction: f64) -> (Vec<T>, Vec<T>) {
    let total = samples.len();
    let fraction = validation_fraction.clamp(0.0, 1.0);
    let val_len = ((total as f64) * fraction).round() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = total - val_len.min(total);

    // After this: samples = [0..split_at], val = [split_at..total]
    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        samples.len(),
        val.len(),
        (samples.len() * 100) / total.max(1),
        (val.len() * 100) / total.max(1),
    );

    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array3};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_permutation_covers_every_index() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = permutation(100, &mut rng);
        p.sort_unstable();
        assert_eq!(p, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_keeps_feature_label_pairs() {
        // Feature block i is filled with value i; label i is i as f32
        let n = 50;
        let features = Array3::from_shape_fn((n, 2, 3), |(d, _, _)| d as u32);
        let labels = Array1::from_shape_fn(n, |d| d as f32);

        let mut rng = StdRng::seed_from_u64(42);
        let (f, l) = shuffle_paired(&features, &labels, &mut rng);

        assert_eq!(f.shape(), features.shape());
        for d in 0..n {
            let id = f[[d, 0, 0]];
            assert!(f.index_axis(Axis(0), d).iter().all(|&v| v == id));
            assert_eq!(l[d], id as f32);
        }
        // Something actually moved
        assert_ne!(l, labels);
    }

    #[test]
    fn test_same_seed_same_order() {
        let labels = Array1::from_shape_fn(20, |d| d as f32);
        let features = Array3::from_shape_fn((20, 1, 1), |(d, _, _)| d as u32);

        let (_, a) = shuffle_paired(&features, &labels, &mut StdRng::seed_from_u64(1));
        let (_, b) = shuffle_paired(&features, &labels, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic]
    fn test_mismatched_lengths_panic() {
        let features = Array3::<u32>::zeros((3, 1, 1));
        let labels = Array1::<f32>::zeros(2);
        let _ = shuffle_paired(&features, &labels, &mut StdRng::seed_from_u64(0));
    }

    #[test]
    fn test_validation_is_the_tail() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val) = split_off_validation(items, 0.35);
        assert_eq!(train.len(), 65);
        assert_eq!(val.len(), 35);
        assert_eq!(val[0], 65);
        assert_eq!(*train.last().unwrap(), 64);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..7).collect();
        let (train, val) = split_off_validation(items, 0.5);
        assert_eq!(train.len() + val.len(), 7);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, val) = split_off_validation(Vec::<usize>::new(), 0.2);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_zero_fraction_keeps_everything_for_training() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val) = split_off_validation(items, 0.0);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
