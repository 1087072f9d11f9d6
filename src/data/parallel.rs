// ============================================================
// Layer 4 — Parallel Map
// ============================================================
// Fan-out / fan-in over a batch of independent items.
// Reading and segmenting 25k reviews is CPU-bound and every
// item is independent, so the work is spread over a rayon
// thread pool. Results come back in input order; the call
// returns only after every item is done.

use rayon::prelude::*;

use crate::domain::traits::ParallelMapper;

/// Rayon-backed mapper using the global thread pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct RayonMapper;

impl ParallelMapper for RayonMapper {
    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        items.into_par_iter().map(f).collect()
    }
}

/// Single-threaded mapper, same contract.
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialMapper;

#[cfg(test)]
impl ParallelMapper for SequentialMapper {
    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        items.into_iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rayon_preserves_order() {
        let items: Vec<u64> = (0..10_000).collect();
        let out = RayonMapper.map(items, |x| x * 2);
        assert_eq!(out.len(), 10_000);
        assert!(out.iter().enumerate().all(|(i, &v)| v == 2 * i as u64));
    }

    #[test]
    fn test_mappers_agree() {
        let items: Vec<String> = ["a b", "c", "", "d e f"].iter().map(|s| s.to_string()).collect();
        let count = |s: String| s.split_whitespace().count();
        assert_eq!(
            RayonMapper.map(items.clone(), count),
            SequentialMapper.map(items, count)
        );
    }

    #[test]
    fn test_empty_batch() {
        let out: Vec<u8> = RayonMapper.map(Vec::<u8>::new(), |x| x);
        assert!(out.is_empty());
    }
}
