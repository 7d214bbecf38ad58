//! Sampler
//!
//! Strategies for partitioning the training rows into a fitting set and a
//! held-out evaluation set.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

// A sampler splits row indices into the rows used for fitting and the rows held out.
pub trait Sampler {
    /// Sample the data, returning a tuple, where the first item is the samples
    /// chosen for training, and the second are the samples excluded.
    fn sample(&mut self, rng: &mut StdRng, index: &[usize]) -> (Vec<usize>, Vec<usize>);
}

/// Stratified sampler, every label keeps its share of rows in both partitions.
pub struct StratifiedSampler<'a> {
    test_size: f64,
    labels: &'a [f64],
}

impl<'a> StratifiedSampler<'a> {
    /// * `test_size` - Fraction of rows held out, in `[0, 1)`.
    /// * `labels` - Label of every row, addressed by the indices passed to `sample`.
    pub fn new(test_size: f64, labels: &'a [f64]) -> Self {
        StratifiedSampler { test_size, labels }
    }

    /// Number of held out rows for `n` rows. At least one row is always kept for training.
    pub fn n_test(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let n_test = (self.test_size * n as f64).ceil() as usize;
        n_test.min(n - 1)
    }
}

impl<'a> Sampler for StratifiedSampler<'a> {
    fn sample(&mut self, rng: &mut StdRng, index: &[usize]) -> (Vec<usize>, Vec<usize>) {
        // Group the rows by label, in ascending label order.
        let mut strata: Vec<(f64, Vec<usize>)> = Vec::new();
        for &i in index {
            let label = self.labels[i];
            match strata.iter_mut().find(|(l, _)| *l == label) {
                Some((_, rows)) => rows.push(i),
                None => strata.push((label, vec![i])),
            }
        }
        strata.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = index.len();
        let n_test = self.n_test(n);

        // Largest remainder allocation of the held out rows across strata.
        let exact: Vec<f64> = strata
            .iter()
            .map(|(_, rows)| n_test as f64 * rows.len() as f64 / n as f64)
            .collect();
        let mut allocation: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
        let mut remaining = n_test - allocation.iter().sum::<usize>();
        let mut order: Vec<usize> = (0..strata.len()).collect();
        order.sort_by(|&a, &b| (exact[b] - exact[b].floor()).total_cmp(&(exact[a] - exact[a].floor())));
        for s in order {
            if remaining == 0 {
                break;
            }
            if allocation[s] < strata[s].1.len() {
                allocation[s] += 1;
                remaining -= 1;
            }
        }

        let mut chosen = Vec::with_capacity(n - n_test);
        let mut excluded = Vec::with_capacity(n_test);
        for ((_, rows), n_out) in strata.iter_mut().zip(allocation) {
            rows.shuffle(rng);
            excluded.extend_from_slice(&rows[..n_out]);
            chosen.extend_from_slice(&rows[n_out..]);
        }
        chosen.sort_unstable();
        excluded.sort_unstable();
        (chosen, excluded)
    }
}
