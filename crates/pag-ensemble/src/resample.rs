//! Row resampling. Run `i` draws from ChaCha8 seeded with `seed + i`, so a
//! run's sample does not depend on which thread executes it.

use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use pag_core::errors::EnsembleError;
use pag_core::{DataSet, PagResult};

#[derive(Debug, Clone, Copy)]
pub struct Resampler {
    fraction: f64,
    with_replacement: bool,
    seed: u64,
}

impl Resampler {
    pub fn new(fraction: f64, with_replacement: bool, seed: u64) -> PagResult<Self> {
        let valid = fraction.is_finite() && fraction > 0.0 && (with_replacement || fraction <= 1.0);
        if !valid {
            return Err(EnsembleError::InvalidResampleFraction { fraction }.into());
        }
        Ok(Self {
            fraction,
            with_replacement,
            seed,
        })
    }

    /// Rows drawn from a dataset of `rows` rows; never zero.
    pub fn sample_size(&self, rows: usize) -> usize {
        ((rows as f64 * self.fraction).round() as usize).max(1)
    }

    /// Row indices for run `run`. Without replacement they come back sorted.
    pub fn indices(&self, run: usize, rows: usize) -> Vec<usize> {
        if rows == 0 {
            return Vec::new();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(run as u64));
        let size = self.sample_size(rows);
        if self.with_replacement {
            (0..size).map(|_| rng.gen_range(0..rows)).collect()
        } else {
            let mut picked = sample(&mut rng, rows, size.min(rows)).into_vec();
            picked.sort_unstable();
            picked
        }
    }

    pub fn resample(&self, run: usize, data: &DataSet) -> PagResult<DataSet> {
        if data.is_empty() {
            return Err(EnsembleError::EmptyDataSet.into());
        }
        Ok(data.subset_rows(&self.indices(run, data.num_rows())))
    }
}
