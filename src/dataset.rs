use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::DatasetError;

/// Feature matrix paired row by row with binary labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array1<u8>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, labels: Array1<u8>) -> Result<Self, DatasetError> {
        if features.nrows() != labels.len() {
            return Err(DatasetError::LabelCount {
                rows: features.nrows(),
                labels: labels.len(),
            });
        }
        Ok(Self { features, labels })
    }

    pub fn from_rows<const D: usize>(
        rows: Vec<[f64; D]>,
        labels: Vec<u8>,
    ) -> Result<Self, DatasetError> {
        let features = Array2::from_shape_fn((rows.len(), D), |(i, j)| rows[i][j]);
        Self::new(features, Array1::from(labels))
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<u8> {
        &self.labels
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.features.row(index)
    }

    /// Copies the given rows, in the given order, into a new dataset.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// Per-column `(min, max)` over all rows.
    pub fn feature_ranges(&self) -> Vec<(f64, f64)> {
        self.features
            .columns()
            .into_iter()
            .map(|column| {
                column
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &value| {
                        (min.min(value), max.max(value))
                    })
            })
            .collect()
    }

    /// Number of rows in each class, `[benign, malignant]`.
    pub fn class_counts(&self) -> [usize; 2] {
        let malignant = self.labels.iter().filter(|&&label| label == 1).count();
        [self.n_samples() - malignant, malignant]
    }
}

/// Row indices of the two partitions, in shuffled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub indices: SplitIndices,
    pub train: Dataset,
    pub test: Dataset,
}

/// Shuffles `0..n_samples` with a seeded generator; the first
/// `ceil(test_fraction * n_samples)` indices form the test partition.
pub fn split_indices(
    n_samples: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<SplitIndices, DatasetError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DatasetError::InvalidTestFraction(test_fraction));
    }

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    let test_size = (n_samples as f64 * test_fraction).ceil() as usize;
    if test_size == 0 || test_size >= n_samples {
        return Err(DatasetError::DegenerateSplit {
            rows: n_samples,
            fraction: test_fraction,
        });
    }

    let mut permutation: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let train = permutation.split_off(test_size);

    Ok(SplitIndices {
        train,
        test: permutation,
    })
}

pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, DatasetError> {
    let indices = split_indices(dataset.n_samples(), test_fraction, seed)?;
    let train = dataset.select(&indices.train);
    let test = dataset.select(&indices.test);

    tracing::info!(
        "split {} samples into {} train / {} test (seed {seed})",
        dataset.n_samples(),
        train.n_samples(),
        test.n_samples()
    );

    Ok(TrainTestSplit {
        indices,
        train,
        test,
    })
}
