use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::ModelError;

/// Per-column z-score normalization fitted on the training partition.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std_dev: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(features: &Array2<f64>) -> Result<Self, ModelError> {
        if features.nrows() == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }

        let mean = features.mean_axis(Axis(0)).ok_or(ModelError::EmptyTrainingSet)?;
        // Constant columns keep a unit scale so they map to zero instead of NaN.
        let std_dev = features
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std > f64::EPSILON { std } else { 1.0 });

        Ok(Self { mean, std_dev })
    }

    pub fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        self.check_width(features.ncols())?;
        Ok((features - &self.mean) / &self.std_dev)
    }

    pub fn transform_row(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, ModelError> {
        self.check_width(row.len())?;
        Ok((&row - &self.mean) / &self.std_dev)
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn std_dev(&self) -> &Array1<f64> {
        &self.std_dev
    }

    fn check_width(&self, actual: usize) -> Result<(), ModelError> {
        if actual == self.mean.len() {
            Ok(())
        } else {
            Err(ModelError::FeatureCountMismatch {
                expected: self.mean.len(),
                actual,
            })
        }
    }
}
