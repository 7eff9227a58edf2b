use ndarray::{Array1, ArrayView1};

use crate::dataset::Dataset;
use crate::error::ModelError;
use crate::logistic_regression::{FitReport, LogisticRegression, TrainOptions};
use crate::scaling::StandardScaler;

/// A fitted logistic regression together with the preprocessing it was trained behind.
///
/// Rows passed to any method are raw measurements; scaling is applied internally.
#[derive(Debug, Clone)]
pub struct Classifier {
    scaler: Option<StandardScaler>,
    regression: LogisticRegression,
    feature_ranges: Vec<(f64, f64)>,
}

impl Classifier {
    pub fn fit(
        train: &Dataset,
        options: TrainOptions,
        standardize: bool,
    ) -> Result<(Self, FitReport), ModelError> {
        let scaler = if standardize {
            Some(StandardScaler::fit(train.features())?)
        } else {
            None
        };

        let mut regression = LogisticRegression::new(options);
        let report = match &scaler {
            Some(scaler) => regression.fit(&scaler.transform(train.features())?, train.labels())?,
            None => regression.fit(train.features(), train.labels())?,
        };

        let classifier = Self {
            scaler,
            regression,
            feature_ranges: train.feature_ranges(),
        };
        Ok((classifier, report))
    }

    pub fn n_features(&self) -> usize {
        self.regression.n_features()
    }

    /// Observed `(min, max)` of every attribute in the training partition.
    pub fn feature_ranges(&self) -> &[(f64, f64)] {
        &self.feature_ranges
    }

    pub fn regression(&self) -> &LogisticRegression {
        &self.regression
    }

    pub fn is_standardized(&self) -> bool {
        self.scaler.is_some()
    }

    /// The row as the regression sees it.
    pub fn model_input(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, ModelError> {
        if row.len() != self.n_features() {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features(),
                actual: row.len(),
            });
        }
        match &self.scaler {
            Some(scaler) => scaler.transform_row(row),
            None => Ok(row.to_owned()),
        }
    }

    pub fn predict(&self, row: ArrayView1<'_, f64>) -> Result<u8, ModelError> {
        self.regression.predict(self.model_input(row)?.view())
    }

    pub fn predict_proba(&self, row: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        self.regression.predict_proba(self.model_input(row)?.view())
    }

    pub fn contributions(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, ModelError> {
        self.regression.contributions(self.model_input(row)?.view())
    }

    pub fn predict_dataset(&self, dataset: &Dataset) -> Result<Array1<u8>, ModelError> {
        match &self.scaler {
            Some(scaler) => self
                .regression
                .predict_batch(&scaler.transform(dataset.features())?),
            None => self.regression.predict_batch(dataset.features()),
        }
    }
}
