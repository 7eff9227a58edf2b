use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or partitioning the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be opened.
    #[error("dataset unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The CSV reader failed on a record.
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("line {line}, column {column}: invalid number {value:?}")]
    InvalidValue {
        line: u64,
        column: usize,
        value: String,
    },
    #[error("line {line}: unknown diagnosis {value:?}")]
    UnknownDiagnosis { line: u64, value: String },
    #[error("dataset contains no samples")]
    Empty,
    #[error("test fraction must lie strictly between 0 and 1, got {0}")]
    InvalidTestFraction(f64),
    /// The requested split would leave one side without rows.
    #[error("cannot split {rows} rows with test fraction {fraction}: one partition would be empty")]
    DegenerateSplit { rows: usize, fraction: f64 },
    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    LabelCount { rows: usize, labels: usize },
}

/// Errors raised while fitting or querying a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,
    #[error("training set contains only class {0}")]
    SingleClass(u8),
    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    LabelCount { rows: usize, labels: usize },
    #[error("label {0} is not a binary class")]
    InvalidLabel(u8),
    /// A row does not have the attribute count the model was fitted with.
    #[error("expected {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },
    #[error("hessian is not positive definite at iteration {iteration}")]
    SingularHessian { iteration: usize },
    #[error("model has not been fitted")]
    NotFitted,
}

/// Errors raised by evaluation metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("predicted has {predicted} labels but actual has {actual}")]
    LengthMismatch { predicted: usize, actual: usize },
    #[error("cannot score an empty label vector")]
    Empty,
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// A value parsed but is outside its allowed range.
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Errors raised while rendering the loss chart.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("nothing to plot")]
    NoData,
    #[error("failed to draw {path}: {message}")]
    Draw { path: PathBuf, message: String },
}

/// Top-level error returned by [`crate::pipeline::run`].
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Plot(#[from] PlotError),
}
