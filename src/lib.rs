pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod logistic_regression;
pub mod metrics;
pub mod parse;
pub mod pipeline;
pub mod plot;
pub mod prediction;
pub mod scaling;
