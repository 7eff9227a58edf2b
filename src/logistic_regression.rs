use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Deserialize;

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Solver {
    /// Newton's method with a backtracking line search.
    #[default]
    Newton,
    /// Full-batch gradient descent with a fixed learning rate.
    GradientDescent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub solver: Solver,
    /// Inverse of the L2 penalty strength (`C`).
    pub inverse_regularization: f64,
    pub max_iterations: usize,
    /// Stop once the max-norm of the gradient is at most this.
    pub tolerance: f64,
    pub learning_rate: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            solver: Solver::Newton,
            inverse_regularization: 1.0,
            max_iterations: 100,
            tolerance: 1e-4,
            learning_rate: 0.01,
        }
    }
}

/// Outcome of a call to [`LogisticRegression::fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub iterations: usize,
    /// Penalized objective divided by the sample count, starting before the first step.
    pub losses: Vec<f64>,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    pub weights: Array1<f64>,
    pub bias: f64,
    pub options: TrainOptions,
}

const ARMIJO_FACTOR: f64 = 1e-4;
const MIN_STEP: f64 = 1e-10;
const DAMPING_START: f64 = 1e-10;
const DAMPING_ATTEMPTS: usize = 8;

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp = z.exp();
        exp / (1.0 + exp)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn max_norm(gradient_weights: &Array1<f64>, gradient_bias: f64) -> f64 {
    gradient_weights
        .iter()
        .fold(gradient_bias.abs(), |max, value| max.max(value.abs()))
}

/// Solves `H d = g` by Cholesky, adding a growing multiple of the identity
/// when saturated probabilities leave `H` numerically indefinite.
fn solve_damped(hessian: DMatrix<f64>, gradient: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(direction) = solve_cholesky(hessian.clone(), gradient) {
        return Some(direction);
    }

    let size = hessian.nrows();
    let mut damping = DAMPING_START * hessian.diagonal().amax().max(1.0);
    for _ in 0..DAMPING_ATTEMPTS {
        let damped = &hessian + DMatrix::<f64>::identity(size, size) * damping;
        if let Some(direction) = solve_cholesky(damped, gradient) {
            tracing::debug!("newton step needed damping {damping:e}");
            return Some(direction);
        }
        damping *= 10.0;
    }
    None
}

/// A zero pivot passes the decomposition but yields a non-finite solution.
fn solve_cholesky(matrix: DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    let solution = matrix.cholesky()?.solve(rhs);
    solution.iter().all(|value| value.is_finite()).then_some(solution)
}

/// Training data and penalty shared by both solvers.
struct Problem<'a> {
    features: &'a Array2<f64>,
    targets: Array1<f64>,
    c: f64,
}

impl Problem<'_> {
    fn n_samples(&self) -> f64 {
        self.features.nrows() as f64
    }

    fn margins(&self, weights: &Array1<f64>, bias: f64) -> Array1<f64> {
        self.features.dot(weights) + bias
    }

    /// `0.5 * |w|^2 + C * sum(logloss)`.
    fn objective(&self, weights: &Array1<f64>, bias: f64) -> f64 {
        let data_loss: f64 = self
            .margins(weights, bias)
            .iter()
            .zip(&self.targets)
            .map(|(&z, &y)| softplus(z) - y * z)
            .sum();

        0.5 * weights.dot(weights) + self.c * data_loss
    }

    /// Gradient of [`Self::objective`] plus the predicted probabilities it was computed from.
    fn gradient(&self, weights: &Array1<f64>, bias: f64) -> (Array1<f64>, f64, Array1<f64>) {
        let probabilities = self.margins(weights, bias).mapv(sigmoid);
        let residual = &probabilities - &self.targets;

        let gradient_weights = self.features.t().dot(&residual) * self.c + weights;
        let gradient_bias = self.c * residual.sum();

        (gradient_weights, gradient_bias, probabilities)
    }

    fn newton_direction(
        &self,
        probabilities: &Array1<f64>,
        gradient_weights: &Array1<f64>,
        gradient_bias: f64,
        iteration: usize,
    ) -> Result<(Array1<f64>, f64), ModelError> {
        let dimensions = self.features.ncols();
        let curvature = probabilities.mapv(|p| self.c * p * (1.0 - p));
        let weighted_rows = self.features * &curvature.view().insert_axis(Axis(1));

        // X^T S X + I
        let weight_block = self.features.t().dot(&weighted_rows) + Array2::<f64>::eye(dimensions);
        let cross_block = weighted_rows.sum_axis(Axis(0));
        let bias_block = curvature.sum();

        let size = dimensions + 1;
        let hessian = DMatrix::from_fn(size, size, |i, j| match (i == dimensions, j == dimensions) {
            (false, false) => weight_block[(i, j)],
            (false, true) => cross_block[i],
            (true, false) => cross_block[j],
            (true, true) => bias_block,
        });
        let gradient = DVector::from_iterator(
            size,
            gradient_weights.iter().copied().chain(std::iter::once(gradient_bias)),
        );

        let direction = solve_damped(hessian, &gradient)
            .ok_or(ModelError::SingularHessian { iteration })?;

        let direction_weights = Array1::from_iter(direction.iter().take(dimensions).copied());
        Ok((direction_weights, direction[dimensions]))
    }
}

impl LogisticRegression {
    pub fn new(options: TrainOptions) -> Self {
        Self {
            weights: Array1::zeros(0),
            bias: 0.0,
            options,
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.weights.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    pub fn fit(
        &mut self,
        features: &Array2<f64>,
        labels: &Array1<u8>,
    ) -> Result<FitReport, ModelError> {
        if features.nrows() == 0 || features.ncols() == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if features.nrows() != labels.len() {
            return Err(ModelError::LabelCount {
                rows: features.nrows(),
                labels: labels.len(),
            });
        }
        if let Some(&label) = labels.iter().find(|&&label| label > 1) {
            return Err(ModelError::InvalidLabel(label));
        }
        if labels.iter().all(|&label| label == labels[0]) {
            return Err(ModelError::SingleClass(labels[0]));
        }

        let problem = Problem {
            features,
            targets: labels.mapv(f64::from),
            c: self.options.inverse_regularization,
        };

        let mut weights = Array1::zeros(features.ncols());
        let mut bias = 0.0;

        let report = match self.options.solver {
            Solver::Newton => self.fit_newton(&problem, &mut weights, &mut bias)?,
            Solver::GradientDescent => self.fit_gradient_descent(&problem, &mut weights, &mut bias),
        };

        if !report.converged {
            tracing::warn!(
                "{:?} solver stopped after {} iterations without converging",
                self.options.solver,
                report.iterations
            );
        }
        tracing::info!(
            "fitted logistic regression in {} iterations, final loss {:.6}",
            report.iterations,
            report.losses.last().copied().unwrap_or(f64::NAN)
        );

        self.weights = weights;
        self.bias = bias;
        Ok(report)
    }

    fn fit_newton(
        &self,
        problem: &Problem<'_>,
        weights: &mut Array1<f64>,
        bias: &mut f64,
    ) -> Result<FitReport, ModelError> {
        let n_samples = problem.n_samples();
        let mut current = problem.objective(weights, *bias);
        let mut losses = vec![current / n_samples];
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.options.max_iterations {
            let (gradient_weights, gradient_bias, probabilities) = problem.gradient(weights, *bias);
            if max_norm(&gradient_weights, gradient_bias) <= self.options.tolerance {
                converged = true;
                break;
            }

            let (direction_weights, direction_bias) = problem.newton_direction(
                &probabilities,
                &gradient_weights,
                gradient_bias,
                iterations,
            )?;
            let slope = gradient_weights.dot(&direction_weights) + gradient_bias * direction_bias;

            let mut step = 1.0;
            let (candidate_weights, candidate_bias, candidate) = loop {
                let candidate_weights = &*weights - &(&direction_weights * step);
                let candidate_bias = *bias - step * direction_bias;
                let candidate = problem.objective(&candidate_weights, candidate_bias);

                if candidate <= current - ARMIJO_FACTOR * step * slope || step < MIN_STEP {
                    break (candidate_weights, candidate_bias, candidate);
                }
                step *= 0.5;
            };

            if step < MIN_STEP {
                tracing::debug!("line search stalled after {iterations} iterations");
                break;
            }
            iterations += 1;

            *weights = candidate_weights;
            *bias = candidate_bias;
            current = candidate;
            losses.push(current / n_samples);
            tracing::debug!("newton iteration {iterations}: loss {:.6}, step {step}", current / n_samples);
        }

        if !converged && iterations == self.options.max_iterations {
            let (gradient_weights, gradient_bias, _) = problem.gradient(weights, *bias);
            converged = max_norm(&gradient_weights, gradient_bias) <= self.options.tolerance;
        }

        Ok(FitReport {
            iterations,
            losses,
            converged,
        })
    }

    /// Descends the per-sample objective `objective / (C * n)`.
    fn fit_gradient_descent(
        &self,
        problem: &Problem<'_>,
        weights: &mut Array1<f64>,
        bias: &mut f64,
    ) -> FitReport {
        let n_samples = problem.n_samples();
        let scale = 1.0 / (problem.c * n_samples);
        let mut losses = vec![problem.objective(weights, *bias) / n_samples];
        let mut converged = false;
        let mut iterations = 0;

        for _ in 0..self.options.max_iterations {
            let (gradient_weights, gradient_bias, _) = problem.gradient(weights, *bias);
            let gradient_weights = gradient_weights * scale;
            let gradient_bias = gradient_bias * scale;

            if max_norm(&gradient_weights, gradient_bias) <= self.options.tolerance {
                converged = true;
                break;
            }

            weights.scaled_add(-self.options.learning_rate, &gradient_weights);
            *bias -= self.options.learning_rate * gradient_bias;

            iterations += 1;
            losses.push(problem.objective(weights, *bias) / n_samples);
        }

        FitReport {
            iterations,
            losses,
            converged,
        }
    }

    fn check_row(&self, row: ArrayView1<'_, f64>) -> Result<(), ModelError> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        if row.len() != self.weights.len() {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.weights.len(),
                actual: row.len(),
            });
        }
        if let Some(index) = row.iter().position(|value| !value.is_finite()) {
            return Err(ModelError::NonFiniteFeature { index });
        }
        Ok(())
    }

    pub fn decision_function(&self, row: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        self.check_row(row)?;
        Ok(row.dot(&self.weights) + self.bias)
    }

    /// Probability of class `1`.
    pub fn predict_proba(&self, row: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        self.decision_function(row).map(sigmoid)
    }

    pub fn predict(&self, row: ArrayView1<'_, f64>) -> Result<u8, ModelError> {
        self.decision_function(row).map(|z| u8::from(z > 0.0))
    }

    pub fn predict_batch(&self, features: &Array2<f64>) -> Result<Array1<u8>, ModelError> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        if features.ncols() != self.weights.len() {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.weights.len(),
                actual: features.ncols(),
            });
        }

        Ok((features.dot(&self.weights) + self.bias).mapv(|z| u8::from(z > 0.0)))
    }

    /// Per-feature terms `w_j * x_j` of the decision function.
    pub fn contributions(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, ModelError> {
        self.check_row(row)?;
        Ok(&row * &self.weights)
    }
}
