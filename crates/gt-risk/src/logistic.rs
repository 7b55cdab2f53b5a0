//! Binary logistic regression fitted by damped Newton-Raphson.
//!
//! The objective is the summed log-loss plus `‖w‖² / (2C)`; the intercept is
//! not penalised. Each iteration solves the regularised Hessian system and
//! halves the step until the objective stops increasing.

use gt_model::Outcome;
use ndarray::{Array1, Array2, ArrayView1, Axis, s};
use tracing::{debug, warn};

use crate::error::{Result, RiskModelError};

const MAX_HALVINGS: usize = 30;

/// Hyper-parameters of the fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    /// Inverse regularisation strength.
    pub c: f64,
    pub max_iter: usize,
    /// Largest parameter change that counts as converged.
    pub tolerance: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tolerance: 1e-8,
        }
    }
}

impl ModelParams {
    pub fn validate(&self) -> Result<()> {
        if !self.c.is_finite() || self.c <= 0.0 {
            return Err(RiskModelError::InvalidParameter {
                name: "c",
                reason: format!("must be a positive number, got {}", self.c),
            });
        }
        if self.max_iter == 0 {
            return Err(RiskModelError::InvalidParameter {
                name: "max_iter",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(RiskModelError::InvalidParameter {
                name: "tolerance",
                reason: format!("must be a positive number, got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Fitted {
    intercept: f64,
    coefficients: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    params: ModelParams,
    fitted: Option<Fitted>,
    iterations: usize,
    converged: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(ModelParams::default())
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
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

impl LogisticRegression {
    pub fn new(params: ModelParams) -> Self {
        Self {
            params,
            fitted: None,
            iterations: 0,
            converged: false,
        }
    }

    /// A model with known parameters, bypassing the fit.
    pub fn from_parts(intercept: f64, coefficients: Vec<f64>) -> Result<Self> {
        if !intercept.is_finite() || coefficients.iter().any(|value| !value.is_finite()) {
            return Err(RiskModelError::InvalidParameter {
                name: "coefficients",
                reason: "must be finite".to_string(),
            });
        }
        Ok(Self {
            params: ModelParams::default(),
            fitted: Some(Fitted {
                intercept,
                coefficients: Array1::from_vec(coefficients),
            }),
            iterations: 0,
            converged: true,
        })
    }

    pub fn params(&self) -> ModelParams {
        self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Newton iterations taken by the last fit.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn intercept(&self) -> Result<f64> {
        self.fitted
            .as_ref()
            .map(|fitted| fitted.intercept)
            .ok_or(RiskModelError::NotFitted)
    }

    pub fn coefficients(&self) -> Result<&Array1<f64>> {
        self.fitted
            .as_ref()
            .map(|fitted| &fitted.coefficients)
            .ok_or(RiskModelError::NotFitted)
    }

    /// Fit on `x` (one row per sample) against 0/1 labels `y`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.params.validate()?;
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(RiskModelError::EmptyTrainingSet);
        }
        if y.len() != n_samples {
            return Err(RiskModelError::DimensionMismatch {
                expected: n_samples,
                got: y.len(),
            });
        }
        if let Some(label) = y.iter().find(|label| **label != 0.0 && **label != 1.0) {
            return Err(RiskModelError::InvalidParameter {
                name: "y",
                reason: format!("labels must be 0 or 1, found {label}"),
            });
        }
        let positives = y.iter().filter(|label| **label == 1.0).count();
        if positives == 0 || positives == n_samples {
            return Err(RiskModelError::SingleClass);
        }

        self.fitted = None;
        self.converged = false;
        self.iterations = 0;

        // Leading column of ones carries the intercept.
        let mut design = Array2::<f64>::ones((n_samples, n_features + 1));
        design.slice_mut(s![.., 1..]).assign(x);
        let penalty = 1.0 / self.params.c;
        let mut theta = Array1::<f64>::zeros(n_features + 1);
        let mut current = objective(&design, y, &theta, penalty);

        for iteration in 1..=self.params.max_iter {
            self.iterations = iteration;
            let probabilities = design.dot(&theta).mapv(sigmoid);
            let mut gradient = design.t().dot(&(&probabilities - y));
            let weights = probabilities.mapv(|p| p * (1.0 - p)).insert_axis(Axis(1));
            let mut hessian = design.t().dot(&(&design * &weights));
            for j in 1..=n_features {
                gradient[j] += penalty * theta[j];
                hessian[[j, j]] += penalty;
            }
            let step = solve(hessian, gradient)
                .ok_or(RiskModelError::SingularHessian { iteration })?;

            let mut scale = 1.0;
            let mut candidate = &theta - &step;
            let mut candidate_objective = objective(&design, y, &candidate, penalty);
            let mut halvings = 0;
            while (candidate_objective > current || candidate_objective.is_nan())
                && halvings < MAX_HALVINGS
            {
                scale *= 0.5;
                candidate = &theta - &(&step * scale);
                candidate_objective = objective(&design, y, &candidate, penalty);
                halvings += 1;
            }
            if candidate_objective > current || candidate_objective.is_nan() {
                // No descent direction left at machine precision.
                self.converged = true;
                break;
            }

            let change = step
                .iter()
                .fold(0.0_f64, |max, value| max.max((value * scale).abs()));
            theta = candidate;
            current = candidate_objective;
            debug!(iteration, objective = current, change, halvings, "newton step");
            if change < self.params.tolerance {
                self.converged = true;
                break;
            }
        }

        if !self.converged {
            warn!(
                iterations = self.iterations,
                "logistic regression stopped before converging"
            );
        }
        self.fitted = Some(Fitted {
            intercept: theta[0],
            coefficients: theta.slice(s![1..]).to_owned(),
        });
        Ok(())
    }

    /// Log-odds for one sample.
    pub fn decision_function(&self, x: &[f64]) -> Result<f64> {
        let fitted = self.fitted.as_ref().ok_or(RiskModelError::NotFitted)?;
        if x.len() != fitted.coefficients.len() {
            return Err(RiskModelError::DimensionMismatch {
                expected: fitted.coefficients.len(),
                got: x.len(),
            });
        }
        Ok(fitted.intercept + fitted.coefficients.dot(&ArrayView1::from(x)))
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<f64> {
        Ok(sigmoid(self.decision_function(x)?))
    }

    pub fn predict(&self, x: &[f64]) -> Result<Outcome> {
        Ok(Outcome::from_probability(self.predict_proba(x)?))
    }
}

fn objective(design: &Array2<f64>, y: &Array1<f64>, theta: &Array1<f64>, penalty: f64) -> f64 {
    let loss: f64 = design
        .dot(theta)
        .iter()
        .zip(y.iter())
        .map(|(z, label)| softplus(*z) - label * z)
        .sum();
    let ridge: f64 = theta.slice(s![1..]).iter().map(|w| w * w).sum();
    loss + 0.5 * penalty * ridge
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    let scale = a.iter().fold(0.0_f64, |max, value| max.max(value.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    let eps = scale * 1e-14;

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() <= eps {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}
