use crate::solution::ConstraintViolation;

/// Represents a linear programming problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Bounds for each variable, `[0, +inf)` unless set otherwise
    pub bounds: Vec<VariableBounds>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

/// Closed interval a variable must lie in. `None` means unbounded on that side.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl VariableBounds {
    pub const NON_NEGATIVE: Self = Self { lower: Some(0.0), upper: None };
    pub const FREE: Self = Self { lower: None, upper: None };

    pub fn between(lower: f64, upper: f64) -> Self {
        Self { lower: Some(lower), upper: Some(upper) }
    }

    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        self.lower.is_none_or(|l| value >= l - tolerance) && self.upper.is_none_or(|u| value <= u + tolerance)
    }
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self::NON_NEGATIVE
    }
}

impl Constraint {
    /// Left-hand side value at `values`
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients.iter().zip(values).map(|(c, v)| c * v).sum()
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            bounds: vec![VariableBounds::default(); n],
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn set_bounds(&mut self, variable: usize, bounds: VariableBounds) {
        self.bounds[variable] = bounds;
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value at `values`
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.coefficients.iter().zip(values).map(|(c, v)| c * v).sum()
    }

    /// Find which constraints and bounds `values` violates by more than `tolerance`, worst first
    pub fn find_violations(&self, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        for c in &self.constraints {
            let lhs = c.evaluate(values);

            let violation = match c.op {
                ConstraintOp::Le if lhs > c.rhs + tolerance => {
                    let amt = lhs - c.rhs;
                    Some((amt, format!("{} exceeds maximum of {:.4} by {:.2e}", c.name, c.rhs, amt)))
                }
                ConstraintOp::Ge if lhs < c.rhs - tolerance => {
                    let amt = c.rhs - lhs;
                    Some((amt, format!("{} is below minimum of {:.4} by {:.2e}", c.name, c.rhs, amt)))
                }
                ConstraintOp::Eq if (lhs - c.rhs).abs() > tolerance => Some((
                    (lhs - c.rhs).abs(),
                    format!("{} requires exactly {:.4} but got {:.4}", c.name, c.rhs, lhs),
                )),
                _ => None,
            };

            if let Some((violation_amount, description)) = violation {
                violations.push(ConstraintViolation {
                    constraint: c.name.clone(),
                    required: c.rhs,
                    actual: lhs,
                    violation_amount,
                    description,
                });
            }
        }

        for ((name, bounds), &value) in self.variables.iter().zip(&self.bounds).zip(values) {
            if bounds.contains(value, tolerance) {
                continue;
            }
            let (required, violation_amount) = match (bounds.lower, bounds.upper) {
                (Some(l), _) if value < l => (l, l - value),
                (_, Some(u)) => (u, value - u),
                _ => continue,
            };
            violations.push(ConstraintViolation {
                constraint: name.clone(),
                required,
                actual: value,
                violation_amount,
                description: format!("{} = {} is outside its bounds", name, value),
            });
        }

        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));
        violations
    }

    /// Check that every vector has one entry per variable and all data is finite
    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.num_variables();
        if self.bounds.len() != n {
            return Err(ProblemError::LengthMismatch {
                what: "bounds".to_string(),
                expected: n,
                found: self.bounds.len(),
            });
        }
        if self.objective.coefficients.len() != n {
            return Err(ProblemError::LengthMismatch {
                what: "objective".to_string(),
                expected: n,
                found: self.objective.coefficients.len(),
            });
        }
        if self.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ProblemError::NonFinite("objective".to_string()));
        }
        for c in &self.constraints {
            if c.coefficients.len() != n {
                return Err(ProblemError::LengthMismatch {
                    what: c.name.clone(),
                    expected: n,
                    found: c.coefficients.len(),
                });
            }
            if !c.rhs.is_finite() || c.coefficients.iter().any(|x| !x.is_finite()) {
                return Err(ProblemError::NonFinite(c.name.clone()));
            }
        }
        for (name, b) in self.variables.iter().zip(&self.bounds) {
            let finite = b.lower.is_none_or(f64::is_finite) && b.upper.is_none_or(f64::is_finite);
            if !finite {
                return Err(ProblemError::NonFinite(name.clone()));
            }
            if let (Some(l), Some(u)) = (b.lower, b.upper) {
                if l > u {
                    return Err(ProblemError::InvertedBounds {
                        variable: name.clone(),
                        lower: l,
                        upper: u,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Structural defects that prevent a problem from being solved at all
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("{what} has {found} coefficients, expected {expected}")]
    LengthMismatch { what: String, expected: usize, found: usize },
    #[error("Non-finite value in {0}")]
    NonFinite(String),
    #[error("Variable {variable} has lower bound {lower} above upper bound {upper}")]
    InvertedBounds { variable: String, lower: f64, upper: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_problem_defaults() {
        let problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(problem.num_variables(), 2);
        assert_eq!(problem.num_constraints(), 0);
        assert_eq!(problem.bounds, vec![VariableBounds::NON_NEGATIVE; 2]);
        assert!(problem.objective.minimize);
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_constraint() {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.add_constraint("short", vec![1.0], ConstraintOp::Le, 1.0);
        assert_eq!(
            problem.validate(),
            Err(ProblemError::LengthMismatch {
                what: "short".to_string(),
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_bounds(0, VariableBounds::between(2.0, 1.0));
        assert!(matches!(problem.validate(), Err(ProblemError::InvertedBounds { .. })));
    }

    #[test]
    fn test_validate_rejects_nan_rhs() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.add_constraint("nan", vec![1.0], ConstraintOp::Eq, f64::NAN);
        assert_eq!(problem.validate(), Err(ProblemError::NonFinite("nan".to_string())));
    }

    #[test]
    fn test_bounds_contains() {
        let unit = VariableBounds::between(0.0, 1.0);
        assert!(unit.contains(0.0, 1e-9));
        assert!(unit.contains(1.0 + 1e-10, 1e-9));
        assert!(!unit.contains(-0.1, 1e-9));
        assert!(VariableBounds::FREE.contains(-1e9, 0.0));
    }

    #[test]
    fn test_find_violations_reports_worst_first() {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_bounds(0, VariableBounds::between(0.0, 1.0));
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Eq, 1.0);
        problem.add_constraint("y_min", vec![0.0, 1.0], ConstraintOp::Ge, 0.5);

        assert!(problem.find_violations(&[0.5, 0.5], 1e-9).is_empty());

        let violations = problem.find_violations(&[1.5, 0.25], 1e-9);
        let names: Vec<&str> = violations.iter().map(|v| v.constraint.as_str()).collect();
        assert_eq!(names, vec!["sum", "x", "y_min"]);
        assert!((violations[0].violation_amount - 0.75).abs() < 1e-12);
        assert!((violations[1].violation_amount - 0.5).abs() < 1e-12);
    }
}
