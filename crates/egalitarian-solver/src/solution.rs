use std::fmt;

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Optimal values for each variable (empty unless optimal)
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Pivots performed across both phases
    pub iterations: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The pivot cap was reached before optimality was proven
    IterationLimit,
    /// The problem data could not be put in standard form
    NumericalError,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::IterationLimit => "iteration limit reached",
            SolutionStatus::NumericalError => "numerical error",
        };
        f.write_str(s)
    }
}

/// Information about a violated constraint or bound
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct ConstraintViolation {
    /// Constraint or variable name
    pub constraint: String,
    /// Required value (from constraint RHS or bound)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
    /// Human-readable description of what's wrong
    pub description: String,
}

impl Solution {
    fn without_values(status: SolutionStatus, objective_value: f64, iterations: usize) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value,
            iterations,
        }
    }

    pub fn infeasible(iterations: usize) -> Self {
        Self::without_values(SolutionStatus::Infeasible, f64::NAN, iterations)
    }

    pub fn unbounded(iterations: usize) -> Self {
        Self::without_values(SolutionStatus::Unbounded, f64::NAN, iterations)
    }

    pub fn iteration_limit(iterations: usize) -> Self {
        Self::without_values(SolutionStatus::IterationLimit, f64::NAN, iterations)
    }

    pub fn numerical_error() -> Self {
        Self::without_values(SolutionStatus::NumericalError, f64::NAN, 0)
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
