use egalitarian_solver::{SolutionStatus, Solver};
use log::{debug, warn};

use crate::allocation::Allocation;
use crate::error::{AllocationError, Result};
use crate::model::AllocationModel;
use crate::valuation::ValuationMatrix;

/// Computes max-min fair allocations by building and solving an LP per call
#[derive(Debug, Clone, Copy)]
pub struct EgalitarianAllocator {
    solver: Solver,
    /// Slack allowed when re-checking the solver's answer against the model
    verification_tolerance: f64,
}

impl Default for EgalitarianAllocator {
    fn default() -> Self {
        Self {
            solver: Solver::new(),
            verification_tolerance: 1e-6,
        }
    }
}

impl EgalitarianAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_verification_tolerance(mut self, tol: f64) -> Self {
        self.verification_tolerance = tol;
        self
    }

    /// Find the allocation that maximizes the smallest utility any player receives.
    ///
    /// Only optimal allocations are returned. Every well-formed matrix has one,
    /// so any other solver outcome is reported as an internal error.
    pub fn allocate(&self, valuations: &ValuationMatrix) -> Result<Allocation> {
        let model = AllocationModel::build(valuations);
        let solution = self.solver.solve(&model.lp_problem);

        match solution.status {
            SolutionStatus::Optimal => {}
            SolutionStatus::IterationLimit => {
                return Err(AllocationError::SolverTimeout {
                    iterations: solution.iterations,
                });
            }
            status => {
                let detail = match status {
                    SolutionStatus::Infeasible => "no allocation satisfies the constraints",
                    SolutionStatus::Unbounded => "the floor utility is unbounded",
                    _ => "the model could not be put in standard form",
                };
                warn!("Solver reported {} for {:?}", status, valuations.rows());
                return Err(AllocationError::SolverInternal {
                    status,
                    detail: detail.to_string(),
                });
            }
        }

        let violations = model
            .lp_problem
            .find_violations(&solution.values, self.verification_tolerance);
        if let Some(worst) = violations.first() {
            warn!("Solver returned a point violating {} constraints", violations.len());
            return Err(AllocationError::SolverInternal {
                status: solution.status,
                detail: worst.description.clone(),
            });
        }

        let allocation = Allocation::from_solution(&model, valuations, &solution.values);
        debug!(
            "Egalitarian floor {} reached after {} pivots",
            allocation.floor(),
            solution.iterations
        );
        Ok(allocation)
    }
}

/// Validate `valuations` and compute their egalitarian allocation with default settings
pub fn egalitarian_allocation(valuations: &[Vec<f64>]) -> Result<Allocation> {
    let matrix = ValuationMatrix::new(valuations.to_vec())?;
    EgalitarianAllocator::new().allocate(&matrix)
}
