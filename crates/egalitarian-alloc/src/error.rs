use egalitarian_solver::SolutionStatus;
use thiserror::Error;

/// Problems with the valuation matrix, detected before any model is built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedInputError {
    #[error("At least one player is required")]
    NoPlayers,
    #[error("At least one resource is required")]
    NoResources,
    #[error("Player {player} values {found} resources, expected {expected}")]
    RaggedRow {
        player: usize,
        expected: usize,
        found: usize,
    },
    #[error("Player {player} has negative valuation {value} for resource {resource}")]
    NegativeValuation {
        player: usize,
        resource: usize,
        value: f64,
    },
    #[error("Player {player} has a non-finite valuation for resource {resource}")]
    NonFiniteValuation { player: usize, resource: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("Malformed valuations: {0}")]
    MalformedInput(#[from] MalformedInputError),
    /// The solver failed on a model that is always feasible and bounded
    #[error("Solver failed on a well-formed model ({status}): {detail}")]
    SolverInternal { status: SolutionStatus, detail: String },
    #[error("Solver gave up after {iterations} pivots without proving optimality")]
    SolverTimeout { iterations: usize },
}

/// Result type alias for allocation operations
pub type Result<T> = std::result::Result<T, AllocationError>;
