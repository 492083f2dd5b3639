use egalitarian_solver::{ConstraintOp, LpProblem, VariableBounds};
use log::debug;

use crate::valuation::ValuationMatrix;

/// LP formulation of the max-min allocation for one valuation matrix.
///
/// Columns `0..P*R` hold the allocation fractions laid out by resource, then
/// player (`resource * P + player`). The last column is the floor variable,
/// the utility every player is guaranteed.
///
/// Utility rows are divided by `scale`, the largest valuation, so the solver
/// always sees coefficients in `[0, 1]`. The floor column is in those units.
#[derive(Debug, Clone)]
pub struct AllocationModel {
    pub num_players: usize,
    pub num_resources: usize,
    pub scale: f64,
    pub lp_problem: LpProblem,
}

impl AllocationModel {
    pub fn build(valuations: &ValuationMatrix) -> Self {
        let num_players = valuations.num_players();
        let num_resources = valuations.num_resources();

        let mut names = Vec::with_capacity(num_players * num_resources + 1);
        for resource in 0..num_resources {
            for player in 0..num_players {
                names.push(format!("x_r{}_p{}", resource, player));
            }
        }
        names.push("floor".to_string());

        let largest = valuations.rows().iter().flatten().copied().fold(0.0, f64::max);
        let scale = if largest > 0.0 { largest } else { 1.0 };

        let mut model = Self {
            num_players,
            num_resources,
            scale,
            lp_problem: LpProblem::new(names),
        };
        let n = model.num_columns();
        let floor = model.floor_index();

        // Fractions live in [0, 1]; the floor may take any sign
        for resource in 0..num_resources {
            for player in 0..num_players {
                let idx = model.variable_index(resource, player);
                model.lp_problem.set_bounds(idx, VariableBounds::between(0.0, 1.0));
            }
        }
        model.lp_problem.set_bounds(floor, VariableBounds::FREE);

        // Each resource is handed out completely
        for resource in 0..num_resources {
            let mut coeffs = vec![0.0; n];
            for player in 0..num_players {
                coeffs[model.variable_index(resource, player)] = 1.0;
            }
            model
                .lp_problem
                .add_constraint(format!("resource_{}_allocated", resource), coeffs, ConstraintOp::Eq, 1.0);
        }

        // utility(player) - floor >= 0
        for player in 0..num_players {
            let mut coeffs = model.utility_coefficients(valuations, player);
            coeffs[floor] = -1.0;
            model
                .lp_problem
                .add_constraint(format!("player_{}_utility", player), coeffs, ConstraintOp::Ge, 0.0);
        }

        let mut objective = vec![0.0; n];
        objective[floor] = 1.0;
        model.lp_problem.set_objective(objective, false);

        debug!(
            "Built allocation model for {} players and {} resources ({} variables, {} constraints, scale {})",
            num_players,
            num_resources,
            n,
            model.lp_problem.num_constraints(),
            scale
        );
        model
    }

    /// Column holding the fraction of `resource` given to `player`
    pub fn variable_index(&self, resource: usize, player: usize) -> usize {
        resource * self.num_players + player
    }

    pub fn floor_index(&self) -> usize {
        self.num_players * self.num_resources
    }

    pub fn num_columns(&self) -> usize {
        self.floor_index() + 1
    }

    /// Coefficients of `player`'s utility over all model columns, divided by `scale`
    pub fn utility_coefficients(&self, valuations: &ValuationMatrix, player: usize) -> Vec<f64> {
        let mut coeffs = vec![0.0; self.num_columns()];
        for (resource, &value) in valuations.player(player).iter().enumerate() {
            coeffs[self.variable_index(resource, player)] = value / self.scale;
        }
        coeffs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ValuationMatrix {
        ValuationMatrix::new(vec![vec![1.0, 19.0, 80.0], vec![20.0, 1.0, 79.0]]).unwrap()
    }

    #[test]
    fn test_model_shape() {
        let model = AllocationModel::build(&sample());
        let lp = &model.lp_problem;

        assert_eq!(lp.num_variables(), 7);
        // 3 resource equalities + 2 utility rows
        assert_eq!(lp.num_constraints(), 5);
        assert_eq!(lp.variables[model.variable_index(2, 1)], "x_r2_p1");
        assert_eq!(lp.variables[model.floor_index()], "floor");
        assert!(lp.validate().is_ok());
    }

    #[test]
    fn test_bounds_and_objective() {
        let model = AllocationModel::build(&sample());
        let lp = &model.lp_problem;

        for idx in 0..model.floor_index() {
            assert_eq!(lp.bounds[idx], VariableBounds::between(0.0, 1.0));
        }
        assert_eq!(lp.bounds[model.floor_index()], VariableBounds::FREE);
        assert!(!lp.objective.minimize);
        assert_eq!(lp.objective.coefficients, vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_resource_rows() {
        let model = AllocationModel::build(&sample());
        let row = &model.lp_problem.constraints[1];

        assert_eq!(row.name, "resource_1_allocated");
        assert_eq!(row.op, ConstraintOp::Eq);
        assert_eq!(row.rhs, 1.0);
        assert_eq!(row.coefficients, vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_utility_rows() {
        let model = AllocationModel::build(&sample());
        let row = &model.lp_problem.constraints[4];

        assert_eq!(row.name, "player_1_utility");
        assert_eq!(row.op, ConstraintOp::Ge);
        assert_eq!(row.rhs, 0.0);
        assert_eq!(model.scale, 80.0);
        assert_eq!(
            row.coefficients,
            vec![0.0, 20.0 / 80.0, 0.0, 1.0 / 80.0, 0.0, 79.0 / 80.0, -1.0]
        );
    }

    #[test]
    fn test_tiny_and_huge_valuations_share_coefficients() {
        let rows = sample().rows().to_vec();
        let base = AllocationModel::build(&sample());

        for factor in [1e-10, 1e12] {
            let scaled = ValuationMatrix::new(
                rows.iter().map(|r| r.iter().map(|v| v * factor).collect()).collect(),
            )
            .unwrap();
            let model = AllocationModel::build(&scaled);

            assert!((model.scale - 80.0 * factor).abs() <= 80.0 * factor * 1e-12);
            for (a, b) in model.lp_problem.constraints.iter().zip(&base.lp_problem.constraints) {
                for (x, y) in a.coefficients.iter().zip(&b.coefficients) {
                    assert!((x - y).abs() < 1e-12, "{} != {} at factor {}", x, y, factor);
                }
            }
        }
    }

    #[test]
    fn test_all_zero_matrix_keeps_unit_scale() {
        let zeros = ValuationMatrix::new(vec![vec![0.0, 0.0], vec![0.0, 0.0]]).unwrap();
        assert_eq!(AllocationModel::build(&zeros).scale, 1.0);
    }

    #[test]
    fn test_input_is_untouched() {
        let valuations = sample();
        let before = valuations.clone();
        let _ = AllocationModel::build(&valuations);
        assert_eq!(valuations, before);
    }
}
