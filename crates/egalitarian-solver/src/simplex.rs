use log::{debug, trace, warn};

use crate::problem::{ConstraintOp, LpProblem};
use crate::solution::{Solution, SolutionStatus};

/// Consecutive zero-step pivots tolerated before switching to Bland's rule
const DEGENERATE_PIVOT_LIMIT: usize = 50;

/// Simplex solver for linear programming problems
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for pivot selection and optimality
    tolerance: f64,
    /// Tolerance on the phase 1 objective, relative to the largest right-hand side
    feasibility_tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            feasibility_tolerance: 1e-8,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Self {
        self.feasibility_tolerance = tol;
        self
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        if let Err(e) = problem.validate() {
            warn!("Rejecting LP problem: {}", e);
            return Solution::numerical_error();
        }

        let form = StandardForm::from_problem(problem);
        let mut tableau = self.build_tableau(&form);
        debug!(
            "Solving LP with {} variables, {} constraints ({} rows x {} columns in standard form)",
            problem.num_variables(),
            problem.num_constraints(),
            tableau.n_rows(),
            tableau.n_cols(),
        );

        let mut iterations = 0;

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut iterations) {
                PhaseOne::Feasible => {}
                PhaseOne::Infeasible => return Solution::infeasible(iterations),
                PhaseOne::IterationLimit => {
                    warn!("Phase 1 hit the iteration limit of {}", self.max_iterations);
                    return Solution::iteration_limit(iterations);
                }
            }
        }

        // Phase 2: Optimize, never letting an artificial back into the basis
        self.load_objective(&mut tableau, &form.objective);
        let column_limit = tableau.artificial_start();
        match self.run_simplex(&mut tableau, column_limit, &mut iterations) {
            SimplexResult::Optimal => {}
            SimplexResult::Unbounded => return Solution::unbounded(iterations),
            SimplexResult::IterationLimit => {
                warn!("Phase 2 hit the iteration limit of {}", self.max_iterations);
                return Solution::iteration_limit(iterations);
            }
        }

        let solution = self.extract_solution(&tableau, &form, problem, iterations);
        debug!(
            "Optimal objective {} after {} pivots",
            solution.objective_value, solution.iterations
        );
        solution
    }

    fn build_tableau(&self, form: &StandardForm) -> Tableau {
        let n_vars = form.n_structural;
        let n_constraints = form.rows.len();

        // Right-hand sides must be non-negative, so flip rows that aren't
        let rows: Vec<(Vec<f64>, ConstraintOp, f64)> = form
            .rows
            .iter()
            .map(|r| {
                if r.rhs < 0.0 {
                    let op = match r.op {
                        ConstraintOp::Le => ConstraintOp::Ge,
                        ConstraintOp::Ge => ConstraintOp::Le,
                        ConstraintOp::Eq => ConstraintOp::Eq,
                    };
                    (r.coefficients.iter().map(|c| -c).collect(), op, -r.rhs)
                } else {
                    (r.coefficients.clone(), r.op, r.rhs)
                }
            })
            .collect();

        // Count slack and artificial variables needed
        let mut n_slack = 0;
        let mut n_artificial = 0;

        for (_, op, _) in &rows {
            match op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS
        let total_rows = n_constraints + 1; // +1 for objective

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; total_rows],
            basic_vars: vec![0; n_constraints],
            n_structural: n_vars,
            n_slack,
            n_artificial,
        };

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;

        for (i, (coefficients, op, rhs)) in rows.into_iter().enumerate() {
            tableau.data[i][..n_vars].copy_from_slice(&coefficients);
            tableau.data[i][total_cols - 1] = rhs;

            match op {
                ConstraintOp::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    tableau.basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    tableau.data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        tableau
    }

    fn phase1(&self, tableau: &mut Tableau, iterations: &mut usize) -> PhaseOne {
        // Maximize -sum(artificials), i.e. minimize the total infeasibility
        let obj_row = tableau.obj_row();
        let n_cols = tableau.n_cols();
        let art_start = tableau.artificial_start();

        tableau.data[obj_row].fill(0.0);
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[obj_row][j] = -1.0;
        }

        // Price out the artificials that start in the basis
        for i in 0..obj_row {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] += tableau.data[i][j];
                }
            }
        }

        match self.run_simplex(tableau, n_cols - 1, iterations) {
            SimplexResult::Optimal => {}
            // Phase 1 is bounded below by zero; running off means the data is degenerate
            SimplexResult::Unbounded => return PhaseOne::Infeasible,
            SimplexResult::IterationLimit => return PhaseOne::IterationLimit,
        }

        let rhs_col = tableau.rhs_col();
        let infeasibility: f64 = (0..obj_row)
            .filter(|&i| tableau.basic_vars[i] >= art_start)
            .map(|i| tableau.data[i][rhs_col])
            .sum();
        let scale = 1.0 + (0..obj_row).map(|i| tableau.data[i][rhs_col].abs()).fold(0.0, f64::max);
        if infeasibility > self.feasibility_tolerance * scale {
            debug!("Phase 1 ended with infeasibility {}", infeasibility);
            return PhaseOne::Infeasible;
        }

        self.drive_out_artificials(tableau);
        debug!("Phase 1 found a feasible basis after {} pivots", iterations);
        PhaseOne::Feasible
    }

    /// Replace artificials still basic at level zero with a real column where possible.
    /// Rows with no usable column are redundant and stay inert.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let art_start = tableau.artificial_start();
        let rhs_col = tableau.rhs_col();

        for i in 0..tableau.basic_vars.len() {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            let mut best: Option<(usize, f64)> = None;
            for j in 0..art_start {
                let magnitude = tableau.data[i][j].abs();
                if magnitude > self.tolerance && best.is_none_or(|(_, m)| magnitude > m) {
                    best = Some((j, magnitude));
                }
            }
            match best {
                Some((col, _)) => {
                    tableau.data[i][rhs_col] = 0.0;
                    self.pivot(tableau, i, col);
                }
                None => trace!("Row {} is redundant", i),
            }
        }
    }

    /// Install the phase 2 objective and price out the current basis
    fn load_objective(&self, tableau: &mut Tableau, objective: &[f64]) {
        let obj_row = tableau.obj_row();
        let n_cols = tableau.n_cols();

        tableau.data[obj_row].fill(0.0);
        tableau.data[obj_row][..objective.len()].copy_from_slice(objective);

        for i in 0..obj_row {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[obj_row][basic];
            if ratio != 0.0 {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] -= ratio * tableau.data[i][j];
                }
            }
        }
    }

    /// Pivot until no column below `column_limit` can improve the objective row
    fn run_simplex(&self, tableau: &mut Tableau, column_limit: usize, iterations: &mut usize) -> SimplexResult {
        let mut rule = PivotRule::Dantzig;
        let mut degenerate_run = 0;

        for _ in 0..self.max_iterations {
            let Some(pivot_col) = self.find_pivot_column(tableau, column_limit, rule) else {
                return SimplexResult::Optimal;
            };
            let Some((pivot_row, ratio)) = self.find_pivot_row(tableau, pivot_col) else {
                return SimplexResult::Unbounded;
            };

            if ratio <= self.tolerance {
                degenerate_run += 1;
                if rule == PivotRule::Dantzig && degenerate_run > DEGENERATE_PIVOT_LIMIT {
                    debug!("{} degenerate pivots in a row, switching to Bland's rule", degenerate_run);
                    rule = PivotRule::Bland;
                }
            } else {
                degenerate_run = 0;
            }

            trace!("Pivot on row {} column {} (step {})", pivot_row, pivot_col, ratio);
            self.pivot(tableau, pivot_row, pivot_col);
            *iterations += 1;
        }

        if self.find_pivot_column(tableau, column_limit, rule).is_none() {
            SimplexResult::Optimal
        } else {
            SimplexResult::IterationLimit
        }
    }

    fn find_pivot_column(&self, tableau: &Tableau, column_limit: usize, rule: PivotRule) -> Option<usize> {
        let obj_row = tableau.obj_row();
        let reduced_costs = &tableau.data[obj_row][..column_limit];

        match rule {
            // Most positive reduced cost
            PivotRule::Dantzig => {
                let mut max_val = self.tolerance;
                let mut max_col = None;
                for (j, &val) in reduced_costs.iter().enumerate() {
                    if val > max_val {
                        max_val = val;
                        max_col = Some(j);
                    }
                }
                max_col
            }
            // First improving column
            PivotRule::Bland => reduced_costs.iter().position(|&val| val > self.tolerance),
        }
    }

    /// Minimum ratio test; ties go to the row whose basic variable has the smallest index
    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<(usize, f64)> {
        let rhs_col = tableau.rhs_col();

        let mut best: Option<(usize, f64)> = None;

        for i in 0..tableau.obj_row() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col].max(0.0) / val;
            best = match best {
                None => Some((i, ratio)),
                Some((row, min_ratio)) => {
                    if ratio < min_ratio - self.tolerance
                        || (ratio <= min_ratio + self.tolerance && tableau.basic_vars[i] < tableau.basic_vars[row])
                    {
                        Some((i, ratio))
                    } else {
                        Some((row, min_ratio))
                    }
                }
            };
        }

        best
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_rows = tableau.data.len();
        let n_cols = tableau.n_cols();

        tableau.basic_vars[row] = col;

        // Scale pivot row
        let pivot_val = tableau.data[row][col];
        for j in 0..n_cols {
            tableau.data[row][j] /= pivot_val;
        }

        // Eliminate column in other rows
        for i in 0..n_rows {
            if i != row {
                let factor = tableau.data[i][col];
                if factor != 0.0 {
                    for j in 0..n_cols {
                        tableau.data[i][j] -= factor * tableau.data[row][j];
                    }
                }
            }
        }
    }

    fn extract_solution(&self, tableau: &Tableau, form: &StandardForm, problem: &LpProblem, iterations: usize) -> Solution {
        let rhs_col = tableau.rhs_col();

        let mut structural = vec![0.0; tableau.n_structural];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < tableau.n_structural {
                structural[basic] = tableau.data[i][rhs_col].max(0.0);
            }
        }

        let values: Vec<f64> = form.columns.iter().map(|c| c.value(&structural)).collect();
        let objective_value = problem.objective_value(&values);

        Solution {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            iterations,
        }
    }
}

/// How an original variable is expressed with non-negative tableau columns
#[derive(Debug, Clone, Copy)]
enum Column {
    /// x = offset + col
    Shifted { col: usize, offset: f64 },
    /// x = offset - col
    Mirrored { col: usize, offset: f64 },
    /// x = pos - neg
    Split { pos: usize, neg: usize },
}

impl Column {
    fn value(&self, structural: &[f64]) -> f64 {
        match *self {
            Column::Shifted { col, offset } => offset + structural[col],
            Column::Mirrored { col, offset } => offset - structural[col],
            Column::Split { pos, neg } => structural[pos] - structural[neg],
        }
    }

    /// Add `coef * x` to a row over structural columns, returning the constant it contributes
    fn accumulate(&self, row: &mut [f64], coef: f64) -> f64 {
        match *self {
            Column::Shifted { col, offset } => {
                row[col] += coef;
                coef * offset
            }
            Column::Mirrored { col, offset } => {
                row[col] -= coef;
                coef * offset
            }
            Column::Split { pos, neg } => {
                row[pos] += coef;
                row[neg] -= coef;
                0.0
            }
        }
    }
}

struct StandardRow {
    coefficients: Vec<f64>,
    op: ConstraintOp,
    rhs: f64,
}

/// The problem rewritten over non-negative columns with a maximization objective
struct StandardForm {
    columns: Vec<Column>,
    n_structural: usize,
    rows: Vec<StandardRow>,
    objective: Vec<f64>,
}

impl StandardForm {
    fn from_problem(problem: &LpProblem) -> Self {
        let mut columns = Vec::with_capacity(problem.num_variables());
        let mut n_structural = 0;
        let mut upper_limits = Vec::new();

        for bounds in &problem.bounds {
            let column = match (bounds.lower, bounds.upper) {
                (Some(lower), upper) => {
                    let col = n_structural;
                    n_structural += 1;
                    if let Some(upper) = upper {
                        upper_limits.push((col, upper - lower));
                    }
                    Column::Shifted { col, offset: lower }
                }
                (None, Some(upper)) => {
                    let col = n_structural;
                    n_structural += 1;
                    Column::Mirrored { col, offset: upper }
                }
                (None, None) => {
                    let pos = n_structural;
                    n_structural += 2;
                    Column::Split { pos, neg: pos + 1 }
                }
            };
            columns.push(column);
        }

        let mut rows = Vec::with_capacity(problem.num_constraints() + upper_limits.len());
        for c in &problem.constraints {
            let mut coefficients = vec![0.0; n_structural];
            let mut rhs = c.rhs;
            for (column, &coef) in columns.iter().zip(&c.coefficients) {
                rhs -= column.accumulate(&mut coefficients, coef);
            }
            rows.push(StandardRow { coefficients, op: c.op, rhs });
        }
        for (col, limit) in upper_limits {
            let mut coefficients = vec![0.0; n_structural];
            coefficients[col] = 1.0;
            rows.push(StandardRow {
                coefficients,
                op: ConstraintOp::Le,
                rhs: limit,
            });
        }

        // Simplex maximizes, so minimization negates the costs
        let sign = if problem.objective.minimize { -1.0 } else { 1.0 };
        let mut objective = vec![0.0; n_structural];
        for (column, &coef) in columns.iter().zip(&problem.objective.coefficients) {
            column.accumulate(&mut objective, sign * coef);
        }

        Self {
            columns,
            n_structural,
            rows,
            objective,
        }
    }
}

struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_structural: usize,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn n_rows(&self) -> usize {
        self.data.len()
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    fn rhs_col(&self) -> usize {
        self.n_cols() - 1
    }

    fn artificial_start(&self) -> usize {
        self.n_structural + self.n_slack
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PivotRule {
    Dantzig,
    Bland,
}

enum SimplexResult {
    Optimal,
    Unbounded,
    IterationLimit,
}

enum PhaseOne {
    Feasible,
    Infeasible,
    IterationLimit,
}
