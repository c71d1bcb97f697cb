use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    constraint, default_solver, variable,
};
use log::trace;
use std::collections::HashMap;

/// Caller-tunable knobs for a single solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveOptions {
    /// Wall-clock limit in seconds; `None` lets the solver run to proof.
    pub time_limit: Option<f64>,
}

/// Terminal outcome classes reported after a solve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven best solution under the objective.
    Optimal,
    /// A solution exists but optimality was not proven.
    Feasible,
    /// Proven to have no solution.
    Infeasible,
    /// The solver stopped without proving anything, e.g. on a time limit.
    Unknown,
    /// The backend itself misbehaved.
    Error,
}

/// Variable values pulled out of a completed solve.
#[derive(Debug, Clone)]
pub struct Valuation {
    values: HashMap<Variable, f64>,
}

impl Valuation {
    /// Whether a 0/1 variable came back as 1. Backends report binaries as
    /// floats near their integer value, so anything above 0.9 counts.
    pub fn is_true(&self, var: Variable) -> bool {
        self.values.get(&var).copied().unwrap_or(0.0) > 0.9
    }
}

/// What one solve attempt produced.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub message: Option<String>,
    pub valuation: Option<Valuation>,
}

impl SolveOutcome {
    /// True when the outcome carries usable variable values.
    pub fn is_solved(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Incrementally collected 0/1 model, handed to HiGHS in one shot.
///
/// good_lp wants the objective fixed before any constraint is attached,
/// so constraints are buffered here and replayed inside
/// [`BoolModel::solve`].
pub struct BoolModel {
    vars: ProblemVariables,
    declared: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Expression,
    minimize: bool,
    time_limit: Option<f64>,
}

impl BoolModel {
    pub fn new() -> Self {
        Self {
            vars: ProblemVariables::new(),
            declared: Vec::new(),
            constraints: Vec::new(),
            // zero objective makes a plain solve a pure feasibility check
            objective: 0.into(),
            minimize: true,
            time_limit: None,
        }
    }

    /// Declares a fresh 0/1 decision variable.
    pub fn bool_var(&mut self) -> Variable {
        let var = self.vars.add(variable().binary());
        self.declared.push(var);
        var
    }

    pub fn var_count(&self) -> usize {
        self.declared.len()
    }

    /// Constrains `terms` to sum to exactly `value`.
    pub fn add_eq(&mut self, terms: Expression, value: f64) {
        self.constraints.push(constraint!(terms == value));
    }

    /// Constrains `terms` to sum to at most `value`.
    pub fn add_le(&mut self, terms: Expression, value: f64) {
        self.constraints.push(constraint!(terms <= value));
    }

    /// Ties `indicator` to whether `load` is nonzero, in both directions:
    /// the indicator can neither be dropped while the load is active nor
    /// raised while the load is empty, whatever the objective rewards.
    /// `cap` must bound `load` from above (the number of summed variables).
    pub fn reify_nonzero(&mut self, indicator: Variable, load: Expression, cap: usize) {
        // indicator = 1 forces load >= 1; load = 0 forces indicator = 0
        let lower = load.clone() - indicator;
        self.constraints.push(constraint!(lower >= 0));
        // load >= 1 forces indicator = 1; indicator = 0 forces load = 0
        let upper = load - cap as f64 * indicator;
        self.constraints.push(constraint!(upper <= 0));
    }

    /// Ties `indicator` to the conjunction of two 0/1-valued expressions,
    /// in both directions.
    pub fn reify_and(&mut self, indicator: Variable, left: Expression, right: Expression) {
        // left = right = 1 forces indicator = 1
        let both = left.clone() + right.clone() - indicator;
        self.constraints.push(constraint!(both <= 1));
        // indicator = 1 forces left = 1, and symmetrically for right
        let left_bound = left - indicator;
        self.constraints.push(constraint!(left_bound >= 0));
        let right_bound = right - indicator;
        self.constraints.push(constraint!(right_bound >= 0));
    }

    /// Replaces the zero objective with something to minimize.
    pub fn minimize(&mut self, objective: Expression) {
        self.objective = objective;
        self.minimize = true;
    }

    /// Replaces the zero objective with something to maximize.
    pub fn maximize(&mut self, objective: Expression) {
        self.objective = objective;
        self.minimize = false;
    }

    pub fn set_time_limit(&mut self, seconds: f64) {
        self.time_limit = Some(seconds);
    }

    /// Hands the collected model to the backend and classifies the result.
    pub fn solve(self) -> SolveOutcome {
        let Self {
            vars,
            declared,
            constraints,
            objective,
            minimize,
            time_limit,
        } = self;
        trace!(
            "Solving 0/1 model with {} variables and {} constraints.",
            declared.len(),
            constraints.len()
        );

        let unsolved = if minimize {
            vars.minimise(objective)
        } else {
            vars.maximise(objective)
        };
        let mut model = unsolved
            .using(default_solver)
            .set_option("threads", 1) // limit to 1 thread for reproducibility
            .set_option("random_seed", 1234) //set seed for reproducibility
            .set_option("log_to_console", "false");
        if let Some(seconds) = time_limit {
            model = model.set_option("time_limit", seconds);
        }
        for constraint in constraints {
            model.add_constraint(constraint);
        }

        match model.solve() {
            Ok(solution) => {
                let values = declared
                    .iter()
                    .map(|&var| (var, solution.value(var)))
                    .collect();
                SolveOutcome {
                    status: SolveStatus::Optimal,
                    message: None,
                    valuation: Some(Valuation { values }),
                }
            }
            Err(ResolutionError::Infeasible) => SolveOutcome {
                status: SolveStatus::Infeasible,
                message: None,
                valuation: None,
            },
            // a pure 0/1 model has a bounded objective, so this is a backend fault
            Err(ResolutionError::Unbounded) => SolveOutcome {
                status: SolveStatus::Error,
                message: Some("solver reported an unbounded model".to_string()),
                valuation: None,
            },
            Err(other) => SolveOutcome {
                status: SolveStatus::Unknown,
                message: Some(other.to_string()),
                valuation: None,
            },
        }
    }
}

impl Default for BoolModel {
    fn default() -> Self {
        Self::new()
    }
}
