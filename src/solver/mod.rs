#[cfg(feature = "gurobi")]
pub mod gurobi;

use typed_index_collections::TiVec;

use crate::models::collection::Model;
use crate::models::expr::VarId;

/// An external MILP solver. The model is handed over as is; time limits,
/// retries and partial results are the solver's business.
pub trait Solver {
    type Error: std::error::Error;

    fn solve(&mut self, model: &Model) -> Result<SolveOutcome, Self::Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// At least one feasible solution was found
    Solved(Solution),
    /// The solve finished without any solution, e.g. because the model is
    /// infeasible or unbounded. `status` is the solver's own description.
    NoSolution { status: String },
}

impl SolveOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Solved(solution) => Some(solution),
            SolveOutcome::NoSolution { .. } => None,
        }
    }

    pub fn solution_count(&self) -> usize {
        self.solution().map_or(0, |s| s.solution_count)
    }
}

/// The best solution reported by a solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Number of solutions the solver found
    pub solution_count: usize,
    /// One value per variable of the model
    pub values: TiVec<VarId, f64>,
    /// Objective value of `values`
    pub objective: f64,
}

impl Solution {
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var]
    }

    /// Named variables with a non-zero value, in declaration order.
    pub fn nonzero<'a>(&'a self, model: &'a Model) -> impl Iterator<Item = (String, f64)> + 'a {
        model
            .vars()
            .iter()
            .zip(self.values.iter())
            .filter(|(_, value)| **value != 0.0)
            .map(|(var, value)| (var.name(), *value))
    }

    /// Human readable listing: solution count, non-zero variables, objective.
    pub fn report(&self, model: &Model) -> String {
        let mut out = format!("Number of solutions: {}\n", self.solution_count);
        out.push_str(&format!("{:<20} {:>12}\n", "Variable", "X"));
        for (name, value) in self.nonzero(model) {
            out.push_str(&format!("{:<20} {:>12}\n", name, value));
        }
        out.push_str(&format!("Optimal value: {}\n", self.objective));
        out
    }
}
