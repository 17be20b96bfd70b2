use std::path::PathBuf;

use grb::{attr, c, expr::LinExpr as GrbLinExpr, Expr, ModelSense, Var, VarType};
use log::{info, warn};
use typed_index_collections::TiVec;

use super::{Solution, SolveOutcome, Solver};
use crate::models::collection::Model;
use crate::models::expr::{LinExpr, Sense, VarId};

/// Solves with a local Gurobi installation.
pub struct Gurobi {
    /// Where to write the solution file after a successful solve
    solution_path: Option<PathBuf>,
}

impl Gurobi {
    pub fn new(solution_path: Option<PathBuf>) -> Gurobi {
        Gurobi { solution_path }
    }

    fn lower(expr: &LinExpr, vars: &TiVec<VarId, Var>) -> Expr {
        let mut out = GrbLinExpr::new();
        for (var, coeff) in expr.terms() {
            out.add_term(coeff, vars[var]);
        }
        out.add_constant(expr.constant());
        Expr::from(out)
    }

    /// Transfers variables, objective and constraints into a Gurobi model.
    pub fn build(model: &Model) -> grb::Result<(grb::Model, TiVec<VarId, Var>)> {
        let mut grb_model = grb::Model::new(model.name())?;

        let mut vars: TiVec<VarId, Var> = TiVec::new();
        for var in model.vars().iter() {
            vars.push(grb_model.add_var(
                &var.name(),
                VarType::Integer,
                0.0,
                0.0,
                f64::INFINITY,
                std::iter::empty(),
            )?);
        }

        // itegrate all the variables into the model
        grb_model.update()?;

        for constr in model.constraints() {
            let lhs = Self::lower(&constr.expr, &vars);
            let rhs = constr.rhs;
            let ineq = match constr.sense {
                Sense::Le => c!(lhs <= rhs),
                Sense::Ge => c!(lhs >= rhs),
                Sense::Eq => c!(lhs == rhs),
            };
            grb_model.add_constr(&constr.name, ineq)?;
        }

        grb_model.set_objective(Self::lower(model.objective(), &vars), ModelSense::Minimize)?;
        grb_model.update()?;

        Ok((grb_model, vars))
    }
}

impl Solver for Gurobi {
    type Error = grb::Error;

    fn solve(&mut self, model: &Model) -> grb::Result<SolveOutcome> {
        let (mut grb_model, vars) = Self::build(model)?;

        grb_model.optimize()?;

        let status = grb_model.status()?;
        let solution_count = grb_model.get_attr(attr::SolCount)?;
        if solution_count <= 0 {
            warn!("Gurobi found no solution, status {:?}", status);
            return Ok(SolveOutcome::NoSolution {
                status: format!("{:?}", status),
            });
        }

        let mut values: TiVec<VarId, f64> = TiVec::new();
        for var in vars.iter() {
            values.push(grb_model.get_obj_attr(attr::X, var)?);
        }
        let objective = grb_model.get_attr(attr::ObjVal)?;

        if let Some(path) = &self.solution_path {
            grb_model.write(&path.to_string_lossy())?;
            info!("Wrote solution to {}", path.display());
        }

        Ok(SolveOutcome::Solved(Solution {
            solution_count: solution_count as usize,
            values,
            objective,
        }))
    }
}
