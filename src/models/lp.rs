use std::{
    fs,
    io::{self, ErrorKind, Write},
    path::Path,
};

use log::{info, warn};

use super::collection::Model;
use super::expr::LinExpr;

/// Slack allowed when deciding whether a row without variables holds.
pub const TOLERANCE: f64 = 1e-9;

/// Writes the model in CPLEX LP format.
///
/// Every variable is listed under `Generals` with the default bounds of the
/// format, `[0, +inf)`. Rows without variables cannot be expressed in LP
/// format: those that hold are written as comments, and a model with one that
/// does not is infeasible and is refused with [`ErrorKind::InvalidData`]
/// before anything is written.
pub fn write_lp(model: &Model, out: &mut impl Write) -> io::Result<()> {
    check_constant_rows(model)?;

    writeln!(out, "\\ Model {}", model.name())?;
    writeln!(out, "Minimize")?;
    writeln!(out, " obj: {}", terms(model, model.objective()))?;
    if model.objective().constant() != 0.0 {
        writeln!(out, "\\ objective constant {}", model.objective().constant())?;
    }

    writeln!(out, "Subject To")?;
    for constr in model.constraints() {
        if constr.expr.is_constant() {
            warn!("Row {} has no variables, written as a comment", constr.name);
            writeln!(out, "\\ {}: 0 {} {}", constr.name, constr.sense, constr.rhs)?;
            continue;
        }
        writeln!(
            out,
            " {}: {} {} {}",
            constr.name,
            terms(model, &constr.expr),
            constr.sense,
            constr.rhs
        )?;
    }

    if model.num_vars() > 0 {
        writeln!(out, "Generals")?;
        for var in model.vars().iter() {
            writeln!(out, " {}", var.name())?;
        }
    }

    writeln!(out, "End")
}

pub fn write_lp_file(model: &Model, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    let mut out = Vec::new();
    write_lp(model, &mut out)?;
    fs::write(path, out)?;
    info!("Wrote model {} to {}", model.name(), path.display());
    Ok(())
}

fn check_constant_rows(model: &Model) -> io::Result<()> {
    let violated = model
        .constraints()
        .iter()
        .find(|c| c.expr.is_constant() && !c.sense.holds(0.0, c.rhs, TOLERANCE));

    match violated {
        Some(constr) => Err(io::Error::new(
            ErrorKind::InvalidData,
            format!(
                "row {} reads 0 {} {} and can never hold, the model is infeasible",
                constr.name, constr.sense, constr.rhs
            ),
        )),
        None => Ok(()),
    }
}

fn terms(model: &Model, expr: &LinExpr) -> String {
    let mut parts = Vec::with_capacity(expr.len());
    for (i, (var, coeff)) in expr.terms().enumerate() {
        let sign = match (i, coeff < 0.0) {
            (_, true) => "- ",
            (0, false) => "",
            (_, false) => "+ ",
        };
        let magnitude = match coeff.abs() {
            c if c == 1.0 => String::new(),
            c => format!("{} ", c),
        };
        parts.push(format!("{}{}{}", sign, magnitude, model.vars()[var].name()));
    }

    // the format needs at least one term in the objective
    if parts.is_empty() {
        if let Some(first) = model.vars().iter().next() {
            parts.push(format!("0 {}", first.name()));
        }
    }
    parts.join(" ")
}
