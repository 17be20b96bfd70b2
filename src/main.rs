use std::{error::Error, io::ErrorKind, path::PathBuf};

use beachcrew::models::collection::Variables;
use beachcrew::models::{lp, BuildOptions, Model};
use beachcrew::params::Params;
use clap::Parser;
use log::{info, warn};

/// Builds (and, with the `gurobi` feature, solves) the weekly collection model.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Input payload. Nothing is done if it does not exist.
    #[clap(long, default_value = "params.json")]
    params: PathBuf,
    /// Where the solver writes its solution file
    #[clap(long, default_value = "out.sol")]
    solution: PathBuf,
    /// Also write the model in LP format
    #[clap(long)]
    write_lp: Option<PathBuf>,
    /// Emit explicit `v >= 0` rows on top of the variable bounds
    #[clap(long)]
    explicit_non_negativity: bool,
    /// Cache inventory expressions instead of unrolling them on every use
    #[clap(long)]
    memoize_inventory: bool,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let params = match Params::load(&args.params)? {
        Some(params) => params,
        None => {
            info!("No input at {}, nothing to do", args.params.display());
            return Ok(());
        }
    };

    let options = BuildOptions {
        explicit_non_negativity: args.explicit_non_negativity,
        memoize_inventory: args.memoize_inventory,
    };
    let (model, variables) = beachcrew::build(&params, &options)?;

    if let Some(path) = &args.write_lp {
        match lp::write_lp_file(&model, path) {
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                warn!("{} not written: {}", path.display(), err)
            }
            result => result?,
        }
    }

    solve(&model, &variables, &args)
}

#[cfg(feature = "gurobi")]
fn solve(model: &Model, variables: &Variables, args: &Args) -> Result<(), Box<dyn Error>> {
    use beachcrew::models::collection::CollectionResult;
    use beachcrew::solver::{gurobi::Gurobi, SolveOutcome, Solver};

    let mut solver = Gurobi::new(Some(args.solution.clone()));
    match solver.solve(model)? {
        SolveOutcome::Solved(solution) => {
            print!("{}", solution.report(model));
            let result = CollectionResult::new(variables, &solution);
            info!("Collectors per day: {:?}", result.collectors_per_day());
        }
        SolveOutcome::NoSolution { status } => {
            println!("Number of solutions: 0");
            warn!("No solution found ({})", status);
        }
    }
    Ok(())
}

#[cfg(not(feature = "gurobi"))]
fn solve(model: &Model, _variables: &Variables, args: &Args) -> Result<(), Box<dyn Error>> {
    warn!(
        "Built without the `gurobi` feature, model {} ({} variables, {} constraints) is not solved and {} is not written",
        model.name(),
        model.num_vars(),
        model.constraints().len(),
        args.solution.display()
    );
    if args.write_lp.is_none() {
        info!("Pass --write-lp to hand the model to another solver");
    }
    Ok(())
}
