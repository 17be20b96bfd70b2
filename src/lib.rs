//! Builds the weekly beach clean-up logistics MILP: how many volunteer
//! collectors to send to each site on each day, how to bus them there through
//! meeting points, and how many trucks haul the plastic to recycling centers.
//!
//! The model is assembled in a solver-agnostic form ([`models::Model`]) and
//! handed to a [`solver::Solver`]; a Gurobi backend is available behind the
//! `gurobi` feature.

pub mod models;
pub mod params;
pub mod solver;

use models::collection::{Parameters, Sets, Variables};
use models::{BuildOptions, CollectionModel, Model};
use params::{Params, ParamsError};

/// Validates the payload and builds the model from it.
pub fn build(params: &Params, options: &BuildOptions) -> Result<(Model, Variables), ParamsError> {
    let sets = Sets::new(params);
    let parameters = Parameters::new(params, &sets)?;
    Ok(CollectionModel::build(&sets, &parameters, options))
}
