pub mod inventory;
pub mod model;
pub mod sets_and_parameters;

pub use inventory::{Inventory, Memoized, Recurrence};
pub use model::{
    BuildOptions, CollectionModel, CollectionResult, Constraint, ConstraintKind, Model, VarKey,
    Variable, Variables,
};
pub use sets_and_parameters::{Parameters, Sets};
