pub mod collection;
pub mod expr;
pub mod lp;
pub mod utils;

pub use collection::{BuildOptions, CollectionModel, Model};
