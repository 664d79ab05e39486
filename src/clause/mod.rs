pub mod error;
pub mod filter;
pub mod operators;
pub mod types;
pub mod update;

pub use error::ClauseError;
pub use filter::build_filter_clause;
pub use operators::{Operator, OperatorTable};
pub use types::*;
pub use update::build_update_clause;
