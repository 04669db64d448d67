// Submodules for separation of concerns
mod builder;
pub mod filter;
mod operator;
pub mod predicate;
mod types;

// Public API re-exports
pub use builder::Query;
pub use filter::{is_operator_document, merge_predicate};
pub use operator::Operator;
pub use predicate::compile_predicate;
pub use types::{CompiledRequest, FindOptions, Order};
