//! Statement synthesis: declaration normalization and variable substitution

pub mod statement_builder;
pub mod variables;

pub use statement_builder::{
    build_conditions, build_principals, build_statement, build_statements, SidTracker,
};
pub use variables::{replace_vars, replace_vars_in_list};
