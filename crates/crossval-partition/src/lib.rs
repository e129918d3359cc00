pub mod generate;
pub mod scheme;

pub use generate::{
    bootstrap, leave_one_out, monte_carlo, repeated_vfold, rolling_origin, stratified_vfold,
    validation_split, vfold,
};
pub use scheme::Scheme;
