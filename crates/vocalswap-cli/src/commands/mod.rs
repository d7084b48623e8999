//! CLI command implementations

pub mod combine;
pub mod doctor;
pub mod json_output;
pub mod run;
pub mod separate;
pub mod tag;

mod reporting;
