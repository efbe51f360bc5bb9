pub mod analyze;
pub mod generate;
pub mod graph;
pub mod serve;
pub mod trace;
pub mod validate;
