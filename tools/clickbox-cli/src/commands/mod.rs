pub mod annotate;
pub mod check;
pub mod plan;
