pub mod evaluator;
pub mod operators;
pub mod potential;
