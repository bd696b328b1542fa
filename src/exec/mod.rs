pub mod condition;
pub mod operator;

pub use operator::{IndexCondition, Operator};
