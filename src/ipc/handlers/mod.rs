pub mod core;
pub mod problems;
