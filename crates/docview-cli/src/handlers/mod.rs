pub mod browse;
pub mod serve;
pub mod tree;
