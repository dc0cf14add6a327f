pub mod combination_generator;
pub mod config;
pub mod coverage_engine;
pub mod coverage_math;
pub mod number_set;
pub mod problem_graph;
pub mod progress;
pub mod utilities;
pub mod wheel_search;
