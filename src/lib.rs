pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod graph;
pub mod output;
pub mod parser;
pub mod peek;
pub mod project;
