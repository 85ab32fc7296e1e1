pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod matcher;
pub mod report;
pub mod scanner;
