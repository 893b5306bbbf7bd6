pub mod commands;
pub mod config;
pub mod output;
pub mod run;
