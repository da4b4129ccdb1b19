pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod project;
pub mod shared;
pub mod update;
