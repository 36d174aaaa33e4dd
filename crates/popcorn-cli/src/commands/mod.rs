pub mod config;
pub mod context;
pub mod interactive;
pub mod prompts;
pub mod rate;
pub mod search;
pub mod show;
pub mod watched;
