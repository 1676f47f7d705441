pub mod command;
pub mod config;
pub mod context;
pub mod document;
pub mod host;
pub mod openai;
pub mod provider;
