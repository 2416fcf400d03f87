// Public API for integration tests and potential library usage

pub mod abuse;
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod matching;
pub mod sanitize;
pub mod state;
pub mod synopsis;
pub mod types;
