pub mod args;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod es;
pub mod name;
pub mod retry;
