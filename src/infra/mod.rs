pub mod api;
pub mod config;
pub mod parser;
pub mod storage;
