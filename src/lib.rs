pub mod database;
pub mod engine;
pub mod models;
pub mod utils;
