pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod listing;
pub mod model;
pub mod render;
pub mod screen;
pub mod session;
pub mod types;

#[cfg(test)]
pub mod testing;
