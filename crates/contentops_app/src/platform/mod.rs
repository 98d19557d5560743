mod app;
mod commands;
mod config;
mod effects;
mod logging;
mod surface;

pub use app::run_app;
