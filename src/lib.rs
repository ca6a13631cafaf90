//! Environment and growth data pipeline for the four-site EC study.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod state;
pub mod ui;
