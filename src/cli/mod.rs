//! Command implementations and terminal presentation

pub mod cache;
pub mod rankings;
pub mod setup;
pub mod ui;
