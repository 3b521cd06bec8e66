// Library interface for the instasuite binary and its tests
pub mod api;
pub mod app;
pub mod auth;
pub mod callback;
pub mod config;
pub mod context;
pub mod detail;
pub mod feed;
pub mod loader;

#[macro_use]
pub mod logging;

pub mod profile;
pub mod session;
pub mod storage;
pub mod terminal;
pub mod ui;
