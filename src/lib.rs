pub mod api;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod preview;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod types;
pub mod ui;
pub mod util;

#[cfg(test)]
pub mod test_support;
