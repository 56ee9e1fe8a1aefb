pub mod cards;
pub mod charts;
pub mod config;
pub mod demo_feed;
pub mod detail;
pub mod error;
pub mod export;
pub mod fetch;
pub mod logging;
pub mod overview;
pub mod payload;
pub mod provider;
pub mod state;
pub mod ui;
