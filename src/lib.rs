pub mod app;
pub mod assets;
pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod counter;
pub mod errors;
pub mod handlers;
pub mod interaction;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use bootstrap::{bootstrap, bootstrap_widget};
pub use config::Config;
pub use state::AppState;
