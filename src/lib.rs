//! Mail-to-task sync: analyze incoming messages for deadlines, keep the
//! extracted tasks in SQLite and track which ones each user has completed.

pub mod commands;
pub mod context;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use context::AppContext;
pub use database::Store;
pub use error::{Error, Result};
