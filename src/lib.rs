//! neuralterm library root.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod providers;
pub mod shell;
pub mod terminal;

pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use error::{Error, Result};
pub use providers::{ChatBackend, HttpBackend};
pub use terminal::{Message, Role, Submission, Terminal};
