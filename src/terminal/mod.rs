//! Terminal module - the interactive shell behind the site's hero.
//!
//! - Transcript entries and their container
//! - Command table and parser
//! - Boot sequence
//! - The session engine tying them to the chat backend

pub mod boot;
pub mod commands;
pub mod history;
pub mod message;
pub mod navigation;
pub mod session;

pub use boot::Timings;
pub use message::{Message, Role};
pub use navigation::{Navigator, NoopNavigator, QuickAction, Section, QUICK_ACTIONS};
pub use session::{Submission, Terminal};
