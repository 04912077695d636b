//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Core session state (`Session`)
//! - `message`: Conversation message types (`MessageRole`, `Message`)
//! - `view`: Visible surface selector (`ActiveView`)

mod message;
mod model;
mod view;

// Re-export public API
pub use message::{Message, MessageRole};
pub use model::{Session, TurnStart};
pub use view::ActiveView;
