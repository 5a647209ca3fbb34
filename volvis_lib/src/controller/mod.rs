//! Frame driven application core
//!
//! Producers (UI, the volume loader thread) post [`Message`]s on the bus, the
//! [`Controller`] applies them at the start of every frame and draws.

mod controller;
mod loader;
mod messages;

pub use controller::{Controller, SELECTION_BAND_WIDTH};
pub use loader::spawn_load;
pub use messages::{Message, MessageBus, MessageSender, View};
