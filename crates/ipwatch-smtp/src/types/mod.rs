//! Core SMTP types.

mod extension;
mod reply;

pub use extension::{AuthMechanism, Extension};
pub use ipwatch_mime::Address;
pub use reply::{Reply, ReplyCode};
