//! Command handlers exposed to the host application.
//!
//! Each handler takes the shared [`OverlayState`] and returns
//! `Result<T, ApiError>`, ready to be wrapped by whatever invocation
//! mechanism the host uses.
//!
//! [`OverlayState`]: crate::state::OverlayState

mod keys;
mod messaging;
mod settings;

pub use keys::*;
pub use messaging::*;
pub use settings::*;
