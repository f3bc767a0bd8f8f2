//! Shared primitives for the NeuVue queue client workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
