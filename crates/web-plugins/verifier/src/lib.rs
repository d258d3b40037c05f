mod circuits;
mod config;
mod constants;
mod error;
mod signals;
mod web;

pub mod builder;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod plugin;
pub mod store;
pub mod validator;
pub mod verification;

#[cfg(test)]
mod test_utils;

// Re-exports
pub use circuits::CircuitId;
pub use error::SessionError;
pub use lifecycle::SessionController;
pub use plugin::VerifierPlugin;
