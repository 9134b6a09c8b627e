//! Credential models: redacted secrets, stored credential pairs, and refresh wire bodies.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
