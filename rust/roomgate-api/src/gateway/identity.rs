//! Identity generation for anonymous visitors.

use std::fmt;

use uuid::Uuid;

/// Produces globally unique identities.
pub trait IdentityGenerator: Send + Sync + fmt::Debug {
    /// A new identity, never returned before.
    fn new_identity(&self) -> String;
}

/// Random (v4) UUID identities.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdentityGenerator for UuidV4Generator {
    fn new_identity(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
