//! Access registry port
//!
//! One owner fixed at startup, zero or more approved principals. There is no
//! revoke operation; the allowlist only grows.

use async_trait::async_trait;

use crate::domain::{error::HosterError, principal::PrincipalId};

/// Allowlist abstraction over the approved-principal store
#[async_trait]
pub trait AccessStore: Send + Sync {
    /// True iff the principal is the configured owner
    fn is_owner(&self, principal: PrincipalId) -> bool;

    /// True for the owner, or when the principal appears in the allowlist.
    /// A missing store means "nobody approved yet", not an error.
    async fn is_approved(&self, principal: PrincipalId) -> Result<bool, HosterError>;

    /// Append the principal to the allowlist. Duplicates are tolerated; the
    /// membership check is unaffected by them.
    async fn approve(&self, principal: PrincipalId) -> Result<(), HosterError>;
}
