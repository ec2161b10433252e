//! Principal identity and privilege levels

/// Numeric identity of a chat user. The platform hands these out; the
/// manager never invents them.
pub type PrincipalId = i64;

/// Privilege level a command demands from its sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Any principal, approved or not
    Any,
    /// Owner or a principal present in the allowlist
    Approved,
    /// The configured owner only
    Owner
}
