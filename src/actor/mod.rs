//! Actor-based command processing system
//!
//! This module implements an Akka-style actor architecture using Ractor:
//! a Guardian supervises the DeploymentManager, which serializes lifecycle
//! work through one CommandProcessor per deployment name.

pub mod guardian;
pub mod manager;
pub mod message;
pub mod processor;

pub use guardian::*;
pub use manager::*;
pub use message::*;
pub use processor::*;
