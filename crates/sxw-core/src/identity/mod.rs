//! Who is the current visitor: launch context, durable cache, resolver.

pub mod launch;
pub mod resolver;
pub mod store;

pub use launch::{HostUser, LaunchContextSource, NoLaunchContext};
pub use resolver::{IdentityResolver, IdentitySource, ResolvedIdentity};
pub use store::{Flag, IdentityStore, JsonFileStore, MemoryStore};
