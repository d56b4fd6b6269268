//! Records exchanged with the club API.

mod de;
pub mod types;

pub use types::*;
