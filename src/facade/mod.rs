pub mod host;

pub use host::{PolicyHost, SharedEnforcer};
