pub mod profile;
pub mod snapshot;

pub use profile::*;
pub use snapshot::*;
