pub mod editing;
pub mod error;
pub mod registry;

// Re-export key types for easier usage
pub use editing::{document::*, policy::*, scheduler::*, session::*};
pub use error::EditError;
pub use registry::{BlockKind, TypeInfo};
