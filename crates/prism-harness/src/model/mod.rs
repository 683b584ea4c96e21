//! Reference models for model-based testing.
//!
//! Each model implements the observable rules of one component in the most
//! direct way possible. Tests drive the model and the real component with the
//! same operations and compare what they expose.

mod operation;
mod registry;
mod sequence;

pub use operation::{DiffOperation, ModelSessionId, RegistryOperation, session_id};
pub use registry::ModelRegistry;
pub use sequence::{ModelOutcome, ModelSequence};
