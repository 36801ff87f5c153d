// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod io;
pub mod mock_set;
pub mod model;
pub mod resolve;
pub mod runtime;
pub mod syntax;
pub mod synth;

// Re-export commonly used types
pub use crate::errors::GenerateError;
pub use crate::mock_set::resolve_mock_set;
pub use crate::model::{build_model, TypeInfo, TypeModel};
pub use crate::resolve::resolve_hierarchy;
pub use crate::runtime::{
    ArgMatcher, ArgValue, Expectation, Invocation, Matcher, Mock, MockMethod, PanicReporter,
    PerformAction, Recorder, SourceLocation, Stub,
};
pub use crate::synth::render_mock_file;
pub use crate::syntax::{SourceFile, TypeDecl, TypeKind};
