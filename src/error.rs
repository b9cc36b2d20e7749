use thiserror::Error;

use crate::runtime::StateError;
use crate::serial::CodecError;
use crate::CompileError;

/// Unified error type covering compilation, session state, and the string
/// codecs.
///
/// Individual entry points return their own error type; this exists for
/// callers that drive the whole pipeline behind one `?`.
#[derive(Debug, Error)]
pub enum FormflowError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
