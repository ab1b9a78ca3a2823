//! Diagnostics objects attached to errors that carry contextual text.

/// A message plus a flag for whether the server supplied it.
///
/// Client-synthesised diagnostics (`is_server = false`) come from algorithms
/// detecting a local precondition violation; server diagnostics come from an
/// ERR packet's message field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub message: String,
    pub is_server: bool,
}

impl Diagnostics {
    pub fn none() -> Self {
        Diagnostics::default()
    }

    pub fn client(message: impl Into<String>) -> Self {
        Diagnostics {
            message: message.into(),
            is_server: false,
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Diagnostics {
            message: message.into(),
            is_server: true,
        }
    }
}
