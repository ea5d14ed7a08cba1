use crate::error::TrellisError;

/// Single last-error slot read by the UI layer.
///
/// Mutation failures land here instead of propagating across the UI
/// boundary. A new error overwrites the previous one; there is no
/// queue.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    last: Option<TrellisError>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error, replacing any previous one.
    pub fn report(&mut self, error: TrellisError) {
        self.last = Some(error);
    }

    /// The most recent unhandled error, if any.
    pub fn last(&self) -> Option<&TrellisError> {
        self.last.as_ref()
    }

    /// User-facing message for the most recent error.
    pub fn message(&self) -> Option<String> {
        self.last.as_ref().map(ToString::to_string)
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
