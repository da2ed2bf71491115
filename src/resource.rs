/// Tagged result type handed to the presentation layer
///
/// `Loading` is transient and never returned from a completed repository
/// call; `Error` optionally carries the last known data so stale content
/// can stay on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error { message: String, data: Option<T> },
}

impl<T> Resource<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Resource::Error {
            message: message.into(),
            data: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    /// Payload, if any. Error resources may still carry stale data.
    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Loading => None,
            Resource::Success(data) => Some(data),
            Resource::Error { data, .. } => data.as_ref(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Resource::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}
