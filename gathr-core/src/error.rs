use thiserror::Error;

/// Terminal outcome of a failed domain operation.
///
/// Every variant is returned synchronously to the caller; nothing is
/// retried inside the domain layer. `Storage` is the only kind a caller
/// may reasonably retry.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The actor is not allowed to perform this operation.
    #[error("{0}")]
    Forbidden(&'static str),

    /// The event's registration window has passed or the event is archived.
    #[error("registration is closed")]
    RegistrationClosed,

    /// The seat bound (`max_attendees`, creator included) is exhausted.
    #[error("event is at capacity")]
    Capacity,

    #[error("you are already registered for this event")]
    AlreadyRegistered,

    /// The operation requires an authenticated actor.
    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }
}
