/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised when resolving catalog identifiers or profile values.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No spread matches the given identifier.
    #[error("unknown spread: \"{0}\"")]
    UnknownSpread(String),

    /// No card in the deck has the given id.
    #[error("unknown card: \"{0}\"")]
    UnknownCard(String),

    /// No suit matches the given name.
    #[error("unknown suit: \"{0}\"")]
    UnknownSuit(String),

    /// A profile field could not be parsed.
    #[error("invalid {field}: \"{value}\"")]
    InvalidValue {
        /// The field being parsed.
        field: &'static str,
        /// The rejected input.
        value: String,
    },
}
