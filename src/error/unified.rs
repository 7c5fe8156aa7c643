//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Network,
    Timeout,
    Validation,
    Server,
    Storage,
    Serialization,
    Configuration,
}

/// Suggested recovery action for a UI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    Reauthenticate,
    RetryLater,
    IncreaseTimeout,
    FixRequest,
    CheckConfiguration,
    CheckStorage,
    ContactSupport,
}
