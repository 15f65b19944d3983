//! Soft-failure result type for advisory read operations.

/// Result of a read operation that never raises.
///
/// Provider failures are logged at the call site and carried here as
/// [`Advisory::Degraded`] so callers can test for the sentinel without
/// inspecting logs.
#[derive(Clone, Debug, Eq, PartialEq)]
#[must_use]
pub enum Advisory<T> {
    /// The provider answered.
    Value(T),
    /// The provider call failed; the cause was logged and discarded.
    Degraded {
        /// Human readable description of the failure.
        cause: String,
    },
}

impl<T> Advisory<T> {
    /// Builds a degraded result.
    pub fn degraded(cause: impl Into<String>) -> Self {
        Self::Degraded {
            cause: cause.into(),
        }
    }

    /// Returns the value, discarding the failure cause.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Degraded { .. } => None,
        }
    }

    /// Returns true when the provider call failed.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Returns the failure cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&str> {
        match self {
            Self::Value(_) => None,
            Self::Degraded { cause } => Some(cause.as_str()),
        }
    }

    /// Maps the carried value, preserving degradation.
    pub fn map<U>(self, op: impl FnOnce(T) -> U) -> Advisory<U> {
        match self {
            Self::Value(value) => Advisory::Value(op(value)),
            Self::Degraded { cause } => Advisory::Degraded { cause },
        }
    }

    /// Returns the value or the type's default when degraded.
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.into_value().unwrap_or_default()
    }
}

impl<T> Advisory<Option<T>> {
    /// Collapses "not found" and "degraded" into `None`.
    pub fn found(self) -> Option<T> {
        self.into_value().flatten()
    }
}
