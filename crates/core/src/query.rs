//! The state of an asynchronous fetch or subscription.

use crate::api::ApiError;

/// One of loading, success with data, or error with a message.
///
/// There is no "stale data while refetching" state: a refetch goes back to
/// [`Query::Loading`] or straight to the new result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Query<T, E = String> {
    Loading,
    Success(T),
    Error(E),
}

impl<T, E> Default for Query<T, E> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T, E> Query<T, E> {
    pub fn success(data: T) -> Self {
        Self::Success(data)
    }

    pub fn loading() -> Self {
        Self::Loading
    }

    pub fn error(error: E) -> Self {
        Self::Error(error)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error_ref(&self) -> Option<&E> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Query<&T, &E> {
        match self {
            Self::Loading => Query::Loading,
            Self::Success(data) => Query::Success(data),
            Self::Error(error) => Query::Error(error),
        }
    }

    /// Transform the success payload. Loading and error pass through untouched.
    pub fn map<U>(self, block: impl FnOnce(T) -> U) -> Query<U, E> {
        match self {
            Self::Loading => Query::Loading,
            Self::Success(data) => Query::Success(block(data)),
            Self::Error(error) => Query::Error(error),
        }
    }

    /// Transform the success payload into a new query.
    pub fn deep_map<U>(self, block: impl FnOnce(T) -> Query<U, E>) -> Query<U, E> {
        match self {
            Self::Loading => Query::Loading,
            Self::Success(data) => block(data),
            Self::Error(error) => Query::Error(error),
        }
    }

    pub fn map_err<F>(self, block: impl FnOnce(E) -> F) -> Query<T, F> {
        match self {
            Self::Loading => Query::Loading,
            Self::Success(data) => Query::Success(data),
            Self::Error(error) => Query::Error(block(error)),
        }
    }
}

impl<T> Query<T> {
    /// Wrap the outcome of an API call, flattening the error to its message.
    pub fn from_api(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(error) => Self::Error(error.to_string()),
        }
    }
}

impl<T, E> From<Result<T, E>> for Query<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(error) => Self::Error(error),
        }
    }
}
