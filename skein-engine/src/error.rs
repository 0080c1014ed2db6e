use crate::store::StoreError;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// The engine operation an error originated from.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Operation {
    ProfileFeed,
    SearchUsers,
    Activity,
    UpdateProfile,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ProfileFeed => "profile feed",
            Operation::SearchUsers => "user search",
            Operation::Activity => "activity",
            Operation::UpdateProfile => "profile update",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Entity {
    User,
    Community,
    Post,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "user",
            Entity::Community => "community",
            Entity::Post => "post",
        };
        f.write_str(name)
    }
}

/// Error category, inspectable without matching on message text.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Query,
    Write,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{operation}: {entity} {id} was not found")]
    NotFound {
        operation: Operation,
        entity: Entity,
        id: String,
    },
    #[error("{operation}: invalid argument: {reason}")]
    InvalidArgument {
        operation: Operation,
        reason: String,
    },
    #[error("{operation}: query failed: {source}")]
    Query {
        operation: Operation,
        #[source]
        source: StoreError,
    },
    #[error("{operation}: write failed: {source}")]
    Write {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl EngineError {
    pub(crate) fn not_found(operation: Operation, entity: Entity, id: impl Into<String>) -> Self {
        Self::NotFound {
            operation,
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn invalid_argument(operation: Operation, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation,
            reason: reason.into(),
        }
    }

    pub(crate) fn query(operation: Operation, source: StoreError) -> Self {
        Self::Query { operation, source }
    }

    pub(crate) fn write(operation: Operation, source: StoreError) -> Self {
        Self::Write { operation, source }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            EngineError::Query { .. } => ErrorKind::Query,
            EngineError::Write { .. } => ErrorKind::Write,
        }
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            EngineError::NotFound { operation, .. }
            | EngineError::InvalidArgument { operation, .. }
            | EngineError::Query { operation, .. }
            | EngineError::Write { operation, .. } => *operation,
        }
    }
}
