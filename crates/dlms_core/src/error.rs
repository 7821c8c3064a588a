#![forbid(unsafe_code)]

use dlms_contracts::access::Role;
use dlms_contracts::s156::RequestStatus;
use dlms_contracts::ContractViolation;
use dlms_storage::dataset::DatasetError;
use dlms_storage::store::StorageError;

/// Interaction-boundary errors. Everything here is recoverable: the
/// in-memory state is unchanged (mutations run only after every check
/// passes) and the session continues. `Dataset` is the one variant that
/// signals possible on-disk inconsistency and must not be swallowed.
#[derive(Debug)]
pub enum ServiceError {
    InvalidSession { username: String },
    NotPermitted { role: Role, action: &'static str },
    TransitionNotPermitted { role: Role, status: RequestStatus },
    Storage(StorageError),
    Dataset(DatasetError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSession { username } => {
                write!(f, "unknown username '{username}'")
            }
            Self::NotPermitted { role, action } => {
                write!(f, "role {} is not permitted to {action}", role.as_str())
            }
            Self::TransitionNotPermitted { role, status } => {
                write!(
                    f,
                    "not permitted in current state: role {} cannot advance a request in status {}",
                    role.as_str(),
                    status.as_str()
                )
            }
            Self::Storage(err) => write!(f, "{err}"),
            Self::Dataset(err) => write!(f, "persistence failed: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<DatasetError> for ServiceError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

impl From<ContractViolation> for ServiceError {
    fn from(value: ContractViolation) -> Self {
        Self::Storage(StorageError::ContractViolation(value))
    }
}
