#![forbid(unsafe_code)]

use dlms_contracts::access::{Role, Username};
use dlms_storage::store::LedgerStore;

use crate::error::ServiceError;

/// Resolved login: a username known to the users dataset plus its
/// role. Constructed once per session and passed to every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub username: Username,
    pub role: Role,
}

pub fn resolve_session(store: &LedgerStore, username: &str) -> Result<SessionContext, ServiceError> {
    let parsed = Username::new(username.trim()).map_err(|_| ServiceError::InvalidSession {
        username: username.to_string(),
    })?;
    let role = store
        .user_role(&parsed)
        .ok_or_else(|| ServiceError::InvalidSession {
            username: parsed.as_str().to_string(),
        })?;
    Ok(SessionContext {
        username: parsed,
        role,
    })
}

pub(crate) fn require_role(
    actual: Role,
    required: Role,
    action: &'static str,
) -> Result<(), ServiceError> {
    if actual != required {
        return Err(ServiceError::NotPermitted {
            role: actual,
            action,
        });
    }
    Ok(())
}
