#![forbid(unsafe_code)]

use crate::{ContractViolation, SchemaVersion, Validate};

pub const ACCESS_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

fn validate_id(field: &'static str, value: &str, max_len: usize) -> Result<(), ContractViolation> {
    if value.trim().is_empty() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must not be empty",
        });
    }
    if value.len() > max_len {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "exceeds max length",
        });
    }
    if value != value.trim() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must not carry leading or trailing whitespace",
        });
    }
    Ok(())
}

/// Session role resolved from the users dataset. Drives every
/// authorization decision; the durable column is the `as_str` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Store,
    Department,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Store => "Store",
            Role::Department => "Department",
            Role::Admin => "Admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "Store" => Some(Role::Store),
            "Department" => Some(Role::Department),
            "Admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(v: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = v.into();
        validate_id("username", &v, 64)?;
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for Username {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_id("username", &self.0, 64)
    }
}

/// Read-only reference row: the core resolves sessions against it and
/// never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub schema_version: SchemaVersion,
    pub username: Username,
    pub role: Role,
}

impl UserRecord {
    pub fn v1(username: Username, role: Role) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: ACCESS_CONTRACT_VERSION,
            username,
            role,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for UserRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.username.validate()
    }
}
