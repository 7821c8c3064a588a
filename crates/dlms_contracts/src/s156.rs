#![forbid(unsafe_code)]

use crate::master::{DepartmentName, ItemName};
use crate::{ContractViolation, SchemaVersion, Validate};

pub const S156_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

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
    Ok(())
}

/// Stable request identity assigned at creation and retained across
/// reloads. Row index stays display-only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct S156Id(String);

impl S156Id {
    pub fn new(v: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = v.into();
        validate_id("s156_id", &v, 64)?;
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for S156Id {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_id("s156_id", &self.0, 64)
    }
}

/// Linear approval lifecycle; there is no rejection or cancellation
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestStatus {
    Pending,
    DeptApproved,
    Approved,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::DeptApproved => "Dept Approved",
            RequestStatus::Approved => "Approved",
        }
    }

    pub fn parse(raw: &str) -> Option<RequestStatus> {
        match raw {
            "Pending" => Some(RequestStatus::Pending),
            "Dept Approved" => Some(RequestStatus::DeptApproved),
            "Approved" => Some(RequestStatus::Approved),
            _ => None,
        }
    }
}

/// One S-156 issue request. Only `status` ever changes after creation,
/// and only through the workflow's advance transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequestRecord {
    pub schema_version: SchemaVersion,
    pub request_id: S156Id,
    pub item: ItemName,
    pub department: DepartmentName,
    pub quantity: u32,
    pub status: RequestStatus,
}

impl IssueRequestRecord {
    pub fn v1(
        request_id: S156Id,
        item: ItemName,
        department: DepartmentName,
        quantity: u32,
        status: RequestStatus,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: S156_CONTRACT_VERSION,
            request_id,
            item,
            department,
            quantity,
            status,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for IssueRequestRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.request_id.validate()?;
        self.item.validate()?;
        self.department.validate()?;
        if self.quantity == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "issue_request.quantity",
                reason: "must be >= 1",
            });
        }
        Ok(())
    }
}
