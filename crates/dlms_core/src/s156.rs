#![forbid(unsafe_code)]

use dlms_contracts::access::Role;
use dlms_contracts::ledger::{LedgerEntryRecord, LoanEntryRecord};
use dlms_contracts::master::{DepartmentName, ItemName};
use dlms_contracts::s156::{IssueRequestRecord, RequestStatus, S156Id};
use dlms_contracts::ContractViolation;
use dlms_storage::repo::IssueRequestRepo;
use dlms_storage::store::{LedgerStore, StorageError};

use crate::error::ServiceError;
use crate::session::require_role;

/// Outcome of one advance transition: the updated request plus the
/// ledger rows fanned out on final approval (absent for the
/// Department step). The service persists s156 alone or s156 + ledger
/// + pll accordingly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceResult {
    pub request: IssueRequestRecord,
    pub ledger_entry: Option<LedgerEntryRecord>,
    pub loan_entry: Option<LoanEntryRecord>,
}

/// The S-156 issue workflow: raise against the master data, advance
/// through Pending -> Dept Approved -> Approved, fan out into the
/// issue ledger and the Permanent Loan Ledger on final approval.
#[derive(Debug, Default, Clone)]
pub struct S156Runtime;

impl S156Runtime {
    pub fn raise_request(
        &self,
        store: &mut LedgerStore,
        actor: Role,
        item: &str,
        department: &str,
        quantity: u32,
    ) -> Result<IssueRequestRecord, ServiceError> {
        require_role(actor, Role::Store, "raise an S-156 issue")?;
        let item = ItemName::new(item)?;
        let department = DepartmentName::new(department)?;
        // Rows are never deleted, so the row count is a stable creation
        // ordinal.
        let seq = store.s156_rows().len() as u64 + 1;
        let request_id = derive_request_id(seq, item.as_str(), department.as_str(), quantity)?;
        let record = IssueRequestRecord::v1(
            request_id,
            item,
            department,
            quantity,
            RequestStatus::Pending,
        )?;
        store.append_s156_row(record.clone())?;
        Ok(record)
    }

    pub fn advance(
        &self,
        store: &mut LedgerStore,
        actor: Role,
        request_id: &S156Id,
    ) -> Result<AdvanceResult, ServiceError> {
        let current_status = store
            .s156_row(request_id)
            .ok_or_else(|| {
                ServiceError::Storage(StorageError::ForeignKeyViolation {
                    table: "s156",
                    key: request_id.as_str().to_string(),
                })
            })?
            .status;
        let next = validate_advance(actor, current_status)?;
        let updated = store.set_s156_status(request_id, current_status, next)?;
        if next != RequestStatus::Approved {
            return Ok(AdvanceResult {
                request: updated,
                ledger_entry: None,
                loan_entry: None,
            });
        }
        let ledger_entry = LedgerEntryRecord::v1(
            updated.item.clone(),
            updated.department.clone(),
            updated.quantity,
        )?;
        let loan_entry = LoanEntryRecord::v1(
            updated.department.clone(),
            updated.item.clone(),
            updated.quantity,
        )?;
        store.append_ledger_row(ledger_entry.clone())?;
        store.append_loan_row(loan_entry.clone())?;
        Ok(AdvanceResult {
            request: updated,
            ledger_entry: Some(ledger_entry),
            loan_entry: Some(loan_entry),
        })
    }

    pub fn list_requests<'a>(&self, store: &'a LedgerStore) -> &'a [IssueRequestRecord] {
        store.s156_rows()
    }
}

/// The whole approval authority table. Everything outside the two
/// legal (role, status) pairs is rejected without mutation.
fn validate_advance(actor: Role, current: RequestStatus) -> Result<RequestStatus, ServiceError> {
    match (actor, current) {
        (Role::Department, RequestStatus::Pending) => Ok(RequestStatus::DeptApproved),
        (Role::Admin, RequestStatus::DeptApproved) => Ok(RequestStatus::Approved),
        (role, status) => Err(ServiceError::TransitionNotPermitted { role, status }),
    }
}

fn derive_request_id(
    seq: u64,
    item: &str,
    department: &str,
    quantity: u32,
) -> Result<S156Id, ContractViolation> {
    let quantity = quantity.to_string();
    S156Id::new(format!(
        "s156_{seq}_{}",
        short_hash_hex(&[item, department, &quantity])
    ))
}

fn short_hash_hex(parts: &[&str]) -> String {
    // FNV-1a 64-bit; deterministic and bounded for id derivation.
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut h = OFFSET;
    for part in parts {
        for &b in part.as_bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(PRIME);
        }
        // Stable delimiter to avoid accidental concatenation ambiguity.
        h ^= b'|' as u64;
        h = h.wrapping_mul(PRIME);
    }
    format!("{h:016x}")
}
