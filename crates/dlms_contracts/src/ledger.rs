#![forbid(unsafe_code)]

use crate::master::{DepartmentName, ItemName};
use crate::{ContractViolation, SchemaVersion, Validate};

pub const LEDGER_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

fn validate_quantity(field: &'static str, quantity: u32) -> Result<(), ContractViolation> {
    if quantity == 0 {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must be >= 1",
        });
    }
    Ok(())
}

/// Appended exactly once per S-156 transition into Approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntryRecord {
    pub schema_version: SchemaVersion,
    pub item: ItemName,
    pub department: DepartmentName,
    pub quantity: u32,
}

impl LedgerEntryRecord {
    pub fn v1(
        item: ItemName,
        department: DepartmentName,
        quantity: u32,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: LEDGER_CONTRACT_VERSION,
            item,
            department,
            quantity,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for LedgerEntryRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.item.validate()?;
        self.department.validate()?;
        validate_quantity("ledger_entry.quantity", self.quantity)
    }
}

/// Permanent Loan Ledger row, written in lockstep with each
/// `LedgerEntryRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanEntryRecord {
    pub schema_version: SchemaVersion,
    pub department: DepartmentName,
    pub item: ItemName,
    pub quantity: u32,
}

impl LoanEntryRecord {
    pub fn v1(
        department: DepartmentName,
        item: ItemName,
        quantity: u32,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: LEDGER_CONTRACT_VERSION,
            department,
            item,
            quantity,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for LoanEntryRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.department.validate()?;
        self.item.validate()?;
        validate_quantity("loan_entry.quantity", self.quantity)
    }
}

/// Direct Store-role append for Consumable issues; bypasses the
/// approval workflow entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntryRecord {
    pub schema_version: SchemaVersion,
    pub item: ItemName,
    pub department: DepartmentName,
    pub quantity: u32,
}

impl SummaryEntryRecord {
    pub fn v1(
        item: ItemName,
        department: DepartmentName,
        quantity: u32,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: LEDGER_CONTRACT_VERSION,
            item,
            department,
            quantity,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for SummaryEntryRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.item.validate()?;
        self.department.validate()?;
        validate_quantity("summary_entry.quantity", self.quantity)
    }
}
