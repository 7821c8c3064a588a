#![forbid(unsafe_code)]

use crate::{ContractViolation, SchemaVersion, Validate};

pub const MASTER_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

fn validate_label(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), ContractViolation> {
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

/// Permanent items flow through the S-156 approval workflow; Consumable
/// items are issued directly into the summary dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    Permanent,
    Consumable,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Permanent => "Permanent",
            ItemKind::Consumable => "Consumable",
        }
    }

    pub fn parse(raw: &str) -> Option<ItemKind> {
        match raw {
            "Permanent" => Some(ItemKind::Permanent),
            "Consumable" => Some(ItemKind::Consumable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemName(String);

impl ItemName {
    pub fn new(v: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = v.into();
        validate_label("item_name", &v, 128)?;
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for ItemName {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_label("item_name", &self.0, 128)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepartmentName(String);

impl DepartmentName {
    pub fn new(v: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = v.into();
        validate_label("department_name", &v, 128)?;
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for DepartmentName {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_label("department_name", &self.0, 128)
    }
}

/// Ledger classification for an item: a free-text ledger tag (may be
/// a comma-joined multi-select) plus the folio id rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFolio {
    pub ledger: String,
    pub folio: String,
}

impl LedgerFolio {
    pub fn new(
        ledger: impl Into<String>,
        folio: impl Into<String>,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            ledger: ledger.into(),
            folio: folio.into(),
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for LedgerFolio {
    fn validate(&self) -> Result<(), ContractViolation> {
        // The ledger tag may be blank; the folio id may not.
        if self.ledger.len() > 256 {
            return Err(ContractViolation::InvalidValue {
                field: "ledger_folio.ledger",
                reason: "exceeds max length",
            });
        }
        validate_label("ledger_folio.folio", &self.folio, 16)
    }
}

/// Immutable once registered; there is no edit or delete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub schema_version: SchemaVersion,
    pub item: ItemName,
    pub folio: LedgerFolio,
    pub kind: ItemKind,
}

impl ItemRecord {
    pub fn v1(item: ItemName, folio: LedgerFolio, kind: ItemKind) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: MASTER_CONTRACT_VERSION,
            item,
            folio,
            kind,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for ItemRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.item.validate()?;
        self.folio.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentRecord {
    pub schema_version: SchemaVersion,
    pub department: DepartmentName,
}

impl DepartmentRecord {
    pub fn v1(department: DepartmentName) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: MASTER_CONTRACT_VERSION,
            department,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for DepartmentRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.department.validate()
    }
}
