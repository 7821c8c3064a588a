#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use dlms_contracts::access::{Role, UserRecord, Username};
use dlms_contracts::ledger::{LedgerEntryRecord, LoanEntryRecord, SummaryEntryRecord};
use dlms_contracts::master::{DepartmentName, DepartmentRecord, ItemKind, ItemName, ItemRecord};
use dlms_contracts::s156::{IssueRequestRecord, RequestStatus, S156Id};
use dlms_contracts::ContractViolation;

use crate::repo::{ConsumableSummaryRepo, IssueRequestRepo, LedgerReadRepo, MasterDataRepo};

#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    ForeignKeyViolation { table: &'static str, key: String },
    DuplicateKey { table: &'static str, key: String },
    ContractViolation(ContractViolation),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ForeignKeyViolation { table, key } => {
                write!(f, "{table}: no row for key '{key}'")
            }
            Self::DuplicateKey { table, key } => {
                write!(f, "{table}: duplicate key '{key}'")
            }
            Self::ContractViolation(v) => write!(f, "{v}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<ContractViolation> for StorageError {
    fn from(v: ContractViolation) -> Self {
        StorageError::ContractViolation(v)
    }
}

// Strict registration policy key: case-insensitive (name, folio) pair.
fn item_key(item: &ItemName, folio: &str) -> (String, String) {
    (
        item.as_str().trim().to_lowercase(),
        folio.trim().to_lowercase(),
    )
}

/// Typed in-memory store for the seven DLMS datasets. Append order is
/// row order; no row is ever deleted or reordered. The single mutable
/// column in the whole store is `s156.status`, reachable only through
/// `set_s156_status`.
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    users: BTreeMap<Username, UserRecord>,
    items: Vec<ItemRecord>,
    item_key_index: BTreeSet<(String, String)>,
    departments: Vec<DepartmentRecord>,
    s156: Vec<IssueRequestRecord>,
    s156_index: BTreeMap<S156Id, usize>,
    ledger: Vec<LedgerEntryRecord>,
    pll: Vec<LoanEntryRecord>,
    summary: Vec<SummaryEntryRecord>,
}

impl LedgerStore {
    pub fn new_in_memory() -> Self {
        Self::default()
    }

    /// Rebuild a store from loaded collections. Indices are rebuilt
    /// first-occurrence-wins and every row is kept, so datasets written
    /// by the permissive registration variant still load; the strict
    /// duplicate policy binds new registrations only.
    pub fn from_collections(
        users: Vec<UserRecord>,
        items: Vec<ItemRecord>,
        departments: Vec<DepartmentRecord>,
        s156: Vec<IssueRequestRecord>,
        ledger: Vec<LedgerEntryRecord>,
        pll: Vec<LoanEntryRecord>,
        summary: Vec<SummaryEntryRecord>,
    ) -> Self {
        let mut user_map = BTreeMap::new();
        for user in users {
            user_map.entry(user.username.clone()).or_insert(user);
        }
        let mut item_key_index = BTreeSet::new();
        for item in &items {
            item_key_index.insert(item_key(&item.item, &item.folio.folio));
        }
        let mut s156_index = BTreeMap::new();
        for (row, record) in s156.iter().enumerate() {
            s156_index.entry(record.request_id.clone()).or_insert(row);
        }
        Self {
            users: user_map,
            items,
            item_key_index,
            departments,
            s156,
            s156_index,
            ledger,
            pll,
            summary,
        }
    }

    pub fn insert_user_row(&mut self, record: UserRecord) -> Result<(), StorageError> {
        if self.users.contains_key(&record.username) {
            return Err(StorageError::DuplicateKey {
                table: "users",
                key: record.username.as_str().to_string(),
            });
        }
        self.users.insert(record.username.clone(), record);
        Ok(())
    }

    pub fn user_role(&self, username: &Username) -> Option<Role> {
        self.users.get(username).map(|u| u.role)
    }

    pub fn users(&self) -> impl Iterator<Item = &UserRecord> {
        self.users.values()
    }

    pub fn find_item(&self, item: &ItemName) -> Option<&ItemRecord> {
        self.items.iter().find(|i| &i.item == item)
    }

    pub fn has_department(&self, department: &DepartmentName) -> bool {
        self.departments.iter().any(|d| &d.department == department)
    }

    fn require_item_of_kind(
        &self,
        table_field: &'static str,
        kind_reason: &'static str,
        item: &ItemName,
        kind: ItemKind,
    ) -> Result<&ItemRecord, StorageError> {
        let record = self
            .find_item(item)
            .ok_or_else(|| StorageError::ForeignKeyViolation {
                table: "items",
                key: item.as_str().to_string(),
            })?;
        if record.kind != kind {
            return Err(StorageError::ContractViolation(
                ContractViolation::InvalidValue {
                    field: table_field,
                    reason: kind_reason,
                },
            ));
        }
        Ok(record)
    }

    fn require_department(&self, department: &DepartmentName) -> Result<(), StorageError> {
        if !self.has_department(department) {
            return Err(StorageError::ForeignKeyViolation {
                table: "departments",
                key: department.as_str().to_string(),
            });
        }
        Ok(())
    }
}

impl MasterDataRepo for LedgerStore {
    fn append_item_row(&mut self, record: ItemRecord) -> Result<(), StorageError> {
        let key = item_key(&record.item, &record.folio.folio);
        if self.item_key_index.contains(&key) {
            return Err(StorageError::DuplicateKey {
                table: "items",
                key: format!("{}|{}", key.0, key.1),
            });
        }
        self.item_key_index.insert(key);
        self.items.push(record);
        Ok(())
    }

    fn append_department_row(&mut self, record: DepartmentRecord) -> Result<(), StorageError> {
        // Departments carry no uniqueness invariant.
        self.departments.push(record);
        Ok(())
    }

    fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    fn items_of_kind(&self, kind: ItemKind) -> Vec<&ItemRecord> {
        self.items.iter().filter(|i| i.kind == kind).collect()
    }

    fn departments(&self) -> &[DepartmentRecord] {
        &self.departments
    }
}

impl IssueRequestRepo for LedgerStore {
    fn append_s156_row(&mut self, record: IssueRequestRecord) -> Result<(), StorageError> {
        self.require_item_of_kind(
            "s156.item",
            "must reference a Permanent item",
            &record.item,
            ItemKind::Permanent,
        )?;
        self.require_department(&record.department)?;
        if self.s156_index.contains_key(&record.request_id) {
            return Err(StorageError::DuplicateKey {
                table: "s156",
                key: record.request_id.as_str().to_string(),
            });
        }
        self.s156_index
            .insert(record.request_id.clone(), self.s156.len());
        self.s156.push(record);
        Ok(())
    }

    fn set_s156_status(
        &mut self,
        request_id: &S156Id,
        expected: RequestStatus,
        next: RequestStatus,
    ) -> Result<IssueRequestRecord, StorageError> {
        let row = *self.s156_index.get(request_id).ok_or_else(|| {
            StorageError::ForeignKeyViolation {
                table: "s156",
                key: request_id.as_str().to_string(),
            }
        })?;
        let record = &mut self.s156[row];
        if record.status != expected {
            return Err(StorageError::ContractViolation(
                ContractViolation::InvalidValue {
                    field: "s156.status",
                    reason: "current status does not match the transition source",
                },
            ));
        }
        record.status = next;
        Ok(record.clone())
    }

    fn append_ledger_row(&mut self, record: LedgerEntryRecord) -> Result<(), StorageError> {
        self.ledger.push(record);
        Ok(())
    }

    fn append_loan_row(&mut self, record: LoanEntryRecord) -> Result<(), StorageError> {
        self.pll.push(record);
        Ok(())
    }

    fn s156_rows(&self) -> &[IssueRequestRecord] {
        &self.s156
    }

    fn s156_row(&self, request_id: &S156Id) -> Option<&IssueRequestRecord> {
        self.s156_index.get(request_id).map(|&row| &self.s156[row])
    }
}

impl ConsumableSummaryRepo for LedgerStore {
    fn append_summary_row(&mut self, record: SummaryEntryRecord) -> Result<(), StorageError> {
        self.require_item_of_kind(
            "summary.item",
            "must reference a Consumable item",
            &record.item,
            ItemKind::Consumable,
        )?;
        self.require_department(&record.department)?;
        self.summary.push(record);
        Ok(())
    }
}

impl LedgerReadRepo for LedgerStore {
    fn ledger_rows(&self) -> &[LedgerEntryRecord] {
        &self.ledger
    }

    fn loan_rows(&self) -> &[LoanEntryRecord] {
        &self.pll
    }

    fn summary_rows(&self) -> &[SummaryEntryRecord] {
        &self.summary
    }
}
