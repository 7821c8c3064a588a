#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use dlms_contracts::access::{Role, UserRecord, Username};
use dlms_contracts::ledger::{LedgerEntryRecord, LoanEntryRecord, SummaryEntryRecord};
use dlms_contracts::master::{
    DepartmentName, DepartmentRecord, ItemKind, ItemName, ItemRecord, LedgerFolio,
};
use dlms_contracts::s156::{IssueRequestRecord, RequestStatus, S156Id};
use dlms_contracts::ContractViolation;

use crate::repo::{IssueRequestRepo, LedgerReadRepo, MasterDataRepo};
use crate::store::LedgerStore;

const DATASET_SCHEMA_VERSION: u32 = 1;

#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Corrupt {
        dataset: &'static str,
        reason: String,
    },
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Corrupt { dataset, reason } => {
                write!(f, "dataset {dataset} is corrupt: {reason}")
            }
        }
    }
}

impl std::error::Error for DatasetError {}

impl From<std::io::Error> for DatasetError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// The seven durable DLMS datasets, one JSON document each under the
/// data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetName {
    Users,
    Items,
    Departments,
    S156,
    Ledger,
    Pll,
    Summary,
}

impl DatasetName {
    pub fn file_name(self) -> &'static str {
        match self {
            DatasetName::Users => "users.json",
            DatasetName::Items => "items.json",
            DatasetName::Departments => "departments.json",
            DatasetName::S156 => "s156.json",
            DatasetName::Ledger => "ledger.json",
            DatasetName::Pll => "pll.json",
            DatasetName::Summary => "summary.json",
        }
    }

    fn table(self) -> &'static str {
        match self {
            DatasetName::Users => "users",
            DatasetName::Items => "items",
            DatasetName::Departments => "departments",
            DatasetName::S156 => "s156",
            DatasetName::Ledger => "ledger",
            DatasetName::Pll => "pll",
            DatasetName::Summary => "summary",
        }
    }
}

// Raw durable rows. Every column defaults, so a document written before
// a column existed backfills with the empty value on load (additive,
// non-destructive schema evolution).

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct UserRow {
    #[serde(default)]
    username: String,
    #[serde(default)]
    role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ItemRow {
    #[serde(default)]
    item: String,
    #[serde(default)]
    ledger: String,
    #[serde(default)]
    folio: String,
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct DepartmentRow {
    #[serde(default)]
    department: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct S156Row {
    #[serde(default)]
    request_id: String,
    #[serde(default)]
    item: String,
    #[serde(default)]
    department: String,
    #[serde(default)]
    qty: u32,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LedgerRow {
    #[serde(default)]
    item: String,
    #[serde(default)]
    department: String,
    #[serde(default)]
    qty: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LoanRow {
    #[serde(default)]
    department: String,
    #[serde(default)]
    item: String,
    #[serde(default)]
    qty: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SummaryRow {
    #[serde(default)]
    item: String,
    #[serde(default)]
    department: String,
    #[serde(default)]
    qty: u32,
}

#[derive(Debug, Deserialize)]
struct Document<R> {
    #[serde(default)]
    schema_version: u32,
    #[serde(default = "Vec::new")]
    rows: Vec<R>,
}

#[derive(Debug, Serialize)]
struct DocumentRef<'a, R> {
    schema_version: u32,
    rows: &'a [R],
}

/// Durable record store over one data directory: one JSON document per
/// dataset, whole-document overwrite on save (last-writer-wins,
/// single-writer assumption per session).
#[derive(Debug, Clone)]
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    pub fn for_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: DatasetName) -> PathBuf {
        self.dir.join(name.file_name())
    }

    fn read_rows<R: DeserializeOwned>(&self, name: DatasetName) -> Result<Vec<R>, DatasetError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let doc = serde_json::from_str::<Document<R>>(&raw)?;
        if doc.schema_version > DATASET_SCHEMA_VERSION {
            return Err(DatasetError::Corrupt {
                dataset: name.table(),
                reason: format!("unsupported schema_version {}", doc.schema_version),
            });
        }
        Ok(doc.rows)
    }

    fn write_rows<R: Serialize>(&self, name: DatasetName, rows: &[R]) -> Result<(), DatasetError> {
        fs::create_dir_all(&self.dir)?;
        let doc = DocumentRef {
            schema_version: DATASET_SCHEMA_VERSION,
            rows,
        };
        let serialized = serde_json::to_vec_pretty(&doc)?;
        atomic_write(&self.path(name), &serialized)?;
        Ok(())
    }

    /// Load all seven datasets into a typed store. A missing file is
    /// the empty dataset.
    pub fn load_ledger_store(&self) -> Result<LedgerStore, DatasetError> {
        let users = self
            .read_rows::<UserRow>(DatasetName::Users)?
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let items = self
            .read_rows::<ItemRow>(DatasetName::Items)?
            .iter()
            .map(item_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let departments = self
            .read_rows::<DepartmentRow>(DatasetName::Departments)?
            .iter()
            .map(department_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let s156 = self
            .read_rows::<S156Row>(DatasetName::S156)?
            .iter()
            .map(s156_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let ledger = self
            .read_rows::<LedgerRow>(DatasetName::Ledger)?
            .iter()
            .map(ledger_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let pll = self
            .read_rows::<LoanRow>(DatasetName::Pll)?
            .iter()
            .map(loan_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let summary = self
            .read_rows::<SummaryRow>(DatasetName::Summary)?
            .iter()
            .map(summary_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LedgerStore::from_collections(
            users,
            items,
            departments,
            s156,
            ledger,
            pll,
            summary,
        ))
    }

    pub fn load_users(&self) -> Result<Vec<UserRecord>, DatasetError> {
        self.read_rows::<UserRow>(DatasetName::Users)?
            .iter()
            .map(user_from_row)
            .collect()
    }

    /// Tool-level bootstrap for the read-only users dataset; the core
    /// never mutates users.
    pub fn append_user(&self, record: &UserRecord) -> Result<(), DatasetError> {
        let mut rows = self.read_rows::<UserRow>(DatasetName::Users)?;
        if rows.iter().any(|r| r.username == record.username.as_str()) {
            return Err(DatasetError::Corrupt {
                dataset: "users",
                reason: format!("username '{}' already present", record.username.as_str()),
            });
        }
        rows.push(user_to_row(record));
        self.write_rows(DatasetName::Users, &rows)
    }

    pub fn save_items(&self, store: &LedgerStore) -> Result<(), DatasetError> {
        let rows: Vec<ItemRow> = store.items().iter().map(item_to_row).collect();
        self.write_rows(DatasetName::Items, &rows)
    }

    pub fn save_departments(&self, store: &LedgerStore) -> Result<(), DatasetError> {
        let rows: Vec<DepartmentRow> = store.departments().iter().map(department_to_row).collect();
        self.write_rows(DatasetName::Departments, &rows)
    }

    pub fn save_s156(&self, store: &LedgerStore) -> Result<(), DatasetError> {
        let rows: Vec<S156Row> = store.s156_rows().iter().map(s156_to_row).collect();
        self.write_rows(DatasetName::S156, &rows)
    }

    pub fn save_summary(&self, store: &LedgerStore) -> Result<(), DatasetError> {
        let rows: Vec<SummaryRow> = store.summary_rows().iter().map(summary_to_row).collect();
        self.write_rows(DatasetName::Summary, &rows)
    }

    /// Persist the Admin-approval outcome: the request dataset plus the
    /// two ledgers it fanned out into, in that order. The first failing
    /// write stops the sequence and is surfaced to the caller; the
    /// at-most-one-of-three-fails window is an accepted limitation.
    pub fn save_approval_outcome(&self, store: &LedgerStore) -> Result<(), DatasetError> {
        self.save_s156(store)?;
        let ledger_rows: Vec<LedgerRow> = store.ledger_rows().iter().map(ledger_to_row).collect();
        self.write_rows(DatasetName::Ledger, &ledger_rows)?;
        let loan_rows: Vec<LoanRow> = store.loan_rows().iter().map(loan_to_row).collect();
        self.write_rows(DatasetName::Pll, &loan_rows)
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), DatasetError> {
    let mut tmp = path.to_path_buf();
    tmp.set_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(tmp, path)?;
    Ok(())
}

fn corrupt(dataset: &'static str) -> impl Fn(ContractViolation) -> DatasetError {
    move |violation| DatasetError::Corrupt {
        dataset,
        reason: violation.to_string(),
    }
}

fn user_from_row(row: &UserRow) -> Result<UserRecord, DatasetError> {
    let username = Username::new(row.username.clone()).map_err(corrupt("users"))?;
    let role = Role::parse(&row.role).ok_or_else(|| DatasetError::Corrupt {
        dataset: "users",
        reason: format!("unknown role '{}' for user '{}'", row.role, row.username),
    })?;
    UserRecord::v1(username, role).map_err(corrupt("users"))
}

fn user_to_row(record: &UserRecord) -> UserRow {
    UserRow {
        username: record.username.as_str().to_string(),
        role: record.role.as_str().to_string(),
    }
}

fn item_from_row(row: &ItemRow) -> Result<ItemRecord, DatasetError> {
    let item = ItemName::new(row.item.clone()).map_err(corrupt("items"))?;
    let folio = LedgerFolio::new(row.ledger.clone(), row.folio.clone()).map_err(corrupt("items"))?;
    let kind = ItemKind::parse(&row.kind).ok_or_else(|| DatasetError::Corrupt {
        dataset: "items",
        reason: format!("unknown item type '{}' for item '{}'", row.kind, row.item),
    })?;
    ItemRecord::v1(item, folio, kind).map_err(corrupt("items"))
}

fn item_to_row(record: &ItemRecord) -> ItemRow {
    ItemRow {
        item: record.item.as_str().to_string(),
        ledger: record.folio.ledger.clone(),
        folio: record.folio.folio.clone(),
        kind: record.kind.as_str().to_string(),
    }
}

fn department_from_row(row: &DepartmentRow) -> Result<DepartmentRecord, DatasetError> {
    let department =
        DepartmentName::new(row.department.clone()).map_err(corrupt("departments"))?;
    DepartmentRecord::v1(department).map_err(corrupt("departments"))
}

fn department_to_row(record: &DepartmentRecord) -> DepartmentRow {
    DepartmentRow {
        department: record.department.as_str().to_string(),
    }
}

fn s156_from_row(row: &S156Row) -> Result<IssueRequestRecord, DatasetError> {
    let request_id = S156Id::new(row.request_id.clone()).map_err(corrupt("s156"))?;
    let item = ItemName::new(row.item.clone()).map_err(corrupt("s156"))?;
    let department = DepartmentName::new(row.department.clone()).map_err(corrupt("s156"))?;
    let status = RequestStatus::parse(&row.status).ok_or_else(|| DatasetError::Corrupt {
        dataset: "s156",
        reason: format!(
            "unknown status '{}' for request '{}'",
            row.status, row.request_id
        ),
    })?;
    IssueRequestRecord::v1(request_id, item, department, row.qty, status).map_err(corrupt("s156"))
}

fn s156_to_row(record: &IssueRequestRecord) -> S156Row {
    S156Row {
        request_id: record.request_id.as_str().to_string(),
        item: record.item.as_str().to_string(),
        department: record.department.as_str().to_string(),
        qty: record.quantity,
        status: record.status.as_str().to_string(),
    }
}

fn ledger_from_row(row: &LedgerRow) -> Result<LedgerEntryRecord, DatasetError> {
    let item = ItemName::new(row.item.clone()).map_err(corrupt("ledger"))?;
    let department = DepartmentName::new(row.department.clone()).map_err(corrupt("ledger"))?;
    LedgerEntryRecord::v1(item, department, row.qty).map_err(corrupt("ledger"))
}

fn ledger_to_row(record: &LedgerEntryRecord) -> LedgerRow {
    LedgerRow {
        item: record.item.as_str().to_string(),
        department: record.department.as_str().to_string(),
        qty: record.quantity,
    }
}

fn loan_from_row(row: &LoanRow) -> Result<LoanEntryRecord, DatasetError> {
    let department = DepartmentName::new(row.department.clone()).map_err(corrupt("pll"))?;
    let item = ItemName::new(row.item.clone()).map_err(corrupt("pll"))?;
    LoanEntryRecord::v1(department, item, row.qty).map_err(corrupt("pll"))
}

fn loan_to_row(record: &LoanEntryRecord) -> LoanRow {
    LoanRow {
        department: record.department.as_str().to_string(),
        item: record.item.as_str().to_string(),
        qty: record.quantity,
    }
}

fn summary_from_row(row: &SummaryRow) -> Result<SummaryEntryRecord, DatasetError> {
    let item = ItemName::new(row.item.clone()).map_err(corrupt("summary"))?;
    let department = DepartmentName::new(row.department.clone()).map_err(corrupt("summary"))?;
    SummaryEntryRecord::v1(item, department, row.qty).map_err(corrupt("summary"))
}

fn summary_to_row(record: &SummaryEntryRecord) -> SummaryRow {
    SummaryRow {
        item: record.item.as_str().to_string(),
        department: record.department.as_str().to_string(),
        qty: record.quantity,
    }
}
