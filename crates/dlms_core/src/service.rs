#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use dlms_contracts::access::Role;
use dlms_contracts::ledger::{LedgerEntryRecord, LoanEntryRecord, SummaryEntryRecord};
use dlms_contracts::master::{DepartmentRecord, ItemKind, ItemRecord};
use dlms_contracts::s156::{IssueRequestRecord, S156Id};
use dlms_storage::dataset::DatasetStore;
use dlms_storage::repo::{IssueRequestRepo, LedgerReadRepo};
use dlms_storage::store::LedgerStore;

use crate::error::ServiceError;
use crate::registry::RegistryRuntime;
use crate::s156::{AdvanceResult, S156Runtime};
use crate::session::{resolve_session, SessionContext};
use crate::summary::SummaryRuntime;

/// Session-scoped service owning the typed in-memory collections and
/// the durable dataset store beneath them. Constructed once per
/// session; every successful mutation persists the affected datasets
/// before returning. Single-writer assumption: concurrent sessions are
/// last-writer-wins on disk.
#[derive(Debug)]
pub struct DlmsService {
    datasets: DatasetStore,
    store: LedgerStore,
    registry: RegistryRuntime,
    s156: S156Runtime,
    summary: SummaryRuntime,
}

impl DlmsService {
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let datasets = DatasetStore::for_dir(data_dir);
        let store = datasets.load_ledger_store()?;
        Ok(Self {
            datasets,
            store,
            registry: RegistryRuntime,
            s156: S156Runtime,
            summary: SummaryRuntime,
        })
    }

    pub fn data_dir(&self) -> &Path {
        self.datasets.dir()
    }

    pub fn resolve_session(&self, username: &str) -> Result<SessionContext, ServiceError> {
        resolve_session(&self.store, username)
    }

    pub fn register_item(
        &mut self,
        actor: Role,
        item: &str,
        ledger: &str,
        folio: &str,
        kind: ItemKind,
    ) -> Result<ItemRecord, ServiceError> {
        let record = self
            .registry
            .register_item(&mut self.store, actor, item, ledger, folio, kind)?;
        self.datasets.save_items(&self.store)?;
        Ok(record)
    }

    pub fn register_department(
        &mut self,
        actor: Role,
        department: &str,
    ) -> Result<DepartmentRecord, ServiceError> {
        let record = self
            .registry
            .register_department(&mut self.store, actor, department)?;
        self.datasets.save_departments(&self.store)?;
        Ok(record)
    }

    pub fn raise_request(
        &mut self,
        actor: Role,
        item: &str,
        department: &str,
        quantity: u32,
    ) -> Result<IssueRequestRecord, ServiceError> {
        let record = self
            .s156
            .raise_request(&mut self.store, actor, item, department, quantity)?;
        self.datasets.save_s156(&self.store)?;
        Ok(record)
    }

    /// Advance one request. The Department step persists the request
    /// dataset alone; the Admin step persists s156 + ledger + pll
    /// together (first failing write surfaces as `Dataset`).
    pub fn advance(
        &mut self,
        actor: Role,
        request_id: &S156Id,
    ) -> Result<AdvanceResult, ServiceError> {
        let outcome = self.s156.advance(&mut self.store, actor, request_id)?;
        if outcome.ledger_entry.is_some() {
            self.datasets.save_approval_outcome(&self.store)?;
        } else {
            self.datasets.save_s156(&self.store)?;
        }
        Ok(outcome)
    }

    pub fn record_issue(
        &mut self,
        actor: Role,
        item: &str,
        department: &str,
        quantity: u32,
    ) -> Result<SummaryEntryRecord, ServiceError> {
        let record = self
            .summary
            .record_issue(&mut self.store, actor, item, department, quantity)?;
        self.datasets.save_summary(&self.store)?;
        Ok(record)
    }

    pub fn items(&self, kind: Option<ItemKind>) -> Vec<&ItemRecord> {
        self.registry.list_items(&self.store, kind)
    }

    pub fn departments(&self) -> &[DepartmentRecord] {
        self.registry.list_departments(&self.store)
    }

    pub fn requests(&self) -> &[IssueRequestRecord] {
        self.s156.list_requests(&self.store)
    }

    pub fn request(&self, request_id: &S156Id) -> Option<&IssueRequestRecord> {
        self.store.s156_row(request_id)
    }

    pub fn ledger(&self) -> &[LedgerEntryRecord] {
        self.store.ledger_rows()
    }

    pub fn loan_ledger(&self) -> &[LoanEntryRecord] {
        self.store.loan_rows()
    }

    pub fn summary(&self) -> &[SummaryEntryRecord] {
        self.store.summary_rows()
    }
}
