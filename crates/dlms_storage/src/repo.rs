#![forbid(unsafe_code)]

use dlms_contracts::ledger::{LedgerEntryRecord, LoanEntryRecord, SummaryEntryRecord};
use dlms_contracts::master::{DepartmentRecord, ItemKind, ItemRecord};
use dlms_contracts::s156::{IssueRequestRecord, RequestStatus, S156Id};

use crate::store::StorageError;

/// Typed repository interface for the item and department catalogs.
pub trait MasterDataRepo {
    fn append_item_row(&mut self, record: ItemRecord) -> Result<(), StorageError>;
    fn append_department_row(&mut self, record: DepartmentRecord) -> Result<(), StorageError>;
    fn items(&self) -> &[ItemRecord];
    fn items_of_kind(&self, kind: ItemKind) -> Vec<&ItemRecord>;
    fn departments(&self) -> &[DepartmentRecord];
}

/// Typed repository interface for the S-156 request dataset and the
/// two ledgers it fans out into on final approval.
pub trait IssueRequestRepo {
    fn append_s156_row(&mut self, record: IssueRequestRecord) -> Result<(), StorageError>;
    fn set_s156_status(
        &mut self,
        request_id: &S156Id,
        expected: RequestStatus,
        next: RequestStatus,
    ) -> Result<IssueRequestRecord, StorageError>;
    fn append_ledger_row(&mut self, record: LedgerEntryRecord) -> Result<(), StorageError>;
    fn append_loan_row(&mut self, record: LoanEntryRecord) -> Result<(), StorageError>;
    fn s156_rows(&self) -> &[IssueRequestRecord];
    fn s156_row(&self, request_id: &S156Id) -> Option<&IssueRequestRecord>;
}

/// Direct Consumable issue appends; this path never touches the S-156
/// datasets.
pub trait ConsumableSummaryRepo {
    fn append_summary_row(&mut self, record: SummaryEntryRecord) -> Result<(), StorageError>;
}

/// Read-only ledger projections.
pub trait LedgerReadRepo {
    fn ledger_rows(&self) -> &[LedgerEntryRecord];
    fn loan_rows(&self) -> &[LoanEntryRecord];
    fn summary_rows(&self) -> &[SummaryEntryRecord];
}
