#![forbid(unsafe_code)]

use dlms_contracts::access::Role;
use dlms_contracts::ledger::SummaryEntryRecord;
use dlms_contracts::master::{DepartmentName, ItemName};
use dlms_storage::repo::ConsumableSummaryRepo;
use dlms_storage::store::LedgerStore;

use crate::error::ServiceError;
use crate::session::require_role;

/// Direct Consumable issues. This path bypasses the S-156 approval
/// workflow entirely; only the summary dataset grows.
#[derive(Debug, Default, Clone)]
pub struct SummaryRuntime;

impl SummaryRuntime {
    pub fn record_issue(
        &self,
        store: &mut LedgerStore,
        actor: Role,
        item: &str,
        department: &str,
        quantity: u32,
    ) -> Result<SummaryEntryRecord, ServiceError> {
        require_role(actor, Role::Store, "record a consumable issue")?;
        let record = SummaryEntryRecord::v1(
            ItemName::new(item)?,
            DepartmentName::new(department)?,
            quantity,
        )?;
        store.append_summary_row(record.clone())?;
        Ok(record)
    }
}
