#![forbid(unsafe_code)]

use dlms_contracts::access::Role;
use dlms_contracts::master::{
    DepartmentName, DepartmentRecord, ItemKind, ItemName, ItemRecord, LedgerFolio,
};
use dlms_storage::repo::MasterDataRepo;
use dlms_storage::store::LedgerStore;

use crate::error::ServiceError;
use crate::session::require_role;

/// Master-data registration and listing. Registration is Store-role
/// only; items follow the strict duplicate policy (the store rejects a
/// second case-insensitive (name, folio) pair), departments append
/// unconditionally.
#[derive(Debug, Default, Clone)]
pub struct RegistryRuntime;

impl RegistryRuntime {
    pub fn register_item(
        &self,
        store: &mut LedgerStore,
        actor: Role,
        item: &str,
        ledger: &str,
        folio: &str,
        kind: ItemKind,
    ) -> Result<ItemRecord, ServiceError> {
        require_role(actor, Role::Store, "register items")?;
        let record = ItemRecord::v1(
            ItemName::new(item)?,
            LedgerFolio::new(ledger, folio)?,
            kind,
        )?;
        store.append_item_row(record.clone())?;
        Ok(record)
    }

    pub fn register_department(
        &self,
        store: &mut LedgerStore,
        actor: Role,
        department: &str,
    ) -> Result<DepartmentRecord, ServiceError> {
        require_role(actor, Role::Store, "register departments")?;
        let record = DepartmentRecord::v1(DepartmentName::new(department)?)?;
        store.append_department_row(record.clone())?;
        Ok(record)
    }

    pub fn list_items<'a>(
        &self,
        store: &'a LedgerStore,
        kind: Option<ItemKind>,
    ) -> Vec<&'a ItemRecord> {
        match kind {
            Some(kind) => store.items_of_kind(kind),
            None => store.items().iter().collect(),
        }
    }

    pub fn list_departments<'a>(&self, store: &'a LedgerStore) -> &'a [DepartmentRecord] {
        store.departments()
    }
}
