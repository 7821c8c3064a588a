#![forbid(unsafe_code)]

use dlms_contracts::ledger::{LedgerEntryRecord, LoanEntryRecord, SummaryEntryRecord};
use dlms_contracts::master::{
    DepartmentName, DepartmentRecord, ItemKind, ItemName, ItemRecord, LedgerFolio,
};
use dlms_storage::repo::{ConsumableSummaryRepo, IssueRequestRepo, LedgerReadRepo, MasterDataRepo};
use dlms_storage::store::{LedgerStore, StorageError};

fn seeded_store() -> LedgerStore {
    let mut s = LedgerStore::new_in_memory();
    s.append_item_row(
        ItemRecord::v1(
            ItemName::new("Cleaning Cloth").unwrap(),
            LedgerFolio::new("Naval store consumable", "3").unwrap(),
            ItemKind::Consumable,
        )
        .unwrap(),
    )
    .unwrap();
    s.append_item_row(
        ItemRecord::v1(
            ItemName::new("Rifle Cleaning Kit").unwrap(),
            LedgerFolio::new("ARS", "12").unwrap(),
            ItemKind::Permanent,
        )
        .unwrap(),
    )
    .unwrap();
    s.append_department_row(
        DepartmentRecord::v1(DepartmentName::new("Signals").unwrap()).unwrap(),
    )
    .unwrap();
    s
}

fn summary_entry(item: &str, department: &str, qty: u32) -> SummaryEntryRecord {
    SummaryEntryRecord::v1(
        ItemName::new(item).unwrap(),
        DepartmentName::new(department).unwrap(),
        qty,
    )
    .unwrap()
}

#[test]
fn at_ledger_db_01_summary_appends_require_a_consumable_item() {
    let mut s = seeded_store();
    let err = s
        .append_summary_row(summary_entry("Rifle Cleaning Kit", "Signals", 2))
        .unwrap_err();
    assert!(matches!(err, StorageError::ContractViolation(_)));

    let err = s
        .append_summary_row(summary_entry("Sextant", "Signals", 2))
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::ForeignKeyViolation { table: "items", .. }
    ));
    assert!(s.summary_rows().is_empty());
}

#[test]
fn at_ledger_db_02_summary_appends_require_a_registered_department() {
    let mut s = seeded_store();
    let err = s
        .append_summary_row(summary_entry("Cleaning Cloth", "Gunnery", 2))
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::ForeignKeyViolation {
            table: "departments",
            ..
        }
    ));
}

#[test]
fn at_ledger_db_03_ledger_and_loan_rows_keep_append_order() {
    let mut s = seeded_store();
    let item = ItemName::new("Rifle Cleaning Kit").unwrap();
    let dept = DepartmentName::new("Signals").unwrap();
    for qty in [5, 2] {
        s.append_ledger_row(LedgerEntryRecord::v1(item.clone(), dept.clone(), qty).unwrap())
            .unwrap();
        s.append_loan_row(LoanEntryRecord::v1(dept.clone(), item.clone(), qty).unwrap())
            .unwrap();
    }
    assert_eq!(s.ledger_rows().len(), 2);
    assert_eq!(s.ledger_rows()[0].quantity, 5);
    assert_eq!(s.ledger_rows()[1].quantity, 2);
    assert_eq!(s.loan_rows()[0].quantity, 5);
    assert_eq!(s.loan_rows()[1].quantity, 2);
}

#[test]
fn at_ledger_db_04_summary_appends_accumulate_in_order() {
    let mut s = seeded_store();
    s.append_summary_row(summary_entry("Cleaning Cloth", "Signals", 2))
        .unwrap();
    s.append_summary_row(summary_entry("Cleaning Cloth", "Signals", 7))
        .unwrap();
    assert_eq!(s.summary_rows().len(), 2);
    assert_eq!(s.summary_rows()[1].quantity, 7);
}
