#![forbid(unsafe_code)]

use dlms_contracts::access::{Role, UserRecord, Username};
use dlms_contracts::master::{
    DepartmentName, DepartmentRecord, ItemKind, ItemName, ItemRecord, LedgerFolio,
};
use dlms_storage::repo::MasterDataRepo;
use dlms_storage::store::{LedgerStore, StorageError};

fn item(name: &str, ledger: &str, folio: &str, kind: ItemKind) -> ItemRecord {
    ItemRecord::v1(
        ItemName::new(name).unwrap(),
        LedgerFolio::new(ledger, folio).unwrap(),
        kind,
    )
    .unwrap()
}

fn department(name: &str) -> DepartmentRecord {
    DepartmentRecord::v1(DepartmentName::new(name).unwrap()).unwrap()
}

#[test]
fn at_master_db_01_duplicate_name_folio_pair_is_rejected_case_insensitively() {
    let mut s = LedgerStore::new_in_memory();
    s.append_item_row(item("Compass", "ARS", "12", ItemKind::Permanent))
        .unwrap();

    let err = s
        .append_item_row(item("COMPASS", "ARS", "12", ItemKind::Permanent))
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::DuplicateKey { table: "items", .. }
    ));
    assert_eq!(s.items().len(), 1);
}

#[test]
fn at_master_db_02_same_name_different_folio_is_a_new_item() {
    let mut s = LedgerStore::new_in_memory();
    s.append_item_row(item("Compass", "ARS", "12", ItemKind::Permanent))
        .unwrap();
    s.append_item_row(item("Compass", "ARS", "13", ItemKind::Permanent))
        .unwrap();
    assert_eq!(s.items().len(), 2);
}

#[test]
fn at_master_db_03_departments_append_without_uniqueness() {
    let mut s = LedgerStore::new_in_memory();
    s.append_department_row(department("Signals")).unwrap();
    s.append_department_row(department("Signals")).unwrap();
    assert_eq!(s.departments().len(), 2);
}

#[test]
fn at_master_db_04_items_of_kind_filters_but_keeps_order() {
    let mut s = LedgerStore::new_in_memory();
    s.append_item_row(item("Compass", "ARS", "1", ItemKind::Permanent))
        .unwrap();
    s.append_item_row(item("Cleaning Cloth", "Stationary", "2", ItemKind::Consumable))
        .unwrap();
    s.append_item_row(item("Sextant", "ARS", "3", ItemKind::Permanent))
        .unwrap();

    let permanent = s.items_of_kind(ItemKind::Permanent);
    assert_eq!(permanent.len(), 2);
    assert_eq!(permanent[0].item.as_str(), "Compass");
    assert_eq!(permanent[1].item.as_str(), "Sextant");
}

#[test]
fn at_master_db_05_usernames_are_unique() {
    let mut s = LedgerStore::new_in_memory();
    s.insert_user_row(
        UserRecord::v1(Username::new("store1").unwrap(), Role::Store).unwrap(),
    )
    .unwrap();
    let err = s
        .insert_user_row(
            UserRecord::v1(Username::new("store1").unwrap(), Role::Admin).unwrap(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::DuplicateKey { table: "users", .. }
    ));
    assert_eq!(
        s.user_role(&Username::new("store1").unwrap()),
        Some(Role::Store)
    );
}
