#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use dlms_contracts::access::{Role, UserRecord, Username};
use dlms_contracts::ledger::{LedgerEntryRecord, LoanEntryRecord, SummaryEntryRecord};
use dlms_contracts::master::{
    DepartmentName, DepartmentRecord, ItemKind, ItemName, ItemRecord, LedgerFolio,
};
use dlms_contracts::s156::{IssueRequestRecord, RequestStatus, S156Id};
use dlms_storage::dataset::{DatasetError, DatasetStore};
use dlms_storage::repo::{ConsumableSummaryRepo, IssueRequestRepo, LedgerReadRepo, MasterDataRepo};
use dlms_storage::store::LedgerStore;

fn temp_dir(name: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(1);
    std::env::temp_dir().join(format!("dlms-dataset-test-{name}-{suffix}"))
}

fn populated_store() -> LedgerStore {
    let mut s = LedgerStore::new_in_memory();
    s.insert_user_row(UserRecord::v1(Username::new("store1").unwrap(), Role::Store).unwrap())
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
    s.append_item_row(
        ItemRecord::v1(
            ItemName::new("Cleaning Cloth").unwrap(),
            LedgerFolio::new("Stationary", "3").unwrap(),
            ItemKind::Consumable,
        )
        .unwrap(),
    )
    .unwrap();
    s.append_department_row(
        DepartmentRecord::v1(DepartmentName::new("Signals").unwrap()).unwrap(),
    )
    .unwrap();
    s.append_s156_row(
        IssueRequestRecord::v1(
            S156Id::new("s156_1_aa11").unwrap(),
            ItemName::new("Rifle Cleaning Kit").unwrap(),
            DepartmentName::new("Signals").unwrap(),
            5,
            RequestStatus::Approved,
        )
        .unwrap(),
    )
    .unwrap();
    s.append_ledger_row(
        LedgerEntryRecord::v1(
            ItemName::new("Rifle Cleaning Kit").unwrap(),
            DepartmentName::new("Signals").unwrap(),
            5,
        )
        .unwrap(),
    )
    .unwrap();
    s.append_loan_row(
        LoanEntryRecord::v1(
            DepartmentName::new("Signals").unwrap(),
            ItemName::new("Rifle Cleaning Kit").unwrap(),
            5,
        )
        .unwrap(),
    )
    .unwrap();
    s.append_summary_row(
        SummaryEntryRecord::v1(
            ItemName::new("Cleaning Cloth").unwrap(),
            DepartmentName::new("Signals").unwrap(),
            2,
        )
        .unwrap(),
    )
    .unwrap();
    s
}

fn save_everything(datasets: &DatasetStore, store: &LedgerStore) {
    datasets.save_items(store).unwrap();
    datasets.save_departments(store).unwrap();
    datasets.save_approval_outcome(store).unwrap();
    datasets.save_summary(store).unwrap();
}

#[test]
fn at_dataset_db_01_missing_files_load_as_the_empty_store() {
    let dir = temp_dir("empty");
    let datasets = DatasetStore::for_dir(dir.clone());
    let store = datasets.load_ledger_store().unwrap();
    assert!(store.items().is_empty());
    assert!(store.departments().is_empty());
    assert!(store.s156_rows().is_empty());
    assert!(store.ledger_rows().is_empty());
    assert!(store.loan_rows().is_empty());
    assert!(store.summary_rows().is_empty());
}

#[test]
fn at_dataset_db_02_save_then_load_reproduces_every_ordered_sequence() {
    let dir = temp_dir("roundtrip");
    let datasets = DatasetStore::for_dir(dir.clone());
    let store = populated_store();
    save_everything(&datasets, &store);
    datasets
        .append_user(&UserRecord::v1(Username::new("store1").unwrap(), Role::Store).unwrap())
        .unwrap();

    let loaded = datasets.load_ledger_store().unwrap();
    assert_eq!(loaded.items(), store.items());
    assert_eq!(loaded.departments(), store.departments());
    assert_eq!(loaded.s156_rows(), store.s156_rows());
    assert_eq!(loaded.ledger_rows(), store.ledger_rows());
    assert_eq!(loaded.loan_rows(), store.loan_rows());
    assert_eq!(loaded.summary_rows(), store.summary_rows());
    assert_eq!(
        loaded.user_role(&Username::new("store1").unwrap()),
        Some(Role::Store)
    );

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn at_dataset_db_03_documents_backfill_columns_added_after_the_write() {
    let dir = temp_dir("backfill");
    fs::create_dir_all(&dir).unwrap();
    // A document written before the ledger-tag column existed.
    fs::write(
        dir.join("items.json"),
        r#"{
  "schema_version": 1,
  "rows": [
    { "item": "Compass", "folio": "7", "type": "Permanent" }
  ]
}"#,
    )
    .unwrap();

    let datasets = DatasetStore::for_dir(dir.clone());
    let store = datasets.load_ledger_store().unwrap();
    assert_eq!(store.items().len(), 1);
    assert_eq!(store.items()[0].item.as_str(), "Compass");
    assert_eq!(store.items()[0].folio.ledger, "");
    assert_eq!(store.items()[0].folio.folio, "7");

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn at_dataset_db_04_bad_enum_values_surface_as_corrupt_not_panic() {
    let dir = temp_dir("corrupt-enum");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("users.json"),
        r#"{ "schema_version": 1, "rows": [ { "username": "boss1", "role": "Boss" } ] }"#,
    )
    .unwrap();

    let datasets = DatasetStore::for_dir(dir.clone());
    let err = datasets.load_ledger_store().unwrap_err();
    assert!(matches!(
        err,
        DatasetError::Corrupt {
            dataset: "users",
            ..
        }
    ));

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn at_dataset_db_05_malformed_json_is_a_json_error() {
    let dir = temp_dir("corrupt-json");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("departments.json"), "{ not json").unwrap();

    let datasets = DatasetStore::for_dir(dir.clone());
    assert!(matches!(
        datasets.load_ledger_store().unwrap_err(),
        DatasetError::Json(_)
    ));

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn at_dataset_db_06_newer_schema_versions_are_refused() {
    let dir = temp_dir("version");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("summary.json"),
        r#"{ "schema_version": 99, "rows": [] }"#,
    )
    .unwrap();

    let datasets = DatasetStore::for_dir(dir.clone());
    assert!(matches!(
        datasets.load_ledger_store().unwrap_err(),
        DatasetError::Corrupt {
            dataset: "summary",
            ..
        }
    ));

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn at_dataset_db_07_save_overwrites_the_whole_document() {
    let dir = temp_dir("overwrite");
    let datasets = DatasetStore::for_dir(dir.clone());
    let store = populated_store();
    datasets.save_departments(&store).unwrap();

    // A later save from an emptier session wins wholesale.
    let empty = LedgerStore::new_in_memory();
    datasets.save_departments(&empty).unwrap();
    let loaded = datasets.load_ledger_store().unwrap();
    assert!(loaded.departments().is_empty());

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn at_dataset_db_08_append_user_rejects_duplicate_usernames() {
    let dir = temp_dir("users");
    let datasets = DatasetStore::for_dir(dir.clone());
    let record = UserRecord::v1(Username::new("store1").unwrap(), Role::Store).unwrap();
    datasets.append_user(&record).unwrap();
    assert!(matches!(
        datasets.append_user(&record).unwrap_err(),
        DatasetError::Corrupt {
            dataset: "users",
            ..
        }
    ));
    assert_eq!(datasets.load_users().unwrap().len(), 1);

    fs::remove_dir_all(dir).unwrap();
}
