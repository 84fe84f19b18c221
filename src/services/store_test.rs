use super::*;
use std::collections::HashSet;

use crate::error::ErrorCode;

async fn test_store() -> SvgStore {
    SvgStore::open(&StoreConfig::in_memory()).await.unwrap()
}

fn ids<'a>(records: impl IntoIterator<Item = &'a Svg>) -> HashSet<String> {
    records.into_iter().map(|s| s.id.clone()).collect()
}

const ICON: &str = "<svg><rect/></svg>";

// =============================================================================
// folders
// =============================================================================

#[tokio::test]
async fn add_folder_is_listed_with_fresh_id() {
    let store = test_store().await;
    let a = store.add_folder("Brands").await.unwrap();
    let b = store.add_folder("Brands").await.unwrap();
    assert_ne!(a.id, b.id);

    let folders = store.get_folders().await.unwrap();
    assert_eq!(folders.len(), 2);
    assert!(folders.iter().any(|f| f.id == a.id && f.name == "Brands"));
    assert!(folders.iter().any(|f| f.id == b.id));
}

#[tokio::test]
async fn add_folder_accepts_empty_name() {
    let store = test_store().await;
    let folder = store.add_folder("").await.unwrap();
    assert_eq!(folder.name, "");
    assert_eq!(store.get_folders().await.unwrap(), vec![folder]);
}

#[tokio::test]
async fn update_folder_name_keeps_id_and_created_at() {
    let store = test_store().await;
    let folder = store.add_folder("Old").await.unwrap();
    store.update_folder_name(&folder.id, "New").await.unwrap();

    let renamed = store.get_folder(&folder.id).await.unwrap().unwrap();
    assert_eq!(renamed.name, "New");
    assert_eq!(renamed.id, folder.id);
    assert_eq!(renamed.created_at, folder.created_at);
}

#[tokio::test]
async fn update_folder_name_on_missing_id_is_not_found() {
    let store = test_store().await;
    store.add_folder("Keep").await.unwrap();
    let err = store.update_folder_name("missing", "x").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref id) if id == "missing"));
    assert_eq!(err.error_code(), "E_FOLDER_NOT_FOUND");
    assert!(!err.retryable());
}

#[tokio::test]
async fn get_folder_missing_returns_none() {
    let store = test_store().await;
    assert!(store.get_folder("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_folder_cascades_to_its_svgs_only() {
    let store = test_store().await;
    let doomed = store.add_folder("Doomed").await.unwrap();
    let kept = store.add_folder("Kept").await.unwrap();
    store.add_svg(NewSvg::in_folder(ICON, &doomed.id)).await.unwrap();
    store.add_svg(NewSvg::in_folder(ICON, &doomed.id)).await.unwrap();
    let survivor = store.add_svg(NewSvg::in_folder(ICON, &kept.id)).await.unwrap();
    let root = store.add_svg(NewSvg::root(ICON)).await.unwrap();

    store.delete_folder(&doomed.id).await.unwrap();

    let folders = store.get_folders().await.unwrap();
    assert_eq!(folders, vec![kept.clone()]);
    assert!(store.get_svgs(Some(&doomed.id)).await.unwrap().is_empty());
    assert_eq!(store.get_svgs(Some(&kept.id)).await.unwrap(), vec![survivor]);
    assert_eq!(store.get_svgs(None).await.unwrap(), vec![root]);
}

#[tokio::test]
async fn delete_unknown_folder_is_noop() {
    let store = test_store().await;
    let folder = store.add_folder("Stay").await.unwrap();
    store.delete_folder("unknown").await.unwrap();
    store.delete_folder("unknown").await.unwrap();
    assert_eq!(store.get_folders().await.unwrap(), vec![folder]);
}

// =============================================================================
// svgs
// =============================================================================

#[tokio::test]
async fn add_svg_returns_stored_record() {
    let store = test_store().await;
    let svg = store.add_svg(NewSvg::root(ICON)).await.unwrap();
    assert_eq!(svg.code, ICON);
    assert!(svg.is_root());
    assert!(svg.created_at > 0);
    assert_eq!(store.get_svgs(None).await.unwrap(), vec![svg]);
}

#[tokio::test]
async fn add_svg_with_empty_folder_id_goes_to_root() {
    let store = test_store().await;
    let svg = store.add_svg(NewSvg::in_folder(ICON, "")).await.unwrap();
    assert_eq!(svg.folder_id, None);
    assert_eq!(store.get_svgs(Some("")).await.unwrap(), vec![svg]);
}

#[tokio::test]
async fn root_and_folder_queries_are_disjoint() {
    let store = test_store().await;
    let folder = store.add_folder("Icons").await.unwrap();
    let in_folder = store.add_svg(NewSvg::in_folder(ICON, &folder.id)).await.unwrap();
    let at_root = store.add_svg(NewSvg::root(ICON)).await.unwrap();

    let root = store.get_svgs(None).await.unwrap();
    let scoped = store.get_svgs(Some(&folder.id)).await.unwrap();

    assert_eq!(ids(&root), HashSet::from([at_root.id.clone()]));
    assert_eq!(ids(&scoped), HashSet::from([in_folder.id.clone()]));
    assert!(ids(&root).is_disjoint(&ids(&scoped)));
}

#[tokio::test]
async fn svg_in_missing_folder_is_neither_root_nor_listed() {
    let store = test_store().await;
    let dangling = store.add_svg(NewSvg::in_folder(ICON, "ghost")).await.unwrap();
    let folder = store.add_folder("Real").await.unwrap();

    assert!(store.get_svgs(None).await.unwrap().is_empty());
    assert!(store.get_svgs(Some(&folder.id)).await.unwrap().is_empty());
    assert_eq!(store.get_svgs(Some("ghost")).await.unwrap(), vec![dangling]);
}

#[tokio::test]
async fn delete_svg_removes_one_and_ignores_unknown() {
    let store = test_store().await;
    let a = store.add_svg(NewSvg::root(ICON)).await.unwrap();
    let b = store.add_svg(NewSvg::root(ICON)).await.unwrap();

    store.delete_svg(&a.id).await.unwrap();
    store.delete_svg(&a.id).await.unwrap();
    store.delete_svg("never-existed").await.unwrap();

    assert_eq!(store.get_svgs(None).await.unwrap(), vec![b]);
}

// =============================================================================
// orphans
// =============================================================================

#[tokio::test]
async fn reconcile_orphans_removes_only_dangling_svgs() {
    let store = test_store().await;
    let folder = store.add_folder("Real").await.unwrap();
    let filed = store.add_svg(NewSvg::in_folder(ICON, &folder.id)).await.unwrap();
    let root = store.add_svg(NewSvg::root(ICON)).await.unwrap();
    let orphan = store.add_svg(NewSvg::in_folder(ICON, "ghost")).await.unwrap();

    assert_eq!(store.orphaned_svgs().await.unwrap(), vec![orphan]);
    assert_eq!(store.reconcile_orphans().await.unwrap(), 1);
    assert_eq!(store.reconcile_orphans().await.unwrap(), 0);
    assert!(store.orphaned_svgs().await.unwrap().is_empty());

    assert_eq!(store.get_svgs(Some(&folder.id)).await.unwrap(), vec![filed]);
    assert_eq!(store.get_svgs(None).await.unwrap(), vec![root]);
}

// =============================================================================
// export / import
// =============================================================================

#[tokio::test]
async fn export_contains_every_record() {
    let store = test_store().await;
    let folder = store.add_folder("Icons").await.unwrap();
    store.add_svg(NewSvg::in_folder(ICON, &folder.id)).await.unwrap();
    store.add_svg(NewSvg::root(ICON)).await.unwrap();
    store.add_svg(NewSvg::in_folder(ICON, "ghost")).await.unwrap();

    let json: serde_json::Value = serde_json::from_str(&store.export_data().await.unwrap()).unwrap();
    assert_eq!(json["folders"].as_array().unwrap().len(), 1);
    assert_eq!(json["svgs"].as_array().unwrap().len(), 3);
    assert!(json["exportedAt"].is_string());
}

#[tokio::test]
async fn export_then_import_round_trips() {
    let store = test_store().await;
    let folder = store.add_folder("Icons").await.unwrap();
    store.add_svg(NewSvg::in_folder(ICON, &folder.id)).await.unwrap();
    store.add_svg(NewSvg::root("<svg><circle/></svg>")).await.unwrap();

    let folders_before = store.get_folders().await.unwrap();
    let root_before = ids(&store.get_svgs(None).await.unwrap());
    let scoped_before = ids(&store.get_svgs(Some(&folder.id)).await.unwrap());

    let exported = store.export_data().await.unwrap();
    store.add_folder("Added after export").await.unwrap();
    store.add_svg(NewSvg::root(ICON)).await.unwrap();
    store.import_data(&exported).await.unwrap();

    assert_eq!(store.get_folders().await.unwrap(), folders_before);
    assert_eq!(ids(&store.get_svgs(None).await.unwrap()), root_before);
    assert_eq!(ids(&store.get_svgs(Some(&folder.id)).await.unwrap()), scoped_before);
}

#[tokio::test]
async fn import_into_second_store_copies_collection() {
    let source = test_store().await;
    let folder = source.add_folder("Icons").await.unwrap();
    let svg = source.add_svg(NewSvg::in_folder(ICON, &folder.id)).await.unwrap();

    let target = test_store().await;
    target.add_folder("Will be replaced").await.unwrap();
    target.import_data(&source.export_data().await.unwrap()).await.unwrap();

    assert_eq!(target.get_folders().await.unwrap(), vec![folder.clone()]);
    assert_eq!(target.get_svgs(Some(&folder.id)).await.unwrap(), vec![svg]);
}

#[tokio::test]
async fn import_rejects_non_array_and_keeps_data() {
    let store = test_store().await;
    let folder = store.add_folder("Keep").await.unwrap();
    let svg = store.add_svg(NewSvg::root(ICON)).await.unwrap();

    let err = store.import_data(r#"{"folders": "not-an-array", "svgs": []}"#).await.unwrap_err();
    assert!(matches!(err, StoreError::Format(_)));
    assert_eq!(err.error_code(), "E_FORMAT");

    assert_eq!(store.get_folders().await.unwrap(), vec![folder]);
    assert_eq!(store.get_svgs(None).await.unwrap(), vec![svg]);
}

#[tokio::test]
async fn import_rejects_unparseable_json_and_keeps_data() {
    let store = test_store().await;
    let folder = store.add_folder("Keep").await.unwrap();

    let err = store.import_data("definitely not json").await.unwrap_err();
    assert!(matches!(err, StoreError::Format(BackupError::InvalidJson(_))));
    assert_eq!(store.get_folders().await.unwrap(), vec![folder]);
}

#[tokio::test]
async fn import_duplicate_ids_keep_last_record() {
    let store = test_store().await;
    let json = r#"{
        "folders": [
            {"id": "f1", "name": "first", "createdAt": 1},
            {"id": "f1", "name": "second", "createdAt": 2}
        ],
        "svgs": [{"id": "s1", "code": "<svg></svg>", "folderId": "", "createdAt": 3}]
    }"#;
    store.import_data(json).await.unwrap();

    let folders = store.get_folders().await.unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].name, "second");
    let root = store.get_svgs(None).await.unwrap();
    assert_eq!(root.len(), 1);
    assert_eq!(root[0].folder_id, None);
}

#[tokio::test]
async fn import_empty_backup_clears_everything() {
    let store = test_store().await;
    store.add_folder("Gone").await.unwrap();
    store.add_svg(NewSvg::root(ICON)).await.unwrap();

    store.import_data(r#"{"folders": [], "svgs": []}"#).await.unwrap();

    assert!(store.get_folders().await.unwrap().is_empty());
    assert!(store.get_svgs(None).await.unwrap().is_empty());
}

// =============================================================================
// lifecycle
// =============================================================================

#[tokio::test]
async fn clones_share_one_store() {
    let store = test_store().await;
    let other = store.clone();
    let folder = store.add_folder("Shared").await.unwrap();
    assert_eq!(other.get_folders().await.unwrap(), vec![folder]);
}

#[tokio::test]
async fn operations_after_close_fail() {
    let store = test_store().await;
    store.close().await;
    assert!(store.is_closed());
    let err = store.get_folders().await.unwrap_err();
    assert_eq!(err.error_code(), "E_DATABASE");
}

#[tokio::test]
async fn import_accepts_null_created_at() {
    let store = test_store().await;
    let json = r#"{"folders": [{"id": "f", "name": "n", "createdAt": null}], "svgs": [{"id": "s", "code": "<svg></svg>", "createdAt": 1.5}]}"#;
    assert!(backup::check_backup_text(json, 1_000_000).is_ok());

    store.import_data(json).await.unwrap();

    let folders = store.get_folders().await.unwrap();
    assert_eq!(folders, vec![Folder { id: "f".into(), name: "n".into(), created_at: 0 }]);
    assert_eq!(store.get_svgs(None).await.unwrap()[0].created_at, 2);
}
