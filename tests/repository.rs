//! Repository layout integration tests

use minigit::{Error, ObjectStore, RepoLayout, MARKER_DIR};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_discover_from_nested_directory() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    RepoLayout::create(&root).unwrap();

    let nested = root.join("a").join("b").join("c");
    fs::create_dir_all(&nested).unwrap();

    let layout = RepoLayout::discover(&nested).unwrap();
    assert_eq!(layout.root(), root);
    assert_eq!(layout.data_dir(), root.join(MARKER_DIR));
    assert_eq!(layout.objects_dir(), root.join(MARKER_DIR).join("objects"));
}

#[test]
fn test_discover_picks_nearest_repository() {
    let dir = tempdir().unwrap();
    let outer = fs::canonicalize(dir.path()).unwrap();
    RepoLayout::create(&outer).unwrap();

    let inner = outer.join("vendor").join("lib");
    fs::create_dir_all(&inner).unwrap();
    RepoLayout::create(&inner).unwrap();

    let deep = inner.join("src");
    fs::create_dir_all(&deep).unwrap();
    assert_eq!(RepoLayout::discover(&deep).unwrap().root(), inner);
}

#[test]
fn test_discover_without_repository() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("x").join("y");
    fs::create_dir_all(&nested).unwrap();

    assert!(matches!(
        RepoLayout::discover(&nested),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_create_then_store_objects() {
    let dir = tempdir().unwrap();
    let layout = RepoLayout::create(dir.path()).unwrap();
    assert!(matches!(
        RepoLayout::create(dir.path()),
        Err(Error::AlreadyInitialized(_))
    ));

    let store = ObjectStore::open(layout).unwrap();
    let id = store.write_blob("from a fresh repository").unwrap();

    // a second handle found by discovery sees the same object
    let found = ObjectStore::open(RepoLayout::discover(dir.path()).unwrap()).unwrap();
    assert_eq!(
        found.read(&id).unwrap().content,
        b"from a fresh repository"
    );
}
