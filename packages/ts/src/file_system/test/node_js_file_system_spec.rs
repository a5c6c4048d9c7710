use std::fs;

use crate::file_system::{FileSystem, NodeJSFileSystem, ReadonlyFileSystem};

#[test]
fn test_node_fs_stat_and_read() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("file.txt");
    fs::write(&file, "hello").unwrap();

    let node_fs = NodeJSFileSystem::new();
    assert!(node_fs.is_file(&file));
    assert!(node_fs.is_directory(tmp.path()));
    assert!(!node_fs.exists(&tmp.path().join("missing")));
    assert_eq!(node_fs.read_file(&file).unwrap(), "hello");
}

#[test]
fn test_node_fs_write_and_readdir() {
    let tmp = tempfile::tempdir().unwrap();
    let node_fs = NodeJSFileSystem::new();
    let dir = tmp.path().join("nested/dir");
    node_fs.ensure_dir(&dir).unwrap();
    node_fs.write_file(&dir.join("b.js"), b"b").unwrap();
    node_fs.write_file(&dir.join("a.js"), b"a").unwrap();

    let entries = node_fs.readdir(&dir).unwrap();
    assert_eq!(entries, vec![dir.join("a.js"), dir.join("b.js")]);
}
