use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::io::{WORKSHEET_CONF_FILE, WORKSHEET_FILE, store_path};
use crate::models::WorksheetMeta;

/// Create a temporary SageNB data directory with an empty worksheet store
pub fn create_test_dot_sage() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(store_path(dir.path())).unwrap();
    dir
}

pub fn test_meta(owner: &str, id_number: u64, name: &str) -> WorksheetMeta {
    WorksheetMeta {
        owner: owner.to_string(),
        id_number,
        name: name.to_string(),
    }
}

/// Create a worksheet directory below the store with markup and pickled metadata
pub fn create_test_worksheet(
    dot_sage: &TempDir,
    relative_dir: &str,
    worksheet: &str,
    meta: &WorksheetMeta,
) -> PathBuf {
    let dir = store_path(dot_sage.path()).join(relative_dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(WORKSHEET_FILE), worksheet).unwrap();
    let mut conf = fs::File::create(dir.join(WORKSHEET_CONF_FILE)).unwrap();
    serde_pickle::to_writer(&mut conf, meta, serde_pickle::SerOptions::new()).unwrap();
    dir
}
