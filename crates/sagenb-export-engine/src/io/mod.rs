use crate::models::{Worksheet, WorksheetMeta};
use std::fs;
use std::path::{Path, PathBuf};

/// Worksheet store, relative to the SageNB data directory.
pub const STORE_PATH: &str = "sage_notebook.sagenb/home/__store__";
/// Worksheet markup inside a worksheet directory.
pub const WORKSHEET_FILE: &str = "worksheet.html";
/// Pickled worksheet configuration inside a worksheet directory.
pub const WORKSHEET_CONF_FILE: &str = "worksheet_conf.pickle";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid SageNB directory: {0}")]
    InvalidStore(String),
    #[error("Failed to read worksheet metadata at {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: serde_pickle::Error,
    },
    #[error("No such worksheet: {0}")]
    NoSuchWorksheet(String),
}

/// The worksheet store below a SageNB data directory.
pub fn store_path(dot_sage: &Path) -> PathBuf {
    dot_sage.join(STORE_PATH)
}

/// Read the pickled worksheet configuration
pub fn read_worksheet_meta(path: &Path) -> Result<WorksheetMeta, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let file = fs::File::open(path).map_err(IoError::Io)?;
    // Python 2 pickles store text as byte strings
    let options = serde_pickle::DeOptions::new()
        .decode_strings()
        .replace_unresolved_globals();
    serde_pickle::from_reader(file, options).map_err(|source| IoError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a worksheet directory: its markup and its configuration
pub fn open_worksheet(dir: &Path) -> Result<Worksheet, IoError> {
    log::debug!("opening worksheet directory: {}", dir.display());
    let worksheet_path = dir.join(WORKSHEET_FILE);
    if !worksheet_path.exists() {
        return Err(IoError::NotFound(worksheet_path));
    }
    let source = fs::read_to_string(&worksheet_path).map_err(IoError::Io)?;
    let meta = read_worksheet_meta(&dir.join(WORKSHEET_CONF_FILE))?;
    Ok(Worksheet::new(dir.to_path_buf(), source, meta))
}

/// Scan for worksheet directories in the store
pub fn scan_worksheet_dirs(dot_sage: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_dot_sage(dot_sage)?;

    let mut dirs = Vec::new();
    scan_directory_recursive(&store_path(dot_sage), &mut dirs)?;
    dirs.sort();
    Ok(dirs)
}

/// Load every readable worksheet in the store, ordered by owner and id number.
///
/// A worksheet that cannot be opened is logged and skipped; only a missing
/// or unreadable store is an error.
pub fn all_worksheets(dot_sage: &Path) -> Result<Vec<Worksheet>, IoError> {
    let dirs = scan_worksheet_dirs(dot_sage)?;
    log::info!("Found {} worksheets in {}", dirs.len(), dot_sage.display());

    let mut worksheets: Vec<Worksheet> = dirs
        .iter()
        .filter_map(|dir| match open_worksheet(dir) {
            Ok(ws) => Some(ws),
            Err(e) => {
                log::warn!("Skipping worksheet {}: {e}", dir.display());
                None
            }
        })
        .collect();
    worksheets.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    Ok(worksheets)
}

/// Find a worksheet by `owner:id_number` or by name, ignoring unreadable ones
pub fn find_worksheet(dot_sage: &Path, name_or_unique_id: &str) -> Result<Worksheet, IoError> {
    all_worksheets(dot_sage)?
        .into_iter()
        .find(|ws| ws.unique_id() == name_or_unique_id || ws.name() == name_or_unique_id)
        .ok_or_else(|| IoError::NoSuchWorksheet(name_or_unique_id.to_string()))
}

fn scan_directory_recursive(dir: &Path, dirs: &mut Vec<PathBuf>) -> Result<(), IoError> {
    if dir.join(WORKSHEET_FILE).is_file() {
        dirs.push(dir.to_path_buf());
    }

    let entries = fs::read_dir(dir).map_err(IoError::Io)?;
    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();
        if path.is_dir() {
            scan_directory_recursive(&path, dirs)?;
        }
    }

    Ok(())
}

pub fn validate_dot_sage(path: &Path) -> Result<(), IoError> {
    let store = store_path(path);
    if !store.exists() || !store.is_dir() {
        return Err(IoError::InvalidStore(format!(
            "worksheet store not found at {}",
            store.display()
        )));
    }

    Ok(())
}
