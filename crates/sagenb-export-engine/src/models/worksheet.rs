use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::parsing::{WorksheetParser, parse_worksheet, unescape::HtmlUnescape};

/// The fields of `worksheet_conf.pickle` this crate relies on.
///
/// The record holds many more keys; they are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetMeta {
    pub owner: String,
    pub id_number: u64,
    pub name: String,
}

impl WorksheetMeta {
    /// `owner:id_number`, the way SageNB addresses a worksheet.
    pub fn unique_id(&self) -> String {
        format!("{}:{}", self.owner, self.id_number)
    }

    pub fn sort_key(&self) -> (&str, u64) {
        (&self.owner, self.id_number)
    }
}

/// A worksheet loaded from its directory in the SageNB store.
#[derive(Debug, Clone)]
pub struct Worksheet {
    path: PathBuf,
    source: String,
    meta: WorksheetMeta,
}

impl Worksheet {
    pub fn new(path: PathBuf, source: String, meta: WorksheetMeta) -> Self {
        Self { path, source, meta }
    }

    /// The worksheet directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw `worksheet.html` text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn meta(&self) -> &WorksheetMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn unique_id(&self) -> String {
        self.meta.unique_id()
    }

    pub fn sort_key(&self) -> (&str, u64) {
        self.meta.sort_key()
    }

    /// A fresh parser over this worksheet's cells.
    pub fn cells(&self) -> WorksheetParser<'_, HtmlUnescape> {
        log::debug!("Parsing worksheet {}", self.unique_id());
        parse_worksheet(&self.source)
    }
}
