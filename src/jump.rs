use crate::address::CellAddress;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map;

/// Label used in annotations when a jump stays inside the loaded workbook.
pub const CURRENT_FILE_LABEL: &str = "当前文件";

/// Where a configured cell jumps to.
///
/// An empty `target_file` means "this document"; anything else names an
/// external workbook, which is only ever reported, never opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpTarget {
    #[serde(default)]
    pub target_file: String,
    pub target_sheet: String,
    pub target_cell: CellAddress,
}

impl JumpTarget {
    pub fn new(
        target_file: impl Into<String>,
        target_sheet: impl Into<String>,
        target_cell: CellAddress,
    ) -> Self {
        JumpTarget {
            target_file: target_file.into(),
            target_sheet: target_sheet.into(),
            target_cell,
        }
    }

    /// Target inside the current document.
    pub fn local(target_sheet: impl Into<String>, target_cell: CellAddress) -> Self {
        Self::new(String::new(), target_sheet, target_cell)
    }

    pub fn is_external(&self) -> bool {
        !self.target_file.is_empty()
    }

    pub fn file_label(&self) -> &str {
        if self.is_external() {
            &self.target_file
        } else {
            CURRENT_FILE_LABEL
        }
    }

    /// Text embedded as a cell note in exported workbooks.
    pub fn annotation(&self) -> String {
        format!(
            "跳转至: {} - {} - {}",
            self.file_label(),
            self.target_sheet,
            self.target_cell
        )
    }

    /// Hover text of a jump-trigger cell in the rendered table.
    pub fn tooltip(&self) -> String {
        format!(
            "跳转到: {} - {} - {}",
            self.file_label(),
            self.target_sheet,
            self.target_cell
        )
    }
}

/// In-memory jump configurations of one session, keyed by source cell.
///
/// Entries are only ever added or overwritten; there is no removal.
#[derive(Clone, Debug, Default)]
pub struct JumpConfigStore {
    entries: HashMap<CellAddress, JumpTarget>,
}

impl JumpConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the configuration for `source`.
    pub fn set(&mut self, source: CellAddress, target: JumpTarget) {
        self.entries.insert(source, target);
    }

    pub fn get(&self, source: &CellAddress) -> Option<&JumpTarget> {
        self.entries.get(source)
    }

    pub fn has(&self, source: &CellAddress) -> bool {
        self.entries.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All configured pairs, in no particular order.
    pub fn iter(&self) -> hash_map::Iter<'_, CellAddress, JumpTarget> {
        self.entries.iter()
    }

    /// Configurations whose target sheet is `sheet`.
    pub fn targeting_sheet<'a>(
        &'a self,
        sheet: &'a str,
    ) -> impl Iterator<Item = (&'a CellAddress, &'a JumpTarget)> + 'a {
        self.iter().filter(move |(_, t)| t.target_sheet == sheet)
    }
}

impl<'a> IntoIterator for &'a JumpConfigStore {
    type Item = (&'a CellAddress, &'a JumpTarget);
    type IntoIter = hash_map::Iter<'a, CellAddress, JumpTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
