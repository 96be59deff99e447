use crate::address::CellAddress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single cell value as read from the source file.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            // whole numbers print without a trailing ".0"
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

/// How a numeric cell was formatted as a point or span in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temporal {
    Date,
    DateTime,
    Duration,
}

impl Temporal {
    /// Classify a date serial: whole days are plain dates.
    pub fn for_serial(serial: f64) -> Self {
        if serial.fract() == 0.0 {
            Temporal::Date
        } else {
            Temporal::DateTime
        }
    }

    pub fn num_format(self) -> &'static str {
        match self {
            Temporal::Date => "yyyy-mm-dd",
            Temporal::DateTime => "yyyy-mm-dd hh:mm:ss",
            Temporal::Duration => "[h]:mm:ss",
        }
    }
}

/// One named page of a workbook.
///
/// `rows` is row-major and anchored at A1: if the source's used range starts
/// further in, the leading rows and columns are filled with `CellValue::Empty`.
/// Rows may have different lengths.
///
/// `rows` holds what each cell displays. Formula cells additionally carry
/// their formula text (without the leading `=`) in `formulas`, and date or
/// time serials their kind in `temporal`, so that a written copy keeps both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
    #[serde(default)]
    pub formulas: BTreeMap<CellAddress, String>,
    #[serde(default)]
    pub temporal: BTreeMap<CellAddress, Temporal>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Sheet {
            name: name.into(),
            rows,
            formulas: BTreeMap::new(),
            temporal: BTreeMap::new(),
        }
    }

    pub fn with_formula(mut self, addr: CellAddress, formula: impl Into<String>) -> Self {
        self.formulas.insert(addr, formula.into());
        self
    }

    pub fn with_temporal(mut self, addr: CellAddress, kind: Temporal) -> Self {
        self.temporal.insert(addr, kind);
        self
    }

    pub fn formula(&self, addr: &CellAddress) -> Option<&str> {
        self.formulas.get(addr).map(String::as_str)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the rendered grid (longest row).
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Whether `addr` falls inside the rendered grid.
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row < self.height() && addr.col < self.width()
    }

    pub fn value(&self, addr: &CellAddress) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(addr.row)
            .and_then(|row| row.get(addr.col))
            .unwrap_or(EMPTY)
    }

    /// Non-empty cells with their addresses, row by row.
    pub fn used_cells(&self) -> impl Iterator<Item = (CellAddress, &CellValue)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| !v.is_empty())
                .map(move |(c, v)| (CellAddress::new(c, r), v))
        })
    }
}

/// A loaded spreadsheet document: its sheets in file order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Workbook { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}
