use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

lazy_static! {
    static ref ADDRESS_REGEX: Regex = Regex::new(r"^([A-Za-z]+)([0-9]+)$").unwrap();
}

/// Errors produced while parsing a textual cell address such as `"C10"`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty cell address")]
    Empty,
    #[error("malformed cell address `{0}`")]
    Malformed(String),
    #[error("row number in `{0}` must be at least 1")]
    ZeroRow(String),
    #[error("cell address `{0}` is out of range")]
    OutOfRange(String),
}

/// A spreadsheet cell position.
///
/// Both coordinates are zero-based; the textual form (`Display`/`FromStr`)
/// uses column letters and a one-based row number, so `col: 2, row: 9`
/// is `"C10"`. Ordering is row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(col: usize, row: usize) -> Self {
        CellAddress { row, col }
    }

    /// Column letters of this address (`"C"` for `"C10"`).
    pub fn column_letters(&self) -> String {
        encode_column(self.col)
    }

    /// One-based row number as displayed in the grid.
    pub fn row_number(&self) -> usize {
        self.row + 1
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", encode_column(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        let caps = ADDRESS_REGEX
            .captures(s)
            .ok_or_else(|| AddressError::Malformed(s.to_string()))?;

        let col = decode_column(&caps[1]).ok_or_else(|| AddressError::OutOfRange(s.to_string()))?;
        let row: usize = caps[2]
            .parse()
            .map_err(|_| AddressError::OutOfRange(s.to_string()))?;
        if row == 0 {
            return Err(AddressError::ZeroRow(s.to_string()));
        }

        Ok(CellAddress::new(col, row - 1))
    }
}

impl TryFrom<String> for CellAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellAddress> for String {
    fn from(addr: CellAddress) -> Self {
        addr.to_string()
    }
}

/// Convert a zero-based column index to its letter sequence
///
/// Columns use bijective base-26: there is no zero digit, so after `Z`
/// comes `AA`, after `ZZ` comes `AAA`.
///
/// # Arguments
/// * `index` - Column index (0-based)
///
/// # Returns
/// * `String` - Column letters (A, B, ..., Z, AA, ...)
///
/// # Examples
/// ```
/// use sheetjump::address::encode_column;
///
/// assert_eq!(encode_column(0), "A");
/// assert_eq!(encode_column(25), "Z");
/// assert_eq!(encode_column(26), "AA");
/// assert_eq!(encode_column(702), "AAA");
/// ```
pub fn encode_column(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index;

    loop {
        letters.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }

    letters.iter().rev().map(|&b| b as char).collect()
}

/// Convert a column letter sequence back to its zero-based index
///
/// Letters may be upper or lower case. Returns `None` for an empty string,
/// any non-letter character, or an index that does not fit in `usize`.
///
/// # Examples
/// ```
/// use sheetjump::address::decode_column;
///
/// assert_eq!(decode_column("A"), Some(0));
/// assert_eq!(decode_column("az"), Some(51));
/// assert_eq!(decode_column("A1"), None);
/// ```
pub fn decode_column(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    // one past the index, so usize::MAX still decodes
    let mut acc: u128 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u128 + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }

    usize::try_from(acc - 1).ok()
}

/// Build the address of the cell at zero-based table coordinates.
///
/// `cell_address(2, 9)` is `"C10"`.
pub fn cell_address(col: usize, row: usize) -> CellAddress {
    CellAddress::new(col, row)
}
