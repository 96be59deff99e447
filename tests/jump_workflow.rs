mod common;

use pretty_assertions::assert_eq;
use sheetjump::downloader::{sheet_annotations, to_xlsx};
use sheetjump::loader::{load_workbook, open_workbook};
use sheetjump::session::{JumpForm, SessionError};
use sheetjump::workbook::Temporal;
use sheetjump::{CellAddress, CellValue, JumpConfigStore, JumpTarget, Session};

fn addr(s: &str) -> CellAddress {
    s.parse().unwrap()
}

fn form(file: &str, sheet: &str, cell: &str) -> JumpForm {
    JumpForm {
        target_file: file.into(),
        target_sheet: sheet.into(),
        target_cell: cell.into(),
    }
}

#[test]
fn configured_cell_becomes_trigger_and_neighbours_keep_values() {
    let mut session = Session::new();
    session.load_file(&common::two_sheet_xlsx()).unwrap();
    session.select_sheet("Sheet1").unwrap();

    let before = session.grid().unwrap();
    assert_eq!(before.columns, vec!["A", "B"]);
    assert_eq!(before.cell(&addr("A1")).unwrap().text, "1");

    session.select_cell("A1").unwrap();
    session
        .save_jump_config(&form("", "Sheet1", "B2"))
        .unwrap();

    let after = session.grid().unwrap();
    assert!(after.cell(&addr("A1")).unwrap().is_jump_trigger());
    let b2 = after.cell(&addr("B2")).unwrap();
    assert!(!b2.is_jump_trigger());
    assert_eq!(b2.text, "4");
}

#[test]
fn resaving_same_config_keeps_one_entry() {
    let mut session = Session::new();
    session.load_file(&common::two_sheet_xlsx()).unwrap();
    session.select_sheet("Sheet1").unwrap();
    session.select_cell("B2").unwrap();

    session.save_jump_config(&form("", "Sheet2", "A1")).unwrap();
    session.save_jump_config(&form("", "Sheet2", "A1")).unwrap();
    assert_eq!(session.jumps().len(), 1);

    session.save_jump_config(&form("", "Sheet2", "B3")).unwrap();
    assert_eq!(session.jumps().len(), 1);
    assert_eq!(
        session.jumps().get(&addr("B2")).unwrap().target_cell,
        addr("B3")
    );
}

#[test]
fn test_mode_requires_a_configuration() {
    let mut session = Session::new();
    assert!(matches!(session.test_jump(), Err(SessionError::NoJumpConfigs)));
}

#[test]
fn export_embeds_annotations_on_target_sheet() {
    let mut session = Session::new();
    session.load_file(&common::two_sheet_xlsx()).unwrap();
    session.select_sheet("Sheet1").unwrap();
    session.select_cell("A1").unwrap();
    session.save_jump_config(&form("", "Sheet2", "A1")).unwrap();
    session.select_cell("B1").unwrap();
    session
        .save_jump_config(&form("budget.xlsx", "Sheet2", "C3"))
        .unwrap();

    let (_, bytes) = session.export().unwrap();

    let comments = common::comment_xml(&bytes);
    assert!(comments.contains("当前文件 - Sheet2 - A1"), "{comments}");
    assert!(comments.contains("budget.xlsx - Sheet2 - C3"), "{comments}");

    // values survive untouched
    let reloaded = load_workbook(&bytes).unwrap();
    assert_eq!(reloaded.sheet_names(), vec!["Sheet1", "Sheet2"]);
    assert_eq!(
        reloaded.sheet("Sheet1").unwrap().value(&addr("B2")),
        &CellValue::Number(4.0)
    );
}

#[test]
fn exported_note_is_exactly_the_annotation() {
    let mut session = Session::new();
    session.load_file(&common::two_sheet_xlsx()).unwrap();
    session.select_sheet("Sheet1").unwrap();
    session.select_cell("B2").unwrap();
    session.save_jump_config(&form("", "Sheet2", "A1")).unwrap();

    let (_, bytes) = session.export().unwrap();
    assert_eq!(
        common::comment_texts(&bytes),
        vec!["跳转至: 当前文件 - Sheet2 - A1".to_string()]
    );
}

#[test]
fn export_keeps_formulas_and_dates() {
    let mut session = Session::new();
    session.load_file(&common::formula_and_date_xlsx()).unwrap();
    session.select_sheet("Calc").unwrap();
    session.select_cell("B1").unwrap();
    session.save_jump_config(&form("", "Calc", "C1")).unwrap();

    let (_, bytes) = session.export().unwrap();
    let sheet_xml = common::part_xml(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains("<f>B1*10</f>"), "{sheet_xml}");
    assert!(common::part_xml(&bytes, "xl/styles.xml").contains("yyyy-mm-dd"));

    let original = load_workbook(&common::formula_and_date_xlsx()).unwrap();
    let reloaded = load_workbook(&bytes).unwrap();
    assert_eq!(reloaded.sheets[0], original.sheets[0]);
    assert_eq!(
        reloaded.sheets[0].temporal.get(&addr("A1")),
        Some(&Temporal::Date)
    );
    assert_eq!(reloaded.sheets[0].formula(&addr("C1")), Some("B1*10"));
}

#[test]
fn export_without_configs_has_no_notes() {
    let book = load_workbook(&common::two_sheet_xlsx()).unwrap();
    let bytes = to_xlsx(&book, &JumpConfigStore::new()).unwrap();
    assert!(common::comment_xml(&bytes).is_empty());
}

#[test]
fn annotation_text_names_file() {
    let mut store = JumpConfigStore::new();
    store.set(addr("B2"), JumpTarget::local("Sheet2", addr("A1")));
    store.set(addr("C3"), JumpTarget::new("other.xlsx", "Sheet2", addr("A2")));

    let notes = sheet_annotations(&store, "Sheet2");
    assert_eq!(notes.len(), 2);
    assert!(notes[0].1.contains("当前文件"));
    assert!(notes[1].1.contains("other.xlsx"));
}

#[test]
fn opens_workbook_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.xlsx");
    std::fs::write(&path, common::two_sheet_xlsx()).unwrap();

    let book = open_workbook(&path).unwrap();
    assert_eq!(book.sheet_names(), vec!["Sheet1", "Sheet2"]);

    assert!(open_workbook(dir.path().join("missing.xlsx")).is_err());
}
