#![allow(dead_code)]

use rust_xlsxwriter::{Format, Formula, Workbook};
use std::io::{Cursor, Read};

/// Two sheets: `Sheet1` holds [[1, 2], [3, 4]], `Sheet2` holds a single label.
pub fn two_sheet_xlsx() -> Vec<u8> {
    let mut book = Workbook::new();
    let ws = book.add_worksheet();
    ws.set_name("Sheet1").unwrap();
    ws.write_number(0, 0, 1).unwrap();
    ws.write_number(0, 1, 2).unwrap();
    ws.write_number(1, 0, 3).unwrap();
    ws.write_number(1, 1, 4).unwrap();

    let ws = book.add_worksheet();
    ws.set_name("Sheet2").unwrap();
    ws.write_string(0, 0, "target").unwrap();

    book.save_to_buffer().unwrap()
}

/// One sheet: A1 a date, B1 = 2, C1 = `=B1*10`.
pub fn formula_and_date_xlsx() -> Vec<u8> {
    let mut book = Workbook::new();
    let ws = book.add_worksheet();
    ws.set_name("Calc").unwrap();
    let date = Format::new().set_num_format("yyyy-mm-dd");
    ws.write_number_with_format(0, 0, 45366, &date).unwrap();
    ws.write_number(0, 1, 2).unwrap();
    ws.write_formula(0, 2, Formula::new("=B1*10").set_result("20"))
        .unwrap();
    book.save_to_buffer().unwrap()
}

/// Text of one part of an xlsx package.
pub fn part_xml(xlsx: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(xlsx)).unwrap();
    let mut out = String::new();
    archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
    out
}

/// The `<t>` runs of every note, in document order.
pub fn comment_texts(xlsx: &[u8]) -> Vec<String> {
    let xml = comment_xml(xlsx);
    let mut texts = Vec::new();
    let mut rest = xml.as_str();
    while let Some(start) = rest.find("<t") {
        rest = &rest[start + 2..];
        // skip <text>, keep <t> and <t xml:space=..>
        if !(rest.starts_with('>') || rest.starts_with(' ')) {
            continue;
        }
        let open_end = rest.find('>').unwrap();
        let close = rest.find("</t>").unwrap();
        texts.push(rest[open_end + 1..close].to_string());
        rest = &rest[close + 4..];
    }
    texts
}

/// Concatenated contents of every comments part in an xlsx package.
pub fn comment_xml(xlsx: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(xlsx)).unwrap();
    let mut out = String::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        if file.name().starts_with("xl/comments") {
            file.read_to_string(&mut out).unwrap();
        }
    }
    out
}
