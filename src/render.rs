use crate::address::{CellAddress, encode_column};
use crate::jump::JumpConfigStore;
use crate::workbook::Sheet;
use handlebars::Handlebars;
use lazy_static::lazy_static;
use serde::Serialize;
use thiserror::Error;

const TABLE_TEMPLATE: &str = "table";

lazy_static! {
    static ref TEMPLATES: Result<Handlebars<'static>, String> = {
        let mut hb = Handlebars::new();
        hb.register_template_string(TABLE_TEMPLATE, include_str!("./templates/table.hbs"))
            .map(|_| hb)
            .map_err(|e| e.to_string())
    };
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("table template is invalid: {0}")]
    Template(String),
    #[error(transparent)]
    Render(#[from] handlebars::RenderError),
}

/// Renderable view of one sheet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridView {
    pub sheet: String,
    /// Column letters, starting at `A`.
    pub columns: Vec<String>,
    pub rows: Vec<GridRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridRow {
    /// One-based row number.
    pub number: usize,
    pub cells: Vec<GridCell>,
}

/// A cell of the grid: either a plain value or, when `jump_title` is set,
/// a jump-trigger checkbox.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridCell {
    pub address: CellAddress,
    pub text: String,
    pub jump_title: Option<String>,
    pub selected: bool,
}

impl GridCell {
    pub fn is_jump_trigger(&self) -> bool {
        self.jump_title.is_some()
    }
}

impl GridView {
    /// Lay out `sheet` as a rectangular grid, consulting `store` for every
    /// coordinate to decide between a value cell and a jump trigger.
    pub fn build(sheet: &Sheet, store: &JumpConfigStore, selected: Option<&CellAddress>) -> Self {
        let width = sheet.width();
        let columns = (0..width).map(encode_column).collect();

        let rows = (0..sheet.height())
            .map(|r| GridRow {
                number: r + 1,
                cells: (0..width)
                    .map(|c| {
                        let address = CellAddress::new(c, r);
                        let jump_title = store.get(&address).map(|t| t.tooltip());
                        GridCell {
                            address,
                            text: sheet.value(&address).to_string(),
                            selected: jump_title.is_none() && selected == Some(&address),
                            jump_title,
                        }
                    })
                    .collect(),
            })
            .collect();

        GridView {
            sheet: sheet.name.clone(),
            columns,
            rows,
        }
    }

    pub fn cell(&self, addr: &CellAddress) -> Option<&GridCell> {
        self.rows.get(addr.row)?.cells.get(addr.col)
    }
}

/// Render the grid as an HTML table.
///
/// Every `<td>` carries `id="cell-<ADDR>"`; values and tooltips are HTML-escaped.
pub fn render_table(view: &GridView) -> Result<String, RenderError> {
    let hb = TEMPLATES
        .as_ref()
        .map_err(|e| RenderError::Template(e.clone()))?;
    Ok(hb.render(TABLE_TEMPLATE, view)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jump::JumpTarget;
    use crate::workbook::CellValue;

    fn addr(s: &str) -> CellAddress {
        s.parse().unwrap()
    }

    fn sheet() -> Sheet {
        Sheet::new(
            "Sheet1",
            vec![
                vec![1.0.into(), 2.0.into()],
                vec![3.0.into(), 4.0.into(), "<b>".into()],
            ],
        )
    }

    #[test]
    fn headers_and_row_numbers() {
        let view = GridView::build(&sheet(), &JumpConfigStore::new(), None);
        assert_eq!(view.columns, vec!["A", "B", "C"]);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[1].number, 2);
        // short rows are padded to the full width
        assert_eq!(view.rows[0].cells.len(), 3);
        assert_eq!(view.cell(&addr("C1")).unwrap().text, "");
    }

    #[test]
    fn configured_cells_become_triggers() {
        let mut store = JumpConfigStore::new();
        store.set(addr("A1"), JumpTarget::local("Sheet1", addr("B2")));
        let view = GridView::build(&sheet(), &store, Some(&addr("A1")));

        let a1 = view.cell(&addr("A1")).unwrap();
        assert!(a1.is_jump_trigger());
        assert!(!a1.selected);
        assert_eq!(a1.jump_title.as_deref(), Some("跳转到: 当前文件 - Sheet1 - B2"));

        let b2 = view.cell(&addr("B2")).unwrap();
        assert!(!b2.is_jump_trigger());
        assert_eq!(b2.text, CellValue::Number(4.0).to_string());
    }

    #[test]
    fn marks_selected_value_cell() {
        let view = GridView::build(&sheet(), &JumpConfigStore::new(), Some(&addr("B1")));
        assert!(view.cell(&addr("B1")).unwrap().selected);
        assert!(!view.cell(&addr("A1")).unwrap().selected);
    }

    #[test]
    fn renders_escaped_html() {
        let mut store = JumpConfigStore::new();
        store.set(addr("A2"), JumpTarget::local("Sheet1", addr("A1")));
        let html = render_table(&GridView::build(&sheet(), &store, None)).unwrap();

        assert!(html.contains("<th>A</th><th>B</th><th>C</th>"));
        assert!(html.contains(r#"id="cell-B2""#));
        assert!(html.contains(r#"data-cell="A2""#));
        assert!(html.contains(r#"type="checkbox""#));
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn empty_sheet_renders_empty_table() {
        let view = GridView::build(&Sheet::new("Blank", vec![]), &JumpConfigStore::new(), None);
        assert!(view.columns.is_empty());
        assert!(view.rows.is_empty());
        assert!(render_table(&view).unwrap().contains("<tbody>"));
    }
}
