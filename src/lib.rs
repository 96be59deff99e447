/*!
# Sheet Jump

A browser-based helper for attaching "jump" links between spreadsheet cells,
built in Rust.

## Overview

A user uploads a spreadsheet, picks one of its sheets and sees it as an HTML
table labelled with column letters and row numbers. Clicking a cell selects
it; saving a jump configuration for the selection (target file, sheet and
cell) turns that cell into a checkbox. Checking it switches to the target
sheet, scrolls the target cell into view and flashes it. The annotated
workbook can be downloaded again, each jump embedded as a cell note of the
form `跳转至: <file or 当前文件> - <sheet> - <cell>`.

## Architecture

### Frontend Layer
- **Technologies**: HTML, Tailwind/daisyUI, a small amount of JavaScript
- Forwards clicks to the backend, inserts the rendered table, runs the
  scroll-and-highlight animation and dismisses status messages.

### Backend Layer
- **Technologies**: Rust, axum
- **Core Components**:
  - Address Codec - Column letters and cell addresses (bijective base-26)
  - Jump Configuration Store - Source cell to target mapping per session
  - Loader - Reads xlsx/xls/xlsb/ods through calamine
  - Renderer - Builds the grid view and renders it with handlebars
  - Exporter - Writes the annotated workbook with rust_xlsxwriter
  - Session - Application state of one open page

Nothing is persisted: a session lives until the page is reloaded or it
expires.

## Modules

- **address**: Column letters, `CellAddress`
- **jump**: `JumpTarget`, `JumpConfigStore`
- **workbook**: Typed cell values, sheets, workbooks
- **loader**: Spreadsheet import
- **downloader**: Annotated XLSX export
- **render**: Grid view and HTML table
- **session**: Per-page state, operations and status messages
- **sessions**: Session registry keyed by cookie (web feature)
- **config**: Command-line / environment settings
- **app**: Routing and handlers (web feature)

## REST API Endpoints

- `POST /api/load` - Upload a workbook (multipart field `file`)
- `POST /api/sheet` - Display a sheet
- `GET /api/table` - Rendered table of the displayed sheet
- `POST /api/cell` - Select a cell
- `POST /api/jump` - Save a jump configuration for the selected cell
- `POST /api/jump/local` - Add a jump within the current file to the selected cell
- `POST /api/jump/test` - Enter test mode
- `POST /api/jump/trigger` - Perform a configured jump
- `GET /api/status` - Current status message
- `GET /api/export` - Download the annotated workbook
*/

pub mod address;
pub mod config;
pub mod downloader;
pub mod jump;
pub mod loader;
pub mod render;
pub mod session;
pub mod workbook;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod sessions;

pub use address::{CellAddress, cell_address, decode_column, encode_column};
pub use jump::{JumpConfigStore, JumpTarget};
pub use session::{JumpOutcome, Session, SessionError};
pub use workbook::{CellValue, Sheet, Temporal, Workbook};
