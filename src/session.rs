use crate::address::{AddressError, CellAddress};
use crate::downloader::{self, EXPORT_FILENAME, ExportError};
use crate::jump::{JumpConfigStore, JumpTarget};
use crate::loader::{self, LoadError};
use crate::render::GridView;
use crate::workbook::{Sheet, Workbook};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds a status message stays visible.
pub const STATUS_TTL_SECS: i64 = 3;

/// How long a jump target stays highlighted.
pub const HIGHLIGHT_MS: u64 = 2000;

pub const WELCOME_MESSAGE: &str = "欢迎使用Excel单元格跳转助手！请先上传Excel文件";

/// Coarse classes of failure, used to pick a response code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Nothing chosen, nothing selected, or a required field left blank.
    MissingInput,
    /// The uploaded file could not be parsed or the export could not be written.
    MalformedInput,
    NotFound,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("请选择Excel文件")]
    MissingFile,
    #[error("加载Excel文件失败: {0}")]
    MalformedFile(String),
    #[error("请先加载Excel文件")]
    NoWorkbook,
    #[error("请先选择工作表")]
    NoSheetDisplayed,
    #[error("工作表不存在: {0}")]
    UnknownSheet(String),
    #[error("单元格 {0} 不在当前表格中")]
    OutOfGrid(CellAddress),
    #[error("请先选择单元格")]
    NoCellSelected,
    #[error("请填写目标工作表和单元格")]
    MissingTarget,
    #[error("单元格地址无效: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("请先配置跳转规则")]
    NoJumpConfigs,
    #[error("单元格 {0} 没有跳转配置")]
    NotConfigured(CellAddress),
    #[error("导出Excel文件失败: {0}")]
    Export(#[from] ExportError),
}

impl SessionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SessionError::MalformedFile(_) | SessionError::Export(_) => {
                ErrorCategory::MalformedInput
            }
            SessionError::UnknownSheet(_)
            | SessionError::OutOfGrid(_)
            | SessionError::NotConfigured(_) => ErrorCategory::NotFound,
            _ => ErrorCategory::MissingInput,
        }
    }
}

impl From<LoadError> for SessionError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Empty => SessionError::MissingFile,
            other => SessionError::MalformedFile(other.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// A transient message shown above the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub expires_at: DateTime<Utc>,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, text: impl Into<String>, now: DateTime<Utc>) -> Self {
        StatusMessage {
            kind,
            text: text.into(),
            expires_at: now + Duration::seconds(STATUS_TTL_SECS),
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Form fields submitted when saving a jump configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpForm {
    #[serde(default)]
    pub target_file: String,
    #[serde(default)]
    pub target_sheet: String,
    #[serde(default)]
    pub target_cell: String,
}

/// What the page should do after a jump trigger is checked.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum JumpOutcome {
    /// Show `sheet`, scroll `cell` into view and highlight it.
    #[serde(rename_all = "camelCase")]
    Navigate {
        sheet: String,
        cell: CellAddress,
        switched: bool,
        highlight_ms: u64,
    },
    /// The target lives in another file; only report it.
    #[serde(rename_all = "camelCase")]
    External {
        file: String,
        sheet: String,
        cell: CellAddress,
        message: String,
    },
}

/// State of one open page.
///
/// Every operation either succeeds or returns a `SessionError` with the state
/// left as it was. Failures always replace the status message.
#[derive(Debug)]
pub struct Session {
    workbook: Option<Workbook>,
    current_sheet: Option<String>,
    selected: Option<CellAddress>,
    jumps: JumpConfigStore,
    status: Option<StatusMessage>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    pub fn new_at(now: DateTime<Utc>) -> Self {
        Session {
            workbook: None,
            current_sheet: None,
            selected: None,
            jumps: JumpConfigStore::new(),
            status: Some(StatusMessage::new(StatusKind::Info, WELCOME_MESSAGE, now)),
        }
    }

    pub fn workbook(&self) -> Option<&Workbook> {
        self.workbook.as_ref()
    }

    pub fn jumps(&self) -> &JumpConfigStore {
        &self.jumps
    }

    pub fn current_sheet_name(&self) -> Option<&str> {
        self.current_sheet.as_deref()
    }

    pub fn selected_cell(&self) -> Option<&CellAddress> {
        self.selected.as_ref()
    }

    /// The status message, if it has not yet expired.
    pub fn status(&self, now: DateTime<Utc>) -> Option<&StatusMessage> {
        self.status.as_ref().filter(|s| s.is_active(now))
    }

    /// Parse `bytes` and make it the session's workbook.
    ///
    /// Returns the sheet names. The displayed sheet and selection are reset;
    /// jump configurations are kept.
    pub fn load_file(&mut self, bytes: &[u8]) -> Result<Vec<String>, SessionError> {
        let result = loader::load_workbook(bytes)
            .map_err(SessionError::from)
            .map(|book| {
                let names: Vec<String> = book.sheet_names().iter().map(|s| s.to_string()).collect();
                log::info!("loaded workbook with {} sheets", names.len());
                self.workbook = Some(book);
                self.current_sheet = None;
                self.selected = None;
                names
            });
        self.report(result, |_| "Excel文件加载成功！".to_string())
    }

    /// Display `name`. The cell selection belongs to the previous view and
    /// is dropped.
    pub fn select_sheet(&mut self, name: &str) -> Result<GridView, SessionError> {
        let result = self.sheet_named(name).map(|_| ());
        let result = result.and_then(|_| {
            self.current_sheet = Some(name.to_string());
            self.selected = None;
            self.grid()
        });
        self.record_error(result)
    }

    /// Select a value cell of the displayed sheet and return the existing
    /// configuration for it, if any, to prefill the form.
    pub fn select_cell(&mut self, cell: &str) -> Result<Option<JumpTarget>, SessionError> {
        let result = self.try_select_cell(cell);
        self.record_error(result)
    }

    fn try_select_cell(&mut self, cell: &str) -> Result<Option<JumpTarget>, SessionError> {
        let addr: CellAddress = cell.parse()?;
        if !self.current_sheet()?.contains(&addr) {
            return Err(SessionError::OutOfGrid(addr));
        }
        self.selected = Some(addr);
        Ok(self.jumps.get(&addr).cloned())
    }

    /// Save a configuration for the selected cell, overwriting any previous one.
    pub fn save_jump_config(&mut self, form: &JumpForm) -> Result<(CellAddress, JumpTarget), SessionError> {
        let result = self.try_save(form);
        self.report(result, |_| "跳转配置已保存".to_string())
    }

    /// Quick action: make the selected cell jump to `sheet`/`cell` in this file.
    ///
    /// Same checks as [`Session::save_jump_config`]; the target file is
    /// always left empty.
    pub fn add_local_jump(&mut self, sheet: &str, cell: &str) -> Result<(CellAddress, JumpTarget), SessionError> {
        let form = JumpForm {
            target_file: String::new(),
            target_sheet: sheet.to_string(),
            target_cell: cell.to_string(),
        };
        let result = self.try_save(&form);
        self.report(result, |_| "复选框已添加".to_string())
    }

    fn try_save(&mut self, form: &JumpForm) -> Result<(CellAddress, JumpTarget), SessionError> {
        let source = self.selected.ok_or(SessionError::NoCellSelected)?;

        let sheet = form.target_sheet.trim();
        let cell = form.target_cell.trim();
        if sheet.is_empty() || cell.is_empty() {
            return Err(SessionError::MissingTarget);
        }

        let target = JumpTarget::new(form.target_file.trim(), sheet, cell.parse()?);
        log::info!("jump config saved: {} -> {}", source, target.annotation());
        self.jumps.set(source, target.clone());
        Ok((source, target))
    }

    /// Gate for test mode: refused while nothing is configured.
    pub fn test_jump(&mut self) -> Result<usize, SessionError> {
        if self.jumps.is_empty() {
            return self.record_error(Err(SessionError::NoJumpConfigs));
        }
        self.set_status(
            StatusKind::Info,
            "测试模式已激活，请勾选复选框进行跳转测试",
        );
        Ok(self.jumps.len())
    }

    /// Perform the jump configured on `source`.
    pub fn trigger_jump(&mut self, source: &str) -> Result<JumpOutcome, SessionError> {
        let result = self.try_trigger(source);
        self.record_error(result)
    }

    fn try_trigger(&mut self, source: &str) -> Result<JumpOutcome, SessionError> {
        let addr: CellAddress = source.parse()?;
        let target = self
            .jumps
            .get(&addr)
            .cloned()
            .ok_or(SessionError::NotConfigured(addr))?;

        if target.is_external() {
            let message = format!(
                "将打开外部文件: {}\n工作表: {}\n单元格: {}",
                target.target_file, target.target_sheet, target.target_cell
            );
            self.set_status(StatusKind::Info, message.clone());
            return Ok(JumpOutcome::External {
                file: target.target_file,
                sheet: target.target_sheet,
                cell: target.target_cell,
                message,
            });
        }

        self.sheet_named(&target.target_sheet)?;
        let switched = self.current_sheet.as_deref() != Some(target.target_sheet.as_str());
        if switched {
            self.current_sheet = Some(target.target_sheet.clone());
            self.selected = None;
        }

        Ok(JumpOutcome::Navigate {
            sheet: target.target_sheet,
            cell: target.target_cell,
            switched,
            highlight_ms: HIGHLIGHT_MS,
        })
    }

    /// Write the annotated workbook; returns the download name and bytes.
    pub fn export(&mut self) -> Result<(&'static str, Vec<u8>), SessionError> {
        let result = self
            .workbook
            .as_ref()
            .ok_or(SessionError::NoWorkbook)
            .and_then(|book| downloader::to_xlsx(book, &self.jumps).map_err(SessionError::from))
            .map(|bytes| (EXPORT_FILENAME, bytes));
        self.report(result, |_| "Excel文件已导出".to_string())
    }

    /// Grid of the displayed sheet.
    pub fn grid(&self) -> Result<GridView, SessionError> {
        let sheet = self.current_sheet()?;
        Ok(GridView::build(sheet, &self.jumps, self.selected.as_ref()))
    }

    fn current_sheet(&self) -> Result<&Sheet, SessionError> {
        let name = self
            .current_sheet
            .as_deref()
            .ok_or(SessionError::NoSheetDisplayed)?;
        self.sheet_named(name)
    }

    fn sheet_named(&self, name: &str) -> Result<&Sheet, SessionError> {
        self.workbook
            .as_ref()
            .ok_or(SessionError::NoWorkbook)?
            .sheet(name)
            .ok_or_else(|| SessionError::UnknownSheet(name.to_string()))
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage::new(kind, text, Utc::now()));
    }

    fn report<T>(
        &mut self,
        result: Result<T, SessionError>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T, SessionError> {
        if let Ok(value) = &result {
            let text = success(value);
            self.set_status(StatusKind::Success, text);
        }
        self.record_error(result)
    }

    fn record_error<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(e) = &result {
            log::warn!("session operation failed: {}", e);
            self.set_status(StatusKind::Error, e.to_string());
        }
        result
    }
}
