// ==========================================
// EnerjiOS 导入管道 - 管道编排器
// ==========================================
// 用途: 驱动 上传 → 预览 → 映射 → 校验 → 提交 的完整流程
// 红线: 每个操作只在对应步骤可用;校验纯函数可重复执行
//       提交失败/超时回到 validation 并保留预览
// ==========================================

use crate::config::ImportSettings;
use crate::domain::mapping::ColumnMapping;
use crate::domain::preview::{ErrorKind, ImportPreview, ValidationError};
use crate::domain::schema::SystemField;
use crate::domain::workbook::{Sheet, Workbook};
use crate::engine::session::{ImportEvent, ImportSession, ImportStep};
use crate::i18n::t;
use crate::importer::auto_mapper::auto_map;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::error_export::export_errors_csv;
use crate::importer::file_parser::ExcelParser;
use crate::importer::import_pipeline_trait::{FileParser, ImportSink};
use crate::importer::range_filter::RangeFilter;
use crate::importer::validator::{group_errors_by_type, validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

// ==========================================
// ImportOutcome - 提交结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub session_id: String,
    pub file_name: Option<String>,
    pub imported_rows: usize,
    pub invalid_rows: usize,
    pub warnings: usize,
    pub elapsed_ms: u64,
}

// ==========================================
// ImportOrchestrator - 管道编排器
// ==========================================
pub struct ImportOrchestrator<S>
where
    S: ImportSink + ?Sized,
{
    schema: Arc<[SystemField]>,
    sink: Arc<S>,
    parser: Arc<dyn FileParser>,
    settings: ImportSettings,
    session: ImportSession,
}

impl<S> ImportOrchestrator<S>
where
    S: ImportSink + ?Sized,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - schema: 目标字段（有序）
    /// - sink: 提交回调
    /// - settings: 会话参数
    pub fn new(schema: Vec<SystemField>, sink: Arc<S>, settings: ImportSettings) -> Self {
        let schema: Arc<[SystemField]> = schema.into();
        let parser = Arc::new(ExcelParser::new(settings.max_file_size_bytes));
        Self {
            session: ImportSession::new(schema.clone()),
            schema,
            sink,
            parser,
            settings,
        }
    }

    /// 替换文件解析器
    pub fn with_parser(mut self, parser: Arc<dyn FileParser>) -> Self {
        self.parser = parser;
        self
    }

    // ===== 只读查询 =====

    pub fn step(&self) -> ImportStep {
        self.session.step()
    }

    pub fn session(&self) -> &ImportSession {
        &self.session
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn schema(&self) -> &[SystemField] {
        &self.schema
    }

    pub fn workbook(&self) -> Option<&Workbook> {
        self.session.workbook.as_ref()
    }

    pub fn active_sheet(&self) -> Option<&Sheet> {
        self.workbook().and_then(|wb| wb.active())
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        self.session.mapping.mappings()
    }

    pub fn preview(&self) -> Option<&ImportPreview> {
        self.session.preview.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.session.last_error.as_deref()
    }

    /// 尚未映射的必填字段
    pub fn missing_required_fields(&self) -> Vec<&SystemField> {
        self.session.mapping.missing_required_fields()
    }

    pub fn required_fields_satisfied(&self) -> bool {
        self.session.mapping.required_fields_satisfied()
    }

    /// 当前预览的问题按分类分组
    pub fn grouped_errors(&self) -> BTreeMap<ErrorKind, Vec<ValidationError>> {
        let errors = self.preview().map(|p| p.errors.as_slice()).unwrap_or(&[]);
        group_errors_by_type(errors)
    }

    /// 当前预览的问题清单 CSV
    pub fn export_errors_csv(&self) -> ImportResult<String> {
        let errors = self.preview().map(|p| p.errors.as_slice()).unwrap_or(&[]);
        export_errors_csv(errors)
    }

    // ===== upload =====

    /// 上传并解析文件
    ///
    /// # 规则
    /// - 解析在阻塞线程池执行
    /// - 成功: 进入 preview,映射与预览清空,按配置自动排除空行
    /// - 失败: 停留在原步骤,记录错误
    #[instrument(skip(self, bytes), fields(session_id = %self.session.session_id, size = bytes.len()))]
    pub async fn upload(&mut self, file_name: &str, bytes: Vec<u8>) -> ImportResult<()> {
        self.session.check(ImportEvent::Parsed)?;

        let parser = self.parser.clone();
        let name = file_name.to_string();
        let parsed = tokio::task::spawn_blocking(move || parser.parse(&name, &bytes))
            .await
            .map_err(|e| ImportError::InternalError(format!("解析任务异常: {}", e)))?;

        let mut workbook = match parsed {
            Ok(wb) => wb,
            Err(e) => {
                warn!(file_name, error = %e, "文件解析失败");
                self.session.last_error = Some(e.to_string());
                return Err(ImportError::Parse(e));
            }
        };

        if self.settings.auto_exclude_empty_rows {
            for sheet in workbook.sheets.iter_mut() {
                RangeFilter::auto_exclude_empty_rows(sheet);
            }
        }

        info!(
            file_name,
            sheets = workbook.sheets.len(),
            "文件解析完成"
        );
        self.session.file_name = Some(file_name.to_string());
        self.session.workbook = Some(workbook);
        self.session.mapping.clear_all();
        self.session.preview = None;
        self.session.last_error = None;
        self.session.apply(ImportEvent::Parsed)?;
        Ok(())
    }

    // ===== preview =====

    fn active_sheet_mut(&mut self) -> ImportResult<&mut Sheet> {
        self.session
            .workbook
            .as_mut()
            .and_then(|wb| wb.active_mut())
            .ok_or_else(|| ImportError::InternalError("aktif sayfa yok".to_string()))
    }

    fn active_sheet_ref(&self) -> ImportResult<&Sheet> {
        self.active_sheet()
            .ok_or_else(|| ImportError::InternalError("aktif sayfa yok".to_string()))
    }

    /// 切换工作表（映射清空）
    pub fn select_sheet(&mut self, index: usize) -> ImportResult<()> {
        self.session.ensure_step(ImportStep::Preview, "select_sheet")?;
        let workbook = self
            .session
            .workbook
            .as_mut()
            .ok_or_else(|| ImportError::InternalError("çalışma kitabı yok".to_string()))?;
        if !workbook.select_sheet(index) {
            return Err(ImportError::SheetOutOfRange {
                index,
                count: workbook.sheets.len(),
            });
        }
        self.session.mapping.clear_all();
        debug!(index, "切换工作表");
        Ok(())
    }

    /// 修改表头行（悬空映射被删除）
    pub fn set_header_row(&mut self, header_row: usize) -> ImportResult<()> {
        self.session.ensure_step(ImportStep::Preview, "set_header_row")?;
        let auto_exclude = self.settings.auto_exclude_empty_rows;
        let sheet = self.active_sheet_mut()?;
        RangeFilter::set_header_row(sheet, header_row)?;
        if auto_exclude {
            RangeFilter::auto_exclude_empty_rows(sheet);
        }
        let columns = sheet.column_count();
        self.session.mapping.prune_dangling(columns);
        Ok(())
    }

    pub fn set_range(&mut self, start_row: usize, end_row: usize) -> ImportResult<()> {
        self.session.ensure_step(ImportStep::Preview, "set_range")?;
        let auto_exclude = self.settings.auto_exclude_empty_rows;
        let sheet = self.active_sheet_mut()?;
        RangeFilter::set_range(sheet, start_row, end_row);
        if auto_exclude {
            RangeFilter::auto_exclude_empty_rows(sheet);
        }
        Ok(())
    }

    /// 切换单行排除,返回切换后是否被排除
    pub fn toggle_row(&mut self, row: usize) -> ImportResult<bool> {
        self.session.ensure_step(ImportStep::Preview, "toggle_row")?;
        RangeFilter::toggle_row(self.active_sheet_mut()?, row)
    }

    pub fn set_rows_excluded(&mut self, rows: &[usize], exclude: bool) -> ImportResult<()> {
        self.session.ensure_step(ImportStep::Preview, "set_rows_excluded")?;
        RangeFilter::set_rows_excluded(self.active_sheet_mut()?, rows, exclude);
        Ok(())
    }

    /// 进入映射步骤: 丢弃旧映射,按当前表头重新自动映射
    pub fn proceed_to_mapping(&mut self) -> ImportResult<usize> {
        self.session.check(ImportEvent::ProceedToMapping)?;
        let mappings = {
            let sheet = self.active_sheet_ref()?;
            auto_map(&sheet.headers, &self.schema, self.settings.auto_map_threshold)
        };
        self.session.mapping.replace_all(mappings);
        self.session.apply(ImportEvent::ProceedToMapping)?;

        let mapped = self.session.mapping.mapped_fields_count();
        info!(mapped, fields = self.schema.len(), "自动映射完成");
        Ok(mapped)
    }

    // ===== mapping =====

    /// 手动绑定字段到源列
    pub fn map_field(&mut self, field_id: &str, excel_index: usize) -> ImportResult<()> {
        self.session.ensure_step(ImportStep::Mapping, "map_field")?;
        let header = {
            let sheet = self.active_sheet_ref()?;
            sheet
                .headers
                .get(excel_index)
                .cloned()
                .ok_or(ImportError::ColumnOutOfRange {
                    index: excel_index,
                    count: sheet.headers.len(),
                })?
        };
        self.session.mapping.map(field_id, &header, excel_index)
    }

    pub fn unmap_field(&mut self, field_id: &str) -> ImportResult<bool> {
        self.session.ensure_step(ImportStep::Mapping, "unmap_field")?;
        Ok(self.session.mapping.unmap(field_id))
    }

    pub fn clear_mappings(&mut self) -> ImportResult<()> {
        self.session.ensure_step(ImportStep::Mapping, "clear_mappings")?;
        self.session.mapping.clear_all();
        Ok(())
    }

    /// 重新自动映射（替换当前映射）
    pub fn auto_map(&mut self) -> ImportResult<usize> {
        self.session.ensure_step(ImportStep::Mapping, "auto_map")?;
        let mappings = {
            let sheet = self.active_sheet_ref()?;
            auto_map(&sheet.headers, &self.schema, self.settings.auto_map_threshold)
        };
        self.session.mapping.replace_all(mappings);
        Ok(self.session.mapping.mapped_fields_count())
    }

    /// 回到预览（映射清空）
    pub fn back_to_preview(&mut self) -> ImportResult<()> {
        self.session.apply(ImportEvent::BackToPreview)?;
        self.session.mapping.clear_all();
        Ok(())
    }

    // ===== validation =====

    fn compute_preview(&self) -> ImportResult<ImportPreview> {
        let sheet = self.active_sheet_ref()?;
        let preview = validate(
            &sheet.data,
            self.session.mapping.mappings(),
            sheet.start_row,
            sheet.end_row,
            &sheet.excluded_rows,
        );
        info!(
            total = preview.total_rows,
            valid = preview.valid_rows,
            invalid = preview.invalid_rows,
            warnings = preview.warnings,
            "校验结果"
        );
        Ok(preview)
    }

    /// 执行校验（必填字段全部映射后才允许）
    #[instrument(skip(self), fields(session_id = %self.session.session_id))]
    pub fn run_validation(&mut self) -> ImportResult<&ImportPreview> {
        self.session.ensure_step(ImportStep::Mapping, "run_validation")?;

        let missing: Vec<String> = self
            .session
            .mapping
            .missing_required_fields()
            .iter()
            .map(|f| f.label.clone())
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "必填字段未映射");
            return Err(ImportError::RequiredFieldsMissing(missing));
        }

        let preview = self.compute_preview()?;
        self.session.apply(ImportEvent::Validated)?;
        Ok(self.session.preview.insert(preview))
    }

    /// 在 validation 步骤内重新校验
    pub fn revalidate(&mut self) -> ImportResult<&ImportPreview> {
        self.session.ensure_step(ImportStep::Validation, "revalidate")?;
        let preview = self.compute_preview()?;
        self.session.apply(ImportEvent::Validated)?;
        Ok(self.session.preview.insert(preview))
    }

    /// 回到映射（预览丢弃）
    pub fn back_to_mapping(&mut self) -> ImportResult<()> {
        self.session.apply(ImportEvent::BackToMapping)?;
        self.session.preview = None;
        Ok(())
    }

    // ===== commit =====

    /// 提交已校验的数据
    ///
    /// # 门槛
    /// - 无 error 级问题（CommitBlocked）
    /// - 有可提交的数据（NothingToImport）
    ///
    /// # 结果
    /// - 成功: complete,会话数据释放
    /// - 回调失败/超时: 回到 validation,预览保留
    #[instrument(skip(self), fields(session_id = %self.session.session_id))]
    pub async fn commit(&mut self) -> ImportResult<ImportOutcome> {
        if self.session.step() == ImportStep::Importing {
            return Err(ImportError::ImportInProgress);
        }
        self.session.check(ImportEvent::CommitStarted)?;

        let preview = self
            .session
            .preview
            .as_ref()
            .ok_or_else(|| ImportError::InternalError("önizleme yok".to_string()))?;
        if preview.has_blocking_errors() {
            return Err(ImportError::CommitBlocked(preview.error_count()));
        }
        if preview.mapped_data.is_empty() {
            return Err(ImportError::NothingToImport);
        }
        let rows = preview.mapped_data.clone();
        let (imported_rows, invalid_rows, warnings) =
            (preview.valid_rows, preview.invalid_rows, preview.warnings);

        self.session.apply(ImportEvent::CommitStarted)?;
        let sink = self.sink.clone();
        let timeout = self.settings.import_timeout;
        // future 被丢弃时由 guard 回到 validation
        let mut guard = CommitGuard::new(&mut self.session);
        let started = Instant::now();
        let result = tokio::time::timeout(timeout, sink.on_import(rows)).await;
        let session = guard.disarm();

        match result {
            Ok(Ok(())) => {
                session.apply(ImportEvent::CommitSucceeded)?;
                let outcome = ImportOutcome {
                    session_id: session.session_id.clone(),
                    file_name: session.file_name.take(),
                    imported_rows,
                    invalid_rows,
                    warnings,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                };
                session.workbook = None;
                session.preview = None;
                session.mapping.clear_all();
                session.last_error = None;
                info!(imported_rows, elapsed_ms = outcome.elapsed_ms, "导入完成");
                Ok(outcome)
            }
            Ok(Err(e)) => {
                let message = e.to_string();
                warn!(error = %message, "导入回调失败");
                session.apply(ImportEvent::CommitFailed)?;
                session.last_error = Some(message.clone());
                Err(ImportError::SinkRejected(message))
            }
            Err(_) => {
                let ms = timeout.as_millis() as u64;
                warn!(timeout_ms = ms, "导入回调超时");
                session.apply(ImportEvent::CommitFailed)?;
                let err = ImportError::SinkTimeout(ms);
                session.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// 重新开始（importing 期间不可用）
    pub fn reset(&mut self) -> ImportResult<()> {
        self.session.apply(ImportEvent::Reset)?;
        info!(session_id = %self.session.session_id, "会话重置");
        self.session = ImportSession::new(self.schema.clone());
        Ok(())
    }
}

// ==========================================
// CommitGuard - 提交被取消时恢复会话
// ==========================================
// 提交 future 在回调完成前被丢弃（外层 timeout / select! / abort）时,
// 会话回到 validation 并记录 last_error,预览保留
struct CommitGuard<'a> {
    session: &'a mut ImportSession,
    armed: bool,
}

impl<'a> CommitGuard<'a> {
    fn new(session: &'a mut ImportSession) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    /// 回调已完成,由调用方继续处理会话
    fn disarm(&mut self) -> &mut ImportSession {
        self.armed = false;
        self.session
    }
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        if !self.armed || self.session.step() != ImportStep::Importing {
            return;
        }
        warn!(session_id = %self.session.session_id, "提交被取消");
        if self.session.apply(ImportEvent::CommitFailed).is_ok() {
            self.session.last_error = Some(t("import.cancelled"));
        }
    }
}
