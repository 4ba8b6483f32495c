// ==========================================
// EnerjiOS 导入管道 - 会话与状态机
// ==========================================
// 状态: upload → preview → mapping → validation → importing → complete
// 回退: mapping → preview, validation → mapping, importing → validation（提交失败）
// 红线: 迁移表是纯函数,所有状态变化都经过 ImportStep::next
// ==========================================

use crate::domain::preview::ImportPreview;
use crate::domain::schema::SystemField;
use crate::domain::workbook::Workbook;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::mapping_editor::MappingEditor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// ==========================================
// ImportStep - 管道步骤
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStep {
    Upload,
    Preview,
    Mapping,
    Validation,
    Importing,
    Complete,
}

// ==========================================
// ImportEvent - 触发迁移的事件
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportEvent {
    Parsed,
    ProceedToMapping,
    BackToPreview,
    Validated,
    BackToMapping,
    CommitStarted,
    CommitSucceeded,
    CommitFailed,
    Reset,
}

impl ImportStep {
    /// 迁移表
    ///
    /// # 返回
    /// - Some(step): 合法迁移的目标步骤
    /// - None: 当前步骤不接受该事件
    pub fn next(self, event: ImportEvent) -> Option<ImportStep> {
        use ImportEvent as E;
        use ImportStep as S;

        match (self, event) {
            (S::Upload | S::Preview, E::Parsed) => Some(S::Preview),
            (S::Preview, E::ProceedToMapping) => Some(S::Mapping),
            (S::Mapping, E::BackToPreview) => Some(S::Preview),
            (S::Mapping | S::Validation, E::Validated) => Some(S::Validation),
            (S::Validation, E::BackToMapping) => Some(S::Mapping),
            (S::Validation, E::CommitStarted) => Some(S::Importing),
            (S::Importing, E::CommitSucceeded) => Some(S::Complete),
            (S::Importing, E::CommitFailed) => Some(S::Validation),
            (S::Importing, E::Reset) => None,
            (_, E::Reset) => Some(S::Upload),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStep::Upload => "upload",
            ImportStep::Preview => "preview",
            ImportStep::Mapping => "mapping",
            ImportStep::Validation => "validation",
            ImportStep::Importing => "importing",
            ImportStep::Complete => "complete",
        }
    }
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ImportEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportEvent::Parsed => "parsed",
            ImportEvent::ProceedToMapping => "proceed_to_mapping",
            ImportEvent::BackToPreview => "back_to_preview",
            ImportEvent::Validated => "validated",
            ImportEvent::BackToMapping => "back_to_mapping",
            ImportEvent::CommitStarted => "commit_started",
            ImportEvent::CommitSucceeded => "commit_succeeded",
            ImportEvent::CommitFailed => "commit_failed",
            ImportEvent::Reset => "reset",
        }
    }
}

// ==========================================
// ImportSession - 单次导入会话的全部状态
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportSession {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    step: ImportStep,
    pub file_name: Option<String>,
    pub workbook: Option<Workbook>,
    pub mapping: MappingEditor,
    pub preview: Option<ImportPreview>,
    pub last_error: Option<String>,
}

impl ImportSession {
    pub fn new(schema: Arc<[SystemField]>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            step: ImportStep::Upload,
            file_name: None,
            workbook: None,
            mapping: MappingEditor::new(schema),
            preview: None,
            last_error: None,
        }
    }

    pub fn step(&self) -> ImportStep {
        self.step
    }

    /// 检查事件在当前步骤是否合法（不迁移）
    pub fn check(&self, event: ImportEvent) -> ImportResult<ImportStep> {
        self.step
            .next(event)
            .ok_or_else(|| ImportError::InvalidTransition {
                from: self.step.to_string(),
                action: event.as_str().to_string(),
            })
    }

    /// 执行迁移
    pub fn apply(&mut self, event: ImportEvent) -> ImportResult<ImportStep> {
        let to = self.check(event)?;
        if to != self.step {
            info!(
                session_id = %self.session_id,
                from = %self.step,
                to = %to,
                event = event.as_str(),
                "导入步骤迁移"
            );
        }
        self.step = to;
        Ok(to)
    }

    /// 要求当前处于指定步骤
    pub fn ensure_step(&self, expected: ImportStep, action: &str) -> ImportResult<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(ImportError::InvalidTransition {
                from: self.step.to_string(),
                action: action.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STEPS: [ImportStep; 6] = [
        ImportStep::Upload,
        ImportStep::Preview,
        ImportStep::Mapping,
        ImportStep::Validation,
        ImportStep::Importing,
        ImportStep::Complete,
    ];

    #[test]
    fn test_happy_path() {
        let mut step = ImportStep::Upload;
        for (event, expected) in [
            (ImportEvent::Parsed, ImportStep::Preview),
            (ImportEvent::ProceedToMapping, ImportStep::Mapping),
            (ImportEvent::Validated, ImportStep::Validation),
            (ImportEvent::CommitStarted, ImportStep::Importing),
            (ImportEvent::CommitSucceeded, ImportStep::Complete),
        ] {
            step = step.next(event).unwrap();
            assert_eq!(step, expected);
        }
    }

    #[test]
    fn test_backward_and_failure_paths() {
        assert_eq!(ImportStep::Mapping.next(ImportEvent::BackToPreview), Some(ImportStep::Preview));
        assert_eq!(ImportStep::Validation.next(ImportEvent::BackToMapping), Some(ImportStep::Mapping));
        assert_eq!(ImportStep::Importing.next(ImportEvent::CommitFailed), Some(ImportStep::Validation));
    }

    #[test]
    fn test_commit_only_from_validation() {
        for step in ALL_STEPS {
            let allowed = step.next(ImportEvent::CommitStarted).is_some();
            assert_eq!(allowed, step == ImportStep::Validation, "{step}");
        }
    }

    #[test]
    fn test_reset_everywhere_but_importing() {
        for step in ALL_STEPS {
            let to = step.next(ImportEvent::Reset);
            if step == ImportStep::Importing {
                assert_eq!(to, None);
            } else {
                assert_eq!(to, Some(ImportStep::Upload));
            }
        }
    }

    #[test]
    fn test_session_apply_rejects_invalid() {
        let mut session = ImportSession::new(Arc::from(Vec::<SystemField>::new()));
        let err = session.apply(ImportEvent::Validated).unwrap_err();
        assert!(matches!(err, ImportError::InvalidTransition { ref from, .. } if from == "upload"));
        assert_eq!(session.step(), ImportStep::Upload);

        session.apply(ImportEvent::Parsed).unwrap();
        assert_eq!(session.step(), ImportStep::Preview);
    }
}
