// ==========================================
// EnerjiOS 导入管道 - 引擎层
// ==========================================
// 职责: 会话状态机与管道编排
// 红线: 单元格级规则在 importer 层,引擎只负责步骤与门槛
// ==========================================

pub mod orchestrator;
pub mod session;

// 重导出核心引擎
pub use orchestrator::{ImportOrchestrator, ImportOutcome};
pub use session::{ImportEvent, ImportSession, ImportStep};
