// ==========================================
// EnerjiOS 导入管道 - 映射编辑器
// ==========================================
// 职责: 源列与目标字段的双向绑定
// 不变量: 每个字段至多一个映射,每个源列至多一个映射（后写覆盖）
// ==========================================

use crate::domain::mapping::ColumnMapping;
use crate::domain::schema::SystemField;
use crate::importer::error::{ImportError, ImportResult};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct MappingEditor {
    schema: Arc<[SystemField]>,
    mappings: Vec<ColumnMapping>,
}

impl MappingEditor {
    pub fn new(schema: Arc<[SystemField]>) -> Self {
        Self {
            schema,
            mappings: Vec::new(),
        }
    }

    pub fn schema(&self) -> &[SystemField] {
        &self.schema
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        &self.mappings
    }

    pub fn field(&self, field_id: &str) -> Option<&SystemField> {
        self.schema.iter().find(|f| f.id == field_id)
    }

    /// 绑定字段到源列
    ///
    /// 与该字段或该源列冲突的旧映射会被移除
    pub fn map(&mut self, field_id: &str, excel_header: &str, excel_index: usize) -> ImportResult<()> {
        let field = self
            .field(field_id)
            .ok_or_else(|| ImportError::UnknownField(field_id.to_string()))?;
        let mapping = ColumnMapping::from_field(field, excel_header, excel_index);

        self.mappings
            .retain(|m| m.system_field != field_id && m.excel_index != excel_index);
        self.mappings.push(mapping);
        debug!(field = field_id, column = excel_header, excel_index, "字段已映射");
        Ok(())
    }

    /// 解除字段映射,返回是否存在过映射
    pub fn unmap(&mut self, field_id: &str) -> bool {
        let before = self.mappings.len();
        self.mappings.retain(|m| m.system_field != field_id);
        before != self.mappings.len()
    }

    pub fn clear_all(&mut self) {
        self.mappings.clear();
    }

    /// 整体替换（自动映射结果）
    ///
    /// 未知字段与重复键按后写覆盖规则处理
    pub fn replace_all(&mut self, mappings: Vec<ColumnMapping>) {
        self.mappings.clear();
        for m in mappings {
            if self.field(&m.system_field).is_none() {
                warn!(field = %m.system_field, "忽略未知字段的映射");
                continue;
            }
            self.mappings
                .retain(|x| x.system_field != m.system_field && x.excel_index != m.excel_index);
            self.mappings.push(m);
        }
    }

    /// 删除指向已不存在列的映射,返回被删除的字段 id
    pub fn prune_dangling(&mut self, column_count: usize) -> Vec<String> {
        let dropped: Vec<String> = self
            .mappings
            .iter()
            .filter(|m| m.excel_index >= column_count)
            .map(|m| m.system_field.clone())
            .collect();
        if !dropped.is_empty() {
            warn!(?dropped, column_count, "删除悬空映射");
            self.mappings.retain(|m| m.excel_index < column_count);
        }
        dropped
    }

    pub fn is_field_mapped(&self, field_id: &str) -> bool {
        self.mappings.iter().any(|m| m.system_field == field_id)
    }

    pub fn is_column_mapped(&self, excel_index: usize) -> bool {
        self.mappings.iter().any(|m| m.excel_index == excel_index)
    }

    pub fn mapped_fields_count(&self) -> usize {
        self.mappings.len()
    }

    pub fn mapping_for_field(&self, field_id: &str) -> Option<&ColumnMapping> {
        self.mappings.iter().find(|m| m.system_field == field_id)
    }

    /// 尚未映射的必填字段
    pub fn missing_required_fields(&self) -> Vec<&SystemField> {
        self.schema
            .iter()
            .filter(|f| f.required && !self.is_field_mapped(&f.id))
            .collect()
    }

    pub fn required_fields_satisfied(&self) -> bool {
        self.missing_required_fields().is_empty()
    }
}
