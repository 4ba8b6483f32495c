// ==========================================
// EnerjiOS 导入管道 - 列自动映射器
// ==========================================
// 职责: 源表头 → 目标字段 启发式配对
// 规则: 精确匹配 > 包含匹配 > Jaro-Winkler 相似度
// 红线: 纯函数,同输入同输出;输出中列与字段均不重复
// ==========================================

use crate::domain::mapping::ColumnMapping;
use crate::domain::schema::SystemField;
use crate::importer::normalizer::normalize_label;
use std::cmp::Ordering;
use tracing::debug;

/// 默认最低置信度
pub const DEFAULT_AUTO_MAP_THRESHOLD: f64 = 0.80;

/// 包含匹配的基础分与长度比加成
const CONTAINMENT_BASE: f64 = 0.80;
const CONTAINMENT_BONUS: f64 = 0.15;

/// 候选配对
#[derive(Debug, Clone)]
struct Candidate {
    field_pos: usize,
    header_idx: usize,
    score: f64,
}

/// 使用默认阈值自动映射
pub fn auto_map_default(headers: &[String], fields: &[SystemField]) -> Vec<ColumnMapping> {
    auto_map(headers, fields, DEFAULT_AUTO_MAP_THRESHOLD)
}

/// 自动映射
///
/// # 参数
/// - headers: 当前表头（下标即源列下标）
/// - fields: 目标字段 schema
/// - threshold: 最低置信度（0.0 ~ 1.0）
///
/// # 返回
/// - 按 schema 字段顺序排列的映射,未达阈值的字段不映射
pub fn auto_map(headers: &[String], fields: &[SystemField], threshold: f64) -> Vec<ColumnMapping> {
    let normalized_headers: Vec<String> = headers.iter().map(|h| normalize_label(h)).collect();

    // 收集所有达到阈值的配对
    let mut candidates = Vec::new();
    for (field_pos, field) in fields.iter().enumerate() {
        let targets = field_targets(field);
        for (header_idx, header) in normalized_headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let score = targets
                .iter()
                .map(|t| score_pair(header, t))
                .fold(0.0_f64, f64::max);
            if score >= threshold {
                candidates.push(Candidate {
                    field_pos,
                    header_idx,
                    score,
                });
            }
        }
    }

    // 分数降序,同分按字段顺序、再按表头下标（稳定）
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.field_pos.cmp(&b.field_pos))
            .then(a.header_idx.cmp(&b.header_idx))
    });

    let mut field_taken = vec![false; fields.len()];
    let mut header_taken = vec![false; headers.len()];
    let mut chosen: Vec<(usize, usize)> = Vec::new();
    for c in candidates {
        if field_taken[c.field_pos] || header_taken[c.header_idx] {
            continue;
        }
        field_taken[c.field_pos] = true;
        header_taken[c.header_idx] = true;
        debug!(
            field = %fields[c.field_pos].id,
            header = %headers[c.header_idx],
            score = c.score,
            "自动映射命中"
        );
        chosen.push((c.field_pos, c.header_idx));
    }

    chosen.sort_by_key(|(field_pos, _)| *field_pos);
    chosen
        .into_iter()
        .map(|(field_pos, header_idx)| {
            ColumnMapping::from_field(&fields[field_pos], headers[header_idx].clone(), header_idx)
        })
        .collect()
}

/// 字段的比较目标: label、id、别名（已规范化、去空、去重）
fn field_targets(field: &SystemField) -> Vec<String> {
    let mut targets: Vec<String> = Vec::with_capacity(field.aliases.len() + 2);
    for raw in std::iter::once(&field.label)
        .chain(std::iter::once(&field.id))
        .chain(field.aliases.iter())
    {
        let n = normalize_label(raw);
        if !n.is_empty() && !targets.contains(&n) {
            targets.push(n);
        }
    }
    targets
}

/// 已规范化的表头与目标之间的相似度
pub fn score_pair(header: &str, target: &str) -> f64 {
    if header.is_empty() || target.is_empty() {
        return 0.0;
    }
    if header == target {
        return 1.0;
    }

    let (shorter, longer) = if header.chars().count() <= target.chars().count() {
        (header, target)
    } else {
        (target, header)
    };
    let short_len = shorter.chars().count();
    if short_len >= 2 && longer.contains(shorter) {
        let ratio = short_len as f64 / longer.chars().count() as f64;
        return CONTAINMENT_BASE + CONTAINMENT_BONUS * ratio;
    }

    strsim::jaro_winkler(header, target)
}
