// ==========================================
// 废料分析系统 - 记录规范化器
// ==========================================
// 职责: 原始行 -> ScrapRecord (容忍可选列缺失)
// 输入: RawRow 列表 / RecordSource
// 输出: NormalizeOutcome (记录 + 校验问题)
// ==========================================
// 列解析规则:
// - 数量: quantity 列 -> scrap_weight 列 -> 1.0
// - 班次: shift 列, 缺失取默认值, UPPER 并去除 "SHIFT " 前缀
// - 原因: reason / cause 列, 空白为 None
// - 机台: machine_name -> machine -> machine_operator -> "Unknown"
// - 日期无法解析的行丢弃; 数量无法解析按 0 处理
// ==========================================

use crate::domain::record::{RawRow, ScrapRecord, UNKNOWN_MACHINE};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{SchemaResult, ValidationError};
use crate::importer::importer_trait::{DataCleaner as _, RecordSource};

/// 列名常量
pub mod columns {
    pub const DATE: &str = "date";
    pub const QUANTITY: &str = "quantity";
    pub const SCRAP_WEIGHT: &str = "scrap_weight";
    pub const SHIFT: &str = "shift";
    pub const REASON: &str = "reason";
    pub const CAUSE: &str = "cause";
    pub const MACHINE_NAME: &str = "machine_name";
    pub const MACHINE: &str = "machine";
    pub const MACHINE_OPERATOR: &str = "machine_operator";
    pub const OPERATOR: &str = "operator";
    pub const TOTAL_PRODUCED: &str = "total_produced";
    pub const PRODUCED_TOTAL: &str = "produced_total";
    pub const UNIT: &str = "unit";
    pub const COMMENTS: &str = "comments";
}

/// 规范化选项
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    pub default_shift: String,
    pub default_unit: String,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            default_shift: "A".to_string(),
            default_unit: "lbs".to_string(),
        }
    }
}

/// 规范化结果
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub records: Vec<ScrapRecord>,
    pub issues: Vec<ValidationError>,
}

impl NormalizeOutcome {
    /// 被丢弃的行数
    pub fn dropped_rows(&self) -> usize {
        self.issues.iter().filter(|i| i.drops_row()).count()
    }
}

// ==========================================
// RecordNormalizer - 记录规范化器
// ==========================================
pub struct RecordNormalizer {
    cleaner: DataCleaner,
    options: NormalizerOptions,
}

impl RecordNormalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self {
            cleaner: DataCleaner,
            options,
        }
    }

    /// 读取数据源并规范化
    ///
    /// # 返回
    /// - Err(SchemaError): 仅当数据源整体不可读
    pub fn normalize_source(&self, source: &dyn RecordSource) -> SchemaResult<NormalizeOutcome> {
        let rows = source.read_rows()?;
        tracing::debug!(source = %source.describe(), rows = rows.len(), "读取原始行");
        Ok(self.normalize(&rows))
    }

    /// 规范化原始行
    pub fn normalize(&self, rows: &[RawRow]) -> NormalizeOutcome {
        let mut outcome = NormalizeOutcome::default();

        for (idx, row) in rows.iter().enumerate() {
            if let Some(record) = self.normalize_row(row, idx + 1, &mut outcome.issues) {
                outcome.records.push(record);
            }
        }

        let dropped = outcome.dropped_rows();
        if !outcome.issues.is_empty() {
            tracing::warn!(
                total = rows.len(),
                kept = outcome.records.len(),
                dropped,
                issues = outcome.issues.len(),
                "规范化存在数据问题"
            );
        }

        outcome
    }

    fn normalize_row(
        &self,
        row: &RawRow,
        row_number: usize,
        issues: &mut Vec<ValidationError>,
    ) -> Option<ScrapRecord> {
        // 1. 日期 (必需)
        let date = match self.field(row, columns::DATE) {
            None => {
                issues.push(ValidationError::MissingDate { row: row_number });
                return None;
            }
            Some(raw) => match self.cleaner.parse_date(&raw) {
                Some(date) => date,
                None => {
                    issues.push(ValidationError::InvalidDate {
                        row: row_number,
                        value: raw,
                    });
                    return None;
                }
            },
        };

        // 2. 数量
        let quantity = self.resolve_quantity(row, row_number, issues);

        // 3. 班次
        let shift = self.cleaner.normalize_shift(
            row.get(columns::SHIFT).map(String::as_str),
            &self.options.default_shift,
        );

        // 4. 原因
        let cause = self
            .field(row, columns::REASON)
            .or_else(|| self.field(row, columns::CAUSE));

        // 5. 机台键: 首个非空者胜出
        let machine = [columns::MACHINE_NAME, columns::MACHINE, columns::MACHINE_OPERATOR]
            .iter()
            .find_map(|col| self.field(row, col))
            .unwrap_or_else(|| UNKNOWN_MACHINE.to_string());

        // 6. 操作员
        let operator = self
            .field(row, columns::MACHINE_OPERATOR)
            .or_else(|| self.field(row, columns::OPERATOR))
            .unwrap_or_default();

        // 7. 总产量
        let produced_total = self
            .field(row, columns::TOTAL_PRODUCED)
            .or_else(|| self.field(row, columns::PRODUCED_TOTAL))
            .and_then(|raw| match self.cleaner.parse_number(&raw) {
                Some(v) => Some(v),
                None => {
                    issues.push(ValidationError::InvalidProducedTotal {
                        row: row_number,
                        value: raw,
                    });
                    None
                }
            });

        let unit = self
            .field(row, columns::UNIT)
            .unwrap_or_else(|| self.options.default_unit.clone());

        Some(ScrapRecord {
            date,
            quantity,
            cause,
            machine,
            operator,
            shift,
            produced_total,
            unit,
            comments: self.field(row, columns::COMMENTS),
        })
    }

    /// 数量列回退: quantity -> scrap_weight -> 1.0
    fn resolve_quantity(
        &self,
        row: &RawRow,
        row_number: usize,
        issues: &mut Vec<ValidationError>,
    ) -> f64 {
        let raw = if let Some(v) = row.get(columns::QUANTITY) {
            v
        } else if let Some(v) = row.get(columns::SCRAP_WEIGHT) {
            v
        } else {
            return 1.0;
        };

        match self.cleaner.parse_number(raw) {
            Some(v) if v < 0.0 => {
                issues.push(ValidationError::NegativeQuantity {
                    row: row_number,
                    value: v,
                });
                0.0
            }
            Some(v) => v,
            None => {
                issues.push(ValidationError::InvalidQuantity {
                    row: row_number,
                    value: raw.clone(),
                });
                0.0
            }
        }
    }

    fn field(&self, row: &RawRow, column: &str) -> Option<String> {
        self.cleaner.normalize_null(row.get(column).map(String::as_str))
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(NormalizerOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_row() {
        let normalizer = RecordNormalizer::default();
        let outcome = normalizer.normalize(&[row(&[
            ("date", "2025-10-01"),
            ("quantity", "12.5"),
            ("shift", "shift b"),
            ("reason", "Overheat"),
            ("machine_name", "Press A"),
            ("machine_operator", "Jo"),
            ("total_produced", "500"),
            ("unit", "kg"),
        ])]);

        assert!(outcome.issues.is_empty());
        let r = &outcome.records[0];
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(r.quantity, 12.5);
        assert_eq!(r.shift, "B");
        assert_eq!(r.cause.as_deref(), Some("Overheat"));
        assert_eq!(r.machine, "Press A");
        assert_eq!(r.operator, "Jo");
        assert_eq!(r.produced_total, Some(500.0));
        assert_eq!(r.unit, "kg");
    }

    #[test]
    fn test_quantity_fallbacks() {
        let normalizer = RecordNormalizer::default();
        let outcome = normalizer.normalize(&[
            row(&[("date", "2025-10-01"), ("scrap_weight", "95.2")]),
            row(&[("date", "2025-10-01")]),
            row(&[("date", "2025-10-01"), ("quantity", "oops")]),
            row(&[("date", "2025-10-01"), ("quantity", "-3")]),
        ]);

        let quantities: Vec<f64> = outcome.records.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![95.2, 1.0, 0.0, 0.0]);
        assert_eq!(outcome.issues.len(), 2);
        assert_eq!(outcome.dropped_rows(), 0);
    }

    #[test]
    fn test_defaults_and_machine_resolution() {
        let normalizer = RecordNormalizer::default();
        let outcome = normalizer.normalize(&[
            row(&[("date", "2025-10-01"), ("machine", "Cutter C")]),
            row(&[("date", "2025-10-01"), ("machine_name", " "), ("machine_operator", "Kim")]),
            row(&[("date", "2025-10-01")]),
        ]);

        let machines: Vec<&str> = outcome.records.iter().map(|r| r.machine.as_str()).collect();
        assert_eq!(machines, vec!["Cutter C", "Kim", "Unknown"]);
        assert!(outcome.records.iter().all(|r| r.shift == "A"));
        assert!(outcome.records.iter().all(|r| r.cause.is_none()));
        assert!(outcome.records.iter().all(|r| r.unit == "lbs"));
    }

    #[test]
    fn test_bad_dates_dropped() {
        let normalizer = RecordNormalizer::default();
        let outcome = normalizer.normalize(&[
            row(&[("date", "garbage"), ("quantity", "1")]),
            row(&[("quantity", "1")]),
            row(&[("date", "2025-10-02"), ("quantity", "1")]),
        ]);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.dropped_rows(), 2);
        assert_eq!(
            outcome.issues[0],
            ValidationError::InvalidDate { row: 1, value: "garbage".to_string() }
        );
        assert_eq!(outcome.issues[1], ValidationError::MissingDate { row: 2 });
    }

    #[test]
    fn test_normalize_source_from_memory() {
        let normalizer = RecordNormalizer::default();
        let source: Vec<RawRow> = vec![row(&[("date", "2025-10-01"), ("quantity", "2")])];
        let outcome = normalizer.normalize_source(&source).unwrap();
        assert_eq!(outcome.records.len(), 1);
    }
}
