//! # 结果导出
//!
//! 导出模型曲线和批量拟合结果。
//!
//! ## 支持格式
//! - CSV: 模型曲线 (x, R) 或批量拟合结果（每个谱一行）
//! - XY: 制表符分隔的模型曲线，带 `#` 注释头
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs`, `commands/spectrum.rs` 调用
//! - 使用 `xps/attenuation.rs` 的 Ratio
//! - 使用 `csv` + `serde` 写入 CSV 文件

use crate::error::{XpsError, Result};
use crate::xps::Ratio;

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 批量处理中单个谱的结果行
#[derive(Debug, Clone, Serialize)]
pub struct FitRecord {
    pub file: String,
    pub theta: f64,
    pub a_over: Option<f64>,
    pub a_sub: Option<f64>,
    pub ratio: Option<f64>,
    pub thickness: Option<f64>,
    pub success: bool,
    pub iterations: Option<usize>,
    pub status: String,
}

impl FitRecord {
    /// 处理失败的谱；多行错误信息合并为一行
    pub fn failed(file: impl Into<String>, theta: f64, reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Self {
            file: file.into(),
            theta,
            a_over: None,
            a_sub: None,
            ratio: None,
            thickness: None,
            success: false,
            iterations: None,
            status: reason
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

fn write_error(path: &Path, e: std::io::Error) -> XpsError {
    XpsError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    }
}

/// 导出模型曲线为 CSV；无定义的比值写为空字段
pub fn curve_to_csv(curve: &[(f64, Ratio)], x_label: &str, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([x_label, "ratio"])?;
    for (x, r) in curve {
        let ratio = r.value().map(|v| format!("{:.6}", v)).unwrap_or_default();
        wtr.write_record([format!("{:.4}", x), ratio])?;
    }

    wtr.flush().map_err(|e| write_error(output_path, e))?;
    Ok(())
}

/// 导出模型曲线为 XY 格式；无定义的比值跳过
pub fn curve_to_xy(
    curve: &[(f64, Ratio)],
    header: &[String],
    x_label: &str,
    output_path: &Path,
) -> Result<()> {
    let file = File::create(output_path).map_err(|e| write_error(output_path, e))?;
    let mut out = BufWriter::new(file);

    let mut write = || -> std::io::Result<()> {
        for line in header {
            writeln!(out, "# {}", line)?;
        }
        writeln!(out, "# Columns: {}, ratio (I_over / I_sub)", x_label)?;
        writeln!(out, "#")?;
        for (x, r) in curve {
            if let Some(v) = r.value() {
                writeln!(out, "{:.4}\t{:.6}", x, v)?;
            }
        }
        out.flush()
    };

    write().map_err(|e| write_error(output_path, e))
}

/// 导出批量拟合结果为 CSV
pub fn fits_to_csv(records: &[FitRecord], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush().map_err(|e| write_error(output_path, e))?;
    Ok(())
}
