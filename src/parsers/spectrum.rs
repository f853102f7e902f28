//! # XPS 谱文件解析器
//!
//! 读取仪器或拟合软件导出的 CSV/TXT 谱数据，返回能量升序的 Spectrum。
//!
//! ## 支持格式
//! ```text
//! # 注释行与空行被忽略
//! Binding Energy;Counts
//! 528.50;1203.4
//! 528.55;1210.9
//! ...
//! ```
//! - 分隔符自动检测：`,` `;` 制表符，或连续空白
//! - 表头自动检测：首行含非数字字段即视为表头
//! - 列自动推断：常见能量/强度列名，否则取前两个数值列
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/spectrum.rs`
//! - 使用 `csv` 解析分隔文本，`regex` 处理空白分隔

use crate::error::{XpsError, Result};
use crate::models::Spectrum;

use regex::Regex;
use std::fs;
use std::path::Path;

/// 常见能量列名
const ENERGY_NAMES: &[&str] = &[
    "BE",
    "Binding Energy",
    "BindingEnergy",
    "binding_energy",
    "Energy",
    "E",
    "Kinetic Energy",
    "KineticEnergy",
    "KE",
];

/// 常见强度列名
const INTENSITY_NAMES: &[&str] = &["I", "Intensity", "Counts", "cps", "CPS", "Signal", "Y"];

/// 候选分隔符（按优先级）
const DELIMITERS: &[u8] = &[b',', b';', b'\t'];

/// 分隔符检测时采样的行数
const SNIFF_LINES: usize = 10;

/// 谱文件读取选项
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// 能量列（表头名称或 0 起始索引）
    pub energy_col: Option<String>,
    /// 强度列（表头名称或 0 起始索引）
    pub intensity_col: Option<String>,
    /// 跳过的前导行数
    pub skip_rows: usize,
    /// 显式分隔符；`None` 为自动检测
    pub delimiter: Option<u8>,
}

/// 读取谱文件
pub fn load_spectrum(path: &Path, options: &LoadOptions) -> Result<Spectrum> {
    let content = fs::read_to_string(path).map_err(|e| XpsError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("spectrum");

    parse_spectrum_content(&content, name, options).map_err(|e| match e {
        XpsError::ParseError { format, reason, .. } => XpsError::ParseError {
            format,
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 从字符串内容解析谱数据
pub fn parse_spectrum_content(content: &str, name: &str, options: &LoadOptions) -> Result<Spectrum> {
    let lines: Vec<&str> = content
        .lines()
        .skip(options.skip_rows)
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();

    if lines.is_empty() {
        return Err(parse_error(name, "no data lines found"));
    }

    let delimiter = options.delimiter.or_else(|| sniff_delimiter(&lines));
    let rows = split_rows(&lines, delimiter)?;

    let has_header = rows[0].iter().any(|field| field.parse::<f64>().is_err());
    let (header, data): (Option<&Vec<String>>, &[Vec<String>]) = if has_header {
        (Some(&rows[0]), &rows[1..])
    } else {
        (None, &rows[..])
    };

    let first = data
        .first()
        .ok_or_else(|| parse_error(name, "header found but no data rows"))?;

    let (e_col, i_col) = match (&options.energy_col, &options.intensity_col) {
        (Some(e), Some(i)) => (
            resolve_column(e, header, name)?,
            resolve_column(i, header, name)?,
        ),
        _ => infer_columns(header, first)
            .ok_or_else(|| parse_error(name, "could not find two numeric columns"))?,
    };

    let mut points = Vec::with_capacity(data.len());
    for (row_idx, row) in data.iter().enumerate() {
        let energy = parse_field(row, e_col, row_idx, name)?;
        let intensity = parse_field(row, i_col, row_idx, name)?;
        points.push((energy, intensity));
    }

    if points.len() < 2 {
        return Err(parse_error(name, "spectrum needs at least 2 data rows"));
    }

    Ok(Spectrum::from_points(name, points))
}

/// 检测分隔符：采样行字段数一致且大于 1 的候选中字段数最多者
fn sniff_delimiter(lines: &[&str]) -> Option<u8> {
    let sample = &lines[..lines.len().min(SNIFF_LINES)];

    DELIMITERS
        .iter()
        .filter_map(|&d| {
            let counts: Vec<usize> = sample
                .iter()
                .map(|l| l.split(d as char).count())
                .collect();
            let n = counts[0];
            if n > 1 && counts.iter().all(|&c| c == n) {
                Some((d, n))
            } else {
                None
            }
        })
        .max_by_key(|&(_, n)| n)
        .map(|(d, _)| d)
}

/// 拆分为字段
fn split_rows(lines: &[&str], delimiter: Option<u8>) -> Result<Vec<Vec<String>>> {
    match delimiter {
        Some(d) => {
            let joined = lines.join("\n");
            let mut reader = csv::ReaderBuilder::new()
                .delimiter(d)
                .has_headers(false)
                .flexible(true)
                .trim(csv::Trim::All)
                .from_reader(joined.as_bytes());

            let mut rows = Vec::with_capacity(lines.len());
            for record in reader.records() {
                let record = record?;
                rows.push(record.iter().map(|f| f.to_string()).collect());
            }
            Ok(rows)
        }
        None => {
            let re = Regex::new(r"\s+").map_err(|e| XpsError::Other(e.to_string()))?;
            Ok(lines
                .iter()
                .map(|l| re.split(l).map(|f| f.to_string()).collect())
                .collect())
        }
    }
}

/// 解析列标识：表头名称优先，其次 0 起始索引
fn resolve_column(column: &str, header: Option<&Vec<String>>, name: &str) -> Result<usize> {
    if let Some(h) = header {
        if let Some(pos) = h.iter().position(|c| c.trim() == column.trim()) {
            return Ok(pos);
        }
    }
    column.trim()
        .parse::<usize>()
        .map_err(|_| parse_error(name, &format!("column '{}' not found", column)))
}

/// 推断 (能量列, 强度列)
fn infer_columns(header: Option<&Vec<String>>, first_row: &[String]) -> Option<(usize, usize)> {
    let numeric: Vec<usize> = first_row
        .iter()
        .enumerate()
        .filter(|(_, f)| f.parse::<f64>().is_ok())
        .map(|(i, _)| i)
        .collect();

    let by_name = |names: &[&str]| {
        header.and_then(|h| {
            names
                .iter()
                .find_map(|n| h.iter().position(|c| c.trim() == *n))
        })
    };

    let energy = by_name(ENERGY_NAMES).or_else(|| numeric.first().copied())?;
    let intensity = by_name(INTENSITY_NAMES)
        .or_else(|| numeric.iter().copied().find(|&c| c != energy))
        .or_else(|| numeric.last().copied())?;

    Some((energy, intensity))
}

fn parse_field(row: &[String], col: usize, row_idx: usize, name: &str) -> Result<f64> {
    let field = row.get(col).ok_or_else(|| {
        parse_error(
            name,
            &format!("data row {} has no column {}", row_idx + 1, col),
        )
    })?;
    field.parse::<f64>().map_err(|_| {
        parse_error(
            name,
            &format!("data row {}: '{}' is not a number", row_idx + 1, field),
        )
    })
}

fn parse_error(name: &str, reason: &str) -> XpsError {
    XpsError::ParseError {
        format: "spectrum".to_string(),
        path: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_with_named_columns() {
        let content = "\
# exported from CasaXPS
Counts;Binding Energy
1210.0;528.55
1203.5;528.50
1250.0;528.60
";
        let s = parse_spectrum_content(content, "o1s", &LoadOptions::default()).unwrap();
        assert_eq!(s.name, "o1s");
        // 能量列由名称识别，并按升序排列
        assert_eq!(s.energy, vec![528.50, 528.55, 528.60]);
        assert_eq!(s.intensity, vec![1203.5, 1210.0, 1250.0]);
    }

    #[test]
    fn test_whitespace_headerless() {
        let content = "530.0   10\n529.0\t12\n531.0  9\n";
        let s = parse_spectrum_content(content, "raw", &LoadOptions::default()).unwrap();
        assert_eq!(s.energy, vec![529.0, 530.0, 531.0]);
        assert_eq!(s.intensity, vec![12.0, 10.0, 9.0]);
    }

    #[test]
    fn test_fallback_numeric_columns() {
        let content = "label,ke,signal_a\nx,100.0,5\ny,101.0,6\n";
        let s = parse_spectrum_content(content, "t", &LoadOptions::default()).unwrap();
        assert_eq!(s.energy, vec![100.0, 101.0]);
        assert_eq!(s.intensity, vec![5.0, 6.0]);
    }

    #[test]
    fn test_explicit_columns_and_skip_rows() {
        let content = "instrument header line\nBE,I_raw,I_bg\n1.0,10,3\n2.0,20,4\n";
        let options = LoadOptions {
            energy_col: Some("BE".to_string()),
            intensity_col: Some("2".to_string()),
            skip_rows: 1,
            delimiter: None,
        };
        let s = parse_spectrum_content(content, "t", &options).unwrap();
        assert_eq!(s.intensity, vec![3.0, 4.0]);

        let missing = LoadOptions {
            energy_col: Some("Energy".to_string()),
            intensity_col: Some("I_raw".to_string()),
            skip_rows: 1,
            delimiter: None,
        };
        assert!(parse_spectrum_content(content, "t", &missing).is_err());
    }

    #[test]
    fn test_bad_number_reports_row() {
        let content = "BE,I\n1.0,10\n2.0,oops\n";
        let err = parse_spectrum_content(content, "t", &LoadOptions::default()).unwrap_err();
        match err {
            XpsError::ParseError { reason, .. } => assert!(reason.contains("row 2"), "{}", reason),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_too_few_rows() {
        assert!(parse_spectrum_content("BE,I\n1.0,2.0\n", "t", &LoadOptions::default()).is_err());
        assert!(parse_spectrum_content("# only comments\n", "t", &LoadOptions::default()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        fs::write(&path, "Energy,Intensity\n2.0,4.0\n1.0,3.0\n").unwrap();

        let s = load_spectrum(&path, &LoadOptions::default()).unwrap();
        assert_eq!(s.name, "sample");
        assert_eq!(s.energy, vec![1.0, 2.0]);

        let missing = load_spectrum(&dir.path().join("nope.csv"), &LoadOptions::default());
        assert!(matches!(missing, Err(XpsError::FileReadError { .. })));
    }
}
