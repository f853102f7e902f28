//! # 多角度比值表解析器
//!
//! 读取 `angle,ratio[,weight]` 形式的 CSV，供多角度厚度拟合使用。
//!
//! ## 依赖关系
//! - 被 `commands/fit.rs` 使用
//! - 使用 `csv` + `serde` 反序列化行

use crate::error::{XpsError, Result};

use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct AngleRow {
    angle: f64,
    ratio: f64,
    #[serde(default)]
    weight: Option<f64>,
}

/// 多角度测量数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AngleTable {
    pub angles: Vec<f64>,
    pub ratios: Vec<f64>,
    /// 全部行都给出权重时才为 Some
    pub weights: Option<Vec<f64>>,
}

/// 读取角度表文件
pub fn load_angle_table(path: &Path) -> Result<AngleTable> {
    if !path.exists() {
        return Err(XpsError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file = File::open(path).map_err(|e| XpsError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    read_angle_table(file, &path.display().to_string())
}

/// 从任意 reader 解析角度表
pub fn read_angle_table<R: std::io::Read>(reader: R, source: &str) -> Result<AngleTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(reader);

    let mut table = AngleTable::default();
    let mut weights = Vec::new();

    for row in rdr.deserialize::<AngleRow>() {
        let row = row?;
        table.angles.push(row.angle);
        table.ratios.push(row.ratio);
        if let Some(w) = row.weight {
            weights.push(w);
        }
    }

    if table.angles.is_empty() {
        return Err(XpsError::ParseError {
            format: "angle table".to_string(),
            path: source.to_string(),
            reason: "no rows".to_string(),
        });
    }

    match weights.len() {
        0 => {}
        n if n == table.angles.len() => table.weights = Some(weights),
        n => {
            return Err(XpsError::ParseError {
                format: "angle table".to_string(),
                path: source.to_string(),
                reason: format!("{} of {} rows have a weight", n, table.angles.len()),
            })
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_without_weights() {
        let data = "angle,ratio\n0,1.54\n# tilted\n45,2.41\n";
        let t = read_angle_table(data.as_bytes(), "mem").unwrap();
        assert_eq!(t.angles, vec![0.0, 45.0]);
        assert_eq!(t.ratios, vec![1.54, 2.41]);
        assert!(t.weights.is_none());
    }

    #[test]
    fn test_read_with_weights() {
        let data = "angle, ratio, weight\n0, 1.5, 1.0\n60, 4.1, 0.2\n";
        let t = read_angle_table(data.as_bytes(), "mem").unwrap();
        assert_eq!(t.weights, Some(vec![1.0, 0.2]));
    }

    #[test]
    fn test_partial_weights_rejected() {
        let data = "angle,ratio,weight\n0,1.5,1.0\n60,4.1,\n";
        assert!(read_angle_table(data.as_bytes(), "mem").is_err());
    }

    #[test]
    fn test_empty_and_missing() {
        assert!(read_angle_table("angle,ratio\n".as_bytes(), "mem").is_err());
        assert!(matches!(
            load_angle_table(Path::new("/nonexistent/angles.csv")),
            Err(XpsError::FileNotFound { .. })
        ));
    }
}
