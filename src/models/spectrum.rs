//! # 谱图数据模型
//!
//! XPS 谱（能量-强度序列）与能量窗口。
//!
//! ## 依赖关系
//! - 被 `parsers/spectrum.rs` 构造
//! - 被 `xps/peaks.rs`, `commands/` 使用

use crate::error::{XpsError, Result};

use std::fmt;
use std::str::FromStr;

/// XPS 谱：能量升序，强度与能量等长
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// 谱名称（通常为文件名）
    pub name: String,
    /// 能量轴 (eV)，升序
    pub energy: Vec<f64>,
    /// 强度
    pub intensity: Vec<f64>,
}

impl Spectrum {
    /// 由 (能量, 强度) 点构造，按能量升序排列
    pub fn from_points(name: impl Into<String>, mut points: Vec<(f64, f64)>) -> Self {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (energy, intensity) = points.into_iter().unzip();
        Self {
            name: name.into(),
            energy,
            intensity,
        }
    }

    /// 采样点数
    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }

    /// 能量范围 (min, max)
    pub fn energy_range(&self) -> Option<(f64, f64)> {
        match (self.energy.first(), self.energy.last()) {
            (Some(lo), Some(hi)) => Some((*lo, *hi)),
            _ => None,
        }
    }
}

/// 能量窗口，构造时归一化为 (min, max)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyWindow {
    low: f64,
    high: f64,
}

impl EnergyWindow {
    /// 创建窗口（与端点顺序无关）
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// 闭区间判断
    pub fn contains(&self, energy: f64) -> bool {
        energy >= self.low && energy <= self.high
    }
}

impl From<(f64, f64)> for EnergyWindow {
    fn from((a, b): (f64, f64)) -> Self {
        Self::new(a, b)
    }
}

impl fmt::Display for EnergyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}:{:.2}", self.low, self.high)
    }
}

/// 解析 "LOW:HIGH" 形式的窗口（用 ':' 分隔以允许负能量）
impl FromStr for EnergyWindow {
    type Err = XpsError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').map(|p| p.trim()).collect();
        if parts.len() != 2 {
            return Err(XpsError::InvalidWindow(s.to_string()));
        }

        let a: f64 = parts[0]
            .parse()
            .map_err(|_| XpsError::InvalidWindow(s.to_string()))?;
        let b: f64 = parts[1]
            .parse()
            .map_err(|_| XpsError::InvalidWindow(s.to_string()))?;

        if !a.is_finite() || !b.is_finite() {
            return Err(XpsError::InvalidWindow(s.to_string()));
        }

        Ok(Self::new(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_normalized() {
        let w = EnergyWindow::new(535.5, 530.3);
        assert_eq!(w.low(), 530.3);
        assert_eq!(w.high(), 535.5);
        assert!(w.contains(530.3));
        assert!(w.contains(535.5));
        assert!(!w.contains(536.0));
    }

    #[test]
    fn test_window_parse() {
        let w: EnergyWindow = "532.5:528.5".parse().unwrap();
        assert_eq!(w, EnergyWindow::new(528.5, 532.5));

        let neg: EnergyWindow = "-3.5:1".parse().unwrap();
        assert_eq!(neg.low(), -3.5);

        assert!("530-535".parse::<EnergyWindow>().is_err());
        assert!("a:b".parse::<EnergyWindow>().is_err());
    }

    #[test]
    fn test_spectrum_sorted() {
        let s = Spectrum::from_points("s", vec![(3.0, 30.0), (1.0, 10.0), (2.0, 20.0)]);
        assert_eq!(s.energy, vec![1.0, 2.0, 3.0]);
        assert_eq!(s.intensity, vec![10.0, 20.0, 30.0]);
        assert_eq!(s.energy_range(), Some((1.0, 3.0)));
    }
}
