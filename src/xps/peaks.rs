//! # 峰面积提取
//!
//! 背景扣除与梯形积分。
//!
//! ## 算法概述
//! 1. 截取能量窗口内的采样点（闭区间）
//! 2. 计算背景：无 / 端点直线 / Shirley 迭代
//! 3. 扣除背景后对非均匀能量轴做梯形积分
//!
//! ## Shirley 背景
//! 背景在窗口两端锚定到信号值；内部各点正比于从低能端到该点的
//! (信号 − 背景) 累积积分，并按全窗口积分归一化。
//!
//! ## 依赖关系
//! - 被 `xps/inversion.rs` 的调用方与 `commands/` 使用
//! - 使用 `models/spectrum.rs` 的 EnergyWindow

use crate::models::EnergyWindow;

use clap::ValueEnum;
use std::fmt;

/// 端点重合时的分母保护
const EPS: f64 = 1e-30;

/// 背景类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum Background {
    /// No background (data already background-subtracted)
    None,
    /// Straight line through the window endpoints
    #[default]
    Linear,
    /// Iterative Shirley background
    Shirley,
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Background::None => write!(f, "none"),
            Background::Linear => write!(f, "linear"),
            Background::Shirley => write!(f, "shirley"),
        }
    }
}

/// Shirley 迭代参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShirleyConfig {
    /// 最大迭代次数
    pub max_iter: usize,
    /// 逐点最大变化量收敛阈值
    pub tol: f64,
}

impl Default for ShirleyConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tol: 1e-6,
        }
    }
}

/// Shirley 背景计算结果
#[derive(Debug, Clone)]
pub struct ShirleyOutcome {
    /// 窗口内背景
    pub background: Vec<f64>,
    /// 实际迭代次数
    pub iterations: usize,
    /// 是否在迭代预算内收敛
    pub converged: bool,
}

/// 单个窗口的峰面积
#[derive(Debug, Clone)]
pub struct PeakArea {
    pub window: EnergyWindow,
    pub background: Background,
    /// 窗口内采样点数
    pub samples: usize,
    /// 扣除背景后的积分面积
    pub area: f64,
    /// Shirley 是否收敛（其他背景类型恒为 true）
    pub converged: bool,
}

/// 截取窗口内的采样点
pub fn window_slice(
    energy: &[f64],
    intensity: &[f64],
    window: EnergyWindow,
) -> (Vec<f64>, Vec<f64>) {
    energy
        .iter()
        .zip(intensity.iter())
        .filter(|(e, _)| window.contains(**e))
        .map(|(e, i)| (*e, *i))
        .unzip()
}

/// 端点直线背景
///
/// 窗口内不足 2 点时返回等长零向量。
pub fn baseline_linear(energy: &[f64], intensity: &[f64], window: EnergyWindow) -> Vec<f64> {
    let (xw, yw) = window_slice(energy, intensity, window);
    linear_on(&xw, &yw)
}

fn linear_on(xw: &[f64], yw: &[f64]) -> Vec<f64> {
    let n = xw.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let (x1, x2) = (xw[0], xw[n - 1]);
    let (y1, y2) = (yw[0], yw[n - 1]);
    let m = (y2 - y1) / (x2 - x1 + EPS);
    let b = y1 - m * x1;

    xw.iter().map(|x| m * x + b).collect()
}

/// Shirley 迭代背景
///
/// 预算用尽时返回最后一次估计，不视为错误。
pub fn baseline_shirley(
    energy: &[f64],
    intensity: &[f64],
    window: EnergyWindow,
    max_iter: usize,
    tol: f64,
) -> Vec<f64> {
    shirley_background(energy, intensity, window, &ShirleyConfig { max_iter, tol }).background
}

/// Shirley 背景，附带迭代信息
pub fn shirley_background(
    energy: &[f64],
    intensity: &[f64],
    window: EnergyWindow,
    config: &ShirleyConfig,
) -> ShirleyOutcome {
    let (xw, yw) = window_slice(energy, intensity, window);
    shirley_on(&xw, &yw, config)
}

fn shirley_on(xw: &[f64], yw: &[f64], config: &ShirleyConfig) -> ShirleyOutcome {
    let n = xw.len();
    if n < 3 {
        return ShirleyOutcome {
            background: linear_on(xw, yw),
            iterations: 0,
            converged: true,
        };
    }

    let y_low = yw[0];
    let y_high = yw[n - 1];

    // 初值：两端点之间按索引线性插值
    let mut bg: Vec<f64> = (0..n)
        .map(|i| y_low + (y_high - y_low) * i as f64 / (n - 1) as f64)
        .collect();

    let mut cumulative = vec![0.0; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        // (y - bg) 的累积梯形积分
        cumulative[0] = 0.0;
        for i in 1..n {
            let seg = 0.5 * ((yw[i] - bg[i]) + (yw[i - 1] - bg[i - 1])) * (xw[i] - xw[i - 1]);
            cumulative[i] = cumulative[i - 1] + seg;
        }

        let total = if cumulative[n - 1] != 0.0 {
            cumulative[n - 1]
        } else {
            EPS
        };

        let mut max_change = 0.0_f64;
        for i in 0..n {
            let next = y_low + (y_high - y_low) * (cumulative[i] / total);
            max_change = max_change.max((next - bg[i]).abs());
            bg[i] = next;
        }

        if max_change < config.tol {
            converged = true;
            break;
        }
    }

    ShirleyOutcome {
        background: bg,
        iterations,
        converged,
    }
}

/// 梯形积分（非均匀网格）
pub(crate) fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (ys[0] + ys[1]) * (xs[1] - xs[0]))
        .sum()
}

/// 扣除背景后的峰面积
///
/// 窗口内不足 2 点时返回 0.0。
pub fn integrate_area(
    energy: &[f64],
    intensity: &[f64],
    window: EnergyWindow,
    background: Background,
) -> f64 {
    integrate_area_with(
        energy,
        intensity,
        window,
        background,
        &ShirleyConfig::default(),
    )
    .area
}

/// 峰面积（可配置 Shirley 参数）
pub fn integrate_area_with(
    energy: &[f64],
    intensity: &[f64],
    window: EnergyWindow,
    background: Background,
    shirley: &ShirleyConfig,
) -> PeakArea {
    let (xw, yw) = window_slice(energy, intensity, window);
    let samples = xw.len();

    if samples < 2 {
        return PeakArea {
            window,
            background,
            samples,
            area: 0.0,
            converged: true,
        };
    }

    let (bg, converged) = match background {
        Background::None => (vec![0.0; samples], true),
        Background::Linear => (linear_on(&xw, &yw), true),
        Background::Shirley => {
            let outcome = shirley_on(&xw, &yw, shirley);
            (outcome.background, outcome.converged)
        }
    };

    let corrected: Vec<f64> = yw.iter().zip(bg.iter()).map(|(y, b)| y - b).collect();

    PeakArea {
        window,
        background,
        samples,
        area: trapezoid(&xw, &corrected),
        converged,
    }
}
