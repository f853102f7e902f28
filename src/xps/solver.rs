//! # 有界非线性最小二乘求解器
//!
//! 单参数 Levenberg–Marquardt 迭代，试探步投影回 [lo, hi]。
//!
//! ## 算法概述
//! 1. 调用方提供解析 Jacobian ∂r/∂x
//! 2. 梯度 g = Jᵀr，近似 Hessian JᵀJ
//! 3. 阻尼步 δ = −g / (JᵀJ · (1 + λ))，截断到边界
//! 4. 代价下降则接受并减小 λ，否则增大 λ 重试
//!
//! ## 收敛判据（任一满足即成功）
//! - 代价为 0
//! - 实际与预测代价下降都 ≤ ftol · cost
//! - 未阻尼 Gauss–Newton 步（投影后）≤ xtol · (xtol + |x|)
//! - 梯度与残差夹角余弦 |g| / (‖J‖·‖r‖) ≤ gtol（活动边界上指向外侧的梯度视为 0）
//!
//! JᵀJ = 0 而残差非零时无法判断是否到达最优，返回 `FlatJacobian`（失败）。
//! 迭代预算用尽时返回当前最优解，`success = false`。
//!
//! ## 依赖关系
//! - 被 `xps/inversion.rs` 调用

use crate::error::{XpsError, Result};

use std::fmt;

/// 单次迭代内 λ 增大重试的上限
const MAX_STEP_TRIALS: usize = 64;

/// 求解器参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// 最大外层迭代次数
    pub max_iterations: usize,
    /// 相对代价下降阈值
    pub ftol: f64,
    /// 相对步长阈值
    pub xtol: f64,
    /// 梯度与残差夹角余弦阈值
    pub gtol: f64,
    /// 初始阻尼 λ
    pub lambda_init: f64,
    /// 拒绝步后 λ 放大倍数
    pub lambda_up: f64,
    /// 接受步后 λ 缩小倍数
    pub lambda_down: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            ftol: 1e-8,
            xtol: 1e-8,
            gtol: 1e-8,
            lambda_init: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
        }
    }
}

/// 终止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// 残差恰为 0
    ExactFit,
    /// 满足 ftol
    CostReduction,
    /// 满足 xtol
    StepSize,
    /// 满足 gtol
    Gradient,
    /// 迭代预算用尽
    MaxIterations,
    /// 阻尼重试耗尽仍无法降低代价
    NoProgress,
    /// 残差非零但 Jacobian 全为 0
    FlatJacobian,
    /// 残差或 Jacobian 在当前点无定义（非有限）
    UndefinedResidual,
}

impl SolverStatus {
    pub fn is_success(self) -> bool {
        matches!(
            self,
            SolverStatus::ExactFit
                | SolverStatus::CostReduction
                | SolverStatus::StepSize
                | SolverStatus::Gradient
        )
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SolverStatus::ExactFit => "residual vanished",
            SolverStatus::CostReduction => "ftol satisfied",
            SolverStatus::StepSize => "xtol satisfied",
            SolverStatus::Gradient => "gtol satisfied",
            SolverStatus::MaxIterations => "iteration budget exhausted",
            SolverStatus::NoProgress => "no cost reduction possible",
            SolverStatus::FlatJacobian => "Jacobian vanished at nonzero residual",
            SolverStatus::UndefinedResidual => "residual undefined",
        };
        write!(f, "{}", msg)
    }
}

/// 求解结果
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    /// 最优参数
    pub x: f64,
    /// 代价 ½Σr²
    pub cost: f64,
    /// 最优点残差
    pub residuals: Vec<f64>,
    /// 外层迭代次数
    pub iterations: usize,
    pub success: bool,
    pub status: SolverStatus,
}

impl SolverOutcome {
    fn finish(x: f64, residuals: Vec<f64>, iterations: usize, status: SolverStatus) -> Self {
        let cost = if residuals.is_empty() && status == SolverStatus::UndefinedResidual {
            f64::INFINITY
        } else {
            half_sum_sq(&residuals)
        };
        Self {
            x,
            cost,
            residuals,
            iterations,
            success: status.is_success(),
            status,
        }
    }
}

fn half_sum_sq(r: &[f64]) -> f64 {
    0.5 * r.iter().map(|v| v * v).sum::<f64>()
}

/// 校验边界
pub fn check_bounds(bounds: (f64, f64)) -> Result<()> {
    let (lo, hi) = bounds;
    if lo.is_nan() || hi.is_nan() || lo > hi {
        return Err(XpsError::InvalidBounds { lo, hi });
    }
    Ok(())
}

/// 有界最小二乘
///
/// `residual` 与 `jacobian` 返回 `None` 表示在该点无定义；含非有限值同样视为无定义。
/// `jacobian(x)` 的第 i 个分量为 ∂rᵢ/∂x，长度须与残差一致。
pub fn least_squares_bounded<F, J>(
    residual: F,
    jacobian: J,
    x0: f64,
    bounds: (f64, f64),
    config: &SolverConfig,
) -> Result<SolverOutcome>
where
    F: Fn(f64) -> Option<Vec<f64>>,
    J: Fn(f64) -> Option<Vec<f64>>,
{
    check_bounds(bounds)?;
    if !x0.is_finite() {
        return Err(XpsError::InvalidArgument(format!(
            "initial guess must be finite (got {})",
            x0
        )));
    }

    let (lo, hi) = bounds;
    let eval = |x: f64| residual(x).filter(|r| r.iter().all(|v| v.is_finite()));

    let mut x = x0.clamp(lo, hi);
    let mut r = match eval(x) {
        Some(r) => r,
        None => {
            return Ok(SolverOutcome::finish(
                x,
                Vec::new(),
                0,
                SolverStatus::UndefinedResidual,
            ))
        }
    };
    let mut cost = half_sum_sq(&r);

    if lo == hi {
        return Ok(SolverOutcome::finish(x, r, 0, SolverStatus::StepSize));
    }

    let mut lambda = config.lambda_init;

    for iter in 1..=config.max_iterations {
        if cost == 0.0 {
            return Ok(SolverOutcome::finish(x, r, iter - 1, SolverStatus::ExactFit));
        }

        let jac = match jacobian(x) {
            Some(j) if j.len() == r.len() && j.iter().all(|v| v.is_finite()) => j,
            _ => return Ok(SolverOutcome::finish(x, r, iter, SolverStatus::UndefinedResidual)),
        };

        let g: f64 = jac.iter().zip(r.iter()).map(|(j, ri)| j * ri).sum();
        let jtj: f64 = jac.iter().map(|j| j * j).sum();

        if !g.is_finite() || !jtj.is_finite() {
            return Ok(SolverOutcome::finish(x, r, iter, SolverStatus::UndefinedResidual));
        }
        if jtj == 0.0 {
            return Ok(SolverOutcome::finish(x, r, iter, SolverStatus::FlatJacobian));
        }

        // 活动边界上指向可行域外的梯度分量不计
        let at_lower_outward = x <= lo && g > 0.0;
        let at_upper_outward = x >= hi && g < 0.0;
        let cos_angle = if at_lower_outward || at_upper_outward {
            0.0
        } else {
            g.abs() / (jtj.sqrt() * (2.0 * cost).sqrt())
        };
        if cos_angle <= config.gtol {
            return Ok(SolverOutcome::finish(x, r, iter, SolverStatus::Gradient));
        }

        let gauss_newton = (x - g / jtj).clamp(lo, hi) - x;
        if gauss_newton.abs() <= config.xtol * (config.xtol + x.abs()) {
            return Ok(SolverOutcome::finish(x, r, iter, SolverStatus::StepSize));
        }
        let predicted = g * g / (2.0 * jtj);

        let mut accepted = false;
        for _ in 0..MAX_STEP_TRIALS {
            let x_trial = (x - g / (jtj * (1.0 + lambda))).clamp(lo, hi);

            if x_trial != x {
                if let Some(r_trial) = eval(x_trial) {
                    let cost_trial = half_sum_sq(&r_trial);
                    if cost_trial < cost {
                        let reduction = cost - cost_trial;
                        x = x_trial;
                        r = r_trial;
                        lambda *= config.lambda_down;

                        if reduction <= config.ftol * cost && predicted <= config.ftol * cost {
                            return Ok(SolverOutcome::finish(
                                x,
                                r,
                                iter,
                                SolverStatus::CostReduction,
                            ));
                        }
                        cost = cost_trial;
                        accepted = true;
                        break;
                    }
                }
            }
            lambda *= config.lambda_up;
        }

        if !accepted {
            return Ok(SolverOutcome::finish(x, r, iter, SolverStatus::NoProgress));
        }
    }

    let iterations = config.max_iterations;
    if cost == 0.0 {
        return Ok(SolverOutcome::finish(x, r, iterations, SolverStatus::ExactFit));
    }
    Ok(SolverOutcome::finish(x, r, iterations, SolverStatus::MaxIterations))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(target: f64) -> impl Fn(f64) -> Option<Vec<f64>> {
        move |x| Some(vec![x - target])
    }

    fn unit_slope(_x: f64) -> Option<Vec<f64>> {
        Some(vec![1.0])
    }

    #[test]
    fn test_unconstrained_minimum() {
        let out = least_squares_bounded(
            linear(3.0),
            unit_slope,
            0.0,
            (0.0, 10.0),
            &SolverConfig::default(),
        )
        .unwrap();
        assert!(out.success, "status: {}", out.status);
        assert!((out.x - 3.0).abs() < 1e-8, "x = {}", out.x);
        assert!(out.cost < 1e-16);
    }

    #[test]
    fn test_nonlinear_vector_residual() {
        // 两个分量共享同一最优点 x = ln 5
        let f = |x: f64| Some(vec![x.exp() - 5.0, 2.0 * (x.exp() - 5.0)]);
        let j = |x: f64| Some(vec![x.exp(), 2.0 * x.exp()]);
        let out = least_squares_bounded(f, j, 0.0, (-5.0, 5.0), &SolverConfig::default()).unwrap();
        assert!(out.success);
        assert!((out.x - 5.0_f64.ln()).abs() < 1e-7, "x = {}", out.x);
        assert_eq!(out.residuals.len(), 2);
    }

    #[test]
    fn test_active_lower_bound() {
        let out = least_squares_bounded(
            linear(3.0),
            unit_slope,
            7.0,
            (5.0, 10.0),
            &SolverConfig::default(),
        )
        .unwrap();
        assert!(out.success, "status: {}", out.status);
        assert_eq!(out.x, 5.0);
        assert!((out.cost - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_active_upper_bound() {
        let out = least_squares_bounded(
            linear(30.0),
            unit_slope,
            1.0,
            (0.0, 10.0),
            &SolverConfig::default(),
        )
        .unwrap();
        assert!(out.success, "status: {}", out.status);
        assert_eq!(out.x, 10.0);
    }

    #[test]
    fn test_initial_guess_clipped() {
        let out = least_squares_bounded(
            linear(3.0),
            unit_slope,
            100.0,
            (0.0, 10.0),
            &SolverConfig::default(),
        )
        .unwrap();
        assert!(out.success);
        assert!((out.x - 3.0).abs() < 1e-8);
    }

    #[test]
    fn test_invalid_bounds() {
        let err = least_squares_bounded(
            linear(1.0),
            unit_slope,
            0.0,
            (5.0, 1.0),
            &SolverConfig::default(),
        );
        assert!(matches!(err, Err(XpsError::InvalidBounds { .. })));

        let err = least_squares_bounded(
            linear(1.0),
            unit_slope,
            f64::NAN,
            (0.0, 1.0),
            &SolverConfig::default(),
        );
        assert!(matches!(err, Err(XpsError::InvalidArgument(_))));
    }

    #[test]
    fn test_budget_exhausted_is_not_an_error() {
        let f = |x: f64| Some(vec![x.exp() - 10.0]);
        let j = |x: f64| Some(vec![x.exp()]);
        let config = SolverConfig {
            max_iterations: 1,
            ..SolverConfig::default()
        };
        let out = least_squares_bounded(f, j, 0.0, (-10.0, 10.0), &config).unwrap();
        assert!(!out.success);
        assert_eq!(out.status, SolverStatus::MaxIterations);
        assert_eq!(out.iterations, 1);
        // 第一步已降低代价
        assert!(out.cost < 0.5 * 81.0);
    }

    #[test]
    fn test_undefined_residual() {
        let f = |_x: f64| -> Option<Vec<f64>> { None };
        let out = least_squares_bounded(
            f,
            unit_slope,
            1.0,
            (0.0, 2.0),
            &SolverConfig::default(),
        )
        .unwrap();
        assert!(!out.success);
        assert_eq!(out.status, SolverStatus::UndefinedResidual);
        assert_eq!(out.x, 1.0);

        let g = |x: f64| Some(vec![if x > 0.5 { f64::INFINITY } else { x }]);
        let out = least_squares_bounded(
            g,
            unit_slope,
            1.0,
            (0.0, 2.0),
            &SolverConfig::default(),
        )
        .unwrap();
        assert_eq!(out.status, SolverStatus::UndefinedResidual);
    }

    #[test]
    fn test_degenerate_interval() {
        let out = least_squares_bounded(
            linear(3.0),
            unit_slope,
            0.0,
            (2.0, 2.0),
            &SolverConfig::default(),
        )
        .unwrap();
        assert!(out.success);
        assert_eq!(out.x, 2.0);
    }

    #[test]
    fn test_flat_jacobian_is_not_success() {
        let f = |_x: f64| Some(vec![1.0]);
        let j = |_x: f64| Some(vec![0.0]);
        let out = least_squares_bounded(f, j, 1.0, (0.0, 2.0), &SolverConfig::default()).unwrap();
        assert!(!out.success);
        assert_eq!(out.status, SolverStatus::FlatJacobian);
        assert_eq!(out.x, 1.0);
    }

    #[test]
    fn test_undefined_jacobian() {
        let j = |x: f64| if x > 0.5 { None } else { Some(vec![1.0]) };
        let out = least_squares_bounded(linear(0.0), j, 1.0, (0.0, 2.0), &SolverConfig::default())
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.status, SolverStatus::UndefinedResidual);

        // 长度与残差不一致
        let j = |_x: f64| Some(vec![1.0, 1.0]);
        let out = least_squares_bounded(linear(0.0), j, 1.0, (0.0, 2.0), &SolverConfig::default())
            .unwrap();
        assert_eq!(out.status, SolverStatus::UndefinedResidual);
    }

    #[test]
    fn test_large_offset_residual() {
        // 残差量级 1e12，x 的微小变化被偏移量吞没
        let target = 1e12 + 7.0;
        let f = move |x: f64| Some(vec![1e12 + x - target]);
        let out = least_squares_bounded(f, unit_slope, 0.0, (0.0, 20.0), &SolverConfig::default())
            .unwrap();
        assert!(out.success, "status: {}", out.status);
        assert!((out.x - 7.0).abs() < 1e-3, "x = {}", out.x);
    }
}
