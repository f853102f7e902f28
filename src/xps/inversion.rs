//! # 厚度反演
//!
//! 由测得的强度比反演覆盖层厚度 d：
//! - 单角度：最小化 (R(d, θ) − R_meas)²
//! - 多角度联合：单一 d 同时解释所有 (θᵢ, Rᵢ)，残差可加权
//! - 峰面积：R = A_over / A_sub 后转单角度反演
//!
//! 每次调用都是一次性的无状态优化。
//!
//! ## 依赖关系
//! - 使用 `xps/attenuation.rs` 的正演模型
//! - 使用 `xps/solver.rs` 的有界最小二乘
//! - 被 `commands/fit.rs`, `commands/spectrum.rs` 调用

use crate::error::{XpsError, Result};
use crate::models::AttenuationParams;
use crate::xps::attenuation::{effective_cos, ratio_derivative, ratio_over_to_sub, Ratio};
use crate::xps::solver::{self, least_squares_bounded, SolverConfig, SolverStatus};

/// 默认初始厚度 (nm)
pub const DEFAULT_D0: f64 = 2.0;

/// 默认厚度搜索范围 (nm)
pub const DEFAULT_BOUNDS: (f64, f64) = (0.0, 50.0);

/// 单角度反演结果
#[derive(Debug, Clone)]
pub struct ThicknessFit {
    /// 最优厚度 (nm)
    pub d: f64,
    /// 最优厚度处的模型比值
    pub r_fit: Ratio,
    /// 由峰面积得到的测量比值（仅面积反演填写）
    pub r_meas: Option<f64>,
    pub success: bool,
    pub iterations: usize,
    /// ½(R_fit − R_meas)²
    pub cost: f64,
    pub status: SolverStatus,
}

/// 多角度联合反演结果
#[derive(Debug, Clone)]
pub struct MultiAngleFit {
    /// 最优厚度 (nm)
    pub d: f64,
    /// 各输入角度处的模型比值；无定义的角度为 `None`
    pub ratios_fit: Vec<Option<f64>>,
    /// cosθ ≤ 0 而被排除的角度索引
    pub excluded: Vec<usize>,
    pub success: bool,
    pub iterations: usize,
    pub cost: f64,
    pub status: SolverStatus,
}

/// 单角度厚度反演（默认求解器参数）
pub fn fit_thickness_from_ratio(
    r_meas: f64,
    theta_deg: f64,
    params: &AttenuationParams,
    d0: f64,
    bounds: (f64, f64),
) -> Result<ThicknessFit> {
    fit_thickness_from_ratio_with(r_meas, theta_deg, params, d0, bounds, &SolverConfig::default())
}

/// 单角度厚度反演
///
/// 该角度下比值无定义（θ ≥ 90°）时返回 `success = false` 的结果而非错误。
pub fn fit_thickness_from_ratio_with(
    r_meas: f64,
    theta_deg: f64,
    params: &AttenuationParams,
    d0: f64,
    bounds: (f64, f64),
    config: &SolverConfig,
) -> Result<ThicknessFit> {
    if !r_meas.is_finite() {
        return Err(XpsError::InvalidArgument(format!(
            "measured ratio must be finite (got {})",
            r_meas
        )));
    }

    let residual = |d: f64| {
        ratio_over_to_sub(params, theta_deg, d)
            .value()
            .map(|r| vec![r - r_meas])
    };
    let jacobian = |d: f64| ratio_derivative(params, theta_deg, d).map(|slope| vec![slope]);

    let outcome = least_squares_bounded(residual, jacobian, d0, bounds, config)?;

    Ok(ThicknessFit {
        d: outcome.x,
        r_fit: ratio_over_to_sub(params, theta_deg, outcome.x),
        r_meas: None,
        success: outcome.success,
        iterations: outcome.iterations,
        cost: outcome.cost,
        status: outcome.status,
    })
}

/// 多角度联合反演（默认求解器参数）
pub fn fit_thickness_from_multi_angle(
    angles: &[f64],
    ratios_meas: &[f64],
    params: &AttenuationParams,
    d0: f64,
    bounds: (f64, f64),
    weights: Option<&[f64]>,
) -> Result<MultiAngleFit> {
    fit_thickness_from_multi_angle_with(
        angles,
        ratios_meas,
        params,
        d0,
        bounds,
        weights,
        &SolverConfig::default(),
    )
}

/// 多角度联合反演
///
/// 残差分量 wᵢ·(R(d, θᵢ) − Rᵢ)，权重缺省为 1。
/// cosθ ≤ 0 的角度在拟合前被排除并记录在 `excluded` 中。
#[allow(clippy::too_many_arguments)]
pub fn fit_thickness_from_multi_angle_with(
    angles: &[f64],
    ratios_meas: &[f64],
    params: &AttenuationParams,
    d0: f64,
    bounds: (f64, f64),
    weights: Option<&[f64]>,
    config: &SolverConfig,
) -> Result<MultiAngleFit> {
    if angles.len() != ratios_meas.len() {
        return Err(XpsError::LengthMismatch {
            angles: angles.len(),
            ratios: ratios_meas.len(),
        });
    }
    if let Some(w) = weights {
        if w.len() != angles.len() {
            return Err(XpsError::WeightLengthMismatch {
                weights: w.len(),
                angles: angles.len(),
            });
        }
    }
    if angles.is_empty() {
        return Err(XpsError::InvalidArgument(
            "at least one (angle, ratio) pair is required".to_string(),
        ));
    }
    if let Some(bad) = ratios_meas.iter().find(|r| !r.is_finite()) {
        return Err(XpsError::InvalidArgument(format!(
            "measured ratios must be finite (got {})",
            bad
        )));
    }
    solver::check_bounds(bounds)?;

    // 只按几何排除（cosθ ≤ 0）；有限角度下衬底强度下溢为 0 属于数值问题，交给求解器报告
    let (usable, excluded): (Vec<usize>, Vec<usize>) =
        (0..angles.len()).partition(|&i| effective_cos(angles[i]) > 0.0);

    if usable.is_empty() {
        return Err(XpsError::NoUsableAngles);
    }

    let weight = |i: usize| weights.map_or(1.0, |w| w[i]);

    let residual = |d: f64| {
        usable
            .iter()
            .map(|&i| {
                ratio_over_to_sub(params, angles[i], d)
                    .value()
                    .map(|r| weight(i) * (r - ratios_meas[i]))
            })
            .collect::<Option<Vec<f64>>>()
    };
    let jacobian = |d: f64| {
        usable
            .iter()
            .map(|&i| ratio_derivative(params, angles[i], d).map(|slope| weight(i) * slope))
            .collect::<Option<Vec<f64>>>()
    };

    let outcome = least_squares_bounded(residual, jacobian, d0, bounds, config)?;

    let ratios_fit = angles
        .iter()
        .map(|&theta| ratio_over_to_sub(params, theta, outcome.x).value())
        .collect();

    Ok(MultiAngleFit {
        d: outcome.x,
        ratios_fit,
        excluded,
        success: outcome.success,
        iterations: outcome.iterations,
        cost: outcome.cost,
        status: outcome.status,
    })
}

/// 由峰面积估计厚度（默认求解器参数）
pub fn estimate_thickness_from_areas(
    a_over: f64,
    a_sub: f64,
    theta_deg: f64,
    params: &AttenuationParams,
    d0: f64,
    bounds: (f64, f64),
) -> Result<ThicknessFit> {
    estimate_thickness_from_areas_with(
        a_over,
        a_sub,
        theta_deg,
        params,
        d0,
        bounds,
        &SolverConfig::default(),
    )
}

/// 由峰面积估计厚度：R = A_over / A_sub
#[allow(clippy::too_many_arguments)]
pub fn estimate_thickness_from_areas_with(
    a_over: f64,
    a_sub: f64,
    theta_deg: f64,
    params: &AttenuationParams,
    d0: f64,
    bounds: (f64, f64),
    config: &SolverConfig,
) -> Result<ThicknessFit> {
    if !(a_sub > 0.0) {
        return Err(XpsError::NonPositiveArea(a_sub));
    }

    let r = a_over / a_sub;
    let mut fit = fit_thickness_from_ratio_with(r, theta_deg, params, d0, bounds, config)?;
    fit.r_meas = Some(r);
    Ok(fit)
}
