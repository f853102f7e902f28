//! # 衰减正演模型
//!
//! 半无限衬底上厚度为 d 的单层覆盖层，出射角 θ（相对表面法线，度）。
//!
//! ## 公式
//! ```text
//! I_over = I0_over · S_over · n_over · λ_over · cosθ · [1 − exp(−d / (λ_over · cosθ))]
//! I_sub  = I0_sub · S_sub · n_sub · exp(−d / (λ_sub,over · cosθ))
//! R      = I_over / I_sub
//! ```
//! cosθ 在 0 处截断：θ ≥ 90° 时两项强度均严格为 0.0。
//!
//! ## 依赖关系
//! - 被 `xps/inversion.rs` 反复调用
//! - 被 `xps/plot.rs`, `commands/plot.rs` 用于生成模型曲线
//! - 使用 `models/params.rs` 的 AttenuationParams

use crate::models::AttenuationParams;

use std::fmt;

/// 强度比计算结果
///
/// 衬底强度为 0 时比值无定义（无可观测信号），显式标记而不是返回 +∞。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    /// 有限比值
    Defined(f64),
    /// 衬底强度为 0
    Undefined,
}

impl Ratio {
    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Defined(r) => Some(r),
            Ratio::Undefined => None,
        }
    }

    /// 转为浮点数，无定义时为 +∞（仅用于绘图/导出）
    pub fn as_f64(self) -> f64 {
        self.value().unwrap_or(f64::INFINITY)
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Ratio::Defined(_))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Defined(r) => write!(f, "{:.4}", r),
            Ratio::Undefined => write!(f, "undefined"),
        }
    }
}

/// cos(90°) 在浮点下约为 6e-17，低于此阈值即视为掠射
const GRAZING_COS: f64 = 1e-12;

/// cosθ，非正值（含掠射舍入误差）截断为 0
pub fn effective_cos(theta_deg: f64) -> f64 {
    let c = theta_deg.to_radians().cos();
    if c < GRAZING_COS {
        0.0
    } else {
        c
    }
}

/// 覆盖层强度
pub fn intensity_overlayer(params: &AttenuationParams, theta_deg: f64, d: f64) -> f64 {
    let c = effective_cos(theta_deg);
    if c == 0.0 {
        return 0.0;
    }
    params.overlayer_prefactor() * c * (1.0 - (-d / (params.lam_over * c)).exp())
}

/// 衬底强度（经覆盖层衰减）
pub fn intensity_substrate(params: &AttenuationParams, theta_deg: f64, d: f64) -> f64 {
    let c = effective_cos(theta_deg);
    if c == 0.0 {
        return 0.0;
    }
    params.substrate_prefactor() * (-d / (params.lam_sub_in_over * c)).exp()
}

/// 覆盖层/衬底强度比 R(d, θ)
pub fn ratio_over_to_sub(params: &AttenuationParams, theta_deg: f64, d: f64) -> Ratio {
    let i_sub = intensity_substrate(params, theta_deg, d);
    if i_sub == 0.0 {
        return Ratio::Undefined;
    }
    Ratio::Defined(intensity_overlayer(params, theta_deg, d) / i_sub)
}

/// 比值对厚度的解析导数
///
/// R = K·e^{ad}·(1 − e^{−bd})，a = 1/(λ_sub,over·cosθ)，b = 1/(λ_over·cosθ)，
/// 故 dR/dd = K·e^{ad}·[a(1 − e^{−bd}) + b·e^{−bd}]。
/// 比值无定义或结果溢出时返回 `None`。
pub fn ratio_derivative(params: &AttenuationParams, theta_deg: f64, d: f64) -> Option<f64> {
    let c = effective_cos(theta_deg);
    if c == 0.0 || !ratio_over_to_sub(params, theta_deg, d).is_defined() {
        return None;
    }
    let a = 1.0 / (params.lam_sub_in_over * c);
    let b = 1.0 / (params.lam_over * c);
    let k = params.overlayer_prefactor() * c / params.substrate_prefactor();
    let eb = (-b * d).exp();
    let slope = k * (a * d).exp() * (a * (1.0 - eb) + b * eb);
    slope.is_finite().then_some(slope)
}

/// 信息深度 3·λ_sub,over·cosθ：超过此厚度时衬底信号 < 5%，比值对 d 不再敏感
pub fn information_depth(params: &AttenuationParams, theta_deg: f64) -> f64 {
    3.0 * params.lam_sub_in_over * effective_cos(theta_deg)
}

/// 在厚度网格上计算模型曲线 (d, R)
pub fn ratio_curve(
    params: &AttenuationParams,
    theta_deg: f64,
    d_range: (f64, f64),
    num: usize,
) -> Vec<(f64, Ratio)> {
    linspace(d_range.0, d_range.1, num)
        .into_iter()
        .map(|d| (d, ratio_over_to_sub(params, theta_deg, d)))
        .collect()
}

/// 在角度网格上计算模型曲线 (θ, R)
pub fn angle_curve(
    params: &AttenuationParams,
    d: f64,
    theta_range: (f64, f64),
    num: usize,
) -> Vec<(f64, Ratio)> {
    linspace(theta_range.0, theta_range.1, num)
        .into_iter()
        .map(|theta| (theta, ratio_over_to_sub(params, theta, d)))
        .collect()
}

fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num).map(|i| start + i as f64 * step).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> AttenuationParams {
        AttenuationParams::new(1.2, 0.8, 2.0, 0.9, 1.1, 2.5).with_source_intensities(1.5, 0.7)
    }

    #[test]
    fn test_zero_at_grazing_and_beyond() {
        let p = params();
        for theta in [90.0, 100.0, 135.0, 180.0] {
            for d in [0.0, 0.5, 3.0, 100.0] {
                assert_eq!(intensity_overlayer(&p, theta, d), 0.0, "θ={theta} d={d}");
                assert_eq!(intensity_substrate(&p, theta, d), 0.0, "θ={theta} d={d}");
            }
            assert_eq!(ratio_over_to_sub(&p, theta, 1.0), Ratio::Undefined);
        }
    }

    #[test]
    fn test_overlayer_monotone_and_saturating() {
        let p = params();
        for theta in [0.0, 30.0, 60.0, 80.0] {
            assert_eq!(intensity_overlayer(&p, theta, 0.0), 0.0);

            let mut prev = 0.0;
            for k in 1..=200 {
                let d = k as f64 * 0.25;
                let i = intensity_overlayer(&p, theta, d);
                assert!(i >= prev, "θ={theta} d={d}: {i} < {prev}");
                prev = i;
            }

            let limit = p.overlayer_prefactor() * effective_cos(theta);
            let far = intensity_overlayer(&p, theta, 1.0e3);
            assert!((far - limit).abs() < 1e-12 * limit.max(1.0));
        }
    }

    #[test]
    fn test_substrate_monotone_and_unattenuated_at_zero() {
        let p = params();
        for theta in [0.0, 45.0, 75.0] {
            assert_eq!(
                intensity_substrate(&p, theta, 0.0),
                p.i0_sub * p.s_sub * p.n_sub
            );
            let mut prev = f64::INFINITY;
            for k in 0..=100 {
                let i = intensity_substrate(&p, theta, k as f64 * 0.1);
                assert!(i <= prev);
                prev = i;
            }
        }
    }

    #[test]
    fn test_ratio_closed_form() {
        let p = AttenuationParams::new(1.0, 1.0, 2.0, 1.0, 1.0, 2.0);
        // λ 相同且 θ = 0 时 R = λ (e^{d/λ} − 1)
        let r = ratio_over_to_sub(&p, 0.0, 2.0).value().unwrap();
        assert!((r - 2.0 * (1.0_f64.exp() - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_grows_with_angle() {
        let p = params();
        let r0 = ratio_over_to_sub(&p, 0.0, 1.0).as_f64();
        let r60 = ratio_over_to_sub(&p, 60.0, 1.0).as_f64();
        assert!(r60 > r0, "surface sensitivity should rise at grazing emission");
        assert!(ratio_over_to_sub(&p, 90.0, 1.0).as_f64().is_infinite());
    }

    #[test]
    fn test_ratio_derivative_matches_central_difference() {
        let p = params();
        for theta in [0.0, 30.0, 60.0, 80.0] {
            for d in [0.05, 0.3, 1.0, 4.0, 12.0] {
                let slope = ratio_derivative(&p, theta, d).unwrap();
                let h = 1e-5;
                let lo = ratio_over_to_sub(&p, theta, d - h).as_f64();
                let hi = ratio_over_to_sub(&p, theta, d + h).as_f64();
                let numeric = (hi - lo) / (2.0 * h);
                assert!(
                    (slope - numeric).abs() < 1e-5 * slope.abs().max(1.0),
                    "θ={theta} d={d}: analytic {slope}, numeric {numeric}"
                );
                assert!(slope > 0.0);
            }
        }
    }

    #[test]
    fn test_ratio_derivative_edges() {
        let p = params();
        // d = 0 处只剩 K·b = I0·S·n·λ_over / (λ_over·I0·S·n)
        let at_zero = ratio_derivative(&p, 0.0, 0.0).unwrap();
        let expected = p.overlayer_prefactor() / (p.lam_over * p.substrate_prefactor());
        assert!((at_zero - expected).abs() < 1e-12);

        assert_eq!(ratio_derivative(&p, 90.0, 1.0), None);
        assert_eq!(ratio_derivative(&p, 120.0, 1.0), None);
        // e^{ad} 溢出
        assert_eq!(ratio_derivative(&p, 0.0, 1.0e4), None);
    }

    #[test]
    fn test_information_depth() {
        let p = params();
        assert!((information_depth(&p, 0.0) - 7.5).abs() < 1e-12);
        assert!((information_depth(&p, 60.0) - 3.75).abs() < 1e-12);
        assert_eq!(information_depth(&p, 95.0), 0.0);

        // 信息深度处衬底信号衰减到 e^-3
        let at_depth = intensity_substrate(&p, 60.0, information_depth(&p, 60.0));
        assert!((at_depth / p.substrate_prefactor() - (-3.0_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_curves() {
        let p = params();
        let curve = ratio_curve(&p, 0.0, (0.0, 10.0), 11);
        assert_eq!(curve.len(), 11);
        assert_eq!(curve[0].0, 0.0);
        assert_eq!(curve[10].0, 10.0);
        assert_eq!(curve[0].1, Ratio::Defined(0.0));

        let angles = angle_curve(&p, 1.0, (0.0, 90.0), 4);
        assert_eq!(angles.len(), 4);
        assert!(angles[3].1 == Ratio::Undefined || angles[3].1.as_f64() > 1e6);
    }
}
