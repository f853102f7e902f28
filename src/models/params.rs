//! # 衰减模型参数
//!
//! 单个覆盖层 / 半无限衬底体系的物理常数集合。
//!
//! ## 约定
//! - IMFP (`lam_*`) 单位为 nm
//! - `s_*` 为灵敏度因子（或有效截面）
//! - `n_*` 为（相对）数密度或比例因子
//! - `i0_*` 为光源强度归一化常数，默认 1.0
//!
//! ## 依赖关系
//! - 被 `xps/attenuation.rs`, `xps/inversion.rs`, `xps/plot.rs` 使用
//! - 由 `cli/mod.rs` 的 `MaterialArgs` 构造

use serde::{Deserialize, Serialize};

/// 覆盖层 / 衬底衰减参数（不可变值对象）
///
/// 每个材料体系构造一次；需要不同参数时创建新实例。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttenuationParams {
    /// 覆盖层灵敏度因子
    pub s_over: f64,
    /// 覆盖层相对密度
    pub n_over: f64,
    /// 覆盖层信号在覆盖层中的 IMFP (nm)
    pub lam_over: f64,
    /// 衬底灵敏度因子
    pub s_sub: f64,
    /// 衬底相对密度
    pub n_sub: f64,
    /// 衬底信号穿过覆盖层时的 IMFP (nm)
    pub lam_sub_in_over: f64,
    /// 覆盖层光源强度
    pub i0_over: f64,
    /// 衬底光源强度
    pub i0_sub: f64,
}

impl AttenuationParams {
    /// 创建参数集，光源强度取默认值 1.0
    pub fn new(
        s_over: f64,
        n_over: f64,
        lam_over: f64,
        s_sub: f64,
        n_sub: f64,
        lam_sub_in_over: f64,
    ) -> Self {
        Self {
            s_over,
            n_over,
            lam_over,
            s_sub,
            n_sub,
            lam_sub_in_over,
            i0_over: 1.0,
            i0_sub: 1.0,
        }
    }

    /// 返回替换光源强度后的新参数集
    pub fn with_source_intensities(self, i0_over: f64, i0_sub: f64) -> Self {
        Self {
            i0_over,
            i0_sub,
            ..self
        }
    }

    /// 覆盖层饱和强度前因子 I0·S·n·λ（不含 cosθ）
    pub fn overlayer_prefactor(&self) -> f64 {
        self.i0_over * self.s_over * self.n_over * self.lam_over
    }

    /// 衬底未衰减强度 I0·S·n
    pub fn substrate_prefactor(&self) -> f64 {
        self.i0_sub * self.s_sub * self.n_sub
    }

    /// 非正参数的名称列表（物理上应全部 > 0）
    pub fn non_positive_fields(&self) -> Vec<&'static str> {
        [
            ("s_over", self.s_over),
            ("n_over", self.n_over),
            ("lam_over", self.lam_over),
            ("s_sub", self.s_sub),
            ("n_sub", self.n_sub),
            ("lam_sub_in_over", self.lam_sub_in_over),
            ("i0_over", self.i0_over),
            ("i0_sub", self.i0_sub),
        ]
        .into_iter()
        .filter(|(_, v)| !(*v > 0.0))
        .map(|(name, _)| name)
        .collect()
    }
}
