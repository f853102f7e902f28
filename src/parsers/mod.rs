//! # 解析器模块
//!
//! 提供 XPS 谱文件和多角度比值表的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: spectrum, angles

pub mod angles;
pub mod spectrum;

pub use angles::{load_angle_table, AngleTable};
pub use spectrum::{load_spectrum, LoadOptions};
