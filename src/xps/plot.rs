//! # 比值曲线图表
//!
//! 使用 `plotters` 库绘制强度比模型曲线与测量值。
//!
//! ## 功能
//! - R(d) 曲线：模型曲线 + 测量比值水平线 + 拟合厚度竖线 + 超出信息深度的低灵敏区阴影
//! - R(θ) 曲线：测量点 + 拟合厚度下的模型曲线
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs` 调用
//! - 使用 `xps/attenuation.rs` 生成模型曲线
//! - 使用 `plotters` 渲染图表

use crate::error::{XpsError, Result};
use crate::models::AttenuationParams;
use crate::xps::attenuation::{angle_curve, information_depth, ratio_curve};

use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// R(θ) 模型曲线的采样点数
const ANGLE_SAMPLES: usize = 200;

/// 模型曲线超过测量最大值该倍数时，纵轴改以测量值定标
const ANGLE_AXIS_CLAMP: f64 = 10.0;

/// 图表输出选项
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    pub svg: bool,
    pub title: Option<String>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            svg: false,
            title: None,
        }
    }
}

fn plot_err<E: std::fmt::Debug>(e: E) -> XpsError {
    XpsError::PlotError(format!("{:?}", e))
}

/// 绘制 R(d) 曲线
#[allow(clippy::too_many_arguments)]
pub fn plot_ratio_vs_thickness(
    params: &AttenuationParams,
    r_meas: Option<f64>,
    theta_deg: f64,
    d_range: (f64, f64),
    num: usize,
    fitted_d: Option<f64>,
    output_path: &Path,
    options: &PlotOptions,
) -> Result<()> {
    if num < 2 {
        return Err(XpsError::InvalidArgument(
            "at least 2 curve points are required".to_string(),
        ));
    }

    let curve: Vec<(f64, f64)> = ratio_curve(params, theta_deg, d_range, num)
        .into_iter()
        .filter_map(|(d, r)| r.value().filter(|v| v.is_finite()).map(|v| (d, v)))
        .collect();
    if curve.is_empty() {
        return Err(XpsError::InvalidArgument(format!(
            "ratio is undefined at θ = {:.1}°",
            theta_deg
        )));
    }

    let title = options
        .title
        .clone()
        .unwrap_or_else(|| format!("Overlayer/substrate ratio vs thickness (θ = {:.1}°)", theta_deg));

    let chart = ThicknessChart {
        curve: &curve,
        r_meas,
        fitted_d,
        info_depth: information_depth(params, theta_deg),
        title: &title,
    };

    if options.svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        chart.draw(&root)?;
        root.present().map_err(plot_err)?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        chart.draw(&root)?;
        root.present().map_err(plot_err)?;
    }
    Ok(())
}

/// 绘制 R(θ) 曲线
pub fn plot_ratio_vs_angle(
    params: &AttenuationParams,
    angles: &[f64],
    ratios_meas: &[f64],
    fitted_d: f64,
    output_path: &Path,
    options: &PlotOptions,
) -> Result<()> {
    if angles.len() != ratios_meas.len() {
        return Err(XpsError::LengthMismatch {
            angles: angles.len(),
            ratios: ratios_meas.len(),
        });
    }
    if angles.is_empty() {
        return Err(XpsError::InvalidArgument("no angles to plot".to_string()));
    }

    let lo = angles.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = angles.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let model: Vec<(f64, f64)> = angle_curve(params, fitted_d, (lo, hi), ANGLE_SAMPLES)
        .into_iter()
        .filter_map(|(t, r)| r.value().filter(|v| v.is_finite()).map(|v| (t, v)))
        .collect();
    let points: Vec<(f64, f64)> = angles
        .iter()
        .copied()
        .zip(ratios_meas.iter().copied())
        .filter(|(_, r)| r.is_finite())
        .collect();

    let title = options
        .title
        .clone()
        .unwrap_or_else(|| format!("Overlayer/substrate ratio vs angle (d = {:.3} nm)", fitted_d));

    let chart = AngleChart {
        model: &model,
        points: &points,
        x_range: (lo, hi),
        title: &title,
    };

    if options.svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        chart.draw(&root)?;
        root.present().map_err(plot_err)?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        chart.draw(&root)?;
        root.present().map_err(plot_err)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────
// 绘制核心逻辑
// ─────────────────────────────────────────────────────────────

struct ThicknessChart<'a> {
    curve: &'a [(f64, f64)],
    r_meas: Option<f64>,
    fitted_d: Option<f64>,
    info_depth: f64,
    title: &'a str,
}

impl ThicknessChart<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE).map_err(plot_err)?;

        let x_min = self.curve.first().map(|(x, _)| *x).unwrap_or(0.0);
        let x_max = self.curve.last().map(|(x, _)| *x).unwrap_or(1.0);
        let y_top = self
            .curve
            .iter()
            .map(|(_, y)| *y)
            .chain(self.r_meas)
            .filter(|y| y.is_finite())
            .fold(0.0_f64, f64::max);
        let y_max = if y_top > 0.0 { y_top * 1.1 } else { 1.0 };

        let mut chart = ChartBuilder::on(root)
            .caption(self.title, ("sans-serif", 28).into_font())
            .margin(30)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_desc("Thickness d (nm)")
            .y_desc("R = I_over / I_sub")
            .x_label_style(("sans-serif", 16))
            .y_label_style(("sans-serif", 16))
            .axis_desc_style(("sans-serif", 18))
            .draw()
            .map_err(plot_err)?;

        if self.info_depth < x_max {
            let shade = RGBColor(178, 34, 34);
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(self.info_depth.max(x_min), 0.0), (x_max, y_max)],
                    shade.mix(0.15).filled(),
                )))
                .map_err(plot_err)?
                .label("low sensitivity (> 3λcosθ)")
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 20, y + 5)], shade.mix(0.15).filled())
                });
        }

        let line_color = RGBColor(0, 102, 204);
        chart
            .draw_series(LineSeries::new(
                self.curve.iter().copied(),
                line_color.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label("model R(d)")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color));

        if let Some(r) = self.r_meas.filter(|r| r.is_finite()) {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(x_min, r), (x_max, r)],
                    RED.stroke_width(1),
                )))
                .map_err(plot_err)?
                .label(format!("measured R = {:.4}", r))
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
        }

        if let Some(d) = self.fitted_d {
            let green = RGBColor(0, 153, 51);
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(d, 0.0), (d, y_max)],
                    green.stroke_width(1),
                )))
                .map_err(plot_err)?
                .label(format!("fitted d = {:.3} nm", d))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], green));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;

        Ok(())
    }
}

struct AngleChart<'a> {
    model: &'a [(f64, f64)],
    points: &'a [(f64, f64)],
    x_range: (f64, f64),
    title: &'a str,
}

impl AngleChart<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE).map_err(plot_err)?;

        let (mut x_min, mut x_max) = self.x_range;
        if x_max - x_min < 1e-9 {
            x_min -= 5.0;
            x_max += 5.0;
        }
        let y_max = angle_axis_top(self.model, self.points);

        let mut chart = ChartBuilder::on(root)
            .caption(self.title, ("sans-serif", 28).into_font())
            .margin(30)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_desc("Take-off angle θ (°)")
            .y_desc("R = I_over / I_sub")
            .x_label_style(("sans-serif", 16))
            .y_label_style(("sans-serif", 16))
            .axis_desc_style(("sans-serif", 18))
            .draw()
            .map_err(plot_err)?;

        let line_color = RGBColor(0, 102, 204);
        chart
            .draw_series(LineSeries::new(
                self.model.iter().copied().filter(|&(_, y)| y <= y_max),
                line_color.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label("model R(θ)")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color));

        chart
            .draw_series(
                self.points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 5, RED.filled())),
            )
            .map_err(plot_err)?
            .label("measured")
            .legend(|(x, y)| Circle::new((x + 10, y), 5, RED.filled()));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;

        Ok(())
    }
}

/// R(θ) 图纵轴上限
///
/// 模型在接近 90° 时发散，若其最大值远超测量点，则以测量最大值的 1.5 倍定标，
/// 超出部分的模型曲线不绘制。
fn angle_axis_top(model: &[(f64, f64)], points: &[(f64, f64)]) -> f64 {
    let finite_max = |xs: &[(f64, f64)]| {
        xs.iter()
            .map(|(_, y)| *y)
            .filter(|y| y.is_finite())
            .fold(0.0_f64, f64::max)
    };
    let model_top = finite_max(model);
    let points_top = finite_max(points);

    if points_top > 0.0 && model_top > ANGLE_AXIS_CLAMP * points_top {
        return 1.5 * points_top;
    }
    let top = model_top.max(points_top);
    if top > 0.0 {
        top * 1.1
    } else {
        1.0
    }
}
