//! # plot 子命令实现
//!
//! 生成强度比模型曲线的图表 (PNG/SVG) 或数据文件 (CSV/XY)。
//!
//! ## 依赖关系
//! - 使用 `cli/plot.rs` 定义的参数
//! - 使用 `xps/plot.rs`, `xps/export.rs` 输出
//! - 使用 `commands/fit.rs` 的反演结果输出

use crate::cli::plot::{FigureArgs, PlotAngleArgs, PlotArgs, PlotCommands, PlotFormat, PlotThicknessArgs};
use crate::commands::fit;
use crate::error::{XpsError, Result};
use crate::models::AttenuationParams;
use crate::utils::output;
use crate::xps::attenuation::{angle_curve, information_depth, ratio_curve};
use crate::xps::plot::{self, PlotOptions};
use crate::xps::{export, inversion};

use std::path::Path;

/// 默认厚度轴上限的下限 (nm)
const MIN_PLOT_THICKNESS: f64 = 10.0;

/// 导出 R(θ) 数据时的采样点数
const ANGLE_EXPORT_POINTS: usize = 200;

/// 执行 plot 子命令
pub fn execute(args: PlotArgs) -> Result<()> {
    match args.command {
        PlotCommands::Thickness(a) => execute_thickness(a),
        PlotCommands::Angle(a) => execute_angle(a),
    }
}

fn execute_thickness(args: PlotThicknessArgs) -> Result<()> {
    output::print_header("Ratio vs Thickness");

    let params = args.material.to_params()?;
    let d_range = args
        .d_range
        .unwrap_or_else(|| (0.0, information_depth(&params, args.theta).max(MIN_PLOT_THICKNESS)));
    let (d_lo, d_hi) = d_range;
    if !(d_lo < d_hi) || d_lo < 0.0 {
        return Err(XpsError::InvalidRange(format!(
            "{}:{} (must be 0 <= lo < hi)",
            d_lo, d_hi
        )));
    }
    if args.num < 2 {
        return Err(XpsError::InvalidArgument(
            "--num must be at least 2".to_string(),
        ));
    }

    let fitted_d = match args.ratio {
        Some(r) => {
            let fit = inversion::fit_thickness_from_ratio_with(
                r,
                args.theta,
                &params,
                args.fit.d0,
                args.fit.bounds,
                &args.fit.solver_config(),
            )?;
            fit::print_thickness_fit(&fit, Some(r));
            Some(fit.d)
        }
        None => None,
    };

    let format = resolve_format(&args.figure, &args.output);
    match format {
        PlotFormat::Png | PlotFormat::Svg => {
            plot::plot_ratio_vs_thickness(
                &params,
                args.ratio,
                args.theta,
                d_range,
                args.num,
                fitted_d,
                &args.output,
                &plot_options(&args.figure, format),
            )?;
        }
        PlotFormat::Csv => {
            let curve = ratio_curve(&params, args.theta, d_range, args.num);
            export::curve_to_csv(&curve, "thickness_nm", &args.output)?;
        }
        PlotFormat::Xy => {
            let curve = ratio_curve(&params, args.theta, d_range, args.num);
            let header = curve_header("Ratio vs thickness", &params, &format!("theta = {:.2} deg", args.theta));
            export::curve_to_xy(&curve, &header, "thickness (nm)", &args.output)?;
        }
    }

    output::print_success(&format!("Saved to '{}'", args.output.display()));
    Ok(())
}

fn execute_angle(args: PlotAngleArgs) -> Result<()> {
    output::print_header("Ratio vs Take-off Angle");

    let params = args.material.to_params()?;
    let table = fit::resolve_angle_data(&args.input)?;

    let d = match args.thickness {
        Some(d) => {
            output::print_info(&format!("Using thickness d = {:.4} nm", d));
            d
        }
        None => {
            let fit = inversion::fit_thickness_from_multi_angle_with(
                &table.angles,
                &table.ratios,
                &params,
                args.fit.d0,
                args.fit.bounds,
                table.weights.as_deref(),
                &args.fit.solver_config(),
            )?;
            output::print_thickness(fit.success, fit.d, fit.status);
            fit.d
        }
    };

    let format = resolve_format(&args.figure, &args.output);
    match format {
        PlotFormat::Png | PlotFormat::Svg => {
            plot::plot_ratio_vs_angle(
                &params,
                &table.angles,
                &table.ratios,
                d,
                &args.output,
                &plot_options(&args.figure, format),
            )?;
        }
        PlotFormat::Csv | PlotFormat::Xy => {
            let lo = table.angles.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = table.angles.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let curve = angle_curve(&params, d, (lo, hi), ANGLE_EXPORT_POINTS);
            if format == PlotFormat::Csv {
                export::curve_to_csv(&curve, "theta_deg", &args.output)?;
            } else {
                let header = curve_header("Ratio vs take-off angle", &params, &format!("d = {:.4} nm", d));
                export::curve_to_xy(&curve, &header, "theta (deg)", &args.output)?;
            }
        }
    }

    output::print_success(&format!("Saved to '{}'", args.output.display()));
    Ok(())
}

/// 显式格式优先，否则由扩展名推断
fn resolve_format(figure: &FigureArgs, output: &Path) -> PlotFormat {
    figure
        .format
        .unwrap_or_else(|| guess_format_from_extension(output))
}

fn plot_options(figure: &FigureArgs, format: PlotFormat) -> PlotOptions {
    PlotOptions {
        width: figure.width,
        height: figure.height,
        svg: format == PlotFormat::Svg,
        title: figure.title.clone(),
    }
}

/// XY 文件注释头
fn curve_header(title: &str, params: &AttenuationParams, geometry: &str) -> Vec<String> {
    vec![
        title.to_string(),
        geometry.to_string(),
        format!(
            "overlayer: S = {}, n = {}, lambda = {} nm, I0 = {}",
            params.s_over, params.n_over, params.lam_over, params.i0_over
        ),
        format!(
            "substrate: S = {}, n = {}, lambda_in_overlayer = {} nm, I0 = {}",
            params.s_sub, params.n_sub, params.lam_sub_in_over, params.i0_sub
        ),
    ]
}

/// 从文件扩展名推断输出格式
fn guess_format_from_extension(path: &Path) -> PlotFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("svg") => PlotFormat::Svg,
        Some("csv") => PlotFormat::Csv,
        Some("xy") | Some("dat") | Some("txt") => PlotFormat::Xy,
        _ => PlotFormat::Png,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_format() {
        assert_eq!(guess_format_from_extension(Path::new("a.SVG")), PlotFormat::Svg);
        assert_eq!(guess_format_from_extension(Path::new("a.csv")), PlotFormat::Csv);
        assert_eq!(guess_format_from_extension(Path::new("curve.dat")), PlotFormat::Xy);
        assert_eq!(guess_format_from_extension(Path::new("plot")), PlotFormat::Png);
    }

    #[test]
    fn test_explicit_format_wins() {
        let figure = FigureArgs {
            format: Some(PlotFormat::Csv),
            width: 800,
            height: 600,
            title: None,
        };
        assert_eq!(resolve_format(&figure, Path::new("x.png")), PlotFormat::Csv);

        let opts = plot_options(&FigureArgs { format: None, ..figure }, PlotFormat::Svg);
        assert!(opts.svg);
        assert_eq!((opts.width, opts.height), (800, 600));
    }

    #[test]
    fn test_curve_header_lists_parameters() {
        let p = AttenuationParams::new(1.0, 1.0, 2.0, 1.0, 1.0, 2.5);
        let h = curve_header("Ratio vs thickness", &p, "theta = 0.00 deg");
        assert_eq!(h.len(), 4);
        assert!(h[3].contains("lambda_in_overlayer = 2.5 nm"));
    }
}
