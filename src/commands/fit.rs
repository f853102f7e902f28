//! # fit 子命令实现
//!
//! 由比值、峰面积或多角度数据反演覆盖层厚度。
//!
//! ## 依赖关系
//! - 使用 `cli/fit.rs` 定义的参数
//! - 使用 `xps/inversion.rs` 进行反演
//! - 使用 `parsers/angles.rs` 读取多角度数据
//! - 被 `commands/spectrum.rs`, `commands/plot.rs` 复用输出与数据解析

use crate::cli::fit::{AngleDataArgs, FitAreasArgs, FitArgs, FitCommands, FitMultiArgs, FitRatioArgs};
use crate::error::{XpsError, Result};
use crate::parsers::{self, AngleTable};
use crate::utils::output;
use crate::xps::inversion;
use crate::xps::{MultiAngleFit, ThicknessFit};

use tabled::{Table, Tabled};

/// 执行 fit 子命令
pub fn execute(args: FitArgs) -> Result<()> {
    match args.command {
        FitCommands::Ratio(a) => execute_ratio(a),
        FitCommands::Areas(a) => execute_areas(a),
        FitCommands::Multi(a) => execute_multi(a),
    }
}

fn execute_ratio(args: FitRatioArgs) -> Result<()> {
    output::print_header("Thickness from Intensity Ratio");

    let params = args.material.to_params()?;
    output::print_info(&format!(
        "R = {:.6} at θ = {:.1}°, bounds [{}, {}] nm",
        args.ratio, args.theta, args.fit.bounds.0, args.fit.bounds.1
    ));

    let fit = inversion::fit_thickness_from_ratio_with(
        args.ratio,
        args.theta,
        &params,
        args.fit.d0,
        args.fit.bounds,
        &args.fit.solver_config(),
    )?;

    print_thickness_fit(&fit, Some(args.ratio));
    Ok(())
}

fn execute_areas(args: FitAreasArgs) -> Result<()> {
    output::print_header("Thickness from Peak Areas");

    let params = args.material.to_params()?;
    output::print_info(&format!(
        "A_over = {:.6e}, A_sub = {:.6e} at θ = {:.1}°",
        args.a_over, args.a_sub, args.theta
    ));

    let fit = inversion::estimate_thickness_from_areas_with(
        args.a_over,
        args.a_sub,
        args.theta,
        &params,
        args.fit.d0,
        args.fit.bounds,
        &args.fit.solver_config(),
    )?;

    print_thickness_fit(&fit, fit.r_meas);
    Ok(())
}

fn execute_multi(args: FitMultiArgs) -> Result<()> {
    output::print_header("Multi-Angle Thickness Fit");

    let params = args.material.to_params()?;
    let table = resolve_angle_data(&args.input)?;
    output::print_info(&format!("{} angle(s) supplied", table.angles.len()));

    let fit = inversion::fit_thickness_from_multi_angle_with(
        &table.angles,
        &table.ratios,
        &params,
        args.fit.d0,
        args.fit.bounds,
        table.weights.as_deref(),
        &args.fit.solver_config(),
    )?;

    print_multi_angle_fit(&table, &fit);
    Ok(())
}

/// 由命令行列表或 CSV 文件得到多角度数据
pub(crate) fn resolve_angle_data(input: &AngleDataArgs) -> Result<AngleTable> {
    if let Some(path) = &input.data {
        let table = parsers::load_angle_table(path)?;
        output::print_success(&format!(
            "Loaded {} rows from '{}'",
            table.angles.len(),
            path.display()
        ));
        return Ok(table);
    }

    if input.angles.is_empty() {
        return Err(XpsError::InvalidArgument(
            "provide --angles and --ratios, or --data FILE".to_string(),
        ));
    }

    Ok(AngleTable {
        angles: input.angles.clone(),
        ratios: input.ratios.clone(),
        weights: if input.weights.is_empty() {
            None
        } else {
            Some(input.weights.clone())
        },
    })
}

/// 打印单角度反演结果
pub(crate) fn print_thickness_fit(fit: &ThicknessFit, r_meas: Option<f64>) {
    output::print_separator();
    output::print_result("Thickness d", &format!("{:.4} nm", fit.d));
    if let Some(r) = r_meas {
        output::print_result("Measured ratio", &format!("{:.6}", r));
    }
    output::print_result("Model ratio at d", &fit.r_fit.to_string());
    output::print_result("Iterations", &fit.iterations.to_string());
    output::print_result("Cost", &format!("{:.3e}", fit.cost));
    output::print_result("Status", &fit.status.to_string());
    output::print_separator();

    output::print_thickness(fit.success, fit.d, fit.status);
}

/// 打印多角度反演结果
fn print_multi_angle_fit(table: &AngleTable, fit: &MultiAngleFit) {
    #[derive(Tabled)]
    struct AngleRow {
        #[tabled(rename = "θ (°)")]
        theta: String,
        #[tabled(rename = "R meas")]
        measured: String,
        #[tabled(rename = "R fit")]
        fitted: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Used")]
        used: String,
    }

    let rows: Vec<AngleRow> = table
        .angles
        .iter()
        .enumerate()
        .map(|(i, theta)| AngleRow {
            theta: format!("{:.1}", theta),
            measured: format!("{:.5}", table.ratios[i]),
            fitted: fit.ratios_fit[i]
                .map(|r| format!("{:.5}", r))
                .unwrap_or_else(|| "undefined".to_string()),
            weight: table
                .weights
                .as_ref()
                .map_or("1".to_string(), |w| format!("{}", w[i])),
            used: if fit.excluded.contains(&i) { "no" } else { "yes" }.to_string(),
        })
        .collect();

    println!("{}", Table::new(&rows));

    for &i in &fit.excluded {
        output::print_warning(&format!(
            "θ = {:.1}° excluded: no substrate signal at grazing emission",
            table.angles[i]
        ));
    }

    output::print_result("Thickness d", &format!("{:.4} nm", fit.d));
    output::print_result("Iterations", &fit.iterations.to_string());
    output::print_result("Cost", &format!("{:.3e}", fit.cost));
    output::print_result("Status", &fit.status.to_string());

    output::print_thickness(fit.success, fit.d, fit.status);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_angle_data_from_lists() {
        let input = AngleDataArgs {
            angles: vec![0.0, 45.0],
            ratios: vec![1.2, 2.0],
            weights: vec![],
            data: None,
        };
        let t = resolve_angle_data(&input).unwrap();
        assert_eq!(t.angles, vec![0.0, 45.0]);
        assert!(t.weights.is_none());

        let weighted = AngleDataArgs {
            weights: vec![1.0, 0.5],
            ..input
        };
        assert_eq!(resolve_angle_data(&weighted).unwrap().weights, Some(vec![1.0, 0.5]));
    }

    #[test]
    fn test_resolve_angle_data_requires_input() {
        let empty = AngleDataArgs {
            angles: vec![],
            ratios: vec![],
            weights: vec![],
            data: None,
        };
        assert!(matches!(
            resolve_angle_data(&empty),
            Err(XpsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_resolve_angle_data_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("angles.csv");
        std::fs::write(&path, "angle,ratio,weight\n0,1.1,1\n60,3.0,0.5\n").unwrap();

        let input = AngleDataArgs {
            angles: vec![],
            ratios: vec![],
            weights: vec![],
            data: Some(path),
        };
        let t = resolve_angle_data(&input).unwrap();
        assert_eq!(t.ratios, vec![1.1, 3.0]);
        assert_eq!(t.weights, Some(vec![1.0, 0.5]));
    }
}
