//! # spectrum 子命令实现
//!
//! 谱文件到厚度的完整流程：读取谱 → 两个窗口的峰面积 → 厚度反演。
//!
//! ## 功能
//! - 支持单文件和批量目录处理
//! - 并行计算（rayon）
//! - 结果汇总为 CSV
//!
//! ## 依赖关系
//! - 使用 `cli/spectrum.rs` 定义的 SpectrumArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `parsers/` 读取谱，`xps/` 计算面积与厚度

use crate::batch::{BatchResult, BatchRunner, FileCollector, ProcessResult};
use crate::cli::spectrum::SpectrumArgs;
use crate::commands::{area, fit};
use crate::error::{XpsError, Result};
use crate::models::{AttenuationParams, EnergyWindow};
use crate::parsers::{self, LoadOptions};
use crate::utils::output;
use crate::xps::export::{self, FitRecord};
use crate::xps::inversion;
use crate::xps::peaks;
use crate::xps::{Background, PeakArea, ShirleyConfig, SolverConfig, ThicknessFit};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 批量模式默认结果文件
const DEFAULT_RESULTS: &str = "thickness_results.csv";

/// 单个谱的处理配置（批量模式下跨线程共享）
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub load: LoadOptions,
    pub over_window: EnergyWindow,
    pub sub_window: EnergyWindow,
    pub background: Background,
    pub shirley: ShirleyConfig,
    pub params: AttenuationParams,
    pub theta: f64,
    pub d0: f64,
    pub bounds: (f64, f64),
    pub solver: SolverConfig,
}

/// 单个谱的处理结果
#[derive(Debug, Clone)]
pub struct SpectrumResult {
    pub name: String,
    pub over: PeakArea,
    pub sub: PeakArea,
    pub fit: ThicknessFit,
}

impl SpectrumResult {
    fn to_record(&self, file: &str, theta: f64) -> FitRecord {
        let mut status = self.fit.status.to_string();
        if !self.over.converged || !self.sub.converged {
            status.push_str("; shirley not converged");
        }
        FitRecord {
            file: file.to_string(),
            theta,
            a_over: Some(self.over.area),
            a_sub: Some(self.sub.area),
            ratio: self.fit.r_meas,
            thickness: Some(self.fit.d),
            success: self.fit.success,
            iterations: Some(self.fit.iterations),
            status,
        }
    }
}

/// 执行完整流程
pub fn execute(args: SpectrumArgs) -> Result<()> {
    output::print_header("XPS Overlayer Thickness from Spectra");

    let config = PipelineConfig {
        load: args.loader.to_options(),
        over_window: args.over_window,
        sub_window: args.sub_window,
        background: args.background,
        shirley: args.shirley.to_config(),
        params: args.material.to_params()?,
        theta: args.theta,
        d0: args.fit.d0,
        bounds: args.fit.bounds,
        solver: args.fit.solver_config(),
    };

    if args.input.is_file() {
        execute_single_file(&args, &config)
    } else if args.input.is_dir() {
        execute_batch(&args, config)
    } else {
        Err(XpsError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 单文件模式
fn execute_single_file(args: &SpectrumArgs, config: &PipelineConfig) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let result = analyze_spectrum(&args.input, config)?;
    output::print_success(&format!(
        "Integrated '{}' with {} background",
        result.name, config.background
    ));

    area::print_area_table(&[result.over.clone(), result.sub.clone()]);
    fit::print_thickness_fit(&result.fit, result.fit.r_meas);

    if let Some(path) = &args.output {
        let record = result.to_record(&args.input.display().to_string(), config.theta);
        export::fits_to_csv(&[record], path)?;
        output::print_success(&format!("Result saved to '{}'", path.display()));
    }

    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &SpectrumArgs, config: PipelineConfig) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} spectrum files", files.len()));
    output::print_info(&format!(
        "Windows: overlayer {} eV, substrate {} eV, background {}",
        config.over_window, config.sub_window, config.background
    ));

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Using {} parallel job(s)", runner.jobs()));

    let theta = config.theta;
    let result = run_batch(&runner, files, Arc::new(config))?;
    let records = collect_records(&result, theta);

    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS));
    export::fits_to_csv(&records, &out_path)?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} failed",
        result.success, result.failed
    ));
    output::print_success(&format!("Results saved to '{}'", out_path.display()));

    let unconverged = records.iter().filter(|r| r.thickness.is_some() && !r.success).count();
    if unconverged > 0 {
        output::print_warning(&format!("{} fit(s) did not converge", unconverged));
    }

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 并行处理文件列表
pub fn run_batch(
    runner: &BatchRunner,
    files: Vec<PathBuf>,
    config: Arc<PipelineConfig>,
) -> Result<BatchResult<(String, SpectrumResult)>> {
    runner.run(files, |file| {
        let name = file.display().to_string();
        match analyze_spectrum(file, &config) {
            Ok(r) => ProcessResult::Success((name, r)),
            Err(e) => ProcessResult::Failed(name, e.to_string()),
        }
    })
}

/// 成功与失败的文件合并为按文件名排序的结果行
pub fn collect_records(
    result: &BatchResult<(String, SpectrumResult)>,
    theta: f64,
) -> Vec<FitRecord> {
    let mut records: Vec<FitRecord> = result
        .outputs
        .iter()
        .map(|(file, r)| r.to_record(file, theta))
        .chain(
            result
                .failures
                .iter()
                .map(|(file, err)| FitRecord::failed(file.clone(), theta, err.clone())),
        )
        .collect();
    records.sort_by(|a, b| a.file.cmp(&b.file));
    records
}

/// 处理单个谱文件
pub fn analyze_spectrum(path: &Path, config: &PipelineConfig) -> Result<SpectrumResult> {
    let spectrum = parsers::load_spectrum(path, &config.load)?;

    let over = peaks::integrate_area_with(
        &spectrum.energy,
        &spectrum.intensity,
        config.over_window,
        config.background,
        &config.shirley,
    );
    let sub = peaks::integrate_area_with(
        &spectrum.energy,
        &spectrum.intensity,
        config.sub_window,
        config.background,
        &config.shirley,
    );

    let fit = inversion::estimate_thickness_from_areas_with(
        over.area,
        sub.area,
        config.theta,
        &config.params,
        config.d0,
        config.bounds,
        &config.solver,
    )?;

    Ok(SpectrumResult {
        name: spectrum.name,
        over,
        sub,
        fit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xps::ratio_over_to_sub;
    use std::f64::consts::PI;
    use std::fmt::Write as _;
    use std::fs;

    fn params() -> AttenuationParams {
        AttenuationParams::new(1.0, 1.0, 2.0, 1.0, 1.0, 2.0)
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            load: LoadOptions::default(),
            over_window: EnergyWindow::new(20.0, 40.0),
            sub_window: EnergyWindow::new(60.0, 80.0),
            background: Background::Linear,
            shirley: ShirleyConfig::default(),
            params: params(),
            theta: 0.0,
            d0: 2.0,
            bounds: (0.0, 50.0),
            solver: SolverConfig::default(),
        }
    }

    /// 两个高斯峰 + 常数基线，面积比为给定值
    fn synthetic_spectrum(ratio: f64) -> String {
        let sub_area = 100.0;
        let over_area = sub_area * ratio;
        let gauss = |x: f64, c: f64, area: f64| area / (2.0 * PI).sqrt() * (-(x - c).powi(2) / 2.0).exp();

        let mut text = String::from("Binding Energy,Counts\n");
        for k in 0..=1000 {
            let e = k as f64 * 0.1;
            let y = 5.0 + gauss(e, 30.0, over_area) + gauss(e, 70.0, sub_area);
            writeln!(text, "{:.3},{:.9}", e, y).unwrap();
        }
        text
    }

    #[test]
    fn test_pipeline_recovers_thickness() {
        let d_true = 1.5;
        let r = ratio_over_to_sub(&params(), 0.0, d_true).value().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("film.csv");
        fs::write(&path, synthetic_spectrum(r)).unwrap();

        let result = analyze_spectrum(&path, &config()).unwrap();
        assert_eq!(result.name, "film");
        assert!((result.sub.area - 100.0).abs() < 1e-3, "{}", result.sub.area);
        assert!(result.fit.success);
        assert!((result.fit.d - d_true).abs() < 1e-3, "d = {}", result.fit.d);
    }

    #[test]
    fn test_empty_substrate_window_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("film.csv");
        fs::write(&path, synthetic_spectrum(1.0)).unwrap();

        let mut cfg = config();
        cfg.sub_window = EnergyWindow::new(500.0, 600.0);
        assert!(matches!(
            analyze_spectrum(&path, &cfg),
            Err(XpsError::NonPositiveArea(_))
        ));
    }

    #[test]
    fn test_batch_collects_successes_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let r = ratio_over_to_sub(&params(), 0.0, 0.8).value().unwrap();
        fs::write(dir.path().join("a.csv"), synthetic_spectrum(r)).unwrap();
        fs::write(dir.path().join("b.csv"), synthetic_spectrum(r)).unwrap();
        fs::write(dir.path().join("broken.csv"), "BE,I\n1,x\n2,y\n").unwrap();

        let files = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.csv")
            .unwrap()
            .collect();
        let result = run_batch(&BatchRunner::new(2), files, Arc::new(config())).unwrap();
        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 1);

        let records = collect_records(&result, 0.0);
        assert_eq!(records.len(), 3);
        assert!(records[0].file.ends_with("a.csv"));
        assert!(records[2].file.ends_with("broken.csv"));
        assert!(!records[2].success);
        for rec in &records[..2] {
            assert!((rec.thickness.unwrap() - 0.8).abs() < 1e-3);
        }

        let out = dir.path().join("results.csv");
        export::fits_to_csv(&records, &out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap().lines().count(), 4);
    }
}
