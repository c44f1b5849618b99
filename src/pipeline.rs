// src/pipeline.rs
//! 评估流程编排：预处理检查 -> 生成推理配置 -> 推理 -> 后处理与打分。
use crate::engine::{
    EngineSession, InferenceEngine, InferenceRequest, NumericEngine, numeric::PostProcessParams,
};
use crate::file_utils::{ensure_dir, find_item_names};
use crate::inference_config::{
    IniDocument, KEY_FILENAME_NOT_CONTAINS, SynthesisInputs, exclusion_set, write_inference_config,
};
use crate::models::{DERIVED_MARKER, PerformanceRecord, RunConfig, RunPaths, Scores};
use crate::results::{ThresholdBundle, load_thresholds, save_performance, save_segments};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// 确保每条数据都有预处理后的文件，缺失时调用引擎生成
///
/// 已存在的文件不会触发任何引擎调用。
pub fn prepare_data<E: NumericEngine + ?Sized>(
    engine: &mut E,
    config: &RunConfig,
    paths: &RunPaths,
) -> Result<()> {
    ensure_dir(&paths.save_mask)?;
    ensure_dir(&paths.save_data)?;

    for name in &config.general.names {
        if paths.derived_artifact(name).exists() {
            continue;
        }
        info!("Preparing data {} for network...", name);
        engine
            .homo_filt_normalize(
                &paths.source_artifact(name),
                &paths.save_data,
                name,
                config.parameters.smoothing,
            )
            .with_context(|| format!("Failed to prepare data {}", name))?;
    }
    Ok(())
}

/// 按当前目录状态生成推理配置文件
pub fn synthesize_config(config: &RunConfig, paths: &RunPaths) -> Result<IniDocument> {
    let discovered = find_item_names(&paths.save_data, DERIVED_MARKER)?;
    let exclude = exclusion_set(&discovered, &config.general.names);
    let excluded = exclude.len();

    let inputs = SynthesisInputs {
        search_path: paths.save_data.clone(),
        filename_contains: DERIVED_MARKER.to_string(),
        exclude,
        save_dir: paths.prob_map.clone(),
        model_dir: paths.model.clone(),
    };

    let template = Path::new(&config.inference.template);
    let output = Path::new(&config.inference.output);
    let doc = write_inference_config(template, output, &inputs).with_context(|| {
        format!(
            "Failed to write inference config {} from template {}",
            output.display(),
            template.display()
        )
    })?;
    info!(
        "Inference config written to {} ({} lines)",
        output.display(),
        doc.line_count()
    );
    if excluded > 0 {
        info!(
            "Excluding {} unlisted data items from inference: {}",
            excluded,
            doc.get(KEY_FILENAME_NOT_CONTAINS).unwrap_or_default()
        );
    }
    Ok(doc)
}

/// 推理、逐条后处理与打分，最后写出汇总性能文件
///
/// 没有人工标注时返回 `None`，此时性能文件中的分数全部为 0。
pub fn run_and_score<E, I>(
    engine: &mut E,
    inference: &mut I,
    thresholds: &ThresholdBundle,
    config: &RunConfig,
    paths: &RunPaths,
) -> Result<Option<PerformanceRecord>>
where
    E: NumericEngine + ?Sized,
    I: InferenceEngine + ?Sized,
{
    let request = InferenceRequest {
        architecture: config.inference.architecture.clone(),
        config_path: config.inference.output.clone().into(),
        batch_size: config.parameters.batch_size,
    };
    inference.run(&request).context("Inference failed")?;

    let params = PostProcessParams {
        dims: config.parameters.dims,
        avg_area: config.parameters.avg_area(),
        min_area: thresholds.min_area,
        prob_thresh: thresholds.prob_thresh,
    };

    let names = &config.general.names;
    let mut record = PerformanceRecord::zeros(names.len());
    for (index, name) in names.iter().enumerate() {
        info!("Postprocessing data {} ...", name);
        let segments = engine
            .post_process(&paths.prob_map, name, &params)
            .with_context(|| format!("Failed to postprocess data {}", name))?;

        if config.general.save_segments {
            info!("Saving results of {} ...", name);
            save_segments(&paths.segments_file(name), &segments)?;
        }

        if let Some(mask_dir) = &paths.mask {
            info!("Getting performance metrics for {} ...", name);
            let (recall, precision, f1) = engine
                .get_performance(mask_dir, name, &segments, config.parameters.iou_threshold)
                .with_context(|| format!("Failed to score data {}", name))?;
            let scores = Scores::from_raw(recall, precision, f1);
            info!(
                "data: {} -> recall: {}, precision: {}, and F1 {}",
                name, scores.recall, scores.precision, scores.f1
            );
            record.set(index, scores);
        }
    }

    let performance_file = paths.performance_file();
    save_performance(&performance_file, &record)?;
    info!("Performance saved to {}", performance_file.display());

    Ok(paths.mask.is_some().then_some(record))
}

/// 读取当前网络类型的阈值文件
pub fn load_run_thresholds(config: &RunConfig, paths: &RunPaths) -> Result<ThresholdBundle> {
    let thresh_file = paths.threshold_file(config);
    let thresholds = load_thresholds(&thresh_file, config)
        .with_context(|| format!("Failed to load thresholds from {}", thresh_file.display()))?;
    info!(
        "Thresholds: probability {}, minimum area {}",
        thresholds.prob_thresh, thresholds.min_area
    );
    Ok(thresholds)
}

/// 完整流程；引擎会话在任何退出路径上都会结束
pub fn run_pipeline<E, I>(
    engine: E,
    inference: &mut I,
    config: &RunConfig,
) -> Result<Option<PerformanceRecord>>
where
    E: NumericEngine,
    I: InferenceEngine + ?Sized,
{
    let paths = RunPaths::new(config);
    let mut session = EngineSession::acquire(engine);

    // 阈值文件有问题时在任何预处理之前失败
    let thresholds = load_run_thresholds(config, &paths)?;
    prepare_data(&mut *session, config, &paths)?;
    synthesize_config(config, &paths)?;
    let record = run_and_score(&mut *session, inference, &thresholds, config, &paths)?;

    session.release().context("Failed to terminate engine session")?;
    Ok(record)
}

/// 只做到生成推理配置为止
pub fn configure_only<E: NumericEngine>(engine: E, config: &RunConfig) -> Result<IniDocument> {
    let paths = RunPaths::new(config);
    let mut session = EngineSession::acquire(engine);

    prepare_data(&mut *session, config, &paths)?;
    let doc = synthesize_config(config, &paths)?;

    session.release().context("Failed to terminate engine session")?;
    Ok(doc)
}
