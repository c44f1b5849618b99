use crate::errors::{EvalError, EvalResult};
use crate::models::InferenceConfig;
use std::path::PathBuf;
use std::process::Command;
use tracing::info;

/// 一次推理调用所需的参数
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub architecture: String,
    pub config_path: PathBuf,
    pub batch_size: usize,
}

impl InferenceRequest {
    pub fn args(&self) -> Vec<String> {
        vec![
            "inference".to_string(),
            "-a".to_string(),
            self.architecture.clone(),
            "--conf".to_string(),
            self.config_path.to_string_lossy().into_owned(),
            "--batch_size".to_string(),
            self.batch_size.to_string(),
        ]
    }
}

/// 推理引擎：读取推理配置，把概率图写到配置中的 save_seg_dir
pub trait InferenceEngine {
    fn run(&mut self, request: &InferenceRequest) -> EvalResult<()>;
}

/// 以外部命令方式运行的推理引擎
#[derive(Debug, Clone)]
pub struct CommandInference {
    program: String,
}

impl CommandInference {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Self {
        Self::new(config.program.clone())
    }
}

impl InferenceEngine for CommandInference {
    fn run(&mut self, request: &InferenceRequest) -> EvalResult<()> {
        let args = request.args();
        info!("Running inference: {} {}", self.program, args.join(" "));

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| EvalError::engine("inference", format!("{}: {}", self.program, e)))?;
        if !status.success() {
            return Err(EvalError::engine(
                "inference",
                format!("{} exited with {}", self.program, status),
            ));
        }
        Ok(())
    }
}
