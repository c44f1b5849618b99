// src/engine/bridge.rs
//! 通过子进程桥接数值计算引擎。
//!
//! 每次调用向子进程 stdin 写一行 JSON 请求，从 stdout 读一行 JSON 应答：
//!
//! ```text
//! -> {"procedure": "postProcess", "args": [...], "nargout": 2}
//! <- {"ok": true, "values": [...]}
//! <- {"ok": false, "error": "..."}
//! ```
//!
//! 分割结果以 `{"shape": [...], "data": [...]}` 传输，标签可以是整数或整值浮点数
//! （如 `1.0`），带小数部分的值会被拒绝。
//!
//! 关闭 stdin 即通知引擎退出。
use crate::engine::numeric::{
    NumericEngine, PROC_NORMALIZE, PROC_PERFORMANCE, PROC_POST_PROCESS, PostProcessParams,
};
use crate::errors::{EvalError, EvalResult};
use crate::models::EngineConfig;
use crate::results::Segments;
use ndarray::IxDyn;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tracing::debug;

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    procedure: &'a str,
    args: Vec<Value>,
    nargout: usize,
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    ok: bool,
    #[serde(default)]
    values: Vec<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// 在桥接协议中传输的标签数组，数据按行优先展开
///
/// 数值引擎的数组默认是双精度，所以这里按 f64 接收。
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LabeledArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl LabeledArray {
    pub fn from_segments(segments: &Segments) -> Self {
        Self {
            shape: segments.shape().to_vec(),
            data: segments.iter().map(|&label| label as f64).collect(),
        }
    }

    pub fn into_segments(self) -> Result<Segments, String> {
        let labels = self
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                if v.is_finite() && v.fract() == 0.0 {
                    Ok(v as i64)
                } else {
                    Err(format!("label {} at index {} is not a whole number", v, i))
                }
            })
            .collect::<Result<Vec<i64>, String>>()?;
        Segments::from_shape_vec(IxDyn(&self.shape), labels).map_err(|e| e.to_string())
    }
}

/// 子进程形式的数值计算引擎会话
pub struct BridgeEngine {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl BridgeEngine {
    /// 启动桥接进程
    pub fn spawn(config: &EngineConfig) -> EvalResult<Self> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| EvalError::engine("spawn", format!("{}: {}", config.program, e)))?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| EvalError::engine("spawn", "bridge stdout not captured"))?;

        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    /// 调用一个具名过程，返回至少 `nargout` 个值
    pub fn call(&mut self, procedure: &str, args: Vec<Value>, nargout: usize) -> EvalResult<Vec<Value>> {
        let request = BridgeRequest {
            procedure,
            args,
            nargout,
        };
        let mut line = serde_json::to_string(&request).map_err(|e| EvalError::engine(procedure, e))?;
        line.push('\n');
        debug!("bridge -> {}", line.trim_end());

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| EvalError::engine(procedure, "engine session already terminated"))?;
        stdin
            .write_all(line.as_bytes())
            .map_err(|e| EvalError::engine(procedure, e))?;
        stdin.flush().map_err(|e| EvalError::engine(procedure, e))?;

        let mut reply_line = String::new();
        let read = self
            .stdout
            .read_line(&mut reply_line)
            .map_err(|e| EvalError::engine(procedure, e))?;
        if read == 0 {
            return Err(EvalError::engine(procedure, "engine closed the connection"));
        }
        debug!("bridge <- {}", reply_line.trim_end());

        let reply: BridgeReply = serde_json::from_str(&reply_line)
            .map_err(|e| EvalError::engine(procedure, format!("malformed reply: {}", e)))?;
        if !reply.ok {
            return Err(EvalError::engine(
                procedure,
                reply.error.unwrap_or_else(|| "unspecified engine error".to_string()),
            ));
        }
        if reply.values.len() < nargout {
            return Err(EvalError::engine(
                procedure,
                format!("expected {} return values, got {}", nargout, reply.values.len()),
            ));
        }
        Ok(reply.values)
    }
}

fn path_arg(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

fn number_of(procedure: &str, value: &Value) -> EvalResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| EvalError::engine(procedure, format!("expected a number, got {}", value)))
}

impl NumericEngine for BridgeEngine {
    fn homo_filt_normalize(
        &mut self,
        source: &Path,
        save_dir: &Path,
        name: &str,
        smoothing: f64,
    ) -> EvalResult<()> {
        let args = vec![path_arg(source), path_arg(save_dir), json!(name), json!(smoothing)];
        self.call(PROC_NORMALIZE, args, 0)?;
        Ok(())
    }

    fn post_process(
        &mut self,
        prob_dir: &Path,
        name: &str,
        params: &PostProcessParams,
    ) -> EvalResult<Segments> {
        let args = vec![
            path_arg(prob_dir),
            json!(name),
            json!(params.dims),
            json!(params.avg_area),
            json!(params.min_area),
            json!(params.prob_thresh),
        ];
        let mut values = self.call(PROC_POST_PROCESS, args, 2)?;
        // 第一个返回值是分割结果，第二个不使用
        let array: LabeledArray = serde_json::from_value(values.swap_remove(0))
            .map_err(|e| EvalError::engine(PROC_POST_PROCESS, format!("bad segments: {}", e)))?;
        array
            .into_segments()
            .map_err(|e| EvalError::engine(PROC_POST_PROCESS, format!("bad segments: {}", e)))
    }

    fn get_performance(
        &mut self,
        mask_dir: &Path,
        name: &str,
        segments: &Segments,
        iou_threshold: f64,
    ) -> EvalResult<(f64, f64, f64)> {
        let segments = serde_json::to_value(LabeledArray::from_segments(segments))
            .map_err(|e| EvalError::engine(PROC_PERFORMANCE, e))?;
        let args = vec![path_arg(mask_dir), json!(name), segments, json!(iou_threshold)];
        let values = self.call(PROC_PERFORMANCE, args, 3)?;
        Ok((
            number_of(PROC_PERFORMANCE, &values[0])?,
            number_of(PROC_PERFORMANCE, &values[1])?,
            number_of(PROC_PERFORMANCE, &values[2])?,
        ))
    }

    fn terminate(&mut self) -> EvalResult<()> {
        // 重复调用时直接返回
        let Some(stdin) = self.stdin.take() else {
            return Ok(());
        };
        drop(stdin);
        let status = self
            .child
            .wait()
            .map_err(|e| EvalError::engine("terminate", e))?;
        if !status.success() {
            return Err(EvalError::engine("terminate", format!("engine exited with {}", status)));
        }
        Ok(())
    }
}
