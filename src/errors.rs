use std::path::PathBuf;
use thiserror::Error;

/// 评估流程中所有可命名的失败类型
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Config key '{0}' not found in template")]
    MarkerNotFound(String),
    #[error("Config key '{key}' appears {count} times in template, expected exactly one")]
    DuplicateMarker { key: String, count: usize },
    #[error("Unknown network type '{0}' (expected ABO, ABO_Neuro or Neurofinder)")]
    UnknownNetworkType(String),
    #[error("Engine call '{procedure}' failed: {message}")]
    Engine { procedure: String, message: String },
    #[error("I/O failure at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Numeric archive failure at {}: {message}", path.display())]
    Npz { path: PathBuf, message: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EvalError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn engine(procedure: &str, message: impl ToString) -> Self {
        EvalError::Engine {
            procedure: procedure.to_string(),
            message: message.to_string(),
        }
    }

    pub fn npz(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        EvalError::Npz {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_failure() {
        let err = EvalError::MarkerNotFound("model_dir".to_string());
        assert_eq!(err.to_string(), "Config key 'model_dir' not found in template");

        let err = EvalError::DuplicateMarker {
            key: "save_seg_dir".to_string(),
            count: 2,
        };
        assert!(err.to_string().contains("appears 2 times"));

        let err = EvalError::engine("postProcess", "segfault");
        assert_eq!(err.to_string(), "Engine call 'postProcess' failed: segfault");
    }
}
