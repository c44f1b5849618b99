pub mod bridge;
pub mod inference;
pub mod numeric;
pub mod session;

pub use bridge::BridgeEngine;
pub use inference::{CommandInference, InferenceEngine, InferenceRequest};
pub use numeric::NumericEngine;
pub use session::EngineSession;
