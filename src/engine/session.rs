use crate::engine::numeric::NumericEngine;
use crate::errors::EvalResult;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// 引擎会话守卫：无论流程正常结束还是中途出错，引擎都只结束一次
pub struct EngineSession<E: NumericEngine> {
    engine: E,
    released: bool,
}

impl<E: NumericEngine> EngineSession<E> {
    pub fn acquire(engine: E) -> Self {
        Self {
            engine,
            released: false,
        }
    }

    /// 显式结束会话，并返回结束时的错误
    pub fn release(mut self) -> EvalResult<()> {
        self.released = true;
        self.engine.terminate()
    }
}

impl<E: NumericEngine> Deref for EngineSession<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.engine
    }
}

impl<E: NumericEngine> DerefMut for EngineSession<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: NumericEngine> Drop for EngineSession<E> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // 出错提前返回时走这里，错误只记录不覆盖原始错误
        if let Err(e) = self.engine.terminate() {
            warn!("Failed to terminate engine session: {}", e);
        }
    }
}
