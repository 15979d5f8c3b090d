// core/src/pipeline/mod.rs

//! Step pipelines for the multi-step storefront workflows (add to cart,
//! checkout). Steps run in order; each may have `before`, `on` and `after`
//! handlers that share one [`ContextData`] and answer with a
//! [`PipelineControl`].

mod context_data;
mod control;
mod definition;
mod execution;
mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Pipeline, StepSpec};
pub use step::{Handler, HandlerFuture, Phase, SkipCondition, StepDef};
