// core/src/pipeline/definition.rs

//! Building a [`Pipeline`]: step layout and handler registration.

use super::context_data::ContextData;
use super::control::PipelineControl;
use super::step::{Handler, HandlerFuture, Phase, SkipCondition, StepDef, StepSlot};
use crate::error::PipelineError;
use std::future::Future;

/// `(name, optional, skip_if)` as accepted by [`Pipeline::new`].
pub type StepSpec<'a, TData> = (&'a str, bool, Option<SkipCondition<TData>>);

/// Named steps over shared data `TData`, run in declaration order.
///
/// Handler errors reach the caller unchanged. Failures of the engine itself
/// are turned into `Err` via `From<PipelineError>`.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) slots: Vec<StepSlot<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub fn new(specs: &[StepSpec<'_, TData>]) -> Self {
    let mut pipeline = Self { slots: Vec::with_capacity(specs.len()) };
    for (name, optional, skip_if) in specs {
      pipeline.reject_duplicate(name);
      pipeline.slots.push(StepSlot::new(StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      }));
    }
    pipeline
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.slots.iter().map(|slot| slot.def.name.as_str()).collect()
  }

  fn index_of(&self, step_name: &str) -> Option<usize> {
    self.slots.iter().position(|slot| slot.def.name == step_name)
  }

  // Misspelled step names are wiring bugs and fail loudly at build time.
  fn require(&self, step_name: &str) -> usize {
    self
      .index_of(step_name)
      .unwrap_or_else(|| panic!("Pipeline setup error: no step named '{}'.", step_name))
  }

  fn reject_duplicate(&self, step_name: &str) {
    if self.index_of(step_name).is_some() {
      panic!("Pipeline setup error: step '{}' is declared twice.", step_name);
    }
  }

  fn attach<F, E>(&mut self, phase: Phase, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    let idx = self.require(step_name);
    let handler: Handler<TData, Err> = Box::new(move |ctx| -> HandlerFuture<Err> {
      let fut = handler_fn(ctx);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self.slots[idx].push(phase, handler);
  }

  pub fn before_root<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.attach(Phase::Before, step_name, handler_fn);
  }

  pub fn on_root<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.attach(Phase::On, step_name, handler_fn);
  }

  pub fn after_root<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.attach(Phase::After, step_name, handler_fn);
  }
}
