// core/src/pipeline/step.rs
use super::control::PipelineControl;
use super::ContextData;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Evaluated right before a step; returning `true` skips it for this run.
pub type SkipCondition<TData> = Arc<dyn Fn(ContextData<TData>) -> bool + Send + Sync + 'static>;

pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>;

/// Type-erased step handler. Lock guards on the context must not be held
/// across an `.await` inside the handler.
pub type Handler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<Err> + Send + Sync>;

/// When a handler runs relative to the other handlers of its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  pub const ORDER: [Phase; 3] = [Phase::Before, Phase::On, Phase::After];

  pub fn as_str(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

#[derive(Clone)]
pub struct StepDef<TData: 'static + Send + Sync> {
  pub name: String,
  pub optional: bool,
  pub skip_if: Option<SkipCondition<TData>>,
}

impl<TData: 'static + Send + Sync> fmt::Debug for StepDef<TData> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("has_skip_condition", &self.skip_if.is_some())
      .finish()
  }
}

/// A step together with the handlers registered for it, grouped by phase.
pub(crate) struct StepSlot<TData: 'static + Send + Sync, Err> {
  pub(crate) def: StepDef<TData>,
  before: Vec<Handler<TData, Err>>,
  on: Vec<Handler<TData, Err>>,
  after: Vec<Handler<TData, Err>>,
}

impl<TData: 'static + Send + Sync, Err> StepSlot<TData, Err> {
  pub(crate) fn new(def: StepDef<TData>) -> Self {
    Self {
      def,
      before: Vec::new(),
      on: Vec::new(),
      after: Vec::new(),
    }
  }

  pub(crate) fn handlers(&self, phase: Phase) -> &[Handler<TData, Err>] {
    match phase {
      Phase::Before => &self.before,
      Phase::On => &self.on,
      Phase::After => &self.after,
    }
  }

  pub(crate) fn push(&mut self, phase: Phase, handler: Handler<TData, Err>) {
    match phase {
      Phase::Before => self.before.push(handler),
      Phase::On => self.on.push(handler),
      Phase::After => self.after.push(handler),
    }
  }

  pub(crate) fn is_unhandled(&self) -> bool {
    self.before.is_empty() && self.on.is_empty() && self.after.is_empty()
  }
}
