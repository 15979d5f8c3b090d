// core/src/pipeline/execution.rs
use super::context_data::ContextData;
use super::control::{PipelineControl, PipelineResult};
use super::definition::Pipeline;
use super::step::{Phase, StepSlot};
use crate::error::PipelineError;
use tracing::{debug, error, info, info_span, instrument, Instrument};

/// What running one step (or one phase of it) amounted to.
enum Flow<Err> {
  Next,
  Halt,
  Fail(Err),
}

async fn run_slot<TData, Err>(slot: &StepSlot<TData, Err>, ctx: &ContextData<TData>) -> Flow<Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for phase in Phase::ORDER {
    for (position, handler) in slot.handlers(phase).iter().enumerate() {
      let span = info_span!("pipeline_handler", phase = phase.as_str(), position);
      match handler(ctx.clone()).instrument(span).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          info!(phase = phase.as_str(), "Handler requested stop.");
          return Flow::Halt;
        }
        Err(e) => {
          error!(phase = phase.as_str(), error = %e, "Handler returned an error.");
          return Flow::Fail(e);
        }
      }
    }
  }
  Flow::Next
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx`, handlers of a step in before/on/after order.
  ///
  /// The first handler error is returned as is. A required step with no
  /// handlers at all yields `PipelineError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(context = %std::any::type_name::<TData>(), steps = self.slots.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx: ContextData<TData>) -> Result<PipelineResult, Err> {
    for (index, slot) in self.slots.iter().enumerate() {
      let def = &slot.def;
      let span = info_span!("pipeline_step", step = %def.name, index);

      if def.skip_if.as_ref().is_some_and(|should_skip| should_skip(ctx.clone())) {
        debug!(parent: &span, "Skip condition held; step not run.");
        continue;
      }

      if slot.is_unhandled() {
        if def.optional {
          debug!(parent: &span, "Optional step without handlers.");
          continue;
        }
        error!(parent: &span, "Required step without handlers.");
        return Err(PipelineError::HandlerMissing { step_name: def.name.clone() }.into());
      }

      match run_slot(slot, &ctx).instrument(span).await {
        Flow::Next => {}
        Flow::Halt => return Ok(PipelineResult::Stopped),
        Flow::Fail(e) => return Err(e),
      }
    }
    Ok(PipelineResult::Completed)
  }
}
