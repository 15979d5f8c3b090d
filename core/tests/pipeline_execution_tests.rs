// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::Arc;
use storefront::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineResult, StepSpec};

fn linear(names: &[&'static str]) -> Pipeline<Ledger, FlowError> {
  let specs: Vec<StepSpec<'_, Ledger>> = names.iter().map(|name| (*name, false, None)).collect();
  Pipeline::new(&specs)
}

#[tokio::test]
#[serial]
async fn steps_run_in_declaration_order() {
  setup_tracing();
  let mut pipeline = linear(&["reserve", "charge", "ship"]);
  pipeline.on_root("ship", mark("ship", "c"));
  pipeline.on_root("reserve", mark("reserve", "a"));
  pipeline.on_root("charge", mark("charge", "b"));

  let ctx = ledger();
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));

  let seen = ctx.read();
  assert_eq!(seen.hits, 3);
  assert_eq!(seen.trail, "abc");
  assert_eq!(seen.visited, ["reserve", "charge", "ship"]);
}

#[tokio::test]
#[serial]
async fn stop_signal_ends_the_run_early() {
  setup_tracing();
  let mut pipeline = linear(&["reserve", "gate", "ship"]);
  pipeline.on_root("reserve", mark("reserve", "a"));
  pipeline.on_root("gate", |ctx: ContextData<Ledger>| {
    Box::pin(async move {
      ctx.write().visited.push("gate".into());
      Ok::<_, FlowError>(PipelineControl::Stop)
    })
  });
  pipeline.on_root("ship", mark("ship", "c"));

  let ctx = ledger();
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Stopped));
  assert_eq!(ctx.read().visited, ["reserve", "gate"]);
  assert_eq!(ctx.read().hits, 1);
}

#[tokio::test]
#[serial]
async fn first_handler_error_is_returned_unchanged() {
  setup_tracing();
  let mut pipeline = linear(&["reserve", "charge", "ship"]);
  pipeline.on_root("reserve", mark("reserve", "a"));
  pipeline.on_root("charge", boom("charge", "card declined"));
  pipeline.on_root("ship", mark("ship", "c"));

  let ctx = ledger();
  assert_eq!(
    pipeline.run(ctx.clone()).await,
    Err(FlowError::Step("card declined".into()))
  );
  assert_eq!(ctx.read().trail, "a");
  assert_eq!(ctx.read().visited, ["reserve", "charge"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_is_evaluated_against_current_data() {
  setup_tracing();
  let mut pipeline = Pipeline::<Ledger, FlowError>::new(&[
    ("reserve", false, None),
    ("retry_reserve", false, Some(Arc::new(|ctx: ContextData<Ledger>| ctx.read().hits > 0))),
    ("ship", false, None),
  ]);
  pipeline.on_root("reserve", mark("reserve", "a"));
  pipeline.on_root("retry_reserve", mark("retry_reserve", "x"));
  pipeline.on_root("ship", mark("ship", "c"));

  let ctx = ledger();
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().trail, "ac");
}

#[tokio::test]
#[serial]
async fn required_step_without_handlers_fails() {
  setup_tracing();
  let pipeline = linear(&["charge"]);

  match pipeline.run(ledger()).await {
    Err(FlowError::Engine(msg)) => {
      assert!(msg.contains("HandlerMissing"), "{msg}");
      assert!(msg.contains("charge"), "{msg}");
    }
    other => panic!("unexpected outcome: {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn optional_step_without_handlers_is_passed_over() {
  setup_tracing();
  let mut pipeline = Pipeline::<Ledger, FlowError>::new(&[("notify", true, None), ("ship", false, None)]);
  pipeline.on_root("ship", mark("ship", "c"));

  let ctx = ledger();
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().visited, ["ship"]);
}

#[tokio::test]
#[serial]
async fn phases_run_before_on_after_regardless_of_registration_order() {
  setup_tracing();
  let mut pipeline = linear(&["charge"]);
  pipeline.after_root("charge", mark("audit", "3"));
  pipeline.on_root("charge", mark("charge", "2"));
  pipeline.before_root("charge", mark("precheck", "1"));
  pipeline.on_root("charge", mark("receipt", "2b"));

  let ctx = ledger();
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, "122b3");
  assert_eq!(ctx.read().visited, ["precheck", "charge", "receipt", "audit"]);
}

#[tokio::test]
#[serial]
async fn stop_in_before_phase_prevents_main_handlers() {
  setup_tracing();
  let mut pipeline = linear(&["charge", "ship"]);
  pipeline.before_root("charge", mark("precheck", "1"));
  pipeline.on_root("charge", mark("charge", "2"));
  pipeline.on_root("ship", mark("ship", "3"));

  let ctx = ContextData::new(Ledger {
    halt_at: Some("precheck".into()),
    ..Default::default()
  });
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Stopped));
  assert_eq!(ctx.read().trail, "1");
}

#[test]
fn step_names_follow_declaration_order() {
  let pipeline = linear(&["validate", "reserve", "charge", "ship"]);
  assert_eq!(pipeline.step_names(), ["validate", "reserve", "charge", "ship"]);
}

#[test]
#[should_panic(expected = "Pipeline setup error")]
fn handler_for_undeclared_step_panics() {
  let mut pipeline = linear(&["charge"]);
  pipeline.on_root("refund", mark("refund", ""));
}

#[test]
#[should_panic(expected = "declared twice")]
fn duplicate_step_names_panic() {
  let _ = Pipeline::<Ledger, FlowError>::new(&[("charge", false, None), ("ship", false, None), ("charge", true, None)]);
}

#[tokio::test]
#[serial]
async fn engine_error_type_can_be_used_directly() {
  setup_tracing();
  let pipeline = Pipeline::<Ledger, PipelineError>::new(&[("charge", false, None)]);
  match pipeline.run(ledger()).await {
    Err(PipelineError::HandlerMissing { step_name }) => assert_eq!(step_name, "charge"),
    other => panic!("unexpected outcome: {:?}", other),
  }
}
