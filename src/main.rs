// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use the_tempograph::config::{
    event_set_to_json, load_and_validate_config, load_leaf_bindings, PipelineBuilder,
    RuntimeBuilder,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <pipeline.yaml> [more.yaml ...]", args[0]);
        eprintln!("Example: {} pipelines/sales-sequential.yaml", args[0]);
        eprintln!("Set RUST_LOG=the_tempograph=debug to trace scheduling and every step.");
        std::process::exit(1);
    }

    let mut failures = 0;
    for pipeline_file in &args[1..] {
        match run_pipeline(pipeline_file).await {
            Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            Err(e) => {
                failures += 1;
                eprintln!("Failed to evaluate {}: {:#}", pipeline_file, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} pipelines failed", failures, args.len() - 1);
    }
    Ok(())
}

/// Loads, builds and evaluates one pipeline file and renders its outputs.
async fn run_pipeline(pipeline_file: &str) -> Result<serde_json::Value> {
    let config = load_and_validate_config(pipeline_file)
        .with_context(|| format!("loading {}", pipeline_file))?;
    let runtime = RuntimeBuilder::from_config(&config)?;
    let pipeline = PipelineBuilder::new(Arc::clone(runtime.operators())).build(&config)?;
    let bindings = load_leaf_bindings(&config, &pipeline)?;

    let fallbacks: Vec<&str> = config.fallback_backends.iter().map(String::as_str).collect();
    let started = Instant::now();
    let (backend, results) = runtime
        .evaluate_with_fallback(
            pipeline.graph(),
            pipeline.outputs(),
            &config.backend,
            &fallbacks,
            &bindings,
        )
        .await
        .with_context(|| format!("evaluating {}", pipeline_file))?;

    let outputs: serde_json::Map<String, serde_json::Value> = pipeline
        .output_names()
        .iter()
        .zip(&results)
        .map(|(name, events)| (name.clone(), event_set_to_json(events)))
        .collect();

    Ok(serde_json::json!({
        "pipeline": pipeline_file,
        "strategy": runtime.strategy(),
        "backend": backend,
        "elapsed_ms": started.elapsed().as_millis() as u64,
        "outputs": outputs,
    }))
}
