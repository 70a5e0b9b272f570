//! score-runner: headless CLI for the churn scoring core.
//!
//! Usage:
//!   score-runner train [--samples 2000] [--seed 42] [--db ./churn.db]
//!                      [--model ./models/churn_model.json] [--config PATH]
//!   score-runner predict '{"customer_id":"c-1","engagement_score":22}'
//!   cat batch.json | score-runner predict
//!
//! Predict mode takes a single JSON object (scored with a full
//! explanation) or a JSON array (scored in bulk, probability and segment
//! only), from the first positional argument or standard input, and
//! writes the JSON result to standard output.

use anyhow::{bail, Context, Result};
use churn_core::{
    classifier::ChurnClassifier,
    config::ChurnConfig,
    features::RawRecord,
    model::LogisticModel,
    scoring::ScoringService,
    store::CustomerStore,
    training::run_training,
};
use std::env;
use std::io::Read;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mode = args.get(1).map(String::as_str);

    match mode {
        Some("train") => train(&args),
        Some("predict") => predict(&args),
        _ => {
            eprintln!("usage: score-runner train|predict [options]");
            eprintln!("  train   --samples N --seed S --db PATH --model PATH --config PATH");
            eprintln!("  predict [JSON]      --model PATH   (reads stdin when no JSON argument)");
            bail!("unknown mode: {}", mode.unwrap_or("<none>"));
        }
    }
}

fn train(args: &[String]) -> Result<()> {
    let config_path = arg_value(args, "--config").unwrap_or("./churn_config.json");
    let mut config = ChurnConfig::load(Path::new(config_path))?;

    if let Some(samples) = parse_arg(args, "--samples") {
        config.synthetic_samples = samples;
    }
    if let Some(seed) = parse_arg(args, "--seed") {
        config.training_seed = seed;
    }
    if let Some(db) = arg_value(args, "--db") {
        config.db_path = db.to_string();
    }
    if let Some(model) = arg_value(args, "--model") {
        config.model_path = model.to_string();
    }

    println!("score-runner — training");
    println!("  db:      {}", config.db_path);
    println!("  model:   {}", config.model_path);
    println!("  samples: {}", config.synthetic_samples);
    println!("  seed:    {}", config.training_seed);
    println!();

    let store = CustomerStore::open(&config.db_path)?;
    store.migrate()?;

    let mut classifier = LogisticModel::with_split(config.test_fraction, config.training_seed);
    let summary = run_training(&config, &mut classifier, &store)?;

    println!("Model performance:");
    println!("  accuracy:  {:.4}", summary.metrics.accuracy);
    println!("  precision: {:.4}", summary.metrics.precision);
    println!("  recall:    {:.4}", summary.metrics.recall);
    println!("  f1:        {:.4}", summary.metrics.f1);
    println!("  roc_auc:   {:.4}", summary.metrics.roc_auc);
    println!();
    println!("Feature importance:");
    for fi in &summary.metrics.feature_importance {
        println!("  {}: {:.4}", fi.feature, fi.importance);
    }
    println!();
    println!(
        "Scored {} customers (high={} medium={} low={})",
        summary.scored_customers, summary.high_risk, summary.medium_risk, summary.low_risk,
    );

    Ok(())
}

fn predict(args: &[String]) -> Result<()> {
    let model_path = arg_value(args, "--model").unwrap_or("./models/churn_model.json");
    let model = LogisticModel::load(Path::new(model_path))?;
    let service = ScoringService::new(Box::new(model) as Box<dyn ChurnClassifier>);

    let input = read_input(args)?;
    let value: serde_json::Value =
        serde_json::from_str(&input).context("input is not valid JSON")?;

    let output = match value {
        serde_json::Value::Array(items) => {
            let records = items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::Object(map) => Ok(map),
                    other => bail!("batch entries must be JSON objects, got: {other}"),
                })
                .collect::<Result<Vec<RawRecord>>>()?;
            serde_json::to_value(service.score_batch(&records)?)?
        }
        serde_json::Value::Object(record) => serde_json::to_value(service.score_one(&record)?)?,
        other => bail!("input must be a JSON object or array, got: {other}"),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// The first positional argument after the mode, or standard input.
fn read_input(args: &[String]) -> Result<String> {
    let positional = args[2..]
        .iter()
        .zip(args[1..].iter())
        .find(|(arg, prev)| !arg.starts_with("--") && !prev.starts_with("--"))
        .map(|(arg, _)| arg.clone());

    match positional {
        Some(json) => Ok(json),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    arg_value(args, flag).and_then(|v| v.parse().ok())
}
