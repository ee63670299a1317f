//! Centy Forms demo - validate and submit a form given as JSON
//!
//! Reads a JSON object of field values from the first argument (or stdin),
//! requires every text field to be non-empty, and submits the enabled, valid
//! values to an action that echoes them back. Ctrl+C cancels the submit.

use anyhow::{anyhow, bail, Result};
use centy_forms::events::listener;
use centy_forms::forms::{FieldOptions, FieldValue, FormData, FormManager, FormOptions};
use centy_forms::validation::required;
use centy_forms::{EventSource, FormError, FormEvent, FormsConfig};
use std::io::{self, Read};
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = FormsConfig::load()?;

    // Initialize logging
    let default_filter = config
        .log_filter
        .clone()
        .unwrap_or_else(|| "centy_forms=info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let input = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let schema = parse_schema(&input)?;
    let form = build_form(schema, &config);

    form.add_events_listener(listener(|event: &FormEvent<FieldValue>| match event {
        FormEvent::Control { control, event } => {
            tracing::info!("{control}: {event:?}");
        }
        FormEvent::Busy { current, .. } => {
            tracing::info!(busy = current, "form busy changed");
        }
    }));

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    match form.submit(token).await {
        Ok(output) => {
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Err(FormError::InvalidForm(errors)) => {
            eprintln!("{}", serde_json::to_string_pretty(&errors)?);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

/// Parse a JSON object into `(key, value)` pairs
fn parse_schema(input: &str) -> Result<Vec<(String, FieldValue)>> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let serde_json::Value::Object(fields) = value else {
        bail!("expected a JSON object of field values");
    };

    fields
        .into_iter()
        .map(|(key, value)| {
            FieldValue::from_json(value)
                .map(|field| (key.clone(), field))
                .ok_or_else(|| anyhow!("field {key} must be null, a boolean, an integer or a string"))
        })
        .collect()
}

fn build_form(
    schema: Vec<(String, FieldValue)>,
    config: &FormsConfig,
) -> FormManager<FieldValue, String> {
    let mut options = FormOptions::new();
    for (key, value) in &schema {
        if matches!(value, FieldValue::Text(_)) {
            options.insert(
                key.clone(),
                FieldOptions::new().check(|v: &FieldValue| required(v)),
            );
        }
    }

    FormManager::new(schema, options)
        .with_config(config)
        .with_action(echo)
}

async fn echo(cancellation: CancellationToken, data: FormData<FieldValue>) -> Result<String> {
    tokio::select! {
        _ = cancellation.cancelled() => Err(anyhow!("submit canceled")),
        _ = tokio::time::sleep(Duration::from_millis(250)) => {
            Ok(serde_json::to_string_pretty(&data)?)
        }
    }
}
