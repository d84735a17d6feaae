use std::io::{self, Read};
use std::process::ExitCode;

use willow_relay::pipeline::{DisabledPublisher, Pipeline};
use willow_relay::webhook::{WebhookEnvelope, handle_webhook, health_report};
use willow_relay::{FubClient, RelayConfig, Result};

// One invocation per process: the webhook body comes in on stdin and the
// response envelope goes out on stdout. `willow-relay health` prints the
// health report instead.
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run() {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            println!("{}", serde_json::to_string(&WebhookEnvelope::failed(&e)).unwrap_or_default());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let config = RelayConfig::load()?;

    if std::env::args().nth(1).as_deref() == Some("health") {
        println!("{}", serde_json::to_string_pretty(&health_report(&config))?);
        return Ok(ExitCode::SUCCESS);
    }

    let mut body = String::new();
    io::stdin().read_to_string(&mut body)?;

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let envelope = if config.crm.is_configured() {
        let pipeline = Pipeline::from_config(FubClient::new(&config.crm)?, &config);
        runtime.block_on(handle_webhook(&pipeline, &body))
    } else {
        log::warn!("no CRM token configured, tag updates are disabled");
        let pipeline = Pipeline::from_config(DisabledPublisher, &config);
        runtime.block_on(handle_webhook(&pipeline, &body))
    };

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(if envelope.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
