//! Binary entry point for the `rdb-lifecycle` CLI.
//!
//! Runs the demonstration workflow: create an instance, wait for it to become
//! available, print its details and connection string, then list every
//! instance in the region.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use rdb_lifecycle::{
    ConfigError, CreateInstanceRequest, InstanceDetails, InstanceManager, InstanceSummary,
    ManagerError, RdbClient, RdbConfig, WaitOutcome,
};

mod cli;

use cli::Cli;

const DEFAULT_LOG_FILTER: &str = "rdb_lifecycle=info";
const IDENTIFIER_PREFIX: &str = "rdb-lifecycle";
const DEMO_DB_NAME: &str = "mydb";
const DEMO_USERNAME: &str = "postgres";
const PASSWORD_PLACEHOLDER_VALUE: &str = "YOUR_PASSWORD";

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to create instance: {0}")]
    Create(#[source] ManagerError),
    #[error("instance {identifier} did not become available: {outcome}")]
    NotAvailable {
        identifier: String,
        outcome: WaitOutcome,
    },
}

#[tokio::main]
async fn main() {
    Cli::parse();
    init_tracing();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

async fn run() -> Result<(), CliError> {
    let config = RdbConfig::load_without_cli_args()?;
    config.validate()?;
    let password = config.master_password()?;
    let client = RdbClient::new(&config)?;
    let manager = InstanceManager::new(client, config.manager_settings());

    let request = CreateInstanceRequest::builder()
        .identifier(generated_identifier())
        .db_name(DEMO_DB_NAME)
        .username(DEMO_USERNAME)
        .password(password)
        .build()
        .map_err(CliError::Create)?;

    let mut out = io::stdout();
    writeln!(out, "=== Creating instance ===").ok();
    let record = manager.create(&request).await.map_err(CliError::Create)?;
    writeln!(
        out,
        "Instance creation initiated: {} ({})",
        record.identifier, record.status
    )
    .ok();

    let policy = config.retry_policy();
    writeln!(out, "\n=== Waiting for instance to be available ===").ok();
    writeln!(
        out,
        "Checking every {}s, at most {} times...",
        policy.interval.as_secs(),
        policy.max_attempts
    )
    .ok();
    let outcome = manager.await_available(&request.identifier, policy).await;
    if !outcome.succeeded() {
        return Err(CliError::NotAvailable {
            identifier: request.identifier,
            outcome,
        });
    }

    writeln!(out, "\n=== Connection details ===").ok();
    if let Some(details) = manager.describe(&request.identifier).await.found() {
        write_details(&mut out, &details);
    }
    if let Some(template) = manager
        .connection_template(&request.identifier)
        .await
        .found()
    {
        writeln!(out, "\nConnection string template:\n{template}").ok();
        writeln!(
            out,
            "\nFull connection string:\n{}",
            template.render(
                &request.username,
                PASSWORD_PLACEHOLDER_VALUE,
                &request.db_name
            )
        )
        .ok();
    }

    writeln!(out, "\n=== All instances in {} ===", manager.region()).ok();
    write_summaries(&mut out, &manager.list_all().await.unwrap_or_default());
    Ok(())
}

fn generated_identifier() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("{IDENTIFIER_PREFIX}-{suffix}")
}

fn write_details(mut target: impl Write, details: &InstanceDetails) {
    let (host, port) = details.endpoint.as_ref().map_or_else(
        || (String::from("not available"), String::from("not available")),
        |endpoint| (endpoint.host.clone(), endpoint.port.to_string()),
    );
    writeln!(target, "Endpoint: {host}").ok();
    writeln!(target, "Port: {port}").ok();
    writeln!(target, "Status: {}", details.status).ok();
    writeln!(target, "Engine: {}", details.engine).ok();
}

fn write_summaries(mut target: impl Write, summaries: &[InstanceSummary]) {
    for (index, summary) in summaries.iter().enumerate() {
        writeln!(
            target,
            "{}. {} - {} - {}",
            index + 1,
            summary.identifier,
            summary.status,
            summary.engine
        )
        .ok();
    }
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdb_lifecycle::test_support::instance_record;
    use rdb_lifecycle::{InstanceStatus, ProviderError};

    fn rendered(write: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut buf = Vec::new();
        write(&mut buf);
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn generated_identifier_has_prefix_and_short_suffix() {
        let identifier = generated_identifier();
        let suffix = identifier
            .strip_prefix("rdb-lifecycle-")
            .expect("identifier should carry the prefix");

        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_ne!(identifier, generated_identifier());
    }

    #[test]
    fn write_details_reports_missing_endpoint() {
        let details = InstanceDetails::from(&instance_record("t1", InstanceStatus::Creating));

        let output = rendered(|buf| write_details(buf, &details));

        assert!(output.contains("Endpoint: not available"), "output: {output}");
        assert!(output.contains("Status: creating"), "output: {output}");
        assert!(output.contains("Engine: postgres 16.1"), "output: {output}");
    }

    #[test]
    fn write_summaries_numbers_each_instance() {
        let summaries = vec![
            InstanceSummary::from(&instance_record("a", InstanceStatus::Available)),
            InstanceSummary::from(&instance_record("b", InstanceStatus::Stopped)),
        ];

        let output = rendered(|buf| write_summaries(buf, &summaries));

        assert_eq!(
            output,
            "1. a - available - postgres 16.1\n2. b - stopped - postgres 16.1\n"
        );
    }

    #[test]
    fn write_error_includes_provider_code() {
        let err = CliError::Create(ManagerError::Provider(ProviderError::new(
            "quota_exceeded",
            "too many instances",
        )));

        let output = rendered(|buf| write_error(buf, &err));

        assert!(output.contains("failed to create instance"), "output: {output}");
        assert!(output.contains("quota_exceeded"), "output: {output}");
    }

    #[test]
    fn not_available_error_describes_outcome() {
        let err = CliError::NotAvailable {
            identifier: String::from("t1"),
            outcome: WaitOutcome::Exhausted { attempts: 3 },
        };

        assert_eq!(
            err.to_string(),
            "instance t1 did not become available: gave up after 3 status checks"
        );
    }
}
