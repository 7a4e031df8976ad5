//! eimzo: call E-IMZO component operations from the command line
//!
//! Binds `argv` into the component's named-operation table:
//!
//! ```text
//! eimzo get_all_certificates
//! eimzo get_certificates 'C:\'
//! eimzo --timeout 300 load_key 'C:\' DSKEYS DS5230703 'cn=...'
//! eimzo create_pkcs aGVsbG8= ebd4978d5
//! eimzo --list
//! ```
//!
//! Replies go to stdout. Failures go to stderr as a JSON fault and exit with 1.

use anyhow::{Context, Result, bail};
use eimzo_bridge::BridgeConfig;
use eimzo_component::{Dispatcher, EimzoComponent, Fault, OPERATIONS};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Parsed command line
#[derive(Debug, PartialEq)]
enum Command {
    List,
    Invoke {
        response_timeout: Option<Duration>,
        operation: String,
        args: Vec<String>,
    },
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Command> {
    let mut response_timeout = None;

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--list" | "-l" => return Ok(Command::List),
            "--timeout" | "-t" => {
                let secs = argv.next().context("--timeout needs a value in seconds")?;
                let secs: u64 = secs
                    .parse()
                    .with_context(|| format!("Invalid timeout: {}", secs))?;
                response_timeout = Some(Duration::from_secs(secs));
            }
            flag if flag.starts_with("--") => bail!("Unknown flag: {}", flag),
            _ => {
                return Ok(Command::Invoke {
                    response_timeout,
                    operation: arg,
                    args: argv.collect(),
                });
            }
        }
    }

    bail!("Usage: eimzo [--timeout SECS] <operation> [args...] | eimzo --list")
}

fn print_operations() {
    for op in OPERATIONS {
        println!("{:<22} ({})", op.name, op.arguments.join(", "));
        println!("{:<22} {}", "", op.description);
    }
}

fn main() -> Result<ExitCode> {
    // Initialize logging (stdout carries replies)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (response_timeout, operation, args) = match parse_args(std::env::args().skip(1))? {
        Command::List => {
            print_operations();
            return Ok(ExitCode::SUCCESS);
        }
        Command::Invoke {
            response_timeout,
            operation,
            args,
        } => (response_timeout, operation, args),
    };

    let mut config = BridgeConfig::default();
    if let Some(timeout) = response_timeout {
        config = config.with_response_timeout(timeout);
    }
    info!("Using endpoint {}", config.endpoint);
    debug!("Invoking {} with {} argument(s)", operation, args.len());

    let component = EimzoComponent::with_config(config);
    match component.invoke(&operation, &args) {
        Ok(reply) => {
            println!("{}", reply);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let fault = Fault::from(e);
            eprintln!("{}", serde_json::to_string(&fault)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
