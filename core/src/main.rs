use std::process::ExitCode;

use clap::Parser;
use petstore_core::{logging, suite, PetStoreClient, SuiteConfig, UreqTransport, Verifier};

fn main() -> ExitCode {
    let config = SuiteConfig::parse();
    logging::init_cli_logger(config.verbose);

    tracing::info!(base_url = %config.base_url, "starting petstore-suite");

    let client = match PetStoreClient::new(&config.base_url, &config.api_key) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("invalid configuration: {e}");
            eprintln!("❌ {e}");
            return ExitCode::from(2);
        }
    };

    let cases = match &config.cases {
        Some(path) => suite::load_cases(path).map_err(|e| e.to_string()),
        None => suite::builtin_cases().map_err(|e| e.to_string()),
    };
    let cases = match cases {
        Ok(cases) => cases,
        Err(e) => {
            tracing::error!("could not load cases: {e}");
            eprintln!("❌ {e}");
            return ExitCode::from(2);
        }
    };

    let verifier = Verifier::new(client, UreqTransport::new());
    let report = suite::run(&verifier, &cases, config.filter.as_deref());

    for (name, error) in &report.failed {
        eprintln!("FAILED {name}: {error}");
    }
    println!(
        "{} passed, {} failed, {} total",
        report.passed,
        report.failed.len(),
        report.total()
    );

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
