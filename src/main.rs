use anyhow::Result;
use clap::Parser;

use vt_probe::cli::{Cli, ReportFormat};
use vt_probe::output::{format_report_text, ndjson_lines};
use vt_probe::probe::probe;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    let config = cli.to_config()?;
    let report = probe(&config)?;

    match cli.output {
        ReportFormat::Text => {
            for line in format_report_text(&report) {
                println!("{}", line);
            }
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        ReportFormat::Ndjson => {
            for line in ndjson_lines(&report)? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
