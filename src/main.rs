//! RedGIFs crawler - CLI entry point.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::Parser;
use indicatif::ProgressBar;
use tracing_subscriber::{fmt, EnvFilter};

use redgifs_crawler::{
    api::{RedgifsApi, TokenStore},
    cli::Args,
    config::{validate_config, Config},
    crawl::{CrawlLoop, CrawlSummary},
    error::{exit_codes, Error, Result},
    output::{
        create_spinner, print_api_error_message, print_config_summary, print_crawl_summary,
        print_error, print_info, print_success, print_warning, JsonLinesSink, ProgressSink,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(summary) => ExitCode::from(summary.reason.exit_code() as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_)
                | Error::UrlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Output(_) | Error::Io(_) => ExitCode::from(exit_codes::OUTPUT_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<CrawlSummary> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging; stdout carries the records
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        if !args.quiet {
            print_warning(&format!(
                "Configuration file not found: {}",
                args.config.display()
            ));
            print_info("Using default configuration with CLI arguments");
        }
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    let user = config
        .user()
        .ok_or_else(|| Error::MissingConfig("user (the account to crawl)".into()))?
        .to_string();

    let destination = config
        .output
        .file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    if !args.quiet {
        print_config_summary(&user, &config.output.fields.to_string(), &destination);
    }

    // One client serves both the token endpoint and the list endpoint
    let api = RedgifsApi::new(&config.api_settings())?;
    let tokens = TokenStore::with_lifetime(api.clone(), config.token_lifetime(), config.token_skew());
    let mut crawl = CrawlLoop::new(user.clone(), tokens, api, config.crawl_options());

    // Ctrl-C stops the crawl once the in-flight request returns
    let cancel = crawl.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            print_warning("Interrupted, stopping after the current request");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let writer: Box<dyn Write> = match &config.output.file {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
            Error::Output(format!("Cannot create {}: {}", path.display(), e))
        })?)),
        None => Box::new(io::stdout()),
    };

    let spinner = if args.quiet {
        ProgressBar::hidden()
    } else {
        create_spinner(&format!("Crawling {}", user))
    };
    let mut sink = ProgressSink::new(JsonLinesSink::new(writer), spinner);

    let summary = crawl.run(&mut sink).await;
    sink.finish();

    if let Some(message) = summary
        .failure
        .as_ref()
        .and_then(|f| f.api_message.as_deref())
    {
        print_api_error_message(message);
    }

    if !args.quiet {
        print_crawl_summary(&summary);
        if summary.reason.is_success() {
            print_success(&format!("Listed {} items", summary.items_emitted));
        }
    }

    Ok(summary)
}
