//! `portal-console` entry point: loads settings, wires adapters, runs one
//! command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use portal_console::ConsoleSettings;
use portal_console::domain::ConsoleContext;
use portal_console::inbound::cli::{self, Cli};
use portal_console::outbound::{DirectoryDownloadSink, FileSessionStore, HttpPortalApi};

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .compact()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Cli::parse();
    let settings = ConsoleSettings::load_from_iter([OsString::from("portal-console")])
        .wrap_err("load console settings")?;
    let context = build_context(&settings)?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    let rendered = runtime.block_on(cli::run(args.command, context, read_password))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", rendered.text.trim_end())?;
    Ok(if rendered.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn build_context(settings: &ConsoleSettings) -> Result<ConsoleContext> {
    let api = HttpPortalApi::new(settings.base_url()?, settings.request_timeout())
        .wrap_err("build portal client")?;
    let sessions = FileSessionStore::open(settings.session_dir())?;
    let downloads = DirectoryDownloadSink::open(settings.download_dir())?;
    let context = ConsoleContext::new(
        Arc::new(api),
        Arc::new(sessions),
        Arc::new(downloads),
        Arc::new(DefaultClock),
    )
    .with_options(settings.view_options()?);
    Ok(context)
}

fn read_password() -> io::Result<String> {
    eprint!("password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
