#![doc = include_str!("../README.md")]

use clap::{CommandFactory, Parser};
use color_eyre::eyre::Result;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, prelude::__tracing_subscriber_SubscriberExt as _,
    util::SubscriberInitExt as _,
};

use crate::{
    command::Cli,
    config::FileConfig,
    handler::{run, Context},
};

mod command;
mod config;
mod handler;
mod render;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stdout carries the CGI response, so logs go to stderr.
    // RUST_LOG overrides the default of INFO
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    color_eyre::install()?;

    let cli = Cli::parse();

    let Some(command) = cli.command.clone() else {
        let mut cmd = Cli::command();
        cmd.print_help()?;
        return Ok(());
    };

    let file = match (&cli.config, &cli.section) {
        (Some(path), Some(section)) => FileConfig::load(path, section)?,
        _ => FileConfig::default(),
    };

    let ctx = Context {
        settings: cli.settings(file.settings, |key| std::env::var(key).ok())?,
        cookie_header: cli.cookie.clone(),
        credentials: cli.credentials(&file.login)?,
    };

    let response = run(command, ctx).await?;
    print!("{response}");

    Ok(())
}
