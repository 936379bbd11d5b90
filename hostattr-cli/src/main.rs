//! hostattr CLI -- 호스트 속성 테이블 명령줄 도구

mod cli;
mod commands;
mod error;
mod logging;
mod metrics;
mod output;

use clap::Parser;

use hostattr_core::config::{GeneralConfig, HostAttrConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 설정이 깨져 있어도 로깅은 기본값으로 올라와야 `config validate`가 보고할 수 있음
    let mut general = HostAttrConfig::load_or_default(&cli.config)
        .await
        .map(|config| config.general)
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    if let Err(e) = logging::init_tracing(&general) {
        eprintln!("warning: {e:#}");
    }

    if let Err(e) = run(cli).await {
        tracing::debug!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        Commands::Hosts(args) => commands::hosts::execute(args, &cli.config, &writer).await,
    }
}
