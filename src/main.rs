use bullpen::community::*;
use bullpen::logger::*;
use bullpen::settings::*;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let community = Community::try_new(&project_settings).await?;

    signal::ctrl_c().await?;

    let shutdown_timeout = std::time::Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, community.shutdown()).await {
        Ok(_) => tracing::info!("community shutdown successfully"),
        Err(_) => tracing::error!("community shutdown timed out"),
    }

    Ok(())
}
