use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::pipeline::RelayPipeline;
use crate::worker::{RelayWorker, WorkerLimits};
use mediarelay_api::{ApiServer, ApiState};
use mediarelay_config::RelayConfig;
use mediarelay_fetch::{StrategySet, TempPaths, TokioCommandRunner, YtDlpSettings};
use mediarelay_telegram::{Messenger, TeloxideMessenger};
use mediarelay_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics};
use tracing::{info, warn};

/// Dependencies required to bootstrap the relay service.
pub(crate) struct BootstrapDependencies {
    logging: LoggingConfig<'static>,
    config: RelayConfig,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            RelayConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self {
            logging: logging_config(&config),
            config,
            telemetry,
        })
    }
}

fn logging_config(config: &RelayConfig) -> LoggingConfig<'static> {
    LoggingConfig {
        format: LogFormat::from_name(config.log_format.as_deref()),
        ..LoggingConfig::default()
    }
}

const fn worker_limits(config: &RelayConfig) -> WorkerLimits {
    WorkerLimits {
        max_concurrent: config.max_concurrent_jobs,
        queue_depth: config.queue_depth,
    }
}

/// Entry point for the relay service boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, the bot identity check, or the API
/// listener fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    Box::pin(run_app_with(dependencies)).await
}

/// Boot sequence that relies entirely on injected dependencies.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    mediarelay_telemetry::init_logging(&dependencies.logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("relay");

    info!("relay service bootstrap starting");

    let BootstrapDependencies {
        logging: _,
        config,
        telemetry,
    } = dependencies;

    let bot = TeloxideMessenger::new(config.bot_token.expose(), config.telegram_api_url.clone());
    let identity = bot
        .identity()
        .await
        .map_err(|err| AppError::telegram("telegram.get_me", err))?;
    info!(
        bot_id = identity.id,
        username = identity.username.as_deref().unwrap_or_default(),
        "bot authorized"
    );
    let messenger: Arc<dyn Messenger> = Arc::new(bot);

    let temp = TempPaths::new(config.temp_dir.clone());
    temp.ensure_dir()
        .await
        .map_err(|err| AppError::fetch("temp.ensure_dir", err))?;
    let settings = YtDlpSettings {
        program: config.ytdlp_bin.clone(),
        cookies_file: config.cookies_file.clone(),
    };
    let strategies = StrategySet::standard(
        &settings,
        Arc::new(TokioCommandRunner),
        config.direct_fetch_timeout,
    )
    .map_err(|err| AppError::fetch("fetch.strategies", err))?;

    let pipeline = RelayPipeline::new(
        messenger,
        strategies,
        config.backup_chat_id,
        temp,
        config.upload_part_bytes,
        telemetry.clone(),
    );
    let worker = RelayWorker::new(pipeline, worker_limits(&config), telemetry.clone());

    let state = ApiState::new(
        config.api_key.expose(),
        Arc::new(worker.clone()),
        telemetry.clone(),
    );
    let api = ApiServer::new(state);

    info!(addr = %config.bind_addr, "Launching API listener");
    let serve_result = api
        .serve_with_shutdown(config.bind_addr, shutdown_signal())
        .await;

    let drained = worker.shutdown(config.shutdown_grace).await;
    let totals = telemetry.snapshot();
    info!(
        drained,
        jobs_active = totals.jobs_active,
        jobs_rejected = totals.jobs_rejected_total,
        bytes_relayed = totals.bytes_relayed_total,
        "relay service stopped"
    );

    serve_result.map_err(|err| AppError::api_server("api_server.serve", err))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c; shutting down"),
        () = terminate => info!("received SIGTERM; shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(extra: &[(&str, &str)]) -> anyhow::Result<RelayConfig> {
        let mut vars: HashMap<String, String> = [
            ("BOT_TOKEN", "123:abc"),
            ("BACKUP_CHANNEL_ID", "-100123"),
            ("API_KEY", "key"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
        for (key, value) in extra {
            vars.insert((*key).to_string(), (*value).to_string());
        }
        Ok(RelayConfig::from_lookup(|name| vars.get(name).cloned())?)
    }

    #[test]
    fn log_format_follows_configuration() -> anyhow::Result<()> {
        let json = logging_config(&config(&[("LOG_FORMAT", "json")])?);
        assert_eq!(json.format, LogFormat::Json);

        let pretty = logging_config(&config(&[("LOG_FORMAT", "pretty")])?);
        assert_eq!(pretty.format, LogFormat::Pretty);
        Ok(())
    }

    #[test]
    fn worker_limits_mirror_configuration() -> anyhow::Result<()> {
        let limits = worker_limits(&config(&[("MAX_CONCURRENT_JOBS", "2"), ("QUEUE_DEPTH", "6")])?);
        assert_eq!(
            limits,
            WorkerLimits {
                max_concurrent: 2,
                queue_depth: 6,
            }
        );
        assert_eq!(limits.capacity(), 8);
        Ok(())
    }
}
