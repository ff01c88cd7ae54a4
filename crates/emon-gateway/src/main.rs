use clap::Parser;
use emon_gateway::config::AppConfig;
use emon_gateway::tasks::{ClockSyncTask, LogMaintenanceTask, PollerTask};
use emon_gateway::SystemClockSource;
use emon_logging::{LogHandle, RotatingFileSink, RotationPolicy};
use emon_meter::ModbusMeterClient;
use emon_publish::EmonCmsPublisher;
use emon_scheduler::IntervalScheduler;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

// 协作式调度依赖单一逻辑控制线程,任务只在睡眠点交错
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(&args.config)?;
    config.validate()?;
    let file_level = config.log.parsed_file_level()?;
    let console_level = config.log.parsed_console_level()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.as_str().to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("starting emon gateway with config: {}", args.config);

    let log_dir = Path::new(&config.log.directory);
    let sink = RotatingFileSink::open(
        log_dir.join(&config.log.file_name),
        log_dir.join(&config.log.retained_name),
        RotationPolicy {
            max_size_bytes: config.log.max_size_bytes,
            min_age: Duration::from_secs(config.log.rotate_age_secs),
        },
        file_level,
    )?;
    let log = LogHandle::new(sink, console_level);

    log.info(
        "gateway",
        format!(
            "logging to {} (rotate past {} bytes and {} s)",
            log_dir.join(&config.log.file_name).display(),
            config.log.max_size_bytes,
            config.log.rotate_age_secs
        ),
    );

    let meter = ModbusMeterClient::new(config.meter.clone());
    let publisher = EmonCmsPublisher::new(config.publish.clone());

    let mut scheduler = IntervalScheduler::new();
    scheduler.register(PollerTask::new(
        Box::new(meter),
        Box::new(publisher),
        log.clone(),
        config.meter.start_address,
        Duration::from_millis(config.poll.interval_ms),
        Duration::from_millis(config.poll.min_sleep_ms),
        config.poll.heartbeat_cycles,
    ));
    scheduler.register(LogMaintenanceTask::new(
        log.clone(),
        Duration::from_millis(config.log.flush_interval_ms),
    ));
    if config.timesync.enabled {
        scheduler.register(ClockSyncTask::new(
            Box::new(SystemClockSource::new()),
            log.clone(),
            Duration::from_secs(config.timesync.interval_secs),
        ));
    }

    scheduler.run().await;
    Ok(())
}
