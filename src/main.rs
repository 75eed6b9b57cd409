use anyhow::Result;
use clap::Parser;
use tokio::select;
use tracing::{info, level_filters::LevelFilter};
use vmrelay::app::{run, AppStateBuilder};
use vmrelay::config::{Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match cli.conf {
        Some(ref conf) => Config::load(conf)?,
        None => Config::from_env(),
    };

    let mut log_fmt = tracing_subscriber::fmt();
    if let Some(ref level) = config.log_level {
        if let Ok(lv) = level.as_str().parse::<LevelFilter>() {
            log_fmt = log_fmt.with_max_level(lv);
        }
    }

    // The appender guard must outlive the server or buffered lines are dropped.
    let mut appender_guard = None;
    if let Some(ref log_file) = config.log_file {
        let file = std::fs::File::create(log_file)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        appender_guard = Some(guard);
        log_fmt.with_writer(non_blocking).try_init().ok();
    } else {
        log_fmt.try_init().ok();
    }
    let _appender_guard = appender_guard;

    let state = AppStateBuilder::new().config(config).build()?;

    info!("{}", vmrelay::version::get_version_info());
    info!("Starting vmrelay on {}", state.config.http_addr);
    select! {
        result = run(state.clone()) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received CTRL+C, shutting down");
            state.token.cancel();
        }
    }
    Ok(())
}
