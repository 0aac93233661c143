use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use sl::config::load_config_with_env;
use sl::{context_with_logger, install_tracing_bridge, l, scope, Arg, Attr, Context, Level, Logger};

#[derive(Parser)]
#[command(name = "sl-emit")]
#[command(about = "Emit a structured log record using LOGGER_* configuration", long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Level of the emitted record: debug, info, warn or error
    #[arg(short, long, default_value = "info")]
    level: String,

    /// Nest the record's attributes under this group
    #[arg(short, long)]
    group: Option<String>,

    /// Log at error level and exit with status 1
    #[arg(long)]
    fatal: bool,

    /// Record message
    message: String,

    /// Attributes as KEY=VALUE
    #[arg(value_parser = parse_pair)]
    attrs: Vec<Attr>,
}

fn parse_pair(s: &str) -> Result<Attr, String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }

    let attr = if let Ok(v) = value.parse::<i64>() {
        Attr::int(key, v)
    } else if let Ok(v) = value.parse::<f64>() {
        Attr::float(key, v)
    } else if let Ok(v) = value.parse::<bool>() {
        Attr::bool(key, v)
    } else {
        Attr::string(key, value)
    };
    Ok(attr)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config_with_env(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    let logger = match Logger::new(config) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = install_tracing_bridge() {
        eprintln!("Warning: {e}");
    }

    let logger = match &cli.group {
        Some(name) => logger.with_group(name),
        None => logger,
    };

    let args: Vec<Arg> = cli.attrs.into_iter().map(Arg::from).collect();
    let level = Level::from_name(&cli.level);
    let (fatal, message) = (cli.fatal, cli.message);
    let ctx = context_with_logger(&Context::background(), logger);

    scope(ctx.clone(), async move {
        let logger = l(&ctx);
        if fatal {
            logger.fatal_context(&ctx, &message, &args);
        }
        logger.log(&ctx, level, &message, &args);
    })
    .await;

    ExitCode::SUCCESS
}
