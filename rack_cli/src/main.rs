//! Console front-end for driving a stepper module in a modular rack.

mod cli;
mod error_fmt;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use eyre::WrapErr;
use rack_config::Config;
use rack_core::{MotionCfg, locator};
use rack_driver::{BENCH_STEPPER_SERIAL, SimulatedManager, SimulatedRack};
use rack_traits::MonotonicClock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn init_tracing(args: &Cli, cfg: &Config) {
    // An explicit --log-level beats the config; RUST_LOG beats both.
    let level = if args.log_level != "info" {
        args.log_level.as_str()
    } else {
        cfg.logging.level.as_deref().unwrap_or("info")
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let registry = tracing_subscriber::registry().with(filter);

    let file_layer = cfg.logging.file.as_deref().map(|path| {
        let appender = match cfg.logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(".", path),
            Some("hourly") => tracing_appender::rolling::hourly(".", path),
            _ => tracing_appender::rolling::never(".", path),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
    });

    let stdout_layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if args.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    };
    registry.with(stdout_layer).with(file_layer).init();
}

fn load_config(args: &Cli) -> eyre::Result<Config> {
    if args.config.exists() {
        let cfg = rack_config::load_path(&args.config)
            .wrap_err_with(|| format!("load config {}", args.config.display()))?;
        cfg.validate()
            .wrap_err_with(|| format!("invalid config {}", args.config.display()))?;
        Ok(cfg)
    } else {
        Ok(Config::default())
    }
}

fn cmd_list(module_type: u32, json: bool) -> eyre::Result<()> {
    let mut manager = SimulatedManager::bench();
    let records = locator::enumerate(&mut manager, module_type)?;
    if json {
        let items: Vec<_> = records
            .iter()
            .map(|r| serde_json::json!({ "serial": r.serial, "description": r.description }))
            .collect();
        println!("{}", serde_json::json!({ "devices": items }));
    } else {
        for rec in &records {
            println!("{}  {}", rec.serial, rec.description);
        }
    }
    Ok(())
}

fn cmd_run(cfg: MotionCfg, json: bool) -> eyre::Result<()> {
    let mut manager = SimulatedManager::bench();
    let rack = SimulatedRack::new(BENCH_STEPPER_SERIAL);
    let report = rack_core::run(&mut manager, rack, &cfg, &MonotonicClock)?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "serial": report.serial,
                "final_position": report.final_position,
            })
        );
    } else {
        println!(
            "Device {} homed and moved; final position {}",
            report.serial, report.final_position
        );
    }
    Ok(())
}

fn try_main(args: &Cli) -> eyre::Result<()> {
    let cfg = load_config(args)?;
    init_tracing(args, &cfg);
    if !args.config.exists() {
        tracing::warn!(path = %args.config.display(), "config not found, using defaults");
    }

    match &args.cmd {
        Commands::List => cmd_list(cfg.device.module_type, args.json),
        Commands::Run {
            serial,
            position,
            velocity,
            wait_timeout_ms,
        } => {
            let mut motion = MotionCfg::from(&cfg);
            if let Some(s) = serial {
                motion.serial = s.clone();
            }
            if let Some(p) = position {
                motion.position = *p;
            }
            if let Some(v) = velocity {
                motion.velocity = *v;
            }
            if let Some(ms) = wait_timeout_ms {
                motion.wait_timeout_ms = *ms;
            }
            cmd_run(motion, args.json)
        }
    }
}

fn main() {
    let _ = color_eyre::install();
    let args = Cli::parse();
    let _ = JSON_MODE.set(args.json);

    if let Err(err) = try_main(&args) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("Error: {}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}
