// Site entry wizard: multi-step data entry in the terminal, backed by a records service.

pub mod config;
pub mod models;
pub mod service;
pub mod tui;
pub mod utils;
pub mod wizard;

use log::{error, info};
use std::path::PathBuf;

use crate::config::AppConfig;

/// Initialize logging system with dual-format output (JSON .log and human-readable .txt).
fn init_logging(cfg: &AppConfig, with_stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = utils::path_resolver::resolve_log_folder(cfg.logging.directory.as_deref())?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");

    // JSON log file for structured parsing
    let json_log_file = log_dir.join(format!("site-entry-{}.log", timestamp));

    // Human-readable log file (.txt)
    let txt_log_file = log_dir.join(format!("site-entry-{}.txt", timestamp));

    // - JSON format to .log file
    // - Human-readable format to .txt file
    // - Optional: human-readable to stdout (disabled for TUI to avoid corrupting the terminal UI)
    let mut dispatch = fern::Dispatch::new().level(cfg.log_level());

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", txt_line));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let json_line = utils::logging::format_json_log(
                        &timestamp_utc,
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", json_line));
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", txt_line));
                })
                .chain(fern::log_file(txt_log_file)?),
        );

    dispatch.apply()?;

    info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(())
}

/// Load configuration, falling back to defaults (with a message) when it cannot be read.
fn load_config(config_path: Option<PathBuf>) -> AppConfig {
    let path = config_path.or_else(utils::path_resolver::default_config_path);
    match AppConfig::load(path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error ({}); using defaults", e);
            AppConfig::default()
        }
    }
}

/// Interactive terminal wizard. Returns the process exit code.
pub fn run_tui(config_path: Option<PathBuf>) -> i32 {
    let cfg = load_config(config_path);

    // Initialize logging (no stdout to avoid corrupting the TUI)
    if let Err(e) = init_logging(&cfg, false) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!(
        "[PHASE: initialization] Site entry wizard starting at {} (service mode {:?})",
        chrono::Utc::now(),
        cfg.service.mode
    );

    match tui::run(&cfg) {
        Ok(()) => 0,
        Err(e) => {
            error!("[PHASE: tui] TUI exited with error: {}", e);
            eprintln!("Site entry wizard failed: {}", e);
            1
        }
    }
}

/// Render a single seeded frame and print it. Returns the process exit code.
pub fn run_tui_smoke(target: Option<String>) -> i32 {
    let target = target.as_deref().unwrap_or("1");
    match tui::smoke(target) {
        Ok(frame) => {
            println!("{}", frame);
            0
        }
        Err(e) => {
            eprintln!("TUI smoke failed for target {}: {}", target, e);
            1
        }
    }
}

/// Validate configuration and the form definition without starting the UI.
pub fn run_check_config(config_path: Option<PathBuf>) -> i32 {
    let path = config_path.or_else(utils::path_resolver::default_config_path);
    let cfg = match AppConfig::load(path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            return 1;
        }
    };

    if let Err(e) = init_logging(&cfg, true) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let form = match cfg.form_definition() {
        Ok(form) => form,
        Err(e) => {
            error!("[PHASE: check_config] [STEP: form] {}", e);
            return 1;
        }
    };
    if let Err(e) = cfg.data_service() {
        error!("[PHASE: check_config] [STEP: service] {}", e);
        return 1;
    }

    info!(
        "[PHASE: check_config] Configuration OK: {} steps, {} controls, service mode {:?}, idle timeout {:?}",
        form.step_count(),
        form.fields().count(),
        cfg.service.mode,
        cfg.idle_timeout()
    );
    0
}
