// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{LevelFilter, info};
use std::io::Write;
use std::sync::Arc;

mod api;
mod app_state;
mod bootstrap;
mod catalog;
mod config;
mod runtime_paths;
mod serve;
mod storage;
mod util;

use app_state::AppState;
use catalog::{CatalogService, FileCatalogStore};
use config::ValidatedConfig;
use runtime_paths::RuntimePaths;
use util::log_rotation::{
    DEFAULT_LOG_FILE_NAME, LogRotationSettings, LogRunMode, RotatingLogWriter,
};

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            eprintln!("❌ Use -F to keep the server in the foreground.");
            return 1;
        }
    };

    if matches!(parsed_args.mode, RunMode::Help) {
        print!("{}", help_text());
        return 0;
    }

    let requested_daemon = matches!(parsed_args.mode, RunMode::Daemon);
    let pid_path = util::pid_file::pid_file_path(&parsed_args.runtime_root);
    let pid_status = match util::pid_file::cleanup_stale_pid_file(&pid_path) {
        Ok(status) => status,
        Err(error) => {
            eprintln!(
                "❌ Failed to inspect PID file {}: {}",
                pid_path.display(),
                error
            );
            return 1;
        }
    };

    if let util::pid_file::PidFileStatus::Running { pid } = pid_status {
        eprintln!("❌ Server is already running (pid {}).", pid);
        return 1;
    }

    let bootstrap = match bootstrap::bootstrap_runtime(&parsed_args.runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    let mut daemon_requested = requested_daemon;
    if should_force_foreground(daemon_requested, bootstrap.created_config) {
        eprintln!("[bootstrap] created config.yaml; staying in foreground for this run");
        daemon_requested = false;
    }

    if daemon_requested && let Err(error) = util::daemonize_or_warn() {
        eprintln!("❌ Failed to daemonize: {}", error);
        return 1;
    }

    let mut pid_guard = None;
    if daemon_requested {
        match util::pid_file::create_pid_file(&pid_path) {
            Ok(guard) => pid_guard = Some(guard),
            Err(error) => {
                eprintln!("❌ Failed to create PID file: {}", error);
                return 1;
            }
        }
    }

    let result = System::new().block_on(run_server(bootstrap, daemon_requested));
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    };

    drop(pid_guard);
    exit_code
}

async fn run_server(
    bootstrap: bootstrap::BootstrapResult,
    daemon_requested: bool,
) -> std::io::Result<()> {
    let validated_config = Arc::new(bootstrap.validated_config);
    let runtime_paths = bootstrap.runtime_paths;
    let log_run_mode = determine_log_run_mode(daemon_requested);
    let rotation_settings = LogRotationSettings {
        max_size_mb: validated_config.logging.rotation.max_size_mb,
        max_files: validated_config.logging.rotation.max_files,
    };

    // Parse log level from config
    let log_level = match validated_config.logging.level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    let log_target = if matches!(log_run_mode, LogRunMode::Daemon) {
        match RotatingLogWriter::new(
            runtime_paths.logs_dir.clone(),
            DEFAULT_LOG_FILE_NAME,
            rotation_settings,
        ) {
            Ok(writer) => env_logger::Target::Pipe(Box::new(writer)),
            Err(error) => {
                eprintln!("❌ Failed to initialize daemon log files: {}", error);
                return Err(error);
            }
        }
    } else {
        env_logger::Target::Stdout
    };

    // Configure logging with a stable format
    let logger = env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .target(log_target)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .build();

    log::set_boxed_logger(Box::new(logger)).map_err(|error| {
        eprintln!("❌ Failed to initialize logger: {}", error);
        std::io::Error::other(error.to_string())
    })?;
    log::set_max_level(log_level);

    log_startup_info(&validated_config, &runtime_paths);
    if matches!(log_run_mode, LogRunMode::Daemon) {
        info!("Logs directory: {}", runtime_paths.logs_dir.display());
        info!(
            "Log rotation: {} MB, {} files",
            rotation_settings.max_size_mb, rotation_settings.max_files
        );
    }

    let catalog_store = match FileCatalogStore::new(runtime_paths.catalog_file.clone()) {
        Ok(store) => store,
        Err(error) => {
            eprintln!("❌ Failed to open catalog store: {}", error);
            return Err(std::io::Error::other(error.to_string()));
        }
    };

    let catalog = match CatalogService::new(Arc::new(catalog_store)) {
        Ok(service) => service,
        Err(error) => {
            eprintln!("❌ Failed to load catalog: {}", error);
            eprintln!("❌ Application cannot start without the document catalog.");
            return Err(std::io::Error::other(error.to_string()));
        }
    };

    let document_count = catalog.list_documents().map(|docs| docs.len()).unwrap_or(0);
    let page_count = catalog.list_pages().map(|pages| pages.len()).unwrap_or(0);
    info!(
        "✅ Catalog loaded: {} document(s), {} page(s)",
        document_count, page_count
    );

    let app_state = Arc::new(AppState::new(runtime_paths.clone(), catalog));
    info!(
        "✅ App state initialized with app name: {}",
        validated_config.app.name
    );

    let workers = validated_config.server.workers;
    let host = validated_config.server.host.clone();
    let port = validated_config.server.port;

    let factory = {
        let config_for_app = validated_config.clone();
        let config_for_api = validated_config.clone();
        let app_state_for_app = app_state.clone();

        move || {
            let config_for_app = config_for_app.clone();
            let config_for_api = config_for_api.clone();
            let app_state_for_app = app_state_for_app.clone();

            App::new()
                .app_data(web::Data::from(config_for_app))
                .app_data(web::Data::from(app_state_for_app))
                .wrap(Logger::new(
                    r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
                ))
                .configure(move |cfg| api::configure(cfg, &config_for_api))
                .configure(serve::configure)
        }
    };

    HttpServer::new(factory)
        .workers(workers)
        .bind((host, port))?
        .run()
        .await
}

fn determine_log_run_mode(daemon_requested: bool) -> LogRunMode {
    if daemon_requested && cfg!(unix) {
        LogRunMode::Daemon
    } else {
        LogRunMode::Foreground
    }
}

fn should_force_foreground(daemon_requested: bool, created_config: bool) -> bool {
    daemon_requested && created_config
}

fn log_startup_info(config: &ValidatedConfig, runtime_paths: &RuntimePaths) {
    info!("Starting {} - {}", config.app.name, config.app.description);
    info!("Workers: {}", config.server.workers);
    info!(
        "Listening on http://{}:{}",
        config.server.host, config.server.port
    );
    if config.admin_api.enabled {
        info!("Admin API available under /api");
    } else {
        info!("Admin API disabled");
    }

    // Log canonical paths being used by the server
    info!(
        "Documents directory (canonical): {}",
        runtime_paths.documents_dir.display()
    );
    info!(
        "State directory (canonical): {}",
        runtime_paths.state_dir.display()
    );
    info!("Catalog file: {}", runtime_paths.catalog_file.display());
    info!("Config file: {}", runtime_paths.config_file.display());
    info!("Runtime root: {}", runtime_paths.root.display());

    // Log working directory for context
    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

fn help_text() -> String {
    [
        "DocRack - self-hosted document storage and page-gated delivery",
        "",
        "Usage: docrack [-C <root>] [-F]",
        "",
        "  -C <root>   Runtime root directory (default: current directory)",
        "  -F          Stay in the foreground instead of daemonizing",
        "  -h, --help  Show this help",
        "",
        "The runtime root holds config.yaml, documents/, state/ and logs/.",
        "A fresh root is bootstrapped on first start.",
        "",
    ]
    .join("\n")
}

enum RunMode {
    Daemon,
    Foreground,
    Help,
}

struct ParsedArgs {
    runtime_root: std::path::PathBuf,
    mode: RunMode,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            runtime_root: std::path::PathBuf::from("."),
            mode: RunMode::Help,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = std::path::PathBuf::from(".");
    let mut force_foreground = false;
    let mut help_requested = false;

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = std::path::PathBuf::from(value);
        } else if arg == "-F" {
            force_foreground = true;
        } else if arg.eq_ignore_ascii_case("help") {
            help_requested = true;
        } else {
            return Err(format!("Unknown argument: '{}'", arg));
        }
    }

    if help_requested {
        return Ok(ParsedArgs {
            runtime_root,
            mode: RunMode::Help,
        });
    }

    let runtime_root = make_runtime_root_absolute(runtime_root)?;

    let mode = if force_foreground {
        RunMode::Foreground
    } else {
        RunMode::Daemon
    };

    Ok(ParsedArgs { runtime_root, mode })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(
    runtime_root: std::path::PathBuf,
) -> Result<std::path::PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}

#[cfg(test)]
mod tests {
    use super::{
        LogRunMode, RunMode, determine_log_run_mode, parse_args_from, should_force_foreground,
    };

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_args_defaults_to_daemon() {
        let parsed = parse_args_from(Vec::new()).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Daemon));
        assert!(parsed.runtime_root.is_absolute());
    }

    #[test]
    fn parse_args_honors_foreground_flag() {
        let parsed = parse_args_from(args(&["-F"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Foreground));
    }

    #[test]
    fn parse_args_accepts_runtime_root_with_foreground() {
        let parsed = parse_args_from(args(&["-C", "runtime", "-F"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Foreground));
        assert!(parsed.runtime_root.ends_with("runtime"));
    }

    #[test]
    fn parse_args_accepts_runtime_root_with_foreground_reversed() {
        let parsed = parse_args_from(args(&["-F", "-C", "runtime"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Foreground));
        assert!(parsed.runtime_root.ends_with("runtime"));
    }

    #[test]
    fn parse_args_ignores_double_dash() {
        let parsed = parse_args_from(args(&["--", "-F", "-C", "runtime"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Foreground));
        assert!(parsed.runtime_root.ends_with("runtime"));
    }

    #[test]
    fn parse_args_rejects_unknown_arguments() {
        match parse_args_from(args(&["serve"])) {
            Err(error) => assert!(error.contains("serve")),
            Ok(_) => panic!("expected unknown argument rejection"),
        }
    }

    #[test]
    fn parse_args_accepts_help_command() {
        let parsed = parse_args_from(args(&["help"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Help));
    }

    #[test]
    fn parse_args_accepts_help_flag() {
        let parsed = parse_args_from(args(&["--help", "-F"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Help));
    }

    #[test]
    fn parse_args_accepts_help_with_runtime_root() {
        let parsed = parse_args_from(args(&["-C", "runtime", "help"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Help));
    }

    #[test]
    fn log_run_mode_defaults_to_foreground() {
        assert_eq!(determine_log_run_mode(false), LogRunMode::Foreground);
    }

    #[test]
    fn log_run_mode_daemon_flag_respects_platform() {
        let expected = if cfg!(unix) {
            LogRunMode::Daemon
        } else {
            LogRunMode::Foreground
        };
        assert_eq!(determine_log_run_mode(true), expected);
    }

    #[test]
    fn force_foreground_when_bootstrap_creates_config() {
        assert!(should_force_foreground(true, true));
    }

    #[test]
    fn no_force_foreground_when_bootstrap_creates_nothing() {
        assert!(!should_force_foreground(true, false));
    }

    #[test]
    fn no_force_foreground_when_daemon_not_requested() {
        assert!(!should_force_foreground(false, true));
    }
}
