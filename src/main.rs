#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(
    dead_code,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless,
    clippy::match_wildcard_for_single_variants,
    clippy::doc_markdown,
    clippy::needless_pass_by_value,
    clippy::multiple_crate_versions,
    clippy::new_without_default
)]
mod backend;
mod config;
mod config_io;
mod overlays;
mod state;
mod subsystem;
mod windowing;

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use clap::Parser;
use strum::IntoEnumIterator;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    backend::task::{TaskContainer, TaskType},
    state::{AppSession, AppState},
    subsystem::{
        cache::CacheKey,
        notifications::NotificationManager,
        realtime::{BridgeConfig, RealtimeBridge, consumers},
    },
    windowing::{manager::OverlayWindowManager, registry::AppRegistry, surface},
};

/// Overlay window manager and realtime dispatch core for the dashboard shell
#[derive(Default, Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Open this overlay app on startup (repeatable)
    #[arg(long, value_name = "APP_ID")]
    open: Vec<String>,

    /// Minimize this overlay app after startup (repeatable)
    #[arg(long, value_name = "APP_ID")]
    minimize: Vec<String>,

    /// Exit after this many seconds
    #[arg(long, value_name = "SECONDS")]
    run_for: Option<u64>,

    /// Path to write logs to
    #[arg(short, long, value_name = "FILE_PATH")]
    log_to: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = Args::parse();

    logging_init(&mut args);

    log::info!(
        "Welcome to {} version {}!",
        env!("CARGO_PKG_NAME"),
        env!("OVERLAY_SHELL_BUILD"),
    );
    log::info!("It is {}.", chrono::Local::now().format("%c"));

    let running = Arc::new(AtomicBool::new(true));
    let _ = ctrlc::set_handler({
        let running = running.clone();
        move || {
            running.store(false, Ordering::Relaxed);
        }
    });

    run(&running, &args).inspect_err(|e| log::error!("{e:?}"))?;

    Ok(())
}

fn run(running: &AtomicBool, args: &Args) -> anyhow::Result<()> {
    let registry = AppRegistry::load()?;
    log::info!("{} overlay apps registered", registry.len());

    let mut app = AppState::new(AppSession::load(), TaskContainer::new());
    let notifications = NotificationManager::new();

    let mut windows = OverlayWindowManager::new();
    windows.observe(|event, stack| {
        log::debug!("{}: {event:?}, {} windows open", event.app_id(), stack.len());
    });

    for id in &args.open {
        if !registry.contains(id) {
            log::warn!("{id}: not in the app registry, opening anyway");
        }
        windows.open_overlay(id.as_str());
    }
    for id in &args.minimize {
        windows.minimize_overlay(id);
    }

    for entry in surface::visible_windows(&windows, &registry) {
        log::info!(
            "Surface z={}: {}{}",
            entry.z,
            entry.definition.label,
            if entry.focused { " (focused)" } else { "" }
        );
    }
    for definition in surface::dock_entries(&windows, &registry) {
        log::info!("Dock: {}", definition.label);
    }
    for entry in surface::launcher_entries(&windows, &registry) {
        if !entry.phase.is_open() {
            log::debug!("Launcher: {} ({})", entry.definition.label, entry.definition.icon);
        }
    }

    let mut bridge = RealtimeBridge::new(BridgeConfig::from_general(&app.session.config));
    consumers::attach_monitoring_cache(&mut bridge, app.query_cache.clone());
    consumers::attach_notification_feed(
        &mut bridge,
        app.notifications.clone(),
        notifications.sender(),
        app.session.config.toast_timeout(),
    );
    bridge.init(&mut app.tasks);

    let deadline = args
        .run_for
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let poll_interval = app.session.config.poll_interval();
    let mut due_tasks = VecDeque::with_capacity(4);

    while running.load(Ordering::Relaxed) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            log::info!("Run time elapsed, shutting down");
            break;
        }

        app.tasks.retrieve_due(&mut due_tasks);
        while let Some(task) = due_tasks.pop_front() {
            match task {
                TaskType::Realtime(kind) => {
                    bridge.on_tick(kind, chrono::Utc::now());
                }
                TaskType::DismissToast(id) => {
                    app.toasts.dismiss(id, &mut app.tasks);
                }
            }
        }

        notifications.submit_pending(&mut app);

        std::thread::sleep(poll_interval);
    }

    bridge.stop(&mut app.tasks);

    log::info!(
        "{} notifications received, {} unread",
        app.notifications.len(),
        app.notifications.unread_count()
    );
    if let Some(latest) = app.notifications.latest() {
        log::info!("Latest notification: {} ({})", latest.title, latest.kind);
    }
    for key in CacheKey::iter() {
        if let Some(entry) = app.query_cache.entry(key) {
            log::info!("Cache {key}: v{} at {}", entry.version, entry.updated_at);
        }
    }

    Ok(())
}

fn logging_init(args: &mut Args) {
    let log_file_path = args
        .log_to
        .take()
        .or_else(|| std::env::var("OVERLAY_SHELL_LOGFILE").ok())
        .unwrap_or_else(|| String::from("/tmp/overlay-shell.log"));

    let file_writer = match std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_file_path)
    {
        Ok(file) => {
            println!("Logging to {}", &log_file_path);
            Some(file)
        }
        Err(e) => {
            println!("Failed to open log file (path: {e:?}): {log_file_path}");
            None
        }
    };

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr),
        )
        .with(
            /* read RUST_LOG env var */
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        );

    if let Some(writer) = file_writer {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
    } else {
        registry.init();
    }

    log_panics::init();
}
