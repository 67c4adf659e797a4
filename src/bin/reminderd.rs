//! Headless reminder daemon.
//!
//! Loads `reminders.toml` (first argument, or the default config path),
//! schedules the configured reminders and writes each notification to the
//! log. Push registration is disabled because there is no push provider on
//! a headless host. Stops on Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fitmind_reminders::config::AppConfig;
use fitmind_reminders::notify::NotificationDispatcher;
use fitmind_reminders::platform::{Capability, LogNotificationPlatform, NotificationPlatform};
use fitmind_reminders::profile::{ProfileSnapshot, ProfileStore};
use fitmind_reminders::push::{PushProvider, PushRegistration};
use fitmind_reminders::registry;
use fitmind_reminders::scheduler::{ReminderScheduler, SystemClock};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(AppConfig::default_config_path);

    let config = if path.is_file() {
        AppConfig::from_file(&path)?
    } else {
        AppConfig::default()
    };

    let _log_guard = fitmind_reminders::diagnostics::init_logging(&config.logging)?;
    if path.is_file() {
        tracing::info!(path = %path.display(), "configuration loaded");
    } else {
        tracing::warn!(path = %path.display(), "no configuration file, reminders disabled");
    }

    let push: Capability<Arc<dyn PushProvider>> = Capability::Unsupported;
    let tokens = registry::select_registry(&config.registry, push.is_supported())?;

    let platform: Arc<dyn NotificationPlatform> =
        Arc::new(LogNotificationPlatform::new().with_durable_channel());
    let dispatcher = NotificationDispatcher::new(Capability::Supported(platform));
    let registration = PushRegistration::new(push, tokens);

    let scheduler = ReminderScheduler::new(Arc::new(SystemClock), dispatcher, registration)
        .with_tick_interval(Duration::from_secs(config.scheduler.tick_secs));

    let store = ProfileStore::new();
    store.publish(ProfileSnapshot {
        owner_id: config.owner_id.clone(),
        reminders: config.reminders.clone(),
    });

    let cancel = CancellationToken::new();
    let handle = scheduler.run(store.subscribe(), cancel.clone());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    cancel.cancel();
    handle.await?;

    tracing::info!("fitmind-reminderd shut down cleanly");
    Ok(())
}
