//! Application context - dependency injection container

use std::sync::Arc;

use anyhow::Context as _;
use idletally_common::time::SystemClock;
use idletally_core::TimerSession;
use idletally_domain::Config;
use idletally_infra::{DbManager, LocaleDateTimeFormat, SignalInbox, SqliteActivityRepository};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Application context - holds the session and the adapters it is wired to
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub inbox: SignalInbox,
    pub session: Arc<Mutex<TimerSession>>,
}

impl AppContext {
    /// Open the database, build a session over it and load saved activities
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let db = Arc::new(
            DbManager::open(&config.storage.path)
                .with_context(|| format!("opening database at {}", config.storage.path))?,
        );
        db.health_check().context("database health check")?;

        let format = LocaleDateTimeFormat::from_config(&config.display)
            .context("building date-time format")?;
        let inbox = SignalInbox::new();
        let mut session = TimerSession::new(
            Arc::new(SqliteActivityRepository::new(Arc::clone(&db))),
            Arc::new(inbox.clone()),
            Arc::new(format),
            Arc::new(SystemClock),
        )
        .with_config(&config);
        session.load_activities().context("loading activities")?;
        for event in session.drain_events() {
            debug!(?event, "Session event");
        }

        info!(
            db_path = %config.storage.path,
            idle_threshold_secs = config.timing.idle_threshold_seconds,
            activities = session.activities().len(),
            "IdleTally context initialised"
        );
        Ok(Self { config, db, inbox, session: Arc::new(Mutex::new(session)) })
    }

    /// Poll the activity feed on the configured interval
    pub fn spawn_idle_poller(&self) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let period = self.config.timing.idle_poll_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut announced = false;
            loop {
                ticker.tick().await;
                let mut session = session.lock().await;
                let idle = session.check_idle_time();
                for event in session.drain_events() {
                    debug!(?event, "Session event");
                }
                match session.idle_window() {
                    Some(window) if idle && !announced => {
                        info!(
                            gap_secs = window.idle_duration().num_seconds(),
                            "Idle time awaiting include or exclude"
                        );
                        announced = true;
                    }
                    Some(_) => {}
                    None => announced = false,
                }
            }
        })
    }
}
