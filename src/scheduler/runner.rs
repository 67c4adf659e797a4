//! Reminder scheduler loop.
//!
//! Spawns a tokio task that follows the profile feed. While reminders are
//! enabled it samples the clock every tick, evaluates each new minute once,
//! and hands fired reminders to the dispatcher. Enabling reminders also
//! starts push-token registration for the session.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ClockTime, ReminderConfiguration};
use crate::notify::{DeliveryOutcome, NotificationDispatcher};
use crate::profile::ProfileSnapshot;
use crate::push::{PushRegistration, RegistrationOutcome};
use crate::scheduler::clock::{self, Clock};
use crate::scheduler::messages::{self, ReminderMessage};
use crate::scheduler::triggers::{self, FiredTriggerSet, TriggerCategory};

/// Interval between clock samples.
pub const TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Whether a timer is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No configuration, or reminders disabled. No timer.
    Idle,
    /// Reminders enabled; the tick timer is registered.
    Active,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Reminders are not enabled; nothing was evaluated.
    Idle,
    /// The sampled minute was already evaluated.
    SameMinute,
    /// A new minute was evaluated.
    Evaluated {
        /// The evaluated minute.
        minute: ClockTime,
        /// Categories that fired in it.
        fired: FiredTriggerSet,
    },
}

/// Progress reported to an optional observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Reminders became enabled.
    Activated,
    /// Reminders became disabled or the profile went away.
    Deactivated,
    /// One reminder delivery finished.
    Delivered {
        /// Fired category.
        category: TriggerCategory,
        /// Dedup tag used.
        tag: String,
        /// Delivery result.
        outcome: DeliveryOutcome,
    },
    /// A registration run finished.
    Registration(RegistrationOutcome),
}

/// Point-in-time view of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    /// Idle or Active.
    pub state: SchedulerState,
    /// Last evaluated minute, if any.
    pub last_evaluated: Option<ClockTime>,
    /// Whether a push token was stored this session.
    pub token_sent: bool,
}

/// Owns reminder timing for one session.
pub struct ReminderScheduler {
    clock: Arc<dyn Clock>,
    dispatcher: NotificationDispatcher,
    registration: Arc<Mutex<PushRegistration>>,
    profile: Option<ProfileSnapshot>,
    /// Most recently evaluated minute. At most one evaluation per minute.
    last_fired: Option<ClockTime>,
    tick_interval: Duration,
    rng: StdRng,
    events: Option<mpsc::UnboundedSender<SchedulerEvent>>,
    dispatch_task: Option<JoinHandle<()>>,
    registration_task: Option<JoinHandle<()>>,
}

impl ReminderScheduler {
    /// Create an idle scheduler.
    pub fn new(
        clock: Arc<dyn Clock>,
        dispatcher: NotificationDispatcher,
        registration: PushRegistration,
    ) -> Self {
        Self {
            clock,
            dispatcher,
            registration: Arc::new(Mutex::new(registration)),
            profile: None,
            last_fired: None,
            tick_interval: TICK_INTERVAL,
            rng: StdRng::from_entropy(),
            events: None,
            dispatch_task: None,
            registration_task: None,
        }
    }

    /// Override the tick interval. Values of a minute or more would skip minutes.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Seed message selection for reproducible output.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Report progress on `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SchedulerEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        if self.active_config().is_some() {
            SchedulerState::Active
        } else {
            SchedulerState::Idle
        }
    }

    /// Snapshot for diagnostics. `token_sent` reads false while a
    /// registration run is in flight.
    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            state: self.state(),
            last_evaluated: self.last_fired,
            token_sent: self
                .registration
                .try_lock()
                .map(|r| r.token_sent())
                .unwrap_or(false),
        }
    }

    fn active_config(&self) -> Option<&ReminderConfiguration> {
        self.profile
            .as_ref()
            .map(|p| &p.reminders)
            .filter(|r| r.enabled)
    }

    /// Apply a profile change and return the new state.
    ///
    /// Entering Active starts push registration unless a token was already
    /// sent or a run is still in flight.
    pub fn apply_profile(&mut self, profile: Option<ProfileSnapshot>) -> SchedulerState {
        let before = self.state();
        self.profile = profile;
        let after = self.state();

        match (before, after) {
            (SchedulerState::Idle, SchedulerState::Active) => {
                info!("reminders enabled, scheduler active");
                self.emit(SchedulerEvent::Activated);
                self.start_registration();
            }
            (SchedulerState::Active, SchedulerState::Idle) => {
                info!("reminders disabled, scheduler idle");
                self.emit(SchedulerEvent::Deactivated);
            }
            _ => {}
        }
        if self.profile.is_none() {
            self.cancel_registration();
        }
        after
    }

    /// Abort an in-flight registration so no token is stored for an owner
    /// that is gone.
    fn cancel_registration(&mut self) {
        if let Some(task) = self.registration_task.take() {
            if !task.is_finished() {
                debug!("aborting in-flight push registration");
                task.abort();
            }
        }
    }

    fn start_registration(&mut self) {
        if self
            .registration_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
        {
            debug!("push registration already in flight");
            return;
        }
        let Some(owner_id) = self.profile.as_ref().map(|p| p.owner_id.clone()) else {
            return;
        };

        let registration = Arc::clone(&self.registration);
        let events = self.events.clone();
        self.registration_task = Some(tokio::spawn(async move {
            let mut registration = registration.lock().await;
            if registration.token_sent() {
                return;
            }
            let outcome = registration.register(&owner_id).await;
            if let Some(tx) = events {
                let _ = tx.send(SchedulerEvent::Registration(outcome));
            }
        }));
    }

    /// Execute one tick: sample the clock and evaluate a new minute.
    ///
    /// Waits for the previous tick's deliveries before evaluating, so ticks
    /// never overlap. Deliveries for this tick run in a spawned task; use
    /// [`flush`](Self::flush) to wait for them.
    pub async fn tick(&mut self) -> TickOutcome {
        if self.active_config().is_none() {
            return TickOutcome::Idle;
        }

        let sample = clock::sample(self.clock.as_ref());
        if self.last_fired == Some(sample.time) {
            return TickOutcome::SameMinute;
        }

        self.flush().await;
        self.last_fired = Some(sample.time);

        let Some(config) = self.active_config() else {
            return TickOutcome::Idle;
        };
        let fired = triggers::evaluate(sample.time, sample.weekday, config);
        debug!(minute = %sample.time, fired = fired.len(), "reminder minute evaluated");

        if !fired.is_empty() {
            let batch: Vec<ReminderMessage> = fired
                .iter()
                .map(|category| messages::compose(*category, &mut self.rng))
                .collect();
            self.dispatch_task = Some(spawn_dispatch(
                self.dispatcher.clone(),
                batch,
                self.events.clone(),
            ));
        }

        TickOutcome::Evaluated {
            minute: sample.time,
            fired,
        }
    }

    /// Wait for the most recent tick's deliveries to finish.
    pub async fn flush(&mut self) {
        if let Some(task) = self.dispatch_task.take() {
            if let Err(e) = task.await {
                warn!("reminder dispatch task failed: {e}");
            }
        }
    }

    /// Wait for an in-flight registration run to finish.
    pub async fn flush_registration(&mut self) {
        if let Some(task) = self.registration_task.take() {
            match task.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => debug!("push registration was aborted"),
                Err(e) => warn!("push registration task failed: {e}"),
            }
        }
    }

    /// Start the scheduler loop.
    ///
    /// The loop follows `profile_rx` until it closes or `cancel` fires.
    /// Deliveries already in flight at that point still complete; an
    /// unfinished registration is aborted.
    pub fn run(
        mut self,
        mut profile_rx: watch::Receiver<Option<ProfileSnapshot>>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let initial = profile_rx.borrow_and_update().clone();
            let mut timer = match self.apply_profile(initial) {
                SchedulerState::Active => Some(new_timer(self.tick_interval)),
                SchedulerState::Idle => None,
            };
            info!(state = ?self.state(), "reminder scheduler started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("reminder scheduler cancelled");
                        break;
                    }
                    changed = profile_rx.changed() => {
                        if changed.is_err() {
                            info!("profile feed closed, stopping reminder scheduler");
                            break;
                        }
                        let snapshot = profile_rx.borrow_and_update().clone();
                        match (self.apply_profile(snapshot), timer.is_some()) {
                            (SchedulerState::Active, false) => {
                                timer = Some(new_timer(self.tick_interval));
                            }
                            (SchedulerState::Idle, true) => timer = None,
                            _ => {}
                        }
                    }
                    _ = next_tick(&mut timer) => {
                        self.tick().await;
                    }
                }
            }

            self.cancel_registration();
            if self.state() == SchedulerState::Active {
                self.emit(SchedulerEvent::Deactivated);
            }
        })
    }

    fn emit(&self, event: SchedulerEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

fn new_timer(period: Duration) -> Interval {
    let mut timer = tokio::time::interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn spawn_dispatch(
    dispatcher: NotificationDispatcher,
    batch: Vec<ReminderMessage>,
    events: Option<mpsc::UnboundedSender<SchedulerEvent>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for message in batch {
            let outcome = dispatcher
                .deliver(message.title, message.body, message.tag)
                .await;
            debug!(category = %message.category, ?outcome, "reminder delivered");
            if let Some(tx) = &events {
                let _ = tx.send(SchedulerEvent::Delivered {
                    category: message.category,
                    tag: message.tag.to_owned(),
                    outcome,
                });
            }
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::platform::{Capability, Notification, NotificationPlatform, PermissionState};
    use crate::push::{ChannelRegistration, MessagingHandle, PushProvider};
    use crate::registry::{InMemoryTokenRegistry, TokenRegistry};
    use crate::scheduler::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingPlatform {
        shown: StdMutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationPlatform for RecordingPlatform {
        fn permission(&self) -> PermissionState {
            PermissionState::Granted
        }

        async fn show_durable(&self, notification: &Notification) -> anyhow::Result<()> {
            self.shown.lock().unwrap().push(notification.clone());
            Ok(())
        }

        fn show_direct(&self, notification: &Notification) -> anyhow::Result<()> {
            self.shown.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct CountingProvider {
        permission_requests: AtomicUsize,
    }

    #[async_trait]
    impl PushProvider for CountingProvider {
        async fn request_permission(&self) -> anyhow::Result<PermissionState> {
            self.permission_requests.fetch_add(1, Ordering::SeqCst);
            Ok(PermissionState::Granted)
        }

        async fn messaging_handle(&self) -> anyhow::Result<Option<MessagingHandle>> {
            Ok(Some(MessagingHandle("h".to_owned())))
        }

        async fn wait_channel_ready(&self) -> anyhow::Result<ChannelRegistration> {
            Ok(ChannelRegistration {
                scope: "/".to_owned(),
            })
        }

        async fn token(
            &self,
            _handle: &MessagingHandle,
            _channel: &ChannelRegistration,
        ) -> anyhow::Result<Option<String>> {
            Ok(Some("tok-runner".to_owned()))
        }
    }

    /// Provider that parks in `token()` until the gate opens.
    #[derive(Default)]
    struct GatedProvider {
        reached: tokio::sync::Notify,
        gate: tokio::sync::Notify,
    }

    #[async_trait]
    impl PushProvider for GatedProvider {
        async fn request_permission(&self) -> anyhow::Result<PermissionState> {
            Ok(PermissionState::Granted)
        }

        async fn messaging_handle(&self) -> anyhow::Result<Option<MessagingHandle>> {
            Ok(Some(MessagingHandle("h".to_owned())))
        }

        async fn wait_channel_ready(&self) -> anyhow::Result<ChannelRegistration> {
            Ok(ChannelRegistration {
                scope: "/".to_owned(),
            })
        }

        async fn token(
            &self,
            _handle: &MessagingHandle,
            _channel: &ChannelRegistration,
        ) -> anyhow::Result<Option<String>> {
            self.reached.notify_one();
            self.gate.notified().await;
            Ok(Some("tok-late".to_owned()))
        }
    }

    fn gated_scheduler(
        provider: &Arc<GatedProvider>,
        registry: &Arc<InMemoryTokenRegistry>,
    ) -> ReminderScheduler {
        let dyn_provider: Arc<dyn PushProvider> = provider.clone();
        let dyn_registry: Arc<dyn TokenRegistry> = registry.clone();
        ReminderScheduler::new(
            Arc::new(ManualClock::new(at(9, 0, 0))),
            NotificationDispatcher::new(Capability::Unsupported),
            PushRegistration::new(Capability::Supported(dyn_provider), dyn_registry),
        )
    }

    struct Harness {
        scheduler: ReminderScheduler,
        clock: Arc<ManualClock>,
        platform: Arc<RecordingPlatform>,
        provider: Arc<CountingProvider>,
        registry: Arc<InMemoryTokenRegistry>,
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        // Monday.
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn harness(start: NaiveDateTime) -> Harness {
        let clock = Arc::new(ManualClock::new(start));
        let platform = Arc::new(RecordingPlatform::default());
        let provider = Arc::new(CountingProvider {
            permission_requests: AtomicUsize::new(0),
        });
        let registry = Arc::new(InMemoryTokenRegistry::new());

        let dyn_platform: Arc<dyn NotificationPlatform> = platform.clone();
        let dyn_provider: Arc<dyn PushProvider> = provider.clone();
        let dyn_registry: Arc<dyn TokenRegistry> = registry.clone();
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let scheduler = ReminderScheduler::new(
            dyn_clock,
            NotificationDispatcher::new(Capability::Supported(dyn_platform)),
            PushRegistration::new(Capability::Supported(dyn_provider), dyn_registry),
        )
        .with_rng_seed(3);

        Harness {
            scheduler,
            clock,
            platform,
            provider,
            registry,
        }
    }

    fn profile(enabled: bool) -> ProfileSnapshot {
        let mut reminders = ReminderConfiguration {
            enabled,
            ..Default::default()
        };
        reminders.meal_times.breakfast = Some("08:00".parse().unwrap());
        ProfileSnapshot {
            owner_id: "user-1".to_owned(),
            reminders,
        }
    }

    #[tokio::test]
    async fn disabled_profile_never_evaluates() {
        let mut h = harness(at(8, 0, 0));
        assert_eq!(h.scheduler.apply_profile(Some(profile(false))), SchedulerState::Idle);

        assert_eq!(h.scheduler.tick().await, TickOutcome::Idle);
        h.scheduler.flush().await;

        assert!(h.platform.shown.lock().unwrap().is_empty());
        assert!(h.scheduler.status().last_evaluated.is_none());
        assert_eq!(h.provider.permission_requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_profile_is_idle() {
        let mut h = harness(at(8, 0, 0));
        assert_eq!(h.scheduler.apply_profile(None), SchedulerState::Idle);
        assert_eq!(h.scheduler.tick().await, TickOutcome::Idle);
    }

    #[tokio::test]
    async fn same_minute_is_evaluated_once() {
        let mut h = harness(at(8, 0, 5));
        h.scheduler.apply_profile(Some(profile(true)));

        let first = h.scheduler.tick().await;
        assert!(matches!(first, TickOutcome::Evaluated { ref fired, .. } if fired.len() == 1));

        h.clock.advance(chrono::Duration::seconds(30));
        assert_eq!(h.scheduler.tick().await, TickOutcome::SameMinute);
        h.scheduler.flush().await;

        let shown = h.platform.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "FitMind: Café da Manhã");
        assert_eq!(shown[0].tag, "meal-breakfast");
    }

    #[tokio::test]
    async fn minute_without_triggers_still_advances_marker() {
        let mut h = harness(at(7, 59, 0));
        h.scheduler.apply_profile(Some(profile(true)));

        let outcome = h.scheduler.tick().await;
        assert_eq!(
            outcome,
            TickOutcome::Evaluated {
                minute: "07:59".parse().unwrap(),
                fired: FiredTriggerSet::new()
            }
        );
        assert_eq!(
            h.scheduler.status().last_evaluated,
            Some("07:59".parse().unwrap())
        );
    }

    #[tokio::test]
    async fn activation_registers_push_token_once() {
        let mut h = harness(at(10, 0, 0));

        h.scheduler.apply_profile(Some(profile(true)));
        h.scheduler.flush_registration().await;

        // Same state again, then a disable/enable cycle.
        h.scheduler.apply_profile(Some(profile(true)));
        h.scheduler.apply_profile(Some(profile(false)));
        h.scheduler.apply_profile(Some(profile(true)));
        h.scheduler.flush_registration().await;

        assert_eq!(h.provider.permission_requests.load(Ordering::SeqCst), 1);
        assert_eq!(h.registry.len(), 1);
        assert!(h.scheduler.status().token_sent);
    }

    #[tokio::test]
    async fn events_report_transitions_and_deliveries() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut h = harness(at(8, 0, 0));
        h.scheduler = h.scheduler.with_events(tx);

        h.scheduler.apply_profile(Some(profile(true)));
        h.scheduler.flush_registration().await;
        h.scheduler.tick().await;
        h.scheduler.flush().await;
        h.scheduler.apply_profile(None);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert_eq!(events.first(), Some(&SchedulerEvent::Activated));
        assert!(events.iter().any(|e| matches!(
            e,
            SchedulerEvent::Registration(RegistrationOutcome::Registered { .. })
        )));
        assert!(events.contains(&SchedulerEvent::Delivered {
            category: TriggerCategory::Breakfast,
            tag: "meal-breakfast".to_owned(),
            outcome: DeliveryOutcome::Durable,
        }));
        assert_eq!(events.last(), Some(&SchedulerEvent::Deactivated));
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_cancel() {
        let h = harness(at(12, 0, 0));
        let store = crate::profile::ProfileStore::new();
        store.publish(profile(true));
        let cancel = CancellationToken::new();

        let handle = h
            .scheduler
            .with_tick_interval(Duration::from_millis(10))
            .run(store.subscribe(), cancel.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.is_ok(), "scheduler should stop after cancel");
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_when_profile_feed_closes() {
        let h = harness(at(12, 0, 0));
        let store = crate::profile::ProfileStore::new();
        let rx = store.subscribe();
        let handle = h.scheduler.run(rx, CancellationToken::new());

        drop(store);

        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.is_ok(), "scheduler should stop when the feed closes");
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_delivers_once_across_many_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let h = harness(at(8, 0, 0));
        let platform = Arc::clone(&h.platform);
        let store = crate::profile::ProfileStore::new();
        store.publish(profile(true));
        let cancel = CancellationToken::new();

        let handle = h
            .scheduler
            .with_events(tx)
            .with_tick_interval(Duration::from_millis(5))
            .run(store.subscribe(), cancel.clone());

        // Wait for the breakfast delivery, then let many more ticks pass.
        let delivered = tokio::time::timeout(Duration::from_secs(2), async {
            while let Some(event) = rx.recv().await {
                if matches!(event, SchedulerEvent::Delivered { .. }) {
                    return true;
                }
            }
            false
        })
        .await;
        assert_eq!(delivered.ok(), Some(true));

        tokio::time::sleep(Duration::from_millis(60)).await;
        cancel.cancel();
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;

        assert_eq!(platform.shown.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sign_out_aborts_pending_registration() {
        let provider = Arc::new(GatedProvider::default());
        let registry = Arc::new(InMemoryTokenRegistry::new());
        let mut scheduler = gated_scheduler(&provider, &registry);

        scheduler.apply_profile(Some(profile(true)));
        tokio::time::timeout(Duration::from_secs(2), provider.reached.notified())
            .await
            .expect("registration should reach the token step");

        scheduler.apply_profile(None);
        provider.gate.notify_one();
        scheduler.flush_registration().await;
        tokio::task::yield_now().await;

        assert!(registry.is_empty());
        assert!(!scheduler.status().token_sent);
    }

    #[tokio::test]
    async fn disabling_keeps_pending_registration() {
        let provider = Arc::new(GatedProvider::default());
        let registry = Arc::new(InMemoryTokenRegistry::new());
        let mut scheduler = gated_scheduler(&provider, &registry);

        scheduler.apply_profile(Some(profile(true)));
        tokio::time::timeout(Duration::from_secs(2), provider.reached.notified())
            .await
            .expect("registration should reach the token step");

        scheduler.apply_profile(Some(profile(false)));
        provider.gate.notify_one();
        scheduler.flush_registration().await;

        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn loop_exit_aborts_pending_registration() {
        let provider = Arc::new(GatedProvider::default());
        let registry = Arc::new(InMemoryTokenRegistry::new());
        let store = crate::profile::ProfileStore::new();
        store.publish(profile(true));
        let cancel = CancellationToken::new();

        let handle = gated_scheduler(&provider, &registry).run(store.subscribe(), cancel.clone());
        tokio::time::timeout(Duration::from_secs(2), provider.reached.notified())
            .await
            .expect("registration should reach the token step");

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        provider.gate.notify_one();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert!(registry.is_empty());
    }
}
