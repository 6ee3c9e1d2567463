//! Best-effort HTTP growth notifier.
//!
//! Each growth change is sent as two requests on a detached worker thread:
//! `POST <state_url>` with `{"value": <stage 0..=3>}` and
//! `GET <number_url>?value=<growth>`. Responses are ignored except for logging.
//! A newer dispatch or `cancel_pending()` supersedes older dispatches: they
//! skip their remaining requests and stay silent. Dropping the notifier does
//! not cancel; short-lived callers use `wait_idle` before exiting.

use super::{GrowthNotifier, NotifyError};
use crate::model::profile::FlowerStage;
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

const DEFAULT_STATE_URL: &str = "http://localhost:8000/state";
const DEFAULT_NUMBER_URL: &str = "http://localhost:8080/api/number";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Endpoints and timeout for `HttpGrowthNotifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpNotifierConfig {
    pub state_url: String,
    pub number_url: String,
    pub timeout: Duration,
}

impl Default for HttpNotifierConfig {
    fn default() -> Self {
        Self {
            state_url: DEFAULT_STATE_URL.to_string(),
            number_url: DEFAULT_NUMBER_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Outcome of one dispatch, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// `None` when the request was skipped.
    pub state: Option<Result<(), NotifyError>>,
    pub number: Option<Result<(), NotifyError>>,
    /// Set when a newer dispatch or a cancel overtook this one.
    pub superseded: bool,
}

/// Fire-and-forget notifier backed by a blocking `ureq` agent.
pub struct HttpGrowthNotifier {
    config: Arc<HttpNotifierConfig>,
    agent: ureq::Agent,
    generation: Arc<AtomicU64>,
    in_flight: Arc<InFlight>,
}

impl HttpGrowthNotifier {
    pub fn new(config: HttpNotifierConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self {
            config: Arc::new(config),
            agent,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(InFlight::default()),
        }
    }

    pub fn config(&self) -> &HttpNotifierConfig {
        &self.config
    }

    /// Supersedes every dispatch started so far.
    pub fn cancel_pending(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Blocks until every spawned dispatch finished or `timeout` elapsed.
    ///
    /// Returns `true` when no dispatch is still running.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.in_flight.wait_idle(timeout)
    }

    /// Sends both requests on the calling thread.
    ///
    /// Used by the worker thread; exposed for callers that already run off
    /// the UI thread.
    pub fn dispatch_blocking(&self, growth: u8) -> DispatchReport {
        let ticket = self.next_ticket();
        Dispatch {
            config: Arc::clone(&self.config),
            agent: self.agent.clone(),
            generation: Arc::clone(&self.generation),
            ticket,
        }
        .run(growth)
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl GrowthNotifier for HttpGrowthNotifier {
    fn growth_changed(&self, growth: u8) {
        let dispatch = Dispatch {
            config: Arc::clone(&self.config),
            agent: self.agent.clone(),
            generation: Arc::clone(&self.generation),
            ticket: self.next_ticket(),
        };

        let ticket = InFlightTicket::acquire(Arc::clone(&self.in_flight));
        let spawned = std::thread::Builder::new()
            .name("growth-notify".to_string())
            .spawn(move || {
                let _ticket = ticket;
                dispatch.run(growth);
            });
        if let Err(err) = spawned {
            warn!(
                "event=growth_notify module=notify status=error growth={} error_code=spawn_failed error={}",
                growth, err
            );
        }
    }
}

/// Count of spawned dispatches that have not finished yet.
#[derive(Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn wait_idle(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .idle
            .wait_timeout_while(guard, timeout, |count| *count > 0)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard == 0
    }
}

/// Held by one worker; releases its slot when dropped, even on panic or a
/// failed spawn.
struct InFlightTicket {
    in_flight: Arc<InFlight>,
}

impl InFlightTicket {
    fn acquire(in_flight: Arc<InFlight>) -> Self {
        *in_flight.lock() += 1;
        Self { in_flight }
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        let mut count = self.in_flight.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.in_flight.idle.notify_all();
        }
    }
}

struct Dispatch {
    config: Arc<HttpNotifierConfig>,
    agent: ureq::Agent,
    generation: Arc<AtomicU64>,
    ticket: u64,
}

impl Dispatch {
    fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.ticket
    }

    fn run(self, growth: u8) -> DispatchReport {
        let mut report = DispatchReport::default();
        let stage = FlowerStage::from_growth(growth).state_value();

        if !self.is_current() {
            report.superseded = true;
            return report;
        }
        let state = self.post_state(stage);
        if let Err(err) = &state {
            if self.is_current() {
                warn!(
                    "event=growth_notify module=notify status=error target=state stage={} error={}",
                    stage, err
                );
            }
        }
        report.state = Some(state);

        if !self.is_current() {
            report.superseded = true;
            return report;
        }
        let number = self.get_number(growth);
        match &number {
            Ok(()) => debug!(
                "event=growth_notify module=notify status=ok growth={} stage={}",
                growth, stage
            ),
            Err(err) => {
                if self.is_current() {
                    warn!(
                        "event=growth_notify module=notify status=error target=number growth={} error={}",
                        growth, err
                    );
                }
            }
        }
        report.number = Some(number);
        report.superseded = !self.is_current();
        report
    }

    fn post_state(&self, stage: u8) -> Result<(), NotifyError> {
        self.agent
            .post(&self.config.state_url)
            .send_json(serde_json::json!({ "value": stage }))?;
        Ok(())
    }

    fn get_number(&self, growth: u8) -> Result<(), NotifyError> {
        self.agent
            .get(&self.config.number_url)
            .query("value", &growth.to_string())
            .call()?;
        Ok(())
    }
}
