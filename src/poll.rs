//! Background refresh scheduling.
//!
//! A dedicated thread runs a single-threaded tokio runtime that drives both
//! refresh routines cooperatively.  Each routine gets its own repeating task:
//! the first tick fires immediately, later ticks every configured interval.
//! Results reach the UI thread through the [`ChannelSurface`] the routines
//! write into.
//!
//! ## Overlapping runs
//!
//! Every tick starts the routine as a fresh task, so a slow run does not delay
//! the next tick.  With [`OverlapPolicy::Allow`] two runs of the same routine
//! may be in flight at once and whichever finishes last wins the surface.
//! [`OverlapPolicy::Skip`] drops ticks while the previous run is unfinished.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::WidgetConfig;
use crate::http::ReqwestTransport;
use crate::refresh::{DiscordRefresher, Refresh, SpotifyRefresher};
use crate::surface::{ChannelSurface, DisplaySurface};

/// What to do when a tick fires while the previous run is still going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Start anyway; the later completion overwrites the surface.
    #[default]
    Allow,
    /// Skip this tick.
    Skip,
}

/// Clears the in-flight flag when a run ends, including by panic.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Run `job` now and then every `period`, each run as its own task.
pub fn spawn_repeating<F, Fut>(
    name: &'static str,
    period: Duration,
    policy: OverlapPolicy,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let in_flight = Arc::new(AtomicBool::new(false));

        loop {
            ticker.tick().await;
            if policy == OverlapPolicy::Skip && in_flight.swap(true, Ordering::AcqRel) {
                debug!(task = name, "previous run still in flight, skipping tick");
                continue;
            }

            let run = job();
            let guard = InFlight(Arc::clone(&in_flight));
            tokio::spawn(async move {
                let _guard = guard;
                run.await;
            });
        }
    })
}

/// Schedule a refresh routine at its own interval.
pub fn schedule<R, S>(refresher: R, surface: Arc<S>, policy: OverlapPolicy) -> JoinHandle<()>
where
    R: Refresh,
    S: DisplaySurface,
{
    let name = refresher.name();
    let period = refresher.interval();
    info!(
        task = name,
        interval_ms = period.as_millis() as u64,
        ?policy,
        "scheduling refresh"
    );

    let refresher = Arc::new(refresher);
    spawn_repeating(name, period, policy, move || {
        let refresher = Arc::clone(&refresher);
        let surface = Arc::clone(&surface);
        async move { refresher.refresh(&*surface).await }
    })
}

/// Spawn the polling thread for both routines.
///
/// The thread runs until the process exits.  If the UI side of the channel
/// is gone, writes are silently dropped.
pub fn spawn(config: WidgetConfig, surface: ChannelSurface) -> Result<thread::JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build polling runtime")?;
    let transport = ReqwestTransport::new()?;
    let policy = config.overlap;

    thread::Builder::new()
        .name("statusdeck-poll".into())
        .spawn(move || {
            runtime.block_on(async move {
                let surface = Arc::new(surface);
                let spotify = schedule(
                    SpotifyRefresher::new(config.spotify, transport.clone()),
                    Arc::clone(&surface),
                    policy,
                );
                let discord = schedule(
                    DiscordRefresher::new(config.discord, transport),
                    surface,
                    policy,
                );

                let (spotify, discord) = tokio::join!(spotify, discord);
                for result in [spotify, discord] {
                    if let Err(e) = result {
                        warn!(error = %e, "refresh task ended");
                    }
                }
            });
        })
        .context("spawn polling thread")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use crate::surface::{RecordingSurface, SurfaceWrite};

    fn counting_job(
        starts: &Arc<AtomicUsize>,
        work: Duration,
    ) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>> + Send + 'static {
        let starts = Arc::clone(starts);
        move || {
            let starts = Arc::clone(&starts);
            Box::pin(async move {
                starts.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(work).await;
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_run_is_immediate_then_periodic() {
        let starts = Arc::new(AtomicUsize::new(0));
        let handle = spawn_repeating(
            "test",
            Duration::from_secs(60),
            OverlapPolicy::Allow,
            counting_job(&starts, Duration::ZERO),
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 1, "runs at startup");

        tokio::time::sleep(Duration::from_secs(124)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 3, "t=0, 60, 120");
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn allow_policy_overlaps_slow_runs() {
        let starts = Arc::new(AtomicUsize::new(0));
        let handle = spawn_repeating(
            "test",
            Duration::from_secs(60),
            OverlapPolicy::Allow,
            counting_job(&starts, Duration::from_secs(90)),
        );

        tokio::time::sleep(Duration::from_secs(125)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 3);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn skip_policy_drops_ticks_while_running() {
        let starts = Arc::new(AtomicUsize::new(0));
        let handle = spawn_repeating(
            "test",
            Duration::from_secs(60),
            OverlapPolicy::Skip,
            counting_job(&starts, Duration::from_secs(90)),
        );

        // t=0 starts (busy until 90), t=60 skipped, t=120 starts.
        tokio::time::sleep(Duration::from_secs(125)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 2);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn skip_policy_recovers_after_a_panicking_run() {
        let starts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&starts);
        let handle = spawn_repeating("test", Duration::from_secs(10), OverlapPolicy::Skip, move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("first run fails");
                }
            }
        });

        // t=0 panics; t=10..50 must still start.
        tokio::time::sleep(Duration::from_secs(55)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 6);
        handle.abort();
    }

    struct Stamp;

    impl Refresh for Stamp {
        fn name(&self) -> &'static str {
            "stamp"
        }

        fn interval(&self) -> Duration {
            Duration::from_secs(10)
        }

        async fn refresh<S: DisplaySurface>(&self, surface: &S) {
            surface.write(SurfaceWrite::Activity("tick".into()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_drives_a_refresh_routine() {
        let surface = Arc::new(RecordingSurface::default());
        let handle = schedule(Stamp, Arc::clone(&surface), OverlapPolicy::Allow);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(surface.writes().len(), 3, "t=0, 10, 20");
        handle.abort();
    }

    #[test]
    fn policy_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            overlap: OverlapPolicy,
        }
        let w: Wrapper = toml::from_str(r#"overlap = "skip""#).unwrap();
        assert_eq!(w.overlap, OverlapPolicy::Skip);
    }
}
