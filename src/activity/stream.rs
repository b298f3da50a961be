//! Incremental delivery of a session's events.
//!
//! Consumers receive each event exactly once, in append order. Progress is
//! tracked by event sequence number rather than by position in the snapshot
//! window, so events keep flowing after the window starts dropping old ones.

use super::event::ActivityEvent;
use super::log::ActivityLog;
use futures::Stream;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Polling cadence and give-up policy of an event stream.
#[derive(Debug, Clone, Copy)]
pub struct StreamSettings {
    pub poll_interval: Duration,
    /// Stop when no new event arrived for this long
    pub idle_timeout: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            idle_timeout: Duration::from_secs(120),
        }
    }
}

/// Stream every retained and future event of `log`.
///
/// The stream ends once the run is terminal and all of its events were
/// yielded, or after `idle_timeout` without a new event.
pub fn event_stream(
    log: Arc<ActivityLog>,
    settings: StreamSettings,
) -> impl Stream<Item = ActivityEvent> + Send + 'static {
    async_stream::stream! {
        let mut last_seq = 0u64;
        let mut last_activity = Instant::now();

        loop {
            let batch = log.events_since(last_seq);
            if !batch.is_empty() {
                last_activity = Instant::now();
                for event in batch {
                    last_seq = event.seq;
                    yield event;
                }
            }

            if log.is_terminal() && log.events_since(last_seq).is_empty() {
                break;
            }

            if last_activity.elapsed() >= settings.idle_timeout {
                tracing::debug!(last_seq, "Activity stream idle, closing");
                break;
            }

            tokio::time::sleep(settings.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn fast_settings() -> StreamSettings {
        StreamSettings {
            poll_interval: Duration::from_millis(5),
            idle_timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn test_stream_drains_finished_run() {
        let log = Arc::new(ActivityLog::new());
        log.reset(Some("q".to_string()));
        log.info("one");
        log.info("two");
        log.complete();

        let events: Vec<_> = event_stream(Arc::clone(&log), fast_settings())
            .collect()
            .await;
        let messages: Vec<_> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_stream_follows_live_writes() {
        let log = Arc::new(ActivityLog::new());
        log.reset(None);

        let writer = {
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                for i in 0..5 {
                    log.info(format!("step {}", i));
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
                log.complete();
            })
        };

        let events: Vec<_> = event_stream(Arc::clone(&log), fast_settings())
            .collect()
            .await;
        writer.await.unwrap();

        assert_eq!(events.len(), 5);
        let seqs: Vec<u64> = events.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_stream_times_out_on_stuck_run() {
        let log = Arc::new(ActivityLog::new());
        log.reset(None);
        log.info("started but never finishes");

        let events: Vec<_> = event_stream(log, fast_settings()).collect().await;
        assert_eq!(events.len(), 1);
    }
}
