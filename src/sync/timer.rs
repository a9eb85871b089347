//! Cancelable timers that deliver events into an actor channel.
//!
//! A [`TimerHandle`] owns the spawned timer task and aborts it when dropped,
//! so a timer never outlives the state that started it.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Send `make_event()` every `period`, starting one period from now.
pub fn spawn_interval<E, F>(period: Duration, tx: mpsc::Sender<E>, mut make_event: F) -> TimerHandle
where
    E: Send + 'static,
    F: FnMut() -> E + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if tx.send(make_event()).await.is_err() {
                break;
            }
        }
    });
    TimerHandle { task }
}

/// Send `event` once after `delay`.
pub fn spawn_delay<E>(delay: Duration, tx: mpsc::Sender<E>, event: E) -> TimerHandle
where
    E: Send + 'static,
{
    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        tx.send(event).await.ok();
    });
    TimerHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_delay_fires_once() {
        let (tx, mut rx) = mpsc::channel(4);
        let _timer = spawn_delay(Duration::from_millis(300), tx, 7u32);

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.try_recv().ok(), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_delay_never_fires() {
        let (tx, mut rx) = mpsc::channel::<u32>(4);
        let timer = spawn_delay(Duration::from_millis(300), tx, 7);
        drop(timer);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_ticks_until_dropped() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut count = 0u32;
        let timer = spawn_interval(Duration::from_secs(30), tx, move || {
            count += 1;
            count
        });

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(rx.try_recv().ok(), Some(1));
        assert_eq!(rx.try_recv().ok(), Some(2));
        assert!(rx.try_recv().is_err());

        drop(timer);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }
}
