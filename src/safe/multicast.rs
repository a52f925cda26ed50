//! Fan-out wrapper that relays one upstream stream to many subscribers.
//!
//! The upstream is driven by a `tokio` task started when the first
//! subscriber attaches. Each subscriber owns an unbounded queue, so a slow
//! subscriber never loses items. Dropping the last subscriber cancels the
//! upstream; completion of the upstream ends every subscription.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};

use {
    async_channel::{Sender, unbounded},
    futures::{Stream, StreamExt, stream::BoxStream},
    parking_lot::Mutex,
    tokio::{spawn, sync::Notify},
    tracing::debug,
};

/// Shared state between the handle, the subscriptions and the driver.
struct Shared<I> {
    state: Mutex<State<I>>,
    /// Number of live subscriptions.
    active: AtomicUsize,
    /// Signalled when `active` drops to zero.
    idle: Notify,
}

struct State<I> {
    /// Upstream waiting for its first subscriber; taken by the driver.
    upstream: Option<BoxStream<'static, I>>,
    subscribers: Vec<Sender<I>>,
    /// Set once the upstream completed or was cancelled.
    closed: bool,
}

impl<I: Clone> Shared<I> {
    fn broadcast(&self, item: I) {
        self.state
            .lock()
            .subscribers
            .retain(|subscriber| subscriber.try_send(item.clone()).is_ok());
    }

    fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.subscribers.clear();
    }
}

/// Multicast handle over an upstream stream of `I`.
///
/// Cloning the handle shares the same upstream.
pub struct Multicast<I> {
    shared: Arc<Shared<I>>,
}

impl<I> Clone for Multicast<I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<I> Debug for Multicast<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let state = self.shared.state.lock();
        f.debug_struct("Multicast")
            .field("started", &state.upstream.is_none())
            .field("closed", &state.closed)
            .field("subscribers", &self.shared.active.load(Ordering::Acquire))
            .finish()
    }
}

impl<I: Clone + Send + 'static> Multicast<I> {
    /// Wraps `upstream` without starting it.
    pub fn new<S>(upstream: S) -> Self
    where
        S: Stream<Item = I> + Send + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    upstream: Some(upstream.boxed()),
                    subscribers: Vec::new(),
                    closed: false,
                }),
                active: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Attaches a new subscriber.
    ///
    /// The first call starts the upstream. Later subscribers receive only
    /// the items emitted after they attached; subscribing after the upstream
    /// completed yields an already-finished subscription.
    ///
    /// # Panics
    ///
    /// The first call panics if made outside a `tokio` runtime.
    pub fn subscribe(&self) -> Subscription<I> {
        let (sender, receiver) = unbounded();
        self.shared.active.fetch_add(1, Ordering::AcqRel);

        let upstream = {
            let mut state = self.shared.state.lock();
            if state.closed {
                None
            } else {
                state.subscribers.push(sender);
                state.upstream.take()
            }
        };

        if let Some(upstream) = upstream {
            spawn(drive(Arc::clone(&self.shared), upstream));
        }

        Subscription {
            receiver: receiver.boxed(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Consumes the handle into a single subscription.
    pub fn into_stream(self) -> Subscription<I> {
        self.subscribe()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.active.load(Ordering::Acquire)
    }
}

async fn drive<I: Clone>(shared: Arc<Shared<I>>, mut upstream: BoxStream<'static, I>) {
    debug!("Multicast upstream started");
    loop {
        tokio::select! {
            item = upstream.next() => match item {
                Some(item) => shared.broadcast(item),
                None => {
                    debug!("Multicast upstream completed");
                    break;
                }
            },
            () = shared.idle.notified() => {
                if shared.active.load(Ordering::Acquire) == 0 {
                    debug!("Last subscriber gone, cancelling upstream");
                    break;
                }
            }
        }
    }
    drop(upstream);
    shared.close();
}

/// One subscriber's view of a `Multicast`.
///
/// Dropping it (or calling `cancel`) detaches the subscriber; when the last
/// one detaches the upstream is cancelled.
pub struct Subscription<I> {
    receiver: BoxStream<'static, I>,
    shared: Arc<Shared<I>>,
}

impl<I> Subscription<I> {
    /// Detaches this subscriber.
    pub fn cancel(self) {
        drop(self);
    }
}

impl<I> Debug for Subscription<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl<I> Stream for Subscription<I> {
    type Item = I;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<I>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl<I> Drop for Subscription<I> {
    fn drop(&mut self) {
        if self.shared.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.shared.idle.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use {
        async_channel::unbounded,
        futures::{
            StreamExt,
            stream::{iter, pending},
        },
        tokio::{
            task::yield_now,
            time::{Duration, timeout},
        },
    };

    use crate::safe::multicast::Multicast;

    const TEST_TIMEOUT_MS: u64 = 1000;

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::Release);
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_item() {
        let (sender, receiver) = unbounded::<u32>();
        let multicast = Multicast::new(receiver);
        let first = multicast.subscribe();
        let second = multicast.subscribe();
        assert_eq!(multicast.subscriber_count(), 2);

        for value in [1, 2, 3] {
            sender.send(value).await.unwrap();
        }
        drop(sender);

        let (first, second) = timeout(Duration::from_millis(TEST_TIMEOUT_MS), async {
            (first.collect::<Vec<_>>().await, second.collect::<Vec<_>>().await)
        })
        .await
        .expect("Subscribers did not complete");

        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(second, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_late_subscriber_after_completion_is_finished() {
        let multicast = Multicast::new(iter(vec![1, 2]));
        let items = timeout(
            Duration::from_millis(TEST_TIMEOUT_MS),
            multicast.subscribe().collect::<Vec<_>>(),
        )
        .await
        .expect("Upstream did not complete");
        assert_eq!(items, vec![1, 2]);

        let late = timeout(
            Duration::from_millis(TEST_TIMEOUT_MS),
            multicast.subscribe().collect::<Vec<_>>(),
        )
        .await
        .expect("Late subscription did not finish");
        assert!(late.is_empty());
    }

    #[tokio::test]
    async fn test_dropping_last_subscriber_cancels_upstream() {
        let dropped = Arc::new(AtomicBool::new(false));
        let flag = DropFlag(Arc::clone(&dropped));
        let upstream = pending::<u32>().map(move |item| {
            let _keep = &flag;
            item
        });

        let multicast = Multicast::new(upstream);
        let first = multicast.subscribe();
        let second = multicast.subscribe();
        yield_now().await;

        first.cancel();
        yield_now().await;
        assert!(!dropped.load(Ordering::Acquire));

        drop(second);
        timeout(Duration::from_millis(TEST_TIMEOUT_MS), async {
            while !dropped.load(Ordering::Acquire) {
                yield_now().await;
            }
        })
        .await
        .expect("Upstream was not cancelled");
        assert_eq!(multicast.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_not_started_without_subscribers() {
        let (sender, receiver) = unbounded::<u32>();
        let multicast = Multicast::new(receiver);
        sender.send(7).await.unwrap();
        yield_now().await;

        let mut subscription = multicast.subscribe();
        let first = timeout(Duration::from_millis(TEST_TIMEOUT_MS), subscription.next())
            .await
            .expect("Buffered upstream item not relayed");
        assert_eq!(first, Some(7));
    }
}
