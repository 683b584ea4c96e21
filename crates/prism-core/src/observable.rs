//! Multi-subscriber publication of a current value.
//!
//! [`Observable`] keeps the latest value and a list of subscribers. Each
//! subscriber owns an unbounded queue, so:
//!
//! - a new subscriber receives the current value immediately,
//! - every later publication reaches every live subscriber, in order,
//! - publishing never blocks on a slow subscriber.
//!
//! Nothing is conflated: a subscriber that wants only the latest state calls
//! [`Subscriber::latest`], which drains its own queue.

use tokio::sync::mpsc;

/// Latest value plus fan-out to subscribers.
#[derive(Debug)]
pub struct Observable<V> {
    current: V,
    subscribers: Vec<mpsc::UnboundedSender<V>>,
}

impl<V: Clone> Observable<V> {
    /// Create an observable holding `initial`.
    pub fn new(initial: V) -> Self {
        Self { current: initial, subscribers: Vec::new() }
    }

    /// Current value.
    pub fn get(&self) -> &V {
        &self.current
    }

    /// Replace the current value and deliver it to every subscriber.
    ///
    /// Subscribers whose receiving half was dropped are pruned.
    pub fn publish(&mut self, value: V) {
        self.current = value;
        let current = &self.current;
        self.subscribers.retain(|tx| tx.send(current.clone()).is_ok());
    }

    /// Subscribe to this value, starting with the current one.
    pub fn subscribe(&mut self) -> Subscriber<V> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive, so this cannot fail.
        let _ = tx.send(self.current.clone());
        self.subscribers.push(tx);
        Subscriber { rx }
    }

    /// Number of subscribers still attached.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|tx| !tx.is_closed()).count()
    }
}

/// Receiving end of an [`Observable`].
///
/// The stream ends (returns `None`) once the observable is dropped and all
/// queued values were consumed.
#[derive(Debug)]
pub struct Subscriber<V> {
    rx: mpsc::UnboundedReceiver<V>,
}

impl<V> Subscriber<V> {
    /// Wait for the next published value.
    pub async fn next(&mut self) -> Option<V> {
        self.rx.recv().await
    }

    /// Next queued value without waiting.
    pub fn try_next(&mut self) -> Option<V> {
        self.rx.try_recv().ok()
    }

    /// Drain every queued value, oldest first.
    pub fn drain(&mut self) -> Vec<V> {
        let mut values = Vec::new();
        while let Ok(value) = self.rx.try_recv() {
            values.push(value);
        }
        values
    }

    /// Most recent queued value, discarding older ones.
    pub fn latest(&mut self) -> Option<V> {
        self.drain().pop()
    }
}
