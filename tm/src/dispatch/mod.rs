//! Fire-and-forget dispatch
//!
//! [`Dispatcher::dispatch`] spawns one POST per call and returns immediately.
//! The response and any transport failure are logged and otherwise ignored:
//! no retry, no backoff, no deduplication, no queueing. Concurrent dispatches
//! complete in no particular order.

mod error;
mod transport;

pub use error::DispatchError;
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
pub use transport::mock;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Count of spawned dispatches that have not finished yet
#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    fn begin(self: &Arc<Self>) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard(Arc::clone(self))
    }

    fn end(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Marks one dispatch finished when dropped, also when its task panics
struct InFlightGuard(Arc<InFlight>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.end();
    }
}

/// Issues payloads to a [`Transport`] without observing the outcome
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    in_flight: Arc<InFlight>,
}

impl Dispatcher {
    /// Create a dispatcher over any transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        debug!(endpoint = transport.endpoint(), "Dispatcher::new: called");
        Self {
            transport,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Create a dispatcher posting to an HTTP endpoint
    pub fn http(endpoint: &str) -> Result<Self, DispatchError> {
        Ok(Self::new(Arc::new(HttpTransport::new(endpoint)?)))
    }

    /// Endpoint payloads are sent to
    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Send one payload; returns before the request completes
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self, payload: String) {
        debug!(payload_len = payload.len(), "Dispatcher::dispatch: called");
        let transport = Arc::clone(&self.transport);
        let guard = self.in_flight.begin();

        tokio::spawn(async move {
            let _guard = guard;
            match transport.post(payload).await {
                Ok(()) => debug!(endpoint = transport.endpoint(), "Dispatcher: delivered"),
                Err(e) => warn!(endpoint = transport.endpoint(), error = %e, "Dispatcher: send failed (ignored)"),
            }
        });
    }

    /// Number of dispatches still running
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::SeqCst)
    }

    /// Wait for running dispatches to finish, at most `timeout`
    ///
    /// Returns how many were still running when the wait ended. Used at exit
    /// so a request already issued is not cut off by process shutdown.
    pub async fn flush(&self, timeout: Duration) -> usize {
        debug!(?timeout, in_flight = self.in_flight(), "Dispatcher::flush: called");
        if tokio::time::timeout(timeout, self.in_flight.wait_idle()).await.is_err() {
            let abandoned = self.in_flight();
            warn!("Abandoning {} in-flight dispatch(es) after {:?}", abandoned, timeout);
            return abandoned;
        }
        info!("All dispatches finished");
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mock::RecordingTransport;

    /// Transport that never completes
    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn post(&self, _body: String) -> Result<(), DispatchError> {
            std::future::pending::<()>().await;
            Ok(())
        }

        fn endpoint(&self) -> &str {
            "mock://hanging"
        }
    }

    /// Transport whose request task panics
    struct PanickingTransport;

    #[async_trait]
    impl Transport for PanickingTransport {
        async fn post(&self, _body: String) -> Result<(), DispatchError> {
            panic!("transport blew up");
        }

        fn endpoint(&self) -> &str {
            "mock://panicking"
        }
    }

    #[tokio::test]
    async fn test_dispatch_sends_exactly_one_request() {
        let (transport, mut rx) = RecordingTransport::new();
        let transport = Arc::new(transport);
        let dispatcher = Dispatcher::new(transport.clone());

        dispatcher.dispatch("<h1>Hello</h1>".to_string());
        let body = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(body.as_deref(), Some("<h1>Hello</h1>"));

        assert_eq!(dispatcher.flush(Duration::from_secs(5)).await, 0);
        assert_eq!(transport.bodies(), vec!["<h1>Hello</h1>".to_string()]);
    }

    #[tokio::test]
    async fn test_repeated_dispatch_is_not_deduplicated() {
        let (transport, _rx) = RecordingTransport::new();
        let transport = Arc::new(transport);
        let dispatcher = Dispatcher::new(transport.clone());

        for _ in 0..3 {
            dispatcher.dispatch("same".to_string());
        }
        assert_eq!(dispatcher.flush(Duration::from_secs(5)).await, 0);
        assert_eq!(transport.bodies().len(), 3);
    }

    #[tokio::test]
    async fn test_transport_failure_is_swallowed() {
        let (transport, mut rx) = RecordingTransport::failing();
        let dispatcher = Dispatcher::new(Arc::new(transport));

        dispatcher.dispatch("payload".to_string());
        assert!(rx.recv().await.is_some());
        assert_eq!(dispatcher.flush(Duration::from_secs(5)).await, 0);
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_flush_gives_up_on_hung_request() {
        let dispatcher = Dispatcher::new(Arc::new(HangingTransport));
        dispatcher.dispatch("stuck".to_string());

        assert_eq!(dispatcher.in_flight(), 1);
        assert_eq!(dispatcher.flush(Duration::from_millis(50)).await, 1);
    }

    #[tokio::test]
    async fn test_panicked_dispatch_is_not_left_in_flight() {
        let dispatcher = Dispatcher::new(Arc::new(PanickingTransport));
        dispatcher.dispatch("boom".to_string());

        let started = std::time::Instant::now();
        assert_eq!(dispatcher.flush(Duration::from_secs(10)).await, 0);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_flush_with_nothing_in_flight() {
        let dispatcher = Dispatcher::new(Arc::new(HangingTransport));
        assert_eq!(dispatcher.flush(Duration::from_millis(10)).await, 0);
    }
}
