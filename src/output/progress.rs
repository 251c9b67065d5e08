//! Built-in progress sinks

use crate::output::traits::{CrawlEvent, ProgressSink};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&self, event: CrawlEvent) {
        match event {
            CrawlEvent::PageFetched { url } => debug!("Fetched {}", url),
            CrawlEvent::PageSaved { url, filename } => info!("Saved {} -> {}", url, filename),
            CrawlEvent::PageFailed { url, reason } => warn!("Failed {}: {}", url, reason),
            CrawlEvent::CrawlComplete { pages } => info!("Crawl complete: {} pages saved", pages),
        }
    }
}

/// Forwards events into an unbounded tokio channel
///
/// Events emitted after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: UnboundedSender<CrawlEvent>,
}

impl ChannelProgress {
    /// Creates a sink and the receiver that observes it
    pub fn channel() -> (Self, UnboundedReceiver<CrawlEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressSink for ChannelProgress {
    fn emit(&self, event: CrawlEvent) {
        let _ = self.sender.send(event);
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn emit(&self, _event: CrawlEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn test_channel_progress_forwards_in_order() {
        let (sink, mut rx) = ChannelProgress::channel();
        let url = Url::parse("https://example.com/").unwrap();

        sink.emit(CrawlEvent::PageFetched { url: url.clone() });
        sink.emit(CrawlEvent::CrawlComplete { pages: 1 });
        drop(sink);

        assert_eq!(rx.recv().await, Some(CrawlEvent::PageFetched { url }));
        assert_eq!(rx.recv().await, Some(CrawlEvent::CrawlComplete { pages: 1 }));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_channel_progress_ignores_closed_receiver() {
        let (sink, rx) = ChannelProgress::channel();
        drop(rx);
        sink.emit(CrawlEvent::CrawlComplete { pages: 0 });
    }
}
