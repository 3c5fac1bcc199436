//! In-process message source backed by a broadcast channel.

use super::ports::{ChannelMessage, MessageSource};
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Fans published messages out to every current subscriber.
///
/// Messages published while nobody is subscribed are dropped, the same way
/// a chat transport drops messages nobody is listening for.
#[derive(Debug, Clone)]
pub struct BroadcastSource {
    tx: broadcast::Sender<ChannelMessage>,
}

impl BroadcastSource {
    /// Creates a source buffering up to `capacity` messages per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes a message. Returns how many subscribers received it.
    pub fn publish(&self, message: ChannelMessage) -> usize {
        self.tx.send(message).unwrap_or_else(|_| {
            debug!("No subscribers, message dropped");
            0
        })
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl MessageSource for BroadcastSource {
    fn subscribe(&self) -> BoxStream<'static, ChannelMessage> {
        futures::stream::unfold(self.tx.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(message) => return Some((message, rx)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Subscriber lagged, messages skipped");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ParticipantId;
    use chrono::Utc;

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let source = BroadcastSource::new(8);
        assert_eq!(source.subscriber_count(), 0);
        let mut stream = source.subscribe();
        assert_eq!(source.subscriber_count(), 1);

        for text in ["one", "two"] {
            source.publish(ChannelMessage::new(
                ParticipantId::from("alice"),
                text.to_string(),
                Utc::now(),
            ));
        }
        assert_eq!(stream.next().await.unwrap().text, "one");
        assert_eq!(stream.next().await.unwrap().text, "two");

        drop(stream);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let source = BroadcastSource::new(8);
        let sent = source.publish(ChannelMessage::new(
            ParticipantId::from("alice"),
            "hello".to_string(),
            Utc::now(),
        ));
        assert_eq!(sent, 0);
    }
}
