use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

/// Domain events emitted after a write has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    CustomerCreated(i32),
    CustomerUpdated(i32),
    CustomerDeleted(i32),
    SupplierCreated(i32),
    SupplierUpdated(i32),
    SupplierDeleted(i32),
    CategoryCreated(i32),
    CategoryUpdated(i32),
    CategoryDeleted(i32),
    WarehouseCreated(i32),
    WarehouseUpdated(i32),
    WarehouseDeleted(i32),
    ProductCreated(i32),
    ProductUpdated(i32),
    ProductDeleted(i32),

    /// Net change applied to a product's on-hand quantity
    StockAdjusted { product_id: i32, delta: i64 },

    TransactionRecorded(i32),
    TransactionUpdated(i32),
    TransactionDeleted(i32),

    SalesOrderCreated(i32),
    SalesOrderStatusChanged {
        order_id: i32,
        old_status: String,
        new_status: String,
    },
    SalesOrderDeleted(i32),

    PurchaseOrderCreated(i32),
    PurchaseOrderStatusChanged {
        order_id: i32,
        old_status: String,
        new_status: String,
    },
    PurchaseOrderDeleted(i32),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Queues an event without waiting; a full or closed channel is logged,
    /// never surfaced to the caller.
    pub fn send_or_log(&self, event: Event) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(?event, "event channel full; dropping domain event");
            }
            Err(TrySendError::Closed(event)) => {
                warn!(?event, "event channel closed; dropping domain event");
            }
        }
    }

    /// Queues a batch of events in order.
    pub fn send_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.send_or_log(event);
        }
    }
}

/// Consumes events until every sender has been dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::StockAdjusted { product_id, delta } => {
                info!(product_id, delta, "stock adjusted");
            }
            Event::SalesOrderStatusChanged {
                order_id,
                old_status,
                new_status,
            }
            | Event::PurchaseOrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(order_id, %old_status, %new_status, "order status changed");
            }
            other => info!("Received event: {:?}", other),
        }
    }

    info!("Event channel closed; stopping event processing loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_are_delivered_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send_all([
                Event::ProductCreated(1),
                Event::StockAdjusted {
                    product_id: 1,
                    delta: -4,
                },
            ]);

        assert_eq!(rx.recv().await, Some(Event::ProductCreated(1)));
        assert_eq!(
            rx.recv().await,
            Some(Event::StockAdjusted {
                product_id: 1,
                delta: -4
            })
        );
    }

    #[tokio::test]
    async fn closed_channel_does_not_fail_caller() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::CustomerCreated(1)).await.is_err());
        sender.send_or_log(Event::CustomerCreated(1));
    }

    #[tokio::test]
    async fn full_channel_drops_instead_of_waiting() {
        let (tx, mut rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);

        sender.send_all([Event::CategoryCreated(1), Event::CategoryCreated(2)]);
        drop(sender);

        assert_eq!(rx.recv().await, Some(Event::CategoryCreated(1)));
        assert_eq!(rx.recv().await, None);
    }
}
