//! Allocations read model: which batch holds each order line.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{BatchReference, OrderId, Sku};
use domain::ProductEvent;
use tokio::sync::RwLock;

use crate::projection::Projection;
use crate::{ProjectionError, Result};

/// One allocated line of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRow {
    pub sku: Sku,
    pub batch_reference: BatchReference,
}

/// Read model view of current allocations per order.
///
/// Rows are added on `Allocated` and removed on `Deallocated`, so a line
/// that is reallocated moves to its new batch.
#[derive(Clone, Default)]
pub struct AllocationsView {
    orders: Arc<RwLock<HashMap<OrderId, Vec<AllocationRow>>>>,
}

impl AllocationsView {
    /// Creates a new empty allocations view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the allocated lines of an order, in allocation order.
    pub async fn allocations_for(&self, order_id: &OrderId) -> Vec<AllocationRow> {
        self.orders
            .read()
            .await
            .get(order_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of orders with at least one allocated line.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl Projection for AllocationsView {
    fn name(&self) -> &'static str {
        "AllocationsView"
    }

    async fn handle(&self, event: &ProductEvent) -> Result<()> {
        let mut orders = self.orders.write().await;

        match event {
            ProductEvent::Allocated(data) => {
                let rows = orders.entry(data.order_id.clone()).or_default();
                if let Some(existing) = rows.iter().find(|row| row.sku == data.sku) {
                    if existing.batch_reference == data.batch_reference {
                        return Ok(());
                    }
                    return Err(ProjectionError::Projection(format!(
                        "order {} already has {} allocated to batch {}",
                        data.order_id, data.sku, existing.batch_reference
                    )));
                }
                rows.push(AllocationRow {
                    sku: data.sku.clone(),
                    batch_reference: data.batch_reference.clone(),
                });
            }
            ProductEvent::Deallocated(data) => {
                if let Some(rows) = orders.get_mut(&data.order_id) {
                    rows.retain(|row| row.sku != data.sku);
                    if rows.is_empty() {
                        orders.remove(&data.order_id);
                    }
                }
            }
            ProductEvent::OutOfStock(_) => return Ok(()),
        }

        metrics::counter!("projections_events_processed").increment(1);
        tracing::debug!(
            projection = self.name(),
            event_type = event.kind().as_str(),
            "read model updated"
        );
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.orders.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::OrderLine;

    fn allocated(order: &str, sku: &str, batch: &str) -> ProductEvent {
        ProductEvent::allocated(&OrderLine::new(order, sku, 1), BatchReference::new(batch))
    }

    fn deallocated(order: &str, sku: &str) -> ProductEvent {
        ProductEvent::deallocated(OrderLine::new(order, sku, 1))
    }

    #[tokio::test]
    async fn allocated_adds_row() {
        let view = AllocationsView::new();
        view.handle(&allocated("o1", "LAMP", "b1")).await.unwrap();

        assert_eq!(
            view.allocations_for(&OrderId::new("o1")).await,
            vec![AllocationRow {
                sku: Sku::new("LAMP"),
                batch_reference: BatchReference::new("b1"),
            }]
        );
    }

    #[tokio::test]
    async fn unknown_order_has_no_rows() {
        let view = AllocationsView::new();
        assert!(view.allocations_for(&OrderId::new("nope")).await.is_empty());
    }

    #[tokio::test]
    async fn deallocated_removes_only_that_sku() {
        let view = AllocationsView::new();
        view.handle(&allocated("o1", "LAMP", "b1")).await.unwrap();
        view.handle(&allocated("o1", "DESK", "d1")).await.unwrap();
        view.handle(&deallocated("o1", "LAMP")).await.unwrap();

        let rows = view.allocations_for(&OrderId::new("o1")).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sku, Sku::new("DESK"));
    }

    #[tokio::test]
    async fn last_deallocation_forgets_order() {
        let view = AllocationsView::new();
        view.handle(&allocated("o1", "LAMP", "b1")).await.unwrap();
        view.handle(&deallocated("o1", "LAMP")).await.unwrap();
        assert_eq!(view.order_count().await, 0);
    }

    #[tokio::test]
    async fn repeated_allocated_is_ignored() {
        let view = AllocationsView::new();
        view.handle(&allocated("o1", "LAMP", "b1")).await.unwrap();
        view.handle(&allocated("o1", "LAMP", "b1")).await.unwrap();
        assert_eq!(view.allocations_for(&OrderId::new("o1")).await.len(), 1);
    }

    #[tokio::test]
    async fn conflicting_allocation_is_an_error() {
        let view = AllocationsView::new();
        view.handle(&allocated("o1", "LAMP", "b1")).await.unwrap();

        let result = view.handle(&allocated("o1", "LAMP", "b2")).await;
        assert!(matches!(result, Err(ProjectionError::Projection(_))));
        assert_eq!(
            view.allocations_for(&OrderId::new("o1")).await[0].batch_reference,
            BatchReference::new("b1")
        );
    }

    #[tokio::test]
    async fn out_of_stock_is_ignored() {
        let view = AllocationsView::new();
        view.handle(&ProductEvent::out_of_stock(Sku::new("LAMP")))
            .await
            .unwrap();
        assert_eq!(view.order_count().await, 0);
    }

    #[tokio::test]
    async fn reset_clears_view() {
        let view = AllocationsView::new();
        view.handle(&allocated("o1", "LAMP", "b1")).await.unwrap();
        view.reset().await.unwrap();
        assert_eq!(view.order_count().await, 0);
    }
}
