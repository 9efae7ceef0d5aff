use std::sync::Arc;

use async_trait::async_trait;
use domain::ProductEvent;
use projections::Projection;

use crate::Result;
use crate::handlers::EventHandler;
use crate::unit_of_work::UnitOfWork;

/// Feeds events into a read model projection.
pub struct UpdateReadModel {
    projection: Arc<dyn Projection>,
}

impl UpdateReadModel {
    pub fn new(projection: Arc<dyn Projection>) -> Self {
        Self { projection }
    }
}

#[async_trait]
impl EventHandler for UpdateReadModel {
    fn name(&self) -> &'static str {
        "UpdateReadModel"
    }

    async fn handle(&self, event: &ProductEvent, _uow: &mut UnitOfWork) -> Result<()> {
        self.projection.handle(event).await?;
        Ok(())
    }
}
