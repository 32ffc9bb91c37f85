//! Dashboard Module - polling consumer
//!
//! Reads the latest batch from a [`StatusSource`] on every poll and turns it
//! into a [`DashboardView`]. A failed poll becomes a view, never an error;
//! the next poll simply tries again.

pub mod render;

use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;

use crate::logic::config::FleetConfig;
use crate::logic::remote::{ClientError, StatusClient};
use crate::logic::scheduler::{Recurring, RecurringHandle};
use crate::logic::status::{ResultBatch, ResultStore, TierCounts};

pub use render::render;

/// Where the consumer reads the latest batch from
pub trait StatusSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<Arc<ResultBatch>, ClientError>> + Send;
}

impl StatusSource for ResultStore {
    async fn fetch(&self) -> Result<Arc<ResultBatch>, ClientError> {
        Ok(self.read())
    }
}

impl StatusSource for StatusClient {
    async fn fetch(&self) -> Result<Arc<ResultBatch>, ClientError> {
        self.query().await.map(Arc::new)
    }
}

/// What one poll shows
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// Nothing published yet
    Waiting,
    /// Peer could not be reached
    Unreachable(String),
    /// Peer answered, but with an error or an unreadable body
    ServiceError(String),
    Live {
        batch: Arc<ResultBatch>,
        counts: TierCounts,
        /// Same batch as the previous poll
        repeated: bool,
    },
}

pub struct Dashboard<S> {
    source: S,
    last_batch: Option<Uuid>,
}

impl<S: StatusSource> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self { source, last_batch: None }
    }

    pub async fn poll(&mut self) -> DashboardView {
        let batch = match self.source.fetch().await {
            Ok(batch) => batch,
            Err(e) => {
                log::warn!("Status poll failed: {}", e);
                return match e {
                    ClientError::TransportUnavailable(reason) => DashboardView::Unreachable(reason),
                    other => DashboardView::ServiceError(other.to_string()),
                };
            }
        };

        if batch.is_empty() {
            return DashboardView::Waiting;
        }

        let repeated = batch.batch_id.is_some() && batch.batch_id == self.last_batch;
        self.last_batch = batch.batch_id;

        DashboardView::Live {
            counts: batch.summary(),
            batch,
            repeated,
        }
    }
}

impl<S: StatusSource + 'static> Dashboard<S> {
    /// Poll on `schedule` and print each rendered view
    pub fn spawn(self, schedule: Recurring, fleet: Arc<FleetConfig>) -> RecurringHandle {
        let dashboard = Arc::new(tokio::sync::Mutex::new(self));
        schedule.spawn(move || {
            let dashboard = dashboard.clone();
            let fleet = fleet.clone();
            async move {
                let view = dashboard.lock().await.poll().await;
                println!("{}", render(&view, &fleet));
            }
        })
    }
}
