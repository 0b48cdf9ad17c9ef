//! Order admission core: requests, scoring, the admission queue, the scheduler loop and
//! the locks and events around it.

pub mod admin;
pub mod admission;
pub mod audit;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod gateway;
pub mod request;
pub mod scheduler;
pub mod score;

pub use admin::{AdminConsole, AdminGateway, NewProduct, ProductDraft};
pub use admission::AdmissionQueue;
pub use audit::{customer_record, request_record, AuditRecord, AuditSink, InMemoryAuditSink};
pub use coordinator::{Coordinator, CoordinatorGuard};
pub use error::{
    classify_message, AdminError, AppResult, GatewayError, OutcomeKind, RequestError,
    SchedulerError,
};
pub use events::{EventBus, EventKind, LogLevel, SchedulerEvent};
pub use gateway::{Catalog, CompletionGateway, CustomerRecord, ProductRecord};
pub use request::{
    CustomerId, CustomerRef, OrderId, OrderRequest, ProductId, ProductRef, SnapshotEntry, Tier,
};
pub use scheduler::{CycleReport, OrderScheduler, SchedulerState, SchedulerStats};
pub use score::{score, score_at};
