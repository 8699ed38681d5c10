//! wiki-core: store de registros + motor de aprobaciones
pub mod approval;
pub mod audit;
pub mod errors;
pub mod hashing;
pub mod store;
pub mod table;

pub use approval::{DecisionKind, DecisionOutcome, NewApprovalRequest, NewApprovalStep, RequestStatus, RequestView,
                   StepStatus};
pub use errors::CoreError;
pub use store::{Record, RecordStore};
pub use table::Table;
