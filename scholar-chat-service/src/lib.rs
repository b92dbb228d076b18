pub mod config;
pub mod controller;
pub mod error;
pub mod flows;
pub mod ingest;
pub mod models;
pub mod notices;
pub mod service;
pub mod session;
pub mod storage;

pub use config::{ConfigError, FlowCapabilities, LogFormat, ServiceConfig};
pub use controller::{OrchestrationController, PaperSubmission, PendingAnswer, PendingSubmission};
pub use error::{Result, ServiceError};
pub use flows::PaperFlows;
pub use ingest::{IngestError, PaperFile, decode_paper, read_paper_file};
pub use models::*;
pub use service::{AppState, build_router, create_app};
pub use session::{
    BusyFlags, Generation, KeywordsState, SessionPhase, SessionSnapshot, SessionState,
    SummaryState,
};
pub use storage::{InMemorySessionStorage, SessionStorage};
