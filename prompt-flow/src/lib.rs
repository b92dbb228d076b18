pub mod error;
pub mod invoker;
pub mod model;
#[cfg(feature = "rig")]
pub mod openrouter;
pub mod output;
pub mod template;
pub mod validate;

// Re-export commonly used types
pub use error::{FieldViolation, FlowError, Result, ValidationError};
pub use invoker::{PromptDefinition, PromptInvoker};
pub use model::{InvocationError, ModelClient, ModelRequest};
#[cfg(feature = "rig")]
pub use openrouter::OpenRouterModel;
pub use template::PromptTemplate;
pub use validate::{FieldChecks, Validate};
