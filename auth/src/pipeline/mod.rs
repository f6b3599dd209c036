pub mod auth_pipeline;
pub mod outcome;
pub mod request;

pub use auth_pipeline::AuthPipeline;
pub use outcome::AuthOutcome;
pub use outcome::RejectReason;
pub use request::extract_bearer;
pub use request::RequestDescriptor;
