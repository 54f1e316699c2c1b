pub mod agent;
pub mod attachment;
pub mod draft;
pub mod error;
pub mod reference;
pub mod test_call;
pub mod toast;
pub mod upload;

pub use agent::{Agent, AgentTools, CallType};
pub use attachment::Attachment;
pub use draft::{AgentDraft, RequiredField, TestCallDraft};
pub use error::ValidationError;
pub use upload::{FileId, FileStatus, UploadedFile};
