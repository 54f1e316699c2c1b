pub mod agent;
pub mod editor;
mod file;
mod http;
pub mod mock;
pub mod reference;
pub mod toast;
mod traits;
pub mod upload;

pub use agent::AgentActions;
pub use editor::{AgentEditor, EditorMode};
pub use file::FileHandle;
pub use http::{HttpService, DEFAULT_API_BASE_URL};
pub use reference::ReferenceLoader;
pub use toast::{ToastRenderer, Toaster};
pub use traits::{AgentApi, ServiceError};
pub use upload::{UploadBatch, UploadEvent, UploadTracker};
