pub mod api;
pub mod inbox;
pub mod model;
pub mod submitter;

pub use api::CaptureApi;
pub use inbox::{InboxQuery, SortOrder};
pub use model::{
    CaptureKind, CapturePayload, CaptureReceipt, CaptureStatus, CaptureSummary, WindowContext,
};
pub use submitter::CaptureSubmitter;
