//! Upload protocol: reserve a fid, transfer bytes, finalize.
//!
//! `apply` reserves a staging entry for a new fid. `single_upload` streams the object
//! body under that fid and promotes the staging entry into a file record. Both run as an
//! ordered list of [`UploadStep`]s bound to the caller's [`RequestContext`](crate::RequestContext).

mod coordinator;
mod pipeline;

pub use coordinator::{SignedUrl, UploadCoordinator, UploadSettings};
pub use pipeline::{PipelineRun, UploadStep, APPLY_STEPS, SINGLE_UPLOAD_STEPS};
