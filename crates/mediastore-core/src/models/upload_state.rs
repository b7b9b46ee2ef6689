use std::fmt::{Display, Formatter, Result as FmtResult};

/// Protocol state of one upload attempt.
///
/// `Requested → Reserved → DataReceived → Finalized`. A `Reserved` attempt whose staging
/// entry is gone when its bytes arrive is recorded as `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Requested,
    Reserved,
    DataReceived,
    Finalized,
    Expired,
}

impl Display for UploadState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            UploadState::Requested => "requested",
            UploadState::Reserved => "reserved",
            UploadState::DataReceived => "data_received",
            UploadState::Finalized => "finalized",
            UploadState::Expired => "expired",
        };
        f.write_str(s)
    }
}
