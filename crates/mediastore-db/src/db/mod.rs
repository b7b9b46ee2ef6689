//! Store implementations
//
// Repositories and collections
pub mod namespace;
//
// Upload reservations with expiry
pub mod staging;
//
// Finalized file records
pub mod file_index;
