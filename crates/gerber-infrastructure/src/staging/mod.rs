//! On-disk staging of session file pairs

pub mod codec;
pub mod files;

pub use codec::StagingError;
pub use files::FileStaging;
