//! Downloading located packages and unpacking them into the cache

mod download;
mod unpack;

pub use download::{AcquisitionOutcome, Downloader, CONFIRM_PROMPT};
pub use unpack::{Unpacker, UNPACKED_ARCHIVE};
