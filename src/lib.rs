//! Fulltext harvesting backend
//!
//! Given the document URLs found in one bibliographic metadata record, this
//! library drives an external extraction tool per URL and returns the
//! concatenated plain text, ready to be fed to the search index. Two tool
//! families are supported: an Aperture-style web crawler which writes its
//! result as XML to a file, and a Tika-style extractor which streams the
//! text on its standard output. The active tool is picked from the runtime
//! configuration; with no tool configured harvesting is disabled and callers
//! get `None`.
//!
//! A failing tool invocation never fails the record: the offending URL
//! contributes no text and processing moves on. The one fatal condition is
//! the inability to allocate a temporary file, which means the execution
//! environment is unusable.
use thiserror::Error;

mod aperture;
pub mod config;
pub mod harvest;
pub mod sanitize;
#[cfg(test)]
mod test_utils;
mod tika;

pub use config::{Config, ParserSettings};
pub use harvest::Harvester;
pub use sanitize::sanitize_fulltext;

#[derive(Error, Debug)]
pub enum FulltextError {
    /// Wrapper for [`figment::Error`](https://docs.rs/figment/latest/figment/struct.Error.html)
    #[error("config deserialization: {0:?}")]
    ConfigDeserialization(#[from] figment::Error),

    /// Unable to allocate a temporary file to receive harvested output.
    #[error("failed to create a temporary file for harvest output: {0:?}")]
    TempFile(std::io::Error),
}
