//! Per-record harvest orchestration
use crate::{
    FulltextError, aperture,
    config::{Config, ParserSettings},
    tika,
};
use tracing::debug;

/// Extracts and accumulates document text for one metadata record.
///
/// The harvester is stateless apart from the resolved backend settings.
/// URLs are processed strictly sequentially in input order and their texts
/// concatenated without separators, so the caller's ordering determines the
/// layout of the final blob.
#[derive(Debug)]
pub struct Harvester {
    settings: ParserSettings,
}

impl Harvester {
    /// Creates a harvester with the backend resolved from `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_settings(ParserSettings::resolve(config))
    }

    /// Creates a harvester over already resolved backend settings.
    pub fn with_settings(settings: ParserSettings) -> Self {
        Self { settings }
    }

    /// Returns the accumulated plain text for the documents behind `urls`.
    ///
    /// `Ok(None)` means harvesting is disabled by configuration, as opposed
    /// to `Ok(Some(""))` which means the active backend produced nothing.
    /// Literal spaces in each URL are encoded as `%20` before anything else
    /// happens; when `extension` is given, only URLs whose encoded form ends
    /// with that exact suffix are dispatched. A failure on one URL is
    /// confined to that URL. The only escalating condition is the inability
    /// to create a temporary file, which marks the whole environment as
    /// unusable.
    pub fn harvest<I, S>(
        &self,
        urls: I,
        extension: Option<&str>,
    ) -> Result<Option<String>, FulltextError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if matches!(self.settings, ParserSettings::None) {
            return Ok(None);
        }

        let mut result = String::new();
        for url in urls {
            let current = url.as_ref().replace(' ', "%20");
            if extension.is_some_and(|ext| !current.ends_with(ext)) {
                debug!("skipping {current}: extension filter does not match");
                continue;
            }
            match &self.settings {
                ParserSettings::Aperture { webcrawler } => {
                    result.push_str(&aperture::fetch(&current, webcrawler)?)
                }
                ParserSettings::Tika { jar, java } => {
                    result.push_str(&tika::fetch(&current, jar, java))
                }
                ParserSettings::None => unreachable!(),
            }
        }
        Ok(Some(result))
    }
}
