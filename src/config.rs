//! Facilities for reading runtime configuration values
use crate::FulltextError;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::trace;

/// Harvester configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Explicit parser selection (`"aperture"` or `"tika"`, case-insensitive).
    ///
    /// When unset the parser is inferred from whichever backend table is
    /// present, Aperture first.
    pub parser: Option<String>,

    /// Aperture backend settings.
    pub aperture: Option<ApertureConfig>,

    /// Tika backend settings.
    pub tika: Option<TikaConfig>,
}

/// Settings for the Aperture web crawler backend.
#[derive(Debug, Deserialize)]
pub struct ApertureConfig {
    /// The path to the crawler executable.
    pub webcrawler: String,
}

/// Settings for the Tika extractor backend.
#[derive(Debug, Deserialize)]
pub struct TikaConfig {
    /// The path to the extractor jar.
    pub path: String,

    /// The Java runtime used to run the extractor.
    #[serde(default = "TikaConfig::default_java")]
    pub java: String,
}

impl TikaConfig {
    fn default_java() -> String {
        "java".to_string()
    }
}

impl Config {
    /// Constructs `Config` from a `toml` file and environment variables
    pub fn new() -> Result<Self, FulltextError> {
        let config: Self = Figment::new()
            .merge(Toml::file("fulltext.toml"))
            .merge(Env::prefixed("FULLTEXT__").split("__"))
            .extract()?;
        trace!("final config: {config:#?}");
        Ok(config)
    }
}

/// The active extraction backend and its connection parameters.
///
/// Exactly one variant is active per harvest request. `None` means
/// harvesting is disabled; this is a normal state, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserSettings {
    /// No backend configured: harvesting is a no-op.
    None,

    /// Aperture-style web crawler writing XML output to a file.
    Aperture {
        /// The path to the crawler executable.
        webcrawler: String,
    },

    /// Tika-style extractor streaming plain text on stdout.
    Tika {
        /// The path to the extractor jar.
        jar: String,

        /// The Java runtime used to run the extractor.
        java: String,
    },
}

impl ParserSettings {
    /// Determines the active backend from resolved configuration values.
    ///
    /// An explicit `parser` selector wins even when the matching backend
    /// table is absent: the selection is honored with an empty path, every
    /// spawn attempt then fails and the harvesters absorb that as empty
    /// text. Without a selector the first configured backend wins, Aperture
    /// before Tika. Never fails; an unrecognized selector or a blank
    /// configuration resolves to [`ParserSettings::None`].
    pub fn resolve(config: &Config) -> Self {
        let parser = config.parser.as_deref().map(str::to_lowercase);

        let webcrawler = config.aperture.as_ref().map(|a| a.webcrawler.clone());
        if (parser.is_none() && webcrawler.is_some()) || parser.as_deref() == Some("aperture") {
            return ParserSettings::Aperture {
                webcrawler: webcrawler.unwrap_or_default(),
            };
        }

        let tika = config.tika.as_ref();
        if (parser.is_none() && tika.is_some()) || parser.as_deref() == Some("tika") {
            return ParserSettings::Tika {
                jar: tika.map(|t| t.path.clone()).unwrap_or_default(),
                java: tika
                    .map(|t| t.java.clone())
                    .unwrap_or_else(TikaConfig::default_java),
            };
        }

        ParserSettings::None
    }
}
