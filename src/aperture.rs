//! Harvesting via the Aperture web crawler
//!
//! The crawler is spawned once per URL and writes its extraction result as
//! XML to a temporary file; the plain-text payload sits in the first
//! `plainTextContent` element. Crawler output is known to contain stray
//! control characters which choke the XML parser, so the file is sanitized
//! line by line first. The wait on the crawler is unbounded: a hung crawler
//! blocks the harvest of the record it was invoked for.
use crate::{FulltextError, sanitize::sanitize_fulltext};
use quick_xml::{Reader, events::Event};
use std::{
    fs::File,
    io::{self, BufReader, Read, Write},
    path::Path,
    process::{Command, Stdio},
};
use tempfile::NamedTempFile;
use tracing::{error, instrument, warn};

const PLAIN_TEXT_TAG: &[u8] = b"plainTextContent";

/// Runs the crawler against `url` and returns the extracted plain text.
///
/// Every per-URL failure (unspawnable crawler, abnormal exit, unusable
/// output) is logged and yields empty text. The only `Err` is the inability
/// to create the temporary output file, which poisons the whole harvest
/// environment rather than this one URL.
#[instrument(level = "error", skip_all, fields(url = %url))]
pub(crate) fn fetch(url: &str, webcrawler: &str) -> Result<String, FulltextError> {
    let raw = NamedTempFile::new().map_err(|e| {
        error!("failed to create a temporary file for harvest output: {e}");
        FulltextError::TempFile(e)
    })?;

    match Command::new(webcrawler)
        .arg("-o")
        .arg(raw.path())
        .arg("-x")
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if !status.success() => warn!("crawler exited with {status}"),
        Ok(_) => {}
        // The output file stays empty; the parse below comes up with no
        // payload and the URL contributes no text.
        Err(e) => error!("failed to run the crawler: {e}"),
    }

    let text = match sanitize_output(raw.path()) {
        Ok(sanitized) => match plain_text_content(sanitized.path()) {
            Ok(text) => text.unwrap_or_default(),
            Err(e) => {
                // The sanitized file is retained for post-mortem inspection
                // of whatever made it unparsable.
                match sanitized.into_temp_path().keep() {
                    Ok(path) => error!(
                        "failed to parse crawler output (retained at {}): {e}",
                        path.display()
                    ),
                    Err(keep_err) => {
                        error!("failed to parse crawler output: {e} (retention failed: {keep_err})")
                    }
                }
                String::new()
            }
        },
        Err(e) => {
            error!("failed to sanitize crawler output: {e}");
            String::new()
        }
    };

    Ok(text)
}

/// Rewrites the crawler output with each line passed through the sanitizer.
///
/// Lines are joined without separators, like the Tika stdout capture.
fn sanitize_output(raw: &Path) -> io::Result<NamedTempFile> {
    let mut bytes = Vec::new();
    File::open(raw)?.read_to_end(&mut bytes)?;
    let mut sanitized = NamedTempFile::new()?;
    for line in String::from_utf8_lossy(&bytes).lines() {
        sanitized.write_all(sanitize_fulltext(line).as_bytes())?;
    }
    sanitized.flush()?;
    Ok(sanitized)
}

/// Streams an XML file and returns the text content of the first
/// `plainTextContent` element, `None` when a well-formed document carries no
/// such element.
fn plain_text_content(path: &Path) -> io::Result<Option<String>> {
    let mut reader = Reader::from_reader(BufReader::new(File::open(path)?));
    let mut buf = Vec::new();
    let mut text: Option<String> = None;
    let mut depth = 0usize;
    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf).map_err(invalid_data)?;
        match event {
            Event::Start(e) => {
                if text.is_some() {
                    depth += 1;
                } else if e.local_name().into_inner() == PLAIN_TEXT_TAG {
                    text = Some(String::new());
                }
            }
            Event::Empty(e) => {
                if text.is_none() && e.local_name().into_inner() == PLAIN_TEXT_TAG {
                    return Ok(Some(String::new()));
                }
            }
            Event::End(_) => {
                if text.is_some() {
                    if depth == 0 {
                        return Ok(text);
                    }
                    depth -= 1;
                }
            }
            Event::Text(e) => {
                if let Some(content) = text.as_mut() {
                    match e.unescape() {
                        Ok(t) => content.push_str(&t),
                        Err(_) => {
                            content.push_str(&String::from_utf8_lossy(e.into_inner().as_ref()))
                        }
                    }
                }
            }
            Event::CData(e) => {
                if let Some(content) = text.as_mut() {
                    content.push_str(&String::from_utf8_lossy(e.into_inner().as_ref()));
                }
            }
            Event::Eof => {
                if text.is_some() {
                    return Err(io::ErrorKind::UnexpectedEof.into());
                }
                return Ok(None);
            }
            _ => {}
        }
    }
}

fn invalid_data(e: quick_xml::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}
