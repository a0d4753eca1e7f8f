//! Harvesting via the Tika extractor
//!
//! The extractor runs under a Java runtime and streams the extracted text
//! as UTF-8 lines on stdout, with diagnostics on stderr. Both pipes are
//! drained concurrently: once the OS buffer for an undrained stderr fills
//! up, the subprocess blocks on its next diagnostic write and the harvest
//! deadlocks. The wait on the extractor is unbounded.
use crate::sanitize::sanitize_fulltext;
use std::{
    io::{BufRead, BufReader},
    process::{Command, Stdio},
    thread,
};
use tracing::{debug, error, instrument, warn};

/// Runs the extractor against `url` and returns the captured plain text.
///
/// Stdout lines are accumulated without separators and sanitized as one
/// blob. Failures are logged and degrade to whatever text was captured up
/// to that point, possibly none; nothing is propagated to the caller.
#[instrument(level = "error", skip_all, fields(url = %url))]
pub(crate) fn fetch(url: &str, jar: &str, java: &str) -> String {
    let mut child = match Command::new(java)
        .arg("-jar")
        .arg(jar)
        .arg("-t")
        .arg("-eutf8")
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            error!("failed to spawn the extractor: {e}");
            return String::new();
        }
    };

    let stderr = child.stderr.take().unwrap();
    let drain = thread::spawn(move || {
        for line in BufReader::new(stderr).lines() {
            match line {
                Ok(line) => debug!("Tika(err): {line}"),
                Err(_) => break,
            }
        }
    });

    let stdout = child.stdout.take().unwrap();
    let mut lines: Vec<String> = Vec::new();
    for line in BufReader::new(stdout).lines() {
        match line {
            Ok(line) => lines.push(line),
            Err(e) => {
                error!("failed to read the extractor output: {e}");
                break;
            }
        }
    }

    match child.wait() {
        Ok(status) if !status.success() => warn!("extractor exited with {status}"),
        Ok(_) => {}
        Err(e) => error!("failed to reap the extractor: {e}"),
    }
    if drain.join().is_err() {
        warn!("stderr drain thread panicked");
    }

    sanitize_fulltext(&lines.concat())
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::test_utils::fake_tool;
    use tempfile::TempDir;

    #[test]
    fn captures_stdout_lines_without_separator() {
        let dir = TempDir::new().unwrap();
        let java = fake_tool(
            dir.path(),
            "java",
            "echo 'first line'\necho 'second line'\necho 'diagnostic noise' >&2",
        );
        let text = fetch("http://x/doc.pdf", "/tika.jar", java.to_str().unwrap());
        assert_eq!(text, "first linesecond line");
    }

    #[test]
    fn output_is_sanitized() {
        let dir = TempDir::new().unwrap();
        let java = fake_tool(dir.path(), "java", "printf 'bad\\001char\\n'");
        let text = fetch("http://x/doc.pdf", "/tika.jar", java.to_str().unwrap());
        assert_eq!(text, "bad char");
    }

    #[test]
    fn url_is_the_final_argument() {
        let dir = TempDir::new().unwrap();
        let java = fake_tool(dir.path(), "java", "echo \"$5\"");
        let text = fetch("http://x/a%20b.pdf", "/tika.jar", java.to_str().unwrap());
        assert_eq!(text, "http://x/a%20b.pdf");
    }

    #[test]
    fn unspawnable_runtime_yields_empty_text() {
        assert_eq!(fetch("http://x/doc.pdf", "/tika.jar", "/nonexistent/java"), "");
    }

    #[test]
    fn failing_extractor_yields_captured_text() {
        let dir = TempDir::new().unwrap();
        let java = fake_tool(dir.path(), "java", "echo 'partial'\nexit 3");
        let text = fetch("http://x/doc.pdf", "/tika.jar", java.to_str().unwrap());
        assert_eq!(text, "partial");
    }

    #[test]
    fn noisy_stderr_does_not_deadlock() {
        let dir = TempDir::new().unwrap();
        // Far more than a pipe buffer's worth of diagnostics.
        let java = fake_tool(
            dir.path(),
            "java",
            "i=0\n\
             while [ $i -lt 20000 ]; do\n\
             echo 'the quick brown fox jumps over the lazy dog' >&2\n\
             i=$((i+1))\n\
             done\n\
             echo 'done'",
        );
        let text = fetch("http://x/doc.pdf", "/tika.jar", java.to_str().unwrap());
        assert_eq!(text, "done");
    }
}
