//! URL lists in the engine's batch-file format.

use std::fs;
use std::io;
use std::path::Path;

/// Read the URLs listed in `path`. Bytes that are not valid UTF-8 are dropped.
pub fn read_source(path: &Path) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).replace(char::REPLACEMENT_CHARACTER, "");
    Ok(parse_batch(&text))
}

/// One URL per line. Blank lines and lines starting with `#`, `;` or `]` are
/// skipped, and anything after whitespace followed by `#` is a comment.
pub fn parse_batch(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_start_matches('\u{feff}').trim())
        .filter(|line| !line.is_empty() && !line.starts_with(['#', ';', ']']))
        .map(|line| strip_trailing_comment(line).to_string())
        .collect()
}

fn strip_trailing_comment(line: &str) -> &str {
    let mut prev_space = false;
    for (at, c) in line.char_indices() {
        if c == '#' && prev_space {
            return line[..at].trim_end();
        }
        prev_space = c.is_whitespace();
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines() {
        let text = "\u{feff}https://a\n\n  # comment\n; also\n]skip\nhttps://b   # trailing\nhttps://c#frag\n";
        assert_eq!(
            parse_batch(text),
            ["https://a", "https://b", "https://c#frag"]
        );
    }

    #[test]
    fn crlf_lines() {
        assert_eq!(parse_batch("x\r\ny\r\n"), ["x", "y"]);
    }

    #[test]
    fn invalid_utf8_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.txt");
        fs::write(&path, b"https://ok\n\xff\xfe\nhttps://also\n").unwrap();
        assert_eq!(read_source(&path).unwrap(), ["https://ok", "https://also"]);
    }

    #[test]
    fn empty_file_has_no_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();
        assert!(read_source(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_source(&dir.path().join("nope")).is_err());
    }
}
