//! User-agent loading.
//!
//! Loading never fails: any problem with the file is logged and the list
//! degrades to [`DEFAULT_USER_AGENT`].

use crate::error::IdentityLoadDegraded;

use log::{debug, error};
use std::fs;
use std::path::Path;

/// Identity used when no user-agent list can be loaded.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/78.0.3904.70 Safari/537.36";

/// Curated list, one user-agent per line.
pub const CURATED_FILE: &str = "useragents.csv";

/// Extended list exported from User-Agent Switcher, quoted fields with a header.
pub const SWITCHER_FILE: &str = "useragentswitcher.csv";

/// Load the user-agent list from `dir`.
///
/// `full` selects the extended switcher export over the curated list. The
/// result is never empty.
pub fn load(dir: &Path, full: bool) -> Vec<String> {
    let file = if full { SWITCHER_FILE } else { CURATED_FILE };
    let path = dir.join(file);
    debug!("Init UA: reading user agents from {}", path.display());

    match try_load(&path, full) {
        Ok(identities) => {
            debug!("Init UA: loaded {} user agents", identities.len());
            identities
        }
        Err(e) => {
            error!("Init UA: {}. Default User-Agent returned.", e);
            vec![DEFAULT_USER_AGENT.to_string()]
        }
    }
}

fn try_load(path: &Path, full: bool) -> Result<Vec<String>, IdentityLoadDegraded> {
    let content = fs::read_to_string(path).map_err(|source| IdentityLoadDegraded::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let identities = if full {
        parse_switcher(&content).map_err(|line| IdentityLoadDegraded::Malformed {
            path: path.to_path_buf(),
            line,
        })?
    } else {
        parse_lines(&content)
    };

    if identities.is_empty() {
        return Err(IdentityLoadDegraded::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(identities)
}

/// One identity per line.
pub(crate) fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Header row, then `"a","b","<identity>",...` records.
///
/// Returns the 1-based line number of the first record without a third field.
pub(crate) fn parse_switcher(content: &str) -> Result<Vec<String>, usize> {
    let mut identities = Vec::new();
    for (idx, line) in content.lines().enumerate().skip(1) {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let field = line.split("\",\"").nth(2).ok_or(idx + 1)?;
        identities.push(field.trim_end_matches('"').to_string());
    }
    Ok(identities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn curated_lines_strip_line_endings() {
        let parsed = parse_lines("agent one\r\nagent two\r\n\r\n");
        assert_eq!(parsed, vec!["agent one", "agent two"]);
    }

    #[test]
    fn switcher_takes_third_field_and_skips_header() {
        let content = "\"Description\",\"Type\",\"User Agent\",\"Extra\"\n\
                       \"Chrome\",\"Browser\",\"Mozilla/5.0 Chrome\",\"x\"\n\
                       \"Bot\",\"Spider\",\"Googlebot/2.1\"\n";
        let parsed = parse_switcher(content).unwrap();
        assert_eq!(parsed, vec!["Mozilla/5.0 Chrome", "Googlebot/2.1"]);
    }

    #[test]
    fn switcher_reports_malformed_line() {
        let content = "header\n\"a\",\"b\",\"ua\"\n\"only\",\"two\"\n";
        assert_eq!(parse_switcher(content), Err(3));
    }

    #[test]
    fn missing_file_degrades_to_default() {
        let dir = tempdir().unwrap();
        let loaded = load(&dir.path().join("nope"), false);
        assert_eq!(loaded, vec![DEFAULT_USER_AGENT.to_string()]);
    }

    #[test]
    fn malformed_switcher_degrades_to_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SWITCHER_FILE), "header\nnot,quoted\n").unwrap();
        assert_eq!(load(dir.path(), true), vec![DEFAULT_USER_AGENT.to_string()]);
    }

    #[test]
    fn empty_file_degrades_to_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CURATED_FILE), "\n\n").unwrap();
        assert_eq!(load(dir.path(), false), vec![DEFAULT_USER_AGENT.to_string()]);
    }

    #[test]
    fn curated_fixture_leaves_no_directory_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(path.join(CURATED_FILE), "ua-1\n").unwrap();
        assert_eq!(load(&path, false), vec!["ua-1"]);
        drop(dir);
        assert!(!path.exists());
    }

    #[test]
    fn loads_curated_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CURATED_FILE), "ua-1\nua-2\nua-3\n").unwrap();
        assert_eq!(load(dir.path(), false), vec!["ua-1", "ua-2", "ua-3"]);
    }

    #[test]
    fn full_mode_reads_switcher_export() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SWITCHER_FILE),
            "\"Description\",\"Type\",\"User Agent\"\n\"Chrome\",\"Browser\",\"ua-full\"\n",
        )
        .unwrap();
        fs::write(dir.path().join(CURATED_FILE), "ua-curated\n").unwrap();

        assert_eq!(load(dir.path(), true), vec!["ua-full"]);
        assert_eq!(load(dir.path(), false), vec!["ua-curated"]);
    }

    #[test]
    fn bundled_lists_load() {
        let dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        assert!(load(&dir, false).len() > 1);
        assert!(load(&dir, true).len() > 1);
    }
}
