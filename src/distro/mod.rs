//! Distribution detection from `/etc/os-release`.
//!
//! Parses the os-release file into a [`Distro`] record and assigns it to
//! one of a closed set of [`Family`] categories. Classification is total
//! (unknown distributions become [`Family::Other`]) and deterministic, so
//! the rest of the tool can match on the family without fallback guessing.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Package-manager ecosystem a distribution belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Debian/Ubuntu and derivatives (apt)
    Debian,
    /// Fedora/RHEL and derivatives (dnf)
    Rhel,
    /// Arch Linux and derivatives (pacman)
    Arch,
    /// openSUSE variants (no supported backend)
    Suse,
    /// Alpine Linux (apk)
    Alpine,
    /// Anything we cannot place in a known ecosystem
    Other,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Debian => "debian",
            Family::Rhel => "rhel",
            Family::Arch => "arch",
            Family::Suse => "suse",
            Family::Alpine => "alpine",
            Family::Other => "other",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected distribution, valid for the lifetime of a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distro {
    pub id: String,
    pub id_like: Vec<String>,
    pub name: String,
    pub pretty_name: String,
    pub version_id: String,
    pub family: Family,
}

impl Distro {
    /// Best human-readable name for display, falling back through the
    /// available fields.
    pub fn display_name(&self) -> &str {
        if !self.pretty_name.is_empty() {
            &self.pretty_name
        } else if !self.name.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("could not read /etc/os-release: {0}")]
    SourceUnavailable(#[from] io::Error),

    #[error("no ID entry in /etc/os-release")]
    MissingId,
}

/// Detect the running distribution from `/etc/os-release`.
pub fn detect() -> Result<Distro, DetectError> {
    detect_at(Path::new(OS_RELEASE_PATH))
}

pub fn detect_at(path: &Path) -> Result<Distro, DetectError> {
    let content = fs::read_to_string(path)?;
    from_os_release(&content)
}

/// Parse os-release content into a classified [`Distro`].
///
/// Lines are `KEY=VALUE` with optional single or double quotes around the
/// value. Blank lines, comments and lines without `=` are skipped.
pub fn from_os_release(content: &str) -> Result<Distro, DetectError> {
    let mut id = String::new();
    let mut id_like_raw = String::new();
    let mut name = String::new();
    let mut pretty_name = String::new();
    let mut version_id = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, val)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_uppercase();
        let val = val
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();

        match key.as_str() {
            "ID" => id = val,
            "ID_LIKE" => id_like_raw = val,
            "NAME" => name = val,
            "PRETTY_NAME" => pretty_name = val,
            "VERSION_ID" => version_id = val,
            _ => {}
        }
    }

    if id.is_empty() {
        return Err(DetectError::MissingId);
    }

    let id_like: Vec<String> = id_like_raw
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();

    let family = classify(&id, &id_like);

    Ok(Distro {
        id,
        id_like,
        name,
        pretty_name,
        version_id,
        family,
    })
}

/// Assign a family from ID, falling back to ID_LIKE. First match wins;
/// the order matters because e.g. a fedora-like derivative must land in
/// Rhel before the catch-all.
fn classify(id: &str, id_like: &[String]) -> Family {
    let id = id.to_lowercase();
    let like: Vec<String> = id_like.iter().map(|s| s.to_lowercase()).collect();
    let has_like = |target: &str| like.iter().any(|l| l == target);

    if matches!(id.as_str(), "debian" | "ubuntu" | "linuxmint" | "raspbian") || has_like("debian")
    {
        return Family::Debian;
    }

    if matches!(
        id.as_str(),
        "rhel" | "centos" | "rocky" | "almalinux" | "fedora"
    ) || has_like("rhel")
        || has_like("fedora")
    {
        return Family::Rhel;
    }

    if matches!(id.as_str(), "arch" | "manjaro") || has_like("arch") {
        return Family::Arch;
    }

    if id.contains("suse") || has_like("suse") {
        return Family::Suse;
    }

    if id == "alpine" {
        return Family::Alpine;
    }

    Family::Other
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const UBUNTU: &str = r#"
NAME="Ubuntu"
VERSION_ID="24.04"
ID=ubuntu
ID_LIKE=debian
PRETTY_NAME="Ubuntu 24.04.1 LTS"
"#;

    #[test]
    fn parses_fields_and_strips_quotes() {
        let d = from_os_release(UBUNTU).unwrap();
        assert_eq!(d.id, "ubuntu");
        assert_eq!(d.id_like, vec!["debian"]);
        assert_eq!(d.name, "Ubuntu");
        assert_eq!(d.pretty_name, "Ubuntu 24.04.1 LTS");
        assert_eq!(d.version_id, "24.04");
        assert_eq!(d.family, Family::Debian);
    }

    #[test]
    fn single_quoted_values_and_comments() {
        let d = from_os_release("# header comment\nID='alpine'\nNAME='Alpine Linux'\n").unwrap();
        assert_eq!(d.id, "alpine");
        assert_eq!(d.name, "Alpine Linux");
        assert_eq!(d.family, Family::Alpine);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let d = from_os_release("garbage line without equals\nID=debian\n").unwrap();
        assert_eq!(d.family, Family::Debian);
    }

    #[test]
    fn missing_id_is_an_error() {
        let err = from_os_release("NAME=Mystery\n").unwrap_err();
        assert!(matches!(err, DetectError::MissingId));
    }

    #[test]
    fn unreadable_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = detect_at(&dir.path().join("does-not-exist")).unwrap_err();
        assert!(matches!(err, DetectError::SourceUnavailable(_)));
    }

    #[test]
    fn detect_at_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("os-release");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(b"ID=fedora\nVERSION_ID=41\n").unwrap();
        let d = detect_at(&path).unwrap();
        assert_eq!(d.family, Family::Rhel);
        assert_eq!(d.version_id, "41");
    }

    #[test]
    fn family_by_id() {
        for (id, family) in [
            ("ubuntu", Family::Debian),
            ("linuxmint", Family::Debian),
            ("raspbian", Family::Debian),
            ("fedora", Family::Rhel),
            ("rocky", Family::Rhel),
            ("almalinux", Family::Rhel),
            ("manjaro", Family::Arch),
            ("opensuse-leap", Family::Suse),
            ("opensuse-tumbleweed", Family::Suse),
            ("alpine", Family::Alpine),
            ("gentoo", Family::Other),
        ] {
            let d = from_os_release(&format!("ID={id}\n")).unwrap();
            assert_eq!(d.family, family, "id={id}");
        }
    }

    #[test]
    fn family_by_id_like_fallback() {
        let d = from_os_release("ID=somedistro\nID_LIKE=\"rhel fedora\"\n").unwrap();
        assert_eq!(d.family, Family::Rhel);

        let d = from_os_release("ID=endeavouros\nID_LIKE=arch\n").unwrap();
        assert_eq!(d.family, Family::Arch);

        let d = from_os_release("ID=pop\nID_LIKE=\"ubuntu debian\"\n").unwrap();
        assert_eq!(d.family, Family::Debian);
    }

    #[test]
    fn classification_is_case_insensitive() {
        let d = from_os_release("ID=Ubuntu\n").unwrap();
        assert_eq!(d.family, Family::Debian);
    }

    #[test]
    fn classification_is_deterministic() {
        let a = from_os_release(UBUNTU).unwrap();
        let b = from_os_release(UBUNTU).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_id_like_is_empty_list() {
        let d = from_os_release("ID=debian\nID_LIKE=\n").unwrap();
        assert!(d.id_like.is_empty());
    }

    #[test]
    fn display_name_falls_back() {
        let d = from_os_release("ID=arch\n").unwrap();
        assert_eq!(d.display_name(), "arch");
        let d = from_os_release("ID=arch\nNAME=\"Arch Linux\"\n").unwrap();
        assert_eq!(d.display_name(), "Arch Linux");
    }
}
