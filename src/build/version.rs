use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;
use std::fmt;

/// Version used when `build` is invoked without one.
pub const DEFAULT_VERSION: &str = "1.0.0";

static NUMERIC_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[vV]?([0-9]+)(?:\.([0-9]+))?(?:\.([0-9]+))?(?:\.([0-9]+))?$")
        .expect("version pattern is valid")
});

/// Release label passed to the build, e.g. `1.4.2` or `v2.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLabel(SmolStr);

impl VersionLabel {
    /// Uses `explicit` verbatim, falling back to [`DEFAULT_VERSION`] when it
    /// is absent or blank.
    pub fn resolve(explicit: Option<&str>) -> Self {
        match explicit {
            Some(label) if !label.trim().is_empty() => Self(label.into()),
            _ => Self(DEFAULT_VERSION.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_VERSION
    }

    /// Four-part numeric form required by Windows file metadata.
    ///
    /// `v1.2` becomes `1.2.0.0`; labels such as `nightly` or `1.0.0-rc1`
    /// have no numeric form.
    pub fn numeric(&self) -> Option<String> {
        let caps = NUMERIC_VERSION.captures(&self.0)?;

        let parts: Vec<&str> = (1..=4)
            .map(|i| caps.get(i).map_or("0", |m| m.as_str()))
            .collect();

        Some(parts.join("."))
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
