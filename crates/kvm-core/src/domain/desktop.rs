//! Desktops: the participating machines and their monitor geometry.
//!
//! A desktop is identified by its name alone, compared case-insensitively.
//! Two [`Desktop`] values carrying the same name describe the same machine
//! even when their display lists differ (for example before and after the
//! machine reported a monitor change).

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rectangle};

/// Case-insensitive machine name.
///
/// The name is normalised by upper-casing; equality, hashing and ordering all
/// use the normalised form while [`fmt::Display`] keeps the original spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DesktopName {
    display: String,
    normalized: String,
}

impl DesktopName {
    pub fn new(name: impl Into<String>) -> Self {
        let display = name.into();
        let normalized = display.to_uppercase();
        Self {
            display,
            normalized,
        }
    }

    /// The upper-cased identity key.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// The name as it was originally spelled.
    pub fn as_str(&self) -> &str {
        &self.display
    }
}

impl PartialEq for DesktopName {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for DesktopName {}

impl Hash for DesktopName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl PartialOrd for DesktopName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DesktopName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl fmt::Display for DesktopName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<String> for DesktopName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for DesktopName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<DesktopName> for String {
    fn from(value: DesktopName) -> Self {
        value.display
    }
}

/// One participating machine and its displays in machine-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desktop {
    pub name: DesktopName,
    /// Monitor rectangles in the order the machine reported them.
    pub displays: Vec<Rectangle>,
    pub primary_display: Option<Rectangle>,
}

impl Desktop {
    pub fn new(
        name: impl Into<DesktopName>,
        displays: Vec<Rectangle>,
        primary_display: Option<Rectangle>,
    ) -> Self {
        Self {
            name: name.into(),
            displays,
            primary_display,
        }
    }

    /// Convenience constructor for a machine with one monitor at the local
    /// origin, which is also its primary.
    pub fn single(name: impl Into<DesktopName>, width: i32, height: i32) -> Self {
        let display = Rectangle::new(0, 0, width, height);
        Self::new(name, vec![display], Some(display))
    }

    /// The primary display, falling back to the first reported display.
    pub fn primary_or_first(&self) -> Option<Rectangle> {
        self.primary_display.or_else(|| self.displays.first().copied())
    }

    /// Returns the local display containing `p`, if any.
    pub fn display_at(&self, p: Point) -> Option<Rectangle> {
        self.displays.iter().copied().find(|d| d.contains(p))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_desktop_name_equality_ignores_case() {
        assert_eq!(DesktopName::new("Name"), DesktopName::new("NAME"));
        assert_eq!(DesktopName::new("office-pc"), DesktopName::new("Office-PC"));
        assert_ne!(DesktopName::new("alpha"), DesktopName::new("beta"));
    }

    #[test]
    fn test_desktop_name_hash_matches_equality() {
        let mut set = HashSet::new();
        set.insert(DesktopName::new("Laptop"));
        assert!(set.contains(&DesktopName::new("LAPTOP")));
        assert!(!set.insert(DesktopName::new("laptop")));
    }

    #[test]
    fn test_desktop_name_display_keeps_original_spelling() {
        let name = DesktopName::new("Office-PC");
        assert_eq!(name.to_string(), "Office-PC");
        assert_eq!(name.normalized(), "OFFICE-PC");
    }

    #[test]
    fn test_primary_or_first_prefers_primary() {
        let left = Rectangle::new(-1280, 0, 1280, 1024);
        let main = Rectangle::new(0, 0, 1920, 1080);
        let desktop = Desktop::new("a", vec![left, main], Some(main));
        assert_eq!(desktop.primary_or_first(), Some(main));

        let without_primary = Desktop::new("a", vec![left, main], None);
        assert_eq!(without_primary.primary_or_first(), Some(left));
    }

    #[test]
    fn test_display_at_finds_containing_monitor() {
        let left = Rectangle::new(-1280, 0, 1280, 1024);
        let main = Rectangle::new(0, 0, 1920, 1080);
        let desktop = Desktop::new("a", vec![left, main], Some(main));
        assert_eq!(desktop.display_at(Point::new(-5, 10)), Some(left));
        assert_eq!(desktop.display_at(Point::new(5, 10)), Some(main));
        assert_eq!(desktop.display_at(Point::new(5, 2000)), None);
    }
}
