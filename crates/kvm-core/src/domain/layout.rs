//! Virtual display layout domain entity.
//!
//! The layout tiles every desktop's monitors into one global coordinate space.
//! Desktops are placed left to right in the order given, each shifted
//! horizontally so that its leftmost local display edge lands on the running
//! X offset, and vertically by its configured Y offset.
//!
//! A layout is an immutable snapshot.  Whenever the roster, the ordering, the
//! offsets or any desktop's monitors change, a fresh layout is built and the
//! old one is dropped; [`DisplayId`] is what lets callers find "the same
//! monitor" again after its global rectangle moved.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::desktop::{Desktop, DesktopName};
use super::geometry::{Point, Rectangle};

/// Namespace for the name-based (v5) UUIDs behind [`DisplayId`].
const DISPLAY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6b76_6d2d_6d65_7368_2d64_6973_706c_6179);

/// Errors that can occur when building a layout.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// The same desktop (case-insensitively) appears twice in the input list.
    #[error("desktop listed more than once: {0}")]
    DuplicateDesktop(DesktopName),

    /// A display rectangle has a negative width or height.
    #[error("invalid display {display:?} on desktop {desktop}")]
    InvalidDisplay {
        desktop: DesktopName,
        display: Rectangle,
    },
}

/// Stable identity of one physical monitor.
///
/// Derived from the owning desktop's normalised name and the monitor's
/// *local* rectangle, so it survives layout rebuilds that only move the
/// monitor in global space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayId(Uuid);

impl DisplayId {
    pub fn for_display(desktop: &DesktopName, local: &Rectangle) -> Self {
        let key = format!(
            "{}:{},{},{},{}",
            desktop.normalized(),
            local.x,
            local.y,
            local.width,
            local.height
        );
        Self(Uuid::new_v5(&DISPLAY_ID_NAMESPACE, key.as_bytes()))
    }
}

/// One monitor placed in global space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDisplay {
    pub id: DisplayId,
    pub desktop: DesktopName,
    /// Rectangle in the owning machine's local coordinates.
    pub local: Rectangle,
    /// Rectangle in global coordinates.
    pub global: Rectangle,
}

/// The global tiling of all displays of all desktops.
#[derive(Debug, Clone, Default)]
pub struct DisplayLayout {
    /// Every display in layout order; [`find_point`](Self::find_point) scans this.
    displays: Vec<LayoutDisplay>,
    desktop_by_rect: HashMap<Rectangle, DesktopName>,
    origins: HashMap<DesktopName, Point>,
    rect_by_id: HashMap<DisplayId, Rectangle>,
    id_by_rect: HashMap<Rectangle, DisplayId>,
}

impl DisplayLayout {
    /// Builds the layout for `desktops` (in placement order) with optional
    /// per-desktop vertical offsets.  Desktops missing from `y_offsets` sit at
    /// Y = 0.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DuplicateDesktop`] if a name occurs twice and
    /// [`LayoutError::InvalidDisplay`] for a display with negative size.
    pub fn build(
        desktops: &[Desktop],
        y_offsets: &HashMap<DesktopName, i32>,
    ) -> Result<Self, LayoutError> {
        let mut seen = HashSet::with_capacity(desktops.len());
        for desktop in desktops {
            if !seen.insert(&desktop.name) {
                return Err(LayoutError::DuplicateDesktop(desktop.name.clone()));
            }
            if let Some(bad) = desktop
                .displays
                .iter()
                .find(|d| d.width < 0 || d.height < 0)
            {
                return Err(LayoutError::InvalidDisplay {
                    desktop: desktop.name.clone(),
                    display: *bad,
                });
            }
        }

        let mut layout = Self::default();
        let mut x_offset = 0;

        for desktop in desktops {
            let min_left = desktop.displays.iter().map(Rectangle::left).min().unwrap_or(0);
            let max_right = desktop.displays.iter().map(Rectangle::right).max().unwrap_or(0);
            let desktop_width = max_right - min_left;
            let left_offset = -min_left;
            let primary_x = desktop.primary_display.map_or(0, |p| p.x);
            let y_offset = y_offsets.get(&desktop.name).copied().unwrap_or(0);

            let origin = Point::new(x_offset + primary_x + left_offset, y_offset);
            layout.origins.insert(desktop.name.clone(), origin);

            for local in &desktop.displays {
                let global = local.offset(origin.x, origin.y);
                let id = DisplayId::for_display(&desktop.name, local);
                layout.desktop_by_rect.insert(global, desktop.name.clone());
                layout.rect_by_id.insert(id, global);
                layout.id_by_rect.insert(global, id);
                layout.displays.push(LayoutDisplay {
                    id,
                    desktop: desktop.name.clone(),
                    local: *local,
                    global,
                });
            }

            x_offset += desktop_width;
        }

        tracing::trace!(
            desktops = desktops.len(),
            displays = layout.displays.len(),
            "display layout built"
        );
        Ok(layout)
    }

    /// All displays in layout order.
    pub fn displays(&self) -> &[LayoutDisplay] {
        &self.displays
    }

    pub fn len(&self) -> usize {
        self.displays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    /// Returns the first display (in layout order) containing the global
    /// point `p`, or `None` if `p` lies in a gap.
    pub fn find_point(&self, p: Point) -> Option<&LayoutDisplay> {
        self.displays.iter().find(|d| d.global.contains(p))
    }

    /// Returns the desktop owning the global rectangle `rect`.
    pub fn desktop_of(&self, rect: &Rectangle) -> Option<&DesktopName> {
        self.desktop_by_rect.get(rect)
    }

    /// Returns the global position of `desktop`'s local origin.
    pub fn origin(&self, desktop: &DesktopName) -> Option<Point> {
        self.origins.get(desktop).copied()
    }

    pub fn contains_desktop(&self, desktop: &DesktopName) -> bool {
        self.origins.contains_key(desktop)
    }

    /// Translates a point local to `desktop` into global coordinates.
    pub fn to_global(&self, desktop: &DesktopName, local: Point) -> Option<Point> {
        self.origin(desktop).map(|o| local.offset(o.x, o.y))
    }

    /// Translates a global point into `desktop`'s local coordinates.
    pub fn to_local(&self, desktop: &DesktopName, global: Point) -> Option<Point> {
        self.origin(desktop).map(|o| global.offset(-o.x, -o.y))
    }

    /// Translates a rectangle local to `desktop` into global coordinates.
    pub fn global_rect(&self, desktop: &DesktopName, local: Rectangle) -> Option<Rectangle> {
        self.origin(desktop).map(|o| local.offset(o.x, o.y))
    }

    /// Returns the stable id of the display currently at global `rect`.
    pub fn id_of(&self, rect: &Rectangle) -> Option<DisplayId> {
        self.id_by_rect.get(rect).copied()
    }

    /// Returns the global rectangle of the display with `id` in this layout.
    pub fn display(&self, id: DisplayId) -> Option<Rectangle> {
        self.rect_by_id.get(&id).copied()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn no_offsets() -> HashMap<DesktopName, i32> {
        HashMap::new()
    }

    fn build(desktops: &[Desktop]) -> DisplayLayout {
        DisplayLayout::build(desktops, &no_offsets()).expect("layout must build")
    }

    // ── Construction ──────────────────────────────────────────────────────────

    #[test]
    fn test_single_desktop_layout_equals_local_rectangle() {
        let layout = build(&[Desktop::single("A", 1920, 1080)]);

        assert_eq!(layout.len(), 1);
        assert_eq!(layout.displays()[0].global, Rectangle::new(0, 0, 1920, 1080));
        assert_eq!(layout.origin(&"A".into()), Some(Point::new(0, 0)));
    }

    #[test]
    fn test_second_desktop_is_placed_right_of_first() {
        let layout = build(&[
            Desktop::single("A", 1920, 1080),
            Desktop::single("B", 1920, 1080),
        ]);

        let b = layout
            .displays()
            .iter()
            .find(|d| d.desktop == DesktopName::new("B"))
            .expect("B must be laid out");
        assert_eq!(b.global, Rectangle::new(1920, 0, 1920, 1080));
    }

    #[test]
    fn test_y_offset_shifts_desktop_vertically() {
        let mut offsets = HashMap::new();
        offsets.insert(DesktopName::new("b"), 120);

        let layout = DisplayLayout::build(
            &[
                Desktop::single("A", 1920, 1080),
                Desktop::single("B", 2560, 1440),
            ],
            &offsets,
        )
        .unwrap();

        assert_eq!(layout.origin(&"B".into()), Some(Point::new(1920, 120)));
    }

    #[test]
    fn test_display_left_of_primary_is_shifted_into_desktop_slot() {
        // Desktop B has a monitor to the left of its primary.
        let left = Rectangle::new(-1280, 0, 1280, 1024);
        let main = Rectangle::new(0, 0, 1920, 1080);
        let layout = build(&[
            Desktop::single("A", 1920, 1080),
            Desktop::new("B", vec![left, main], Some(main)),
        ]);

        let globals: Vec<_> = layout
            .displays()
            .iter()
            .filter(|d| d.desktop == DesktopName::new("B"))
            .map(|d| d.global)
            .collect();
        assert_eq!(
            globals,
            vec![
                Rectangle::new(1920, 0, 1280, 1024),
                Rectangle::new(3200, 0, 1920, 1080)
            ]
        );
        assert_eq!(layout.origin(&"B".into()), Some(Point::new(3200, 0)));
    }

    #[test]
    fn test_desktop_without_displays_contributes_zero_width() {
        let layout = build(&[
            Desktop::single("A", 1920, 1080),
            Desktop::new("EMPTY", vec![], None),
            Desktop::single("B", 1920, 1080),
        ]);

        assert_eq!(layout.len(), 2);
        assert_eq!(layout.origin(&"EMPTY".into()), Some(Point::new(1920, 0)));
        assert_eq!(layout.origin(&"B".into()), Some(Point::new(1920, 0)));
    }

    #[test]
    fn test_empty_desktop_list_builds_empty_layout() {
        let layout = build(&[]);
        assert!(layout.is_empty());
        assert!(layout.find_point(Point::new(0, 0)).is_none());
    }

    #[test]
    fn test_duplicate_desktop_name_is_rejected_case_insensitively() {
        let result = DisplayLayout::build(
            &[
                Desktop::single("alpha", 1920, 1080),
                Desktop::single("ALPHA", 1920, 1080),
            ],
            &no_offsets(),
        );
        assert_eq!(result.unwrap_err(), LayoutError::DuplicateDesktop("alpha".into()));
    }

    #[test]
    fn test_negative_display_size_is_rejected() {
        let bad = Rectangle::new(0, 0, -10, 1080);
        let result = DisplayLayout::build(&[Desktop::new("A", vec![bad], None)], &no_offsets());
        assert!(matches!(result, Err(LayoutError::InvalidDisplay { .. })));
    }

    #[test]
    fn test_layout_rectangles_do_not_overlap() {
        let layout = build(&[
            Desktop::new(
                "A",
                vec![Rectangle::new(0, 0, 1920, 1080), Rectangle::new(1920, 0, 1280, 1024)],
                Some(Rectangle::new(0, 0, 1920, 1080)),
            ),
            Desktop::new(
                "B",
                vec![Rectangle::new(-2560, 0, 2560, 1440), Rectangle::new(0, 0, 1920, 1080)],
                Some(Rectangle::new(0, 0, 1920, 1080)),
            ),
            Desktop::single("C", 3840, 2160),
        ]);

        assert_eq!(layout.len(), 5);
        let rects: Vec<_> = layout.displays().iter().map(|d| d.global).collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    #[test]
    fn test_find_point_returns_display_and_owner() {
        let layout = build(&[
            Desktop::single("A", 1920, 1080),
            Desktop::single("B", 1920, 1080),
        ]);

        let hit = layout.find_point(Point::new(1921, 500)).expect("inside B");
        assert_eq!(hit.desktop, DesktopName::new("b"));
        assert_eq!(hit.global, Rectangle::new(1920, 0, 1920, 1080));
    }

    #[test]
    fn test_find_point_in_gap_returns_none() {
        let mut offsets = HashMap::new();
        offsets.insert(DesktopName::new("B"), 500);
        let layout = DisplayLayout::build(
            &[
                Desktop::single("A", 1920, 1080),
                Desktop::single("B", 1920, 1080),
            ],
            &offsets,
        )
        .unwrap();

        // Right of A, above B's top edge.
        assert!(layout.find_point(Point::new(1925, 100)).is_none());
    }

    #[test]
    fn test_find_point_first_match_wins_for_mirrored_displays() {
        let mirrored = Rectangle::new(0, 0, 1920, 1080);
        let layout = build(&[Desktop::new("A", vec![mirrored, mirrored], None)]);
        let hit = layout.find_point(Point::new(10, 10)).unwrap();
        assert!(std::ptr::eq(hit, &layout.displays()[0]));
    }

    #[test]
    fn test_desktop_of_maps_global_rect_to_owner() {
        let layout = build(&[
            Desktop::single("A", 1920, 1080),
            Desktop::single("B", 1920, 1080),
        ]);
        assert_eq!(
            layout.desktop_of(&Rectangle::new(1920, 0, 1920, 1080)),
            Some(&DesktopName::new("B"))
        );
        assert_eq!(layout.desktop_of(&Rectangle::new(5, 5, 5, 5)), None);
    }

    #[test]
    fn test_local_global_round_trip() {
        let layout = build(&[
            Desktop::single("A", 1920, 1080),
            Desktop::single("B", 2560, 1440),
        ]);
        let b = DesktopName::new("B");
        let local = Point::new(37, 911);

        let global = layout.to_global(&b, local).unwrap();
        assert_eq!(global, Point::new(1957, 911));
        assert_eq!(layout.to_local(&b, global), Some(local));
    }

    #[test]
    fn test_unknown_desktop_has_no_origin() {
        let layout = build(&[Desktop::single("A", 1920, 1080)]);
        assert!(layout.to_global(&"ghost".into(), Point::new(0, 0)).is_none());
        assert!(!layout.contains_desktop(&"ghost".into()));
    }

    // ── Stable display ids ────────────────────────────────────────────────────

    #[test]
    fn test_display_id_survives_reordering() {
        let a = Desktop::single("A", 1920, 1080);
        let b = Desktop::single("B", 1920, 1080);
        let before = build(&[a.clone(), b.clone()]);
        let after = build(&[b, a]);

        let b_before = before.find_point(Point::new(1920, 0)).unwrap();
        let moved = after.display(b_before.id).expect("same monitor must still exist");
        assert_eq!(moved, Rectangle::new(0, 0, 1920, 1080));
        assert_eq!(after.id_of(&moved), Some(b_before.id));
    }

    #[test]
    fn test_display_id_ignores_name_case_but_not_geometry() {
        let r = Rectangle::new(0, 0, 1920, 1080);
        assert_eq!(
            DisplayId::for_display(&"alpha".into(), &r),
            DisplayId::for_display(&"ALPHA".into(), &r)
        );
        assert_ne!(
            DisplayId::for_display(&"alpha".into(), &r),
            DisplayId::for_display(&"alpha".into(), &Rectangle::new(0, 0, 2560, 1440))
        );
    }

    #[test]
    fn test_display_id_vanishes_when_desktop_removed() {
        let before = build(&[
            Desktop::single("A", 1920, 1080),
            Desktop::single("B", 1920, 1080),
        ]);
        let b_id = before.find_point(Point::new(2000, 10)).unwrap().id;
        let after = build(&[Desktop::single("A", 1920, 1080)]);
        assert!(after.display(b_id).is_none());
    }
}
