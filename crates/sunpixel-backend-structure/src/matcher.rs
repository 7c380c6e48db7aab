//! Nearest-block lookup under the redmean distance.

use std::collections::HashMap;

use sunpixel_spec::{perceptual_distance, PaletteEntry, PaletteTable, Rgb};

/// Closest entry in `table` to `color`.
///
/// Scans in table order (ascending color); the first entry at the minimum
/// distance wins. Returns `None` only for an empty table.
pub fn closest<'a>(table: &'a PaletteTable, color: Rgb) -> Option<(&'a Rgb, &'a PaletteEntry)> {
    let mut best: Option<(&Rgb, &PaletteEntry)> = None;
    let mut best_distance = f64::INFINITY;

    for (key, entry) in table {
        let distance = perceptual_distance(color, *key);
        if distance < best_distance {
            best_distance = distance;
            best = Some((key, entry));
            if distance == 0.0 {
                break;
            }
        }
    }

    best
}

/// Memoizing matcher over one palette table.
///
/// Images repeat colors heavily, so each distinct input color is matched once.
#[derive(Debug)]
pub struct ColorMatcher<'a> {
    table: &'a PaletteTable,
    cache: HashMap<Rgb, Option<&'a PaletteEntry>>,
}

impl<'a> ColorMatcher<'a> {
    pub fn new(table: &'a PaletteTable) -> Self {
        Self {
            table,
            cache: HashMap::new(),
        }
    }

    /// Closest entry to `color`; see [`closest`].
    pub fn closest(&mut self, color: Rgb) -> Option<&'a PaletteEntry> {
        let table = self.table;
        *self
            .cache
            .entry(color)
            .or_insert_with(|| closest(table, color).map(|(_, entry)| entry))
    }

    /// Number of distinct colors matched so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[((u8, u8, u8), &str)]) -> PaletteTable {
        entries
            .iter()
            .map(|&((r, g, b), block)| (Rgb::new(r, g, b), PaletteEntry::new(block, 0)))
            .collect()
    }

    #[test]
    fn test_exact_match() {
        let t = table(&[((255, 0, 0), "red"), ((0, 0, 255), "blue")]);
        let (key, entry) = closest(&t, Rgb::new(255, 0, 0)).unwrap();
        assert_eq!(*key, Rgb::new(255, 0, 0));
        assert_eq!(entry.block, "red");
    }

    #[test]
    fn test_nearest_by_redmean() {
        let t = table(&[((0, 0, 0), "black"), ((255, 255, 255), "white")]);
        assert_eq!(closest(&t, Rgb::new(40, 40, 40)).unwrap().1.block, "black");
        assert_eq!(closest(&t, Rgb::new(200, 210, 220)).unwrap().1.block, "white");
    }

    #[test]
    fn test_tie_goes_to_first_in_color_order() {
        // Both candidates are exactly 10 away in green only.
        let t = table(&[((0, 20, 0), "high"), ((0, 0, 0), "low")]);
        assert_eq!(closest(&t, Rgb::new(0, 10, 0)).unwrap().1.block, "low");
    }

    #[test]
    fn test_empty_table() {
        let t = PaletteTable::new();
        assert!(closest(&t, Rgb::WHITE).is_none());
        assert!(ColorMatcher::new(&t).closest(Rgb::WHITE).is_none());
    }

    #[test]
    fn test_cache_agrees_with_scan() {
        let t = table(&[
            ((160, 39, 34), "red"),
            ((53, 57, 157), "blue"),
            ((103, 117, 53), "green"),
        ]);
        let mut matcher = ColorMatcher::new(&t);
        for color in [Rgb::new(150, 40, 40), Rgb::new(60, 60, 150), Rgb::new(150, 40, 40)] {
            let cached = matcher.closest(color).unwrap();
            let scanned = closest(&t, color).unwrap().1;
            assert_eq!(cached, scanned);
        }
        assert_eq!(matcher.cached(), 2);
    }
}
