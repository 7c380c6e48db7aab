//! Property-based tests for the matching and resampling stages.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sunpixel-tests --test proptest_pipeline
//! ```

use proptest::prelude::*;

use sunpixel_backend_structure::{build, closest, parse_definition, resample, PixelBuffer};
use sunpixel_spec::{perceptual_distance, GridDimensions, PaletteEntry, PaletteTable, Rgb, Suggestion};

// ============================================================================
// Strategies
// ============================================================================

fn rgb() -> impl Strategy<Value = Rgb> {
    any::<[u8; 3]>().prop_map(Rgb::from)
}

fn table() -> impl Strategy<Value = PaletteTable> {
    prop::collection::vec((rgb(), 0u8..16), 1..24).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (color, data))| (color, PaletteEntry::new(format!("minecraft:block_{i}"), data)))
            .collect()
    })
}

fn image(max: u32) -> impl Strategy<Value = PixelBuffer> {
    (1..=max, 1..=max).prop_flat_map(|(w, h)| {
        prop::collection::vec(rgb(), (w * h) as usize).prop_filter_map(
            "buffer size matches dimensions",
            move |data| PixelBuffer::from_data(w, h, data),
        )
    })
}

// ============================================================================
// 1. Color Distance
// ============================================================================

proptest! {
    #[test]
    fn distance_is_symmetric(a in rgb(), b in rgb()) {
        prop_assert_eq!(perceptual_distance(a, b), perceptual_distance(b, a));
    }

    #[test]
    fn distance_is_zero_only_for_identity(a in rgb(), b in rgb()) {
        prop_assert_eq!(perceptual_distance(a, a), 0.0);
        if a != b {
            prop_assert!(perceptual_distance(a, b) > 0.0);
        }
    }
}

// ============================================================================
// 2. Closest Match
// ============================================================================

proptest! {
    /// No table entry is strictly closer than the chosen one.
    #[test]
    fn closest_is_minimal(table in table(), color in rgb()) {
        let (best, _) = closest(&table, color).unwrap();
        let best_distance = perceptual_distance(color, *best);
        for (key, _) in &table {
            prop_assert!(perceptual_distance(color, *key) >= best_distance);
        }
    }

    /// A color present in the table always maps to itself.
    #[test]
    fn table_colors_match_exactly(table in table()) {
        for (key, entry) in &table {
            let (found, found_entry) = closest(&table, *key).unwrap();
            prop_assert_eq!(found, key);
            prop_assert_eq!(found_entry, entry);
        }
    }
}

// ============================================================================
// 3. Resampling
// ============================================================================

proptest! {
    #[test]
    fn resample_to_same_size_is_identity(buffer in image(12)) {
        let out = resample(&buffer, buffer.dimensions());
        prop_assert_eq!(out, buffer);
    }

    #[test]
    fn solid_image_stays_solid(
        color in rgb(),
        (w, h) in (1u32..40, 1u32..40),
        (tw, th) in (1u32..40, 1u32..40),
    ) {
        let out = resample(&PixelBuffer::new(w, h, color), GridDimensions::new(tw, th));
        prop_assert_eq!(out.dimensions(), GridDimensions::new(tw, th));
        // Cells with an empty source region come out white.
        for px in &out.data {
            prop_assert!(*px == color || *px == Rgb::WHITE);
        }
        if tw <= w && th <= h {
            prop_assert!(out.data.iter().all(|px| *px == color));
        }
    }
}

// ============================================================================
// 4. Voxel Grid
// ============================================================================

proptest! {
    #[test]
    fn voxel_grid_is_well_formed(buffer in image(10), table in table()) {
        let grid = build(&buffer, &table).unwrap();

        prop_assert_eq!(grid.indices.len(), buffer.data.len());
        prop_assert_eq!(grid.aux.len(), buffer.data.len());
        prop_assert!(grid.indices.iter().all(|&i| (i as usize) < grid.palette.len()));

        let mut unique = grid.palette.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), grid.palette.len());

        // Palette order is first use.
        let mut next = 0u32;
        for &index in &grid.indices {
            prop_assert!(index <= next);
            if index == next {
                next += 1;
            }
        }
    }
}

// ============================================================================
// 5. Parsing and Sizing
// ============================================================================

proptest! {
    /// Arbitrary text never panics the definition parser.
    #[test]
    fn parse_definition_never_panics(text in "\\PC{0,200}") {
        let def = parse_definition("fuzz", &text);
        prop_assert!(def.malformed.iter().all(|m| m.palette == "fuzz"));
    }

    #[test]
    fn color_keys_parse_in_both_forms(color in rgb()) {
        let paren = format!("({}, {}, {})", color.r, color.g, color.b);
        let bare = format!("{}, {}, {}", color.r, color.g, color.b);
        prop_assert_eq!(paren.parse::<Rgb>().unwrap(), color);
        prop_assert_eq!(bare.parse::<Rgb>().unwrap(), color);
    }

    /// An adjusted size keeps the requested extent on one axis.
    #[test]
    fn suggestion_keeps_one_side(
        (ow, oh) in (1u32..2000, 1u32..2000),
        (rw, rh) in (1u32..500, 1u32..500),
    ) {
        let requested = GridDimensions::new(rw, rh);
        if let Suggestion::Adjust(alt) = GridDimensions::suggest_for(GridDimensions::new(ow, oh), requested) {
            prop_assert!(alt.width == rw || alt.height == rh);
            prop_assert!(alt != requested);
        }
    }
}
