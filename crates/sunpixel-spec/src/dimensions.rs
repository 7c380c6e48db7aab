//! Output grid dimensions and the aspect-ratio suggestion policy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relative aspect-ratio difference above which a ratio-preserving size is suggested.
pub const ASPECT_TOLERANCE: f64 = 0.05;

/// Width and height of a 2-D grid, each at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
}

impl GridDimensions {
    /// Create dimensions, raising zero sides to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Number of cells.
    pub fn cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// `width / height`.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Compare a requested size against the source's aspect ratio.
    ///
    /// Returns [`Suggestion::Adjust`] with a ratio-preserving alternative when the
    /// relative difference between the two ratios exceeds [`ASPECT_TOLERANCE`] and
    /// the alternative actually differs from the request.
    pub fn suggest_for(original: GridDimensions, requested: GridDimensions) -> Suggestion {
        let orig_ratio = original.aspect_ratio();
        let req_ratio = requested.aspect_ratio();
        let relative = (orig_ratio - req_ratio).abs() / orig_ratio.max(req_ratio);
        if relative <= ASPECT_TOLERANCE {
            return Suggestion::Keep;
        }

        let alternative = if orig_ratio > req_ratio {
            // Width is the limiting side.
            let height = (requested.width as f64 / orig_ratio).floor() as u32;
            GridDimensions::new(requested.width, height)
        } else {
            let width = (requested.height as f64 * orig_ratio).floor() as u32;
            GridDimensions::new(width, requested.height)
        };

        if alternative == requested {
            Suggestion::Keep
        } else {
            Suggestion::Adjust(alternative)
        }
    }
}

impl fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Outcome of the aspect-ratio check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    /// The requested size is close enough to the source ratio.
    Keep,
    /// A ratio-preserving alternative to the requested size.
    Adjust(GridDimensions),
}

impl Suggestion {
    /// The alternative size, if any.
    pub fn alternative(&self) -> Option<GridDimensions> {
        match self {
            Suggestion::Keep => None,
            Suggestion::Adjust(dims) => Some(*dims),
        }
    }
}

/// Which size to use when the request and the suggestion disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    /// Use the caller's size; the suggestion is only reported.
    #[default]
    Requested,
    /// Use the ratio-preserving suggestion when there is one.
    Suggested,
}

/// The size a conversion will actually use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSize {
    pub dimensions: GridDimensions,
    pub suggestion: Suggestion,
}

/// Pick the output size for a source image.
///
/// Without a request the original size is used and no suggestion is made.
pub fn resolve_size(
    original: GridDimensions,
    requested: Option<GridDimensions>,
    policy: SizePolicy,
) -> ResolvedSize {
    let Some(requested) = requested else {
        return ResolvedSize {
            dimensions: original,
            suggestion: Suggestion::Keep,
        };
    };

    let suggestion = GridDimensions::suggest_for(original, requested);
    let dimensions = match (policy, suggestion) {
        (SizePolicy::Suggested, Suggestion::Adjust(alt)) => alt,
        _ => requested,
    };

    ResolvedSize {
        dimensions,
        suggestion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_zero_sides() {
        assert_eq!(GridDimensions::new(0, 0), GridDimensions::new(1, 1));
    }

    #[test]
    fn test_square_source_wide_request_suggests_square() {
        let original = GridDimensions::new(200, 200);
        let requested = GridDimensions::new(100, 50);
        let suggestion = GridDimensions::suggest_for(original, requested);
        assert_eq!(suggestion, Suggestion::Adjust(GridDimensions::new(50, 50)));
        assert_ne!(suggestion.alternative(), Some(requested));
    }

    #[test]
    fn test_wide_source_square_request_keeps_width() {
        let original = GridDimensions::new(400, 100);
        let requested = GridDimensions::new(64, 64);
        assert_eq!(
            GridDimensions::suggest_for(original, requested),
            Suggestion::Adjust(GridDimensions::new(64, 16))
        );
    }

    #[test]
    fn test_within_tolerance_keeps_request() {
        let original = GridDimensions::new(1920, 1080);
        let requested = GridDimensions::new(160, 90);
        assert_eq!(
            GridDimensions::suggest_for(original, requested),
            Suggestion::Keep
        );

        // 100:98 vs 1:1 is a 2% difference.
        let requested = GridDimensions::new(100, 98);
        assert_eq!(
            GridDimensions::suggest_for(GridDimensions::new(64, 64), requested),
            Suggestion::Keep
        );
    }

    #[test]
    fn test_extreme_ratio_suggestion_never_zero() {
        let original = GridDimensions::new(10_000, 1);
        let requested = GridDimensions::new(10, 10);
        let alt = GridDimensions::suggest_for(original, requested)
            .alternative()
            .unwrap();
        assert_eq!(alt, GridDimensions::new(10, 1));
    }

    #[test]
    fn test_resolve_size_policies() {
        let original = GridDimensions::new(200, 200);
        let requested = GridDimensions::new(100, 50);

        let requested_policy = resolve_size(original, Some(requested), SizePolicy::Requested);
        assert_eq!(requested_policy.dimensions, requested);
        assert!(requested_policy.suggestion.alternative().is_some());

        let suggested_policy = resolve_size(original, Some(requested), SizePolicy::Suggested);
        assert_eq!(suggested_policy.dimensions, GridDimensions::new(50, 50));

        let unset = resolve_size(original, None, SizePolicy::Suggested);
        assert_eq!(unset.dimensions, original);
        assert_eq!(unset.suggestion, Suggestion::Keep);
    }
}
