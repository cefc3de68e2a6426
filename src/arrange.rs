//! Deterministic golden-angle spiral placement.
//!
//! Used on initial load when auto-arrange is enabled and for the explicit
//! "auto-arrange" action. Placement depends only on ordinal index and
//! spacing, never on island size.

use crate::geometry::Point;
use crate::model::{Island, LayoutConfig, LayoutModel, MAX_ISLAND_SPACING};
use std::f32::consts::PI;

/// Fraction of a full turn between successive islands (golden ratio conjugate).
pub const GOLDEN_TURN: f32 = 0.618;

/// Fixed spiral anchor in world space. Callers recenter through the viewport.
pub const SPIRAL_CENTER: Point = Point::new(400.0, 400.0);

/// Spiral position for the island at ordinal `index`.
///
/// `angle = index * 0.618 * 2π`, `radius = sqrt(index + 1) * spacing`.
/// A non-finite spacing counts as zero; larger ones cap at [`MAX_ISLAND_SPACING`].
pub fn spiral_position(index: usize, spacing: f32) -> Point {
    let spacing = if spacing.is_finite() {
        spacing.clamp(0.0, MAX_ISLAND_SPACING)
    } else {
        0.0
    };
    let i = index as f32;
    let angle = i * GOLDEN_TURN * 2.0 * PI;
    let radius = (i + 1.0).sqrt() * spacing;
    Point::new(
        angle.cos() * radius + SPIRAL_CENTER.x,
        angle.sin() * radius + SPIRAL_CENTER.y,
    )
}

/// Return a copy of `islands` placed on the spiral, in input order.
///
/// The originals are untouched; only `position` differs in the output.
pub fn arrange(islands: &[Island], config: &LayoutConfig) -> Vec<Island> {
    islands
        .iter()
        .enumerate()
        .map(|(i, island)| {
            let mut placed = island.clone();
            placed.position = spiral_position(i, config.island_spacing);
            placed
        })
        .collect()
}

/// Arrange a model's islands in place.
pub fn arrange_model(model: &mut LayoutModel) {
    let spacing = model.config().island_spacing;
    for (i, island) in model.islands_mut().iter_mut().enumerate() {
        island.position = spiral_position(i, spacing);
    }
    tracing::debug!(islands = model.len(), spacing, "auto-arrange applied");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Point, expected: (f32, f32)) {
        assert!(
            (actual.x - expected.0).abs() < 1e-2 && (actual.y - expected.1).abs() < 1e-2,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    fn abc() -> Vec<Island> {
        vec![
            Island::new("A", 0.0, 0.0, 120.0, 80.0),
            Island::new("B", 0.0, 0.0, 300.0, 200.0),
            Island::new("C", 0.0, 0.0, 10.0, 10.0),
        ]
    }

    // ========================================================================
    // Golden values
    // ========================================================================

    #[test]
    fn test_first_island_on_positive_x_axis() {
        let out = arrange(&abc(), &LayoutConfig::default());
        assert_eq!(out[0].position, Point::new(500.0, 400.0));
    }

    #[test]
    fn test_golden_values_abc() {
        let out = arrange(&abc(), &LayoutConfig::default());
        // index 1: angle = 3.8830085 rad, radius = 141.42136
        assert_close(out[1].position, (295.699_9, 304.493_5));
        // index 2: angle = 7.766017 rad, radius = 173.20508
        assert_close(out[2].position, (415.216_3, 572.535_4));
    }

    #[test]
    fn test_spacing_scales_radius() {
        let config = LayoutConfig {
            island_spacing: 50.0,
            ..LayoutConfig::default()
        };
        let out = arrange(&abc(), &config);
        assert_eq!(out[0].position, Point::new(450.0, 400.0));
    }

    // ========================================================================
    // Purity / determinism
    // ========================================================================

    #[test]
    fn test_arrange_is_deterministic() {
        let config = LayoutConfig::default();
        let first = arrange(&abc(), &config);
        let second = arrange(&abc(), &config);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
            assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
        }
    }

    #[test]
    fn test_arrange_does_not_touch_input() {
        let input = abc();
        let out = arrange(&input, &LayoutConfig::default());
        assert!(input.iter().all(|i| i.position == Point::ZERO));
        assert_eq!(out.len(), input.len());
        assert_eq!(out[1].size, input[1].size);
        assert_eq!(out[1].id, "B");
    }

    #[test]
    fn test_arrange_empty() {
        assert!(arrange(&[], &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn test_spiral_stays_finite_for_extreme_spacing() {
        for spacing in [f32::NAN, f32::INFINITY, 3.0e38, f32::MAX] {
            for i in 0..1000 {
                assert!(spiral_position(i, spacing).is_finite(), "{spacing} at {i}");
            }
        }
        assert_eq!(spiral_position(3, f32::NAN), SPIRAL_CENTER);
    }

    #[test]
    fn test_arrange_model_matches_pure_function() {
        let mut model = LayoutModel::default();
        model.set_islands(abc());
        let expected = arrange(model.islands(), model.config());
        arrange_model(&mut model);
        for (a, b) in model.islands().iter().zip(&expected) {
            assert_eq!(a.position, b.position);
        }
    }
}
