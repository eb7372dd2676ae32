//! Tile seam check.
//!
//! The map only renders features of loaded tiles, so a region that reaches
//! across a tile edge may be missing land use from the neighbouring tile.
//! The grid layer renders the tile outlines; if any outline crosses the
//! region boundary the composition is flagged as possibly incomplete.

use geo::Intersects;
use quartier_composition_models::{Region, RenderedFeature};
use quartier_geometry::{boundary, rings};

/// Whether the region lies within the rendered tiles without crossing a
/// tile seam.
///
/// Returns `true` when no grid feature's outline intersects the region's
/// boundary, including when the grid is empty or there is no region.
#[must_use]
pub fn is_fully_covered(region: Option<&Region>, grid: &[RenderedFeature]) -> bool {
    let Some(region) = region else {
        return true;
    };
    let region_rings = rings(region.geometry());
    if region_rings.0.is_empty() {
        return true;
    }

    let crossing = grid
        .iter()
        .position(|tile| boundary(&tile.geometry).intersects(&region_rings));

    if let Some(index) = crossing {
        log::debug!("Region boundary crosses tile seam of grid feature {index}");
        false
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::circle_region;
    use geo::{LineString, Polygon, Rect, coord};
    use quartier_composition_models::GeoPoint;

    const BASEL: GeoPoint = GeoPoint::new(7.589_79, 47.560_22);

    fn tile(min: (f64, f64), max: (f64, f64)) -> RenderedFeature {
        let rect = Rect::new(coord! { x: min.0, y: min.1 }, coord! { x: max.0, y: max.1 });
        RenderedFeature::new(rect.to_polygon())
    }

    fn circle() -> Region {
        circle_region(BASEL, 250.0, 128)
    }

    #[test]
    fn empty_grid_counts_as_covered() {
        assert!(is_fully_covered(Some(&circle()), &[]));
        assert!(is_fully_covered(None, &[tile((7.0, 47.0), (8.0, 48.0))]));
    }

    #[test]
    fn region_inside_one_tile_is_covered() {
        let grid = vec![
            tile((7.5, 47.5), (7.7, 47.6)),
            tile((7.7, 47.5), (7.9, 47.6)),
        ];
        assert!(is_fully_covered(Some(&circle()), &grid));
    }

    #[test]
    fn seam_through_region_is_not_covered() {
        // Vertical seam at the circle's center longitude.
        let grid = vec![
            tile((7.5, 47.5), (BASEL.lon, 47.6)),
            tile((BASEL.lon, 47.5), (7.7, 47.6)),
        ];
        assert!(!is_fully_covered(Some(&circle()), &grid));
    }

    #[test]
    fn line_seams_are_supported() {
        let seam = LineString::from(vec![(7.5, BASEL.lat), (7.7, BASEL.lat)]);
        assert!(!is_fully_covered(
            Some(&circle()),
            &[RenderedFeature::new(seam)]
        ));

        let far = LineString::from(vec![(7.5, 47.0), (7.7, 47.0)]);
        assert!(is_fully_covered(Some(&circle()), &[RenderedFeature::new(far)]));
    }

    #[test]
    fn tile_inside_region_does_not_cross_boundary() {
        let inner = Polygon::new(
            LineString::from(vec![
                (BASEL.lon - 0.000_1, BASEL.lat - 0.000_1),
                (BASEL.lon + 0.000_1, BASEL.lat - 0.000_1),
                (BASEL.lon + 0.000_1, BASEL.lat + 0.000_1),
                (BASEL.lon - 0.000_1, BASEL.lat + 0.000_1),
                (BASEL.lon - 0.000_1, BASEL.lat - 0.000_1),
            ]),
            vec![],
        );
        assert!(is_fully_covered(
            Some(&circle()),
            &[RenderedFeature::new(inner)]
        ));
    }
}
