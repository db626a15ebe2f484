//! Conversion of polygon boundaries into image regions of interest.

use crate::{ClipPlanes, Polygon, PolygonError, ViewPoint};
use cv_core::{CameraModel, KeyPoint, ObjectToCamera};
use cv_pinhole::{CameraParameters, ImageSize, NormalizedKeyPoint};
use log::*;

/// Minimum share of the points of a region that must lie in the image when it has less
/// than three points inside.
const INSIDE_RATIO: f64 = 0.7;

/// Axis aligned pixel bounds of a region, in rows (`i`) and columns (`j`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoiBounds {
    pub i_min: i32,
    pub i_max: i32,
    pub j_min: i32,
    pub j_max: i32,
}

/// Computes the bounds of a region of interest.
///
/// Coordinates left of or above the image do not extend the bounds past the border:
/// any negative coordinate sets the minimum of its axis to `1`. Maxima only grow from
/// positive coordinates.
///
/// ```
/// use cv_core::KeyPoint;
/// use cv_core::nalgebra::Point2;
/// use cv_mbt::{bounding_box, RoiBounds};
/// let roi = [KeyPoint(Point2::new(-5.0, 10.0)), KeyPoint(Point2::new(40.5, 30.2))];
/// assert_eq!(
///     bounding_box(&roi),
///     RoiBounds { i_min: 10, i_max: 30, j_min: 1, j_max: 40 },
/// );
/// ```
pub fn bounding_box(points: &[KeyPoint]) -> RoiBounds {
    let mut i_min = f64::from(i32::MAX);
    let mut i_max = 0.0;
    let mut j_min = f64::from(i32::MAX);
    let mut j_max = 0.0;

    for point in points {
        let (i, j) = (point.row(), point.column());

        if i < i_min {
            i_min = i;
        }
        if i < 0.0 {
            i_min = 1.0;
        }
        if i > 0.0 && i > i_max {
            i_max = i;
        }

        if j < j_min {
            j_min = j;
        }
        if j < 0.0 {
            j_min = 1.0;
        }
        if j > 0.0 && j > j_max {
            j_max = j;
        }
    }

    RoiBounds {
        i_min: i_min as i32,
        i_max: i_max as i32,
        j_min: j_min as i32,
        j_max: j_max as i32,
    }
}

/// Checks whether enough of a region lies in the image to be used.
///
/// A region is rejected only when less than three of its points and less than 70% of them
/// are inside the image.
pub fn is_region_inside_image(size: ImageSize, points: &[KeyPoint]) -> bool {
    let inside = points.iter().filter(|&&point| size.contains(point)).count();
    !(inside < 3 && (inside as f64) < INSIDE_RATIO * points.len() as f64)
}

/// Converts points to pixels, skipping the ones that have no projection.
fn to_pixels<'a, C>(
    camera: &'a C,
    points: impl IntoIterator<Item = &'a ViewPoint> + 'a,
) -> impl Iterator<Item = (&'a ViewPoint, KeyPoint)> + 'a
where
    C: CameraModel<Projection = NormalizedKeyPoint>,
{
    points.into_iter().filter_map(move |point| match point.projection() {
        Some(projection) => Some((point, camera.uncalibrate(projection))),
        None => {
            warn!(
                "skipping point {:?} in the plane of the optical center",
                point.camera()
            );
            None
        }
    })
}

impl Polygon {
    /// The transformed corners in pixel coordinates, without clipping.
    pub fn image_roi<C>(&self, camera: &C) -> Result<Vec<KeyPoint>, PolygonError>
    where
        C: CameraModel<Projection = NormalizedKeyPoint>,
    {
        self.ensure_transformed()?;
        Ok(to_pixels(camera, self.transformed())
            .map(|(_, pixel)| pixel)
            .collect())
    }

    /// Transforms the polygon and returns its corners in pixel coordinates.
    pub fn image_roi_at<C>(
        &mut self,
        pose: ObjectToCamera,
        camera: &C,
    ) -> Result<Vec<KeyPoint>, PolygonError>
    where
        C: CameraModel<Projection = NormalizedKeyPoint>,
    {
        self.transform(pose);
        self.image_roi(camera)
    }

    /// The clipped boundary in pixel coordinates.
    pub fn clipped_image_roi<C>(&self, camera: &C) -> Result<Vec<KeyPoint>, PolygonError>
    where
        C: CameraModel<Projection = NormalizedKeyPoint>,
    {
        let boundary = self.clipped_boundary()?;
        Ok(to_pixels(camera, boundary.iter().map(|vertex| &vertex.point))
            .map(|(_, pixel)| pixel)
            .collect())
    }

    /// The clipped boundary in pixel coordinates, with the planes that created each vertex.
    ///
    /// Pixels tagged with [`ClipPlanes::NONE`] are corners of the polygon. Consecutive tagged
    /// pixels delimit an edge created by the frustum rather than by the model.
    pub fn clipped_image_roi_with_origin<C>(
        &self,
        camera: &C,
    ) -> Result<Vec<(KeyPoint, ClipPlanes)>, PolygonError>
    where
        C: CameraModel<Projection = NormalizedKeyPoint>,
    {
        let boundary = self.clipped_boundary()?;
        let mut roi = Vec::with_capacity(boundary.len());
        for vertex in boundary {
            let mut point = vertex.point;
            match point.project() {
                Some(projection) => roi.push((camera.uncalibrate(projection), vertex.origin)),
                None => warn!(
                    "skipping clipped vertex {:?} in the plane of the optical center",
                    point.camera()
                ),
            }
        }
        Ok(roi)
    }

    /// Transforms and clips the polygon, then returns the clipped boundary in pixel coordinates.
    pub fn clipped_image_roi_at(
        &mut self,
        pose: ObjectToCamera,
        camera: &CameraParameters,
    ) -> Result<Vec<KeyPoint>, PolygonError> {
        self.transform(pose);
        self.compute_clipped_boundary(camera)?;
        self.clipped_image_roi(camera)
    }

    /// Transforms and clips the polygon, then returns the clipped boundary in pixel coordinates
    /// together with the planes that created each vertex.
    pub fn clipped_image_roi_with_origin_at(
        &mut self,
        pose: ObjectToCamera,
        camera: &CameraParameters,
    ) -> Result<Vec<(KeyPoint, ClipPlanes)>, PolygonError> {
        self.transform(pose);
        self.compute_clipped_boundary(camera)?;
        self.clipped_image_roi_with_origin(camera)
    }

    /// Counts the corners in front of the camera which project inside the image.
    ///
    /// The count is remembered and available from
    /// [`Polygon::corners_inside_prev_count`].
    pub fn count_corners_inside_image<C>(
        &mut self,
        size: ImageSize,
        camera: &C,
    ) -> Result<usize, PolygonError>
    where
        C: CameraModel<Projection = NormalizedKeyPoint>,
    {
        self.ensure_transformed()?;
        let count = to_pixels(camera, self.transformed())
            .filter(|&(point, pixel)| point.depth() > 0.0 && size.contains(pixel))
            .count();
        self.corners_inside_prev = count;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::nalgebra::Point2;
    use proptest::prelude::*;

    fn kp(column: f64, row: f64) -> KeyPoint {
        KeyPoint(Point2::new(column, row))
    }

    #[test]
    fn empty_bounds() {
        assert_eq!(
            bounding_box(&[]),
            RoiBounds {
                i_min: i32::MAX,
                i_max: 0,
                j_min: i32::MAX,
                j_max: 0
            }
        );
    }

    #[test]
    fn negative_coordinates_clamp_to_border() {
        let bounds = bounding_box(&[kp(-3.0, -7.0), kp(12.0, 20.0)]);
        assert_eq!(bounds.i_min, 1);
        assert_eq!(bounds.j_min, 1);
        assert_eq!(bounds.i_max, 20);
        assert_eq!(bounds.j_max, 12);
    }

    #[test]
    fn region_inside_thresholds() {
        let size = ImageSize::new(100, 100);
        let two_of_four = [
            kp(10.0, 10.0),
            kp(20.0, 20.0),
            kp(-1.0, 5.0),
            kp(5.0, 150.0),
        ];
        assert!(!is_region_inside_image(size, &two_of_four));
        let three_of_four = [
            kp(10.0, 10.0),
            kp(20.0, 20.0),
            kp(30.0, 5.0),
            kp(5.0, 150.0),
        ];
        assert!(is_region_inside_image(size, &three_of_four));
        // Two of two is below three points but above the ratio.
        assert!(is_region_inside_image(size, &[kp(1.0, 1.0), kp(2.0, 2.0)]));
        assert!(is_region_inside_image(size, &[]));
    }

    proptest! {
        #[test]
        fn bounds_cover_positive_points(
            points in prop::collection::vec((1.0..500.0f64, 1.0..500.0f64), 1..8)
        ) {
            let roi: Vec<_> = points.iter().map(|&(column, row)| kp(column, row)).collect();
            let bounds = bounding_box(&roi);
            for point in &roi {
                prop_assert!(bounds.i_min <= point.row() as i32);
                prop_assert!(bounds.i_max >= point.row() as i32);
                prop_assert!(bounds.j_min <= point.column() as i32);
                prop_assert!(bounds.j_max >= point.column() as i32);
            }
        }

        #[test]
        fn any_negative_row_pins_minimum(
            points in prop::collection::vec((-50.0..500.0f64, -50.0..-0.5f64), 1..8)
        ) {
            let roi: Vec<_> = points.iter().map(|&(column, row)| kp(column, row)).collect();
            prop_assert_eq!(bounding_box(&roi).i_min, 1);
        }
    }
}
