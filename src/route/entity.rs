use geo::{LineString, Point};

/// One homogeneous stretch of a route: a full or trimmed traversal of a
/// single edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSegment {
    /// Meters travelled on this segment.
    pub distance: f32,
    /// Seconds spent on this segment, `distance / factor`.
    pub duration: f32,
    pub profile_id: u16,
    pub meta_id: u32,
}

/// A fully reconstructed route between two resolved points.
///
/// The shape is a continuous coordinate sequence from the snapped source
/// position to the snapped target position; segments attribute each
/// traversed edge, in travel order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    pub shape: Vec<Point>,
    pub segments: Vec<RouteSegment>,
    pub distance: f32,
    pub duration: f32,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The route geometry as a [`LineString`], convenient for WKT dumps
    /// and geometric post-processing.
    pub fn linestring(&self) -> LineString {
        self.shape.iter().copied().collect::<LineString>()
    }
}
