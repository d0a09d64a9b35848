use crate::network::EdgeId;

use geo::{point, Point};
use rstar::{RTreeObject, AABB};

/// A network vertex. Coordinates are stored at 32-bit precision,
/// which is sufficient for ~1cm positional accuracy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub lat: f32,
    pub lon: f32,
}

impl Vertex {
    pub fn new(lat: f32, lon: f32) -> Self {
        Vertex { lat, lon }
    }

    /// The vertex position in `(x = lon, y = lat)` order.
    #[inline]
    pub fn position(&self) -> Point {
        point! { x: self.lon as f64, y: self.lat as f64 }
    }
}

/// Payload of a stored edge.
///
/// An edge is stored once, in an arbitrary `from → to` orientation; both
/// traversal directions refer to the same record. The `shape` holds the
/// intermediate coordinates between the endpoints (exclusive), as
/// `(lat, lon)` pairs. When `data_inverted` is set the stored shape runs
/// `to → from` and must be read in reverse to follow the edge forward.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    /// Length of the edge in meters, measured along its shape.
    pub distance: f32,
    /// Index into the edge-profile table: one value per distinct
    /// combination of traversal-relevant attributes.
    pub profile_id: u16,
    /// Index into the meta-attribute table carried per edge.
    pub meta_id: u32,
    pub shape: Option<Box<[(f32, f32)]>>,
    pub data_inverted: bool,
}

impl EdgeData {
    pub fn new(distance: f32, profile_id: u16, meta_id: u32) -> Self {
        EdgeData {
            distance,
            profile_id,
            meta_id,
            shape: None,
            data_inverted: false,
        }
    }

    pub fn with_shape(mut self, shape: impl Into<Box<[(f32, f32)]>>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    pub fn inverted(mut self) -> Self {
        self.data_inverted = true;
        self
    }

    /// Intermediate shape points in logical `from → to` order.
    pub(crate) fn shape_forward(&self) -> Vec<Point> {
        let Some(shape) = self.shape.as_deref() else {
            return Vec::new();
        };

        let iter = shape
            .iter()
            .map(|(lat, lon)| point! { x: *lon as f64, y: *lat as f64 });

        if self.data_inverted {
            iter.rev().collect()
        } else {
            iter.collect()
        }
    }
}

/// An edge inflated with its full polyline, as held by the spatial index.
///
/// Large by design: the resolver projects query coordinates onto every
/// candidate segment, so the polyline must be at hand without touching
/// the graph. Only the index holds these; the graph itself stays thin.
#[derive(Debug, Clone)]
pub struct FatEdge {
    pub id: EdgeId,
    /// Full polyline in logical `from → to` order, endpoints included.
    pub points: Box<[Point]>,
}

impl RTreeObject for FatEdge {
    type Envelope = AABB<Point>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_points(self.points.iter())
    }
}

/// One step of an adjacency scan: the edge, its payload, the vertex on
/// the far side, and whether moving there follows the stored orientation.
#[derive(Debug, Clone, Copy)]
pub struct Traversal<'a> {
    pub edge: EdgeId,
    pub data: &'a EdgeData,
    pub neighbour: crate::network::VertexId,
    pub forward: bool,
}
