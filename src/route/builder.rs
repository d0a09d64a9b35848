use crate::network::{EdgeData, EdgeId, RoutingNetwork, VertexId};
use crate::profile::FactorSource;
use crate::resolve::RouterPoint;
use crate::route::{Route, RouteError, RouteSegment};

use geo::{Distance, Haversine, InterpolatableLine, Line, Point};

#[cfg(feature = "tracing")]
use tracing::Level;

/// Turns a vertex path between two resolved points into a [`Route`].
///
/// The default implementation walks the path, re-finds the edge joining
/// each vertex pair and trims the first and last edges to the resolved
/// offsets. A custom builder may be hooked into the router configuration
/// to replace this wholesale.
pub trait BuildRoute: Send + Sync {
    fn build(
        &self,
        network: &RoutingNetwork,
        factors: &FactorSource<'_>,
        source: &RouterPoint,
        target: &RouterPoint,
        path: &[VertexId],
    ) -> Result<Route, RouteError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRouteBuilder;

impl BuildRoute for DefaultRouteBuilder {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip_all))]
    fn build(
        &self,
        network: &RoutingNetwork,
        factors: &FactorSource<'_>,
        source: &RouterPoint,
        target: &RouterPoint,
        path: &[VertexId],
    ) -> Result<Route, RouteError> {
        let mut route = Assembler::new(factors);

        if path.is_empty() {
            // The whole trip stays on one edge.
            let data = network.edge(source.edge).ok_or(RouteError::MissingData)?;
            let points = network
                .edge_polyline(source.edge)
                .ok_or(RouteError::MissingData)?;

            let (f0, f1) = (source.fraction() as f64, target.fraction() as f64);
            let distance = (f1 - f0).abs() as f32 * data.distance;

            let piece = if f0 <= f1 {
                sub_polyline(&points, f0, f1)
            } else {
                let mut reversed = sub_polyline(&points, f1, f0);
                reversed.reverse();
                reversed
            };

            route.push(piece, distance, data);
            return Ok(route.finish());
        }

        // Leave the source edge towards the first path vertex.
        {
            let data = network.edge(source.edge).ok_or(RouteError::MissingData)?;
            let (from, to) = network
                .edge_endpoints(source.edge)
                .ok_or(RouteError::MissingData)?;
            let points = network
                .edge_polyline(source.edge)
                .ok_or(RouteError::MissingData)?;

            let fraction = source.fraction() as f64;
            let first = path[0];

            if first == to {
                let distance = (1.0 - fraction) as f32 * data.distance;
                route.push(sub_polyline(&points, fraction, 1.0), distance, data);
            } else if first == from {
                let mut piece = sub_polyline(&points, 0.0, fraction);
                piece.reverse();
                route.push(piece, fraction as f32 * data.distance, data);
            } else {
                return Err(RouteError::DetachedPath);
            }
        }

        // Full traversals between consecutive path vertices.
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (edge, data, forward) =
                cheapest_edge(network, factors, a, b).ok_or(RouteError::MissingEdge(a, b))?;

            let mut points = network.edge_polyline(edge).ok_or(RouteError::MissingData)?;
            if !forward {
                points.reverse();
            }

            route.push(points, data.distance, data);
        }

        // Enter the target edge from the last path vertex.
        {
            let data = network.edge(target.edge).ok_or(RouteError::MissingData)?;
            let (from, to) = network
                .edge_endpoints(target.edge)
                .ok_or(RouteError::MissingData)?;
            let points = network
                .edge_polyline(target.edge)
                .ok_or(RouteError::MissingData)?;

            let fraction = target.fraction() as f64;
            let last = path[path.len() - 1];

            if last == from {
                route.push(
                    sub_polyline(&points, 0.0, fraction),
                    fraction as f32 * data.distance,
                    data,
                );
            } else if last == to {
                let mut piece = sub_polyline(&points, fraction, 1.0);
                piece.reverse();
                route.push(piece, (1.0 - fraction) as f32 * data.distance, data);
            } else {
                return Err(RouteError::DetachedPath);
            }
        }

        Ok(route.finish())
    }
}

/// The cheapest traversable edge joining `a → b`, in either stored
/// orientation. Parallel edges are disambiguated by weight so the
/// geometry matches what the search priced.
fn cheapest_edge<'a>(
    network: &'a RoutingNetwork,
    factors: &FactorSource<'_>,
    a: VertexId,
    b: VertexId,
) -> Option<(EdgeId, &'a EdgeData, bool)> {
    network
        .edges_between(a, b)
        .filter_map(|(edge, data, forward)| {
            let factor = factors.factor(data.profile_id);
            factor
                .allows(forward)
                .then(|| (edge, data, forward, data.distance / factor.value))
        })
        .min_by(|(_, _, _, x), (_, _, _, y)| x.total_cmp(y))
        .map(|(edge, data, forward, _)| (edge, data, forward))
}

struct Assembler<'a> {
    factors: &'a FactorSource<'a>,
    shape: Vec<Point>,
    segments: Vec<RouteSegment>,
    distance: f32,
    duration: f32,
}

impl<'a> Assembler<'a> {
    fn new(factors: &'a FactorSource<'a>) -> Self {
        Assembler {
            factors,
            shape: Vec::new(),
            segments: Vec::new(),
            distance: 0.0,
            duration: 0.0,
        }
    }

    fn push(&mut self, points: Vec<Point>, distance: f32, data: &EdgeData) {
        let factor = self.factors.factor(data.profile_id);
        let duration = if factor.value > 0.0 {
            distance / factor.value
        } else {
            0.0
        };

        // Pieces join at shared vertex coordinates; keep only one copy.
        let mut iter = points.into_iter();
        if let Some(first) = iter.next() {
            if self.shape.last() != Some(&first) {
                self.shape.push(first);
            }
        }
        self.shape.extend(iter);

        self.segments.push(RouteSegment {
            distance,
            duration,
            profile_id: data.profile_id,
            meta_id: data.meta_id,
        });

        self.distance += distance;
        self.duration += duration;
    }

    fn finish(self) -> Route {
        Route {
            shape: self.shape,
            segments: self.segments,
            distance: self.distance,
            duration: self.duration,
        }
    }
}

/// The stretch of a polyline between two length fractions, endpoints
/// interpolated.
fn sub_polyline(points: &[Point], f0: f64, f1: f64) -> Vec<Point> {
    debug_assert!(f0 <= f1);

    let total: f64 = points
        .windows(2)
        .map(|pair| Haversine.distance(pair[0], pair[1]))
        .sum();

    if total <= 0.0 || points.len() < 2 {
        return points.first().map(|p| vec![*p, *p]).unwrap_or_default();
    }

    let (start, end) = (f0 * total, f1 * total);
    let mut piece = Vec::new();
    let mut cumulative = 0.0;

    // Exact vertex coordinates at the cut points keep adjacent route
    // pieces joinable without an epsilon comparison.
    let interpolate = |line: &Line, local: f64| -> Point {
        if local <= 0.0 {
            line.start.into()
        } else if local >= 1.0 {
            line.end.into()
        } else {
            line.point_at_ratio_from_start(&Haversine, local)
        }
    };

    for pair in points.windows(2) {
        let segment = Haversine.distance(pair[0], pair[1]);
        let next = cumulative + segment;

        if segment > 0.0 {
            let line = Line::new(pair[0], pair[1]);

            if piece.is_empty() && start <= next {
                piece.push(interpolate(&line, (start - cumulative) / segment));
            }

            if !piece.is_empty() {
                if end <= next {
                    piece.push(interpolate(&line, (end - cumulative) / segment));
                    break;
                }

                // A cut exactly on a segment boundary already emitted
                // this vertex.
                if piece.last() != Some(&pair[1]) {
                    piece.push(pair[1]);
                }
            }
        }

        cumulative = next;
    }

    if piece.len() < 2 {
        if let Some(only) = piece.first().copied() {
            piece.push(only);
        }
    }

    piece
}
