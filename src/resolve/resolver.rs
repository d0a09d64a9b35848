use crate::network::{EdgeId, RoutingNetwork};
use crate::resolve::{Resolve, ResolveError, ResolveQuery, RouterPoint};

use geo::{Distance, Haversine, InterpolatableLine, Line, LineLocatePoint, Point};
use itertools::Itertools;
use log::debug;
#[cfg(feature = "tracing")]
use tracing::Level;

/// Candidates this close (in meters) to the best one are considered
/// equivalent and may be overridden by the `is_better` preference.
const PREFERENCE_TOLERANCE: f64 = 2.0;

/// The bounding box grows through these fractions of the maximum search
/// distance; most queries sit on or next to an edge and finish in the
/// first, cheapest scan.
const EXPANSION: [f64; 3] = [0.25, 0.5, 1.0];

/// The default resolver: a bounding-box scan of the edge index followed
/// by per-segment projection of the query point onto each candidate
/// polyline.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeResolver;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    edge: EdgeId,
    projection: Projection,
    preferred: bool,
}

#[derive(Debug, Clone, Copy)]
struct Projection {
    point: Point,
    fraction: f64,
    distance: f64,
}

impl Resolve for EdgeResolver {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip_all))]
    fn resolve(
        &self,
        network: &RoutingNetwork,
        query: &ResolveQuery<'_>,
    ) -> Result<RouterPoint, ResolveError> {
        for step in EXPANSION {
            let radius = query.max_distance * step;

            if let Some(candidate) = self.scan(network, query, radius) {
                debug!(
                    "Resolved onto {:?} at {:.1}m within radius {radius:.1}m",
                    candidate.edge, candidate.projection.distance
                );

                return Ok(RouterPoint::new(
                    candidate.edge,
                    RouterPoint::offset_from_fraction(candidate.projection.fraction),
                    candidate.projection.point,
                ));
            }
        }

        Err(ResolveError::NoEdgeInRange {
            lat: query.position.y(),
            lon: query.position.x(),
            radius: query.max_distance,
        })
    }
}

impl EdgeResolver {
    /// One bounding-box pass. Candidates are ordered by projected
    /// distance; the closest acceptable one wins unless a preferred
    /// edge sits within the tolerance band.
    fn scan(
        &self,
        network: &RoutingNetwork,
        query: &ResolveQuery<'_>,
        radius: f64,
    ) -> Option<Candidate> {
        let mut ordered = network
            .scan_edges(&query.position, radius)
            .filter(|fat| {
                network
                    .edge(fat.id)
                    .is_some_and(|data| (query.is_acceptable)(fat.id, data))
            })
            .filter_map(|fat| {
                let projection = project(&fat.points, &query.position)?;
                if projection.distance > radius {
                    return None;
                }

                let preferred = query.is_better.is_some_and(|better| {
                    network.edge(fat.id).is_some_and(|data| better(fat.id, data))
                });

                Some(Candidate {
                    edge: fat.id,
                    projection,
                    preferred,
                })
            })
            .sorted_by(|a, b| a.projection.distance.total_cmp(&b.projection.distance));

        let closest = ordered.next()?;

        // A preferred edge within the tolerance band beats the closest.
        if !closest.preferred && query.is_better.is_some() {
            let band = closest.projection.distance + PREFERENCE_TOLERANCE;
            if let Some(better) = ordered
                .take_while(|c| c.projection.distance <= band)
                .find(|c| c.preferred)
            {
                return Some(better);
            }
        }

        Some(closest)
    }
}

/// Projects a point onto each segment of the polyline and keeps the
/// nearest projection, tracking the length fraction at which it falls.
fn project(points: &[Point], position: &Point) -> Option<Projection> {
    let total: f64 = points
        .windows(2)
        .map(|pair| Haversine.distance(pair[0], pair[1]))
        .sum();

    if total <= 0.0 {
        return None;
    }

    let mut cumulative = 0.0;
    let mut best: Option<Projection> = None;

    for pair in points.windows(2) {
        let segment = Haversine.distance(pair[0], pair[1]);
        let line = Line::new(pair[0], pair[1]);

        // We locate the point upon the segment, and then project that
        // fractional (%) upon the segment to obtain a point.
        if let Some(fraction) = line.line_locate_point(position) {
            let fraction = fraction.clamp(0.0, 1.0);
            let projected = line.point_at_ratio_from_start(&Haversine, fraction);
            let distance = Haversine.distance(*position, projected);

            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Projection {
                    point: projected,
                    fraction: (cumulative + fraction * segment) / total,
                    distance,
                });
            }
        }

        cumulative += segment;
    }

    best
}
