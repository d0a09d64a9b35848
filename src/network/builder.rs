use crate::network::edge::{EdgeData, FatEdge, Vertex};
use crate::network::{EdgeId, RoutingNetwork, VertexId};

use log::{debug, info};
use petgraph::graph::DiGraph;
use rstar::RTree;
use rustc_hash::FxHashSet;
use std::time::Instant;

/// Side length of the Hilbert grid the freeze sort maps coordinates onto.
const HILBERT_ORDER: u32 = 16;

/// Accumulates vertices and edges, then freezes them into an immutable
/// [`RoutingNetwork`].
///
/// Identifiers handed out before the freeze are provisional: freezing
/// re-orders vertices along a Hilbert curve so that spatially close
/// vertices land on close indices, and remaps every edge accordingly.
/// Edge identifiers keep their insertion order.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    vertices: Vec<Vertex>,
    edges: Vec<(u32, u32, EdgeData)>,
    profiles: FxHashSet<String>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, lat: f32, lon: f32) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(Vertex::new(lat, lon));
        id
    }

    pub fn add_edge(&mut self, from: VertexId, to: VertexId, data: EdgeData) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push((from.0, to.0, data));
        id
    }

    /// Declares a travel profile this network carries data for.
    /// Queries against unregistered profiles are rejected up-front.
    pub fn register_profile(&mut self, name: impl Into<String>) -> &mut Self {
        self.profiles.insert(name.into());
        self
    }

    /// Sorts, remaps and freezes. The result is read-only; all queries
    /// run against it concurrently without locking.
    pub fn freeze(self) -> RoutingNetwork {
        let start_time = Instant::now();

        let NetworkBuilder {
            vertices,
            edges,
            profiles,
        } = self;

        // Hilbert sort: stable on the curve distance so equal cells keep
        // insertion order and re-freezing is deterministic.
        let mut order = (0..vertices.len()).collect::<Vec<_>>();
        order.sort_by_key(|ix| {
            let v = &vertices[*ix];
            hilbert_distance(v.lat, v.lon)
        });

        let mut remap = vec![0u32; vertices.len()];
        for (new_ix, old_ix) in order.iter().enumerate() {
            remap[*old_ix] = new_ix as u32;
        }

        debug!("Hilbert ordering took: {:?}", start_time.elapsed());

        let mut graph = DiGraph::with_capacity(vertices.len(), edges.len());
        for old_ix in &order {
            graph.add_node(vertices[*old_ix]);
        }

        let mut edge_profile_count: u16 = 0;
        for (from, to, data) in edges {
            edge_profile_count = edge_profile_count.max(data.profile_id + 1);
            graph.add_edge(remap[from as usize].into(), remap[to as usize].into(), data);
        }

        let fat = graph
            .edge_indices()
            .map(|ix| {
                let (from, to) = graph.edge_endpoints(ix).unwrap();
                let data = &graph[ix];

                let mut points = Vec::with_capacity(2 + data.shape.as_ref().map_or(0, |s| s.len()));
                points.push(graph[from].position());
                points.extend(data.shape_forward());
                points.push(graph[to].position());

                FatEdge {
                    id: ix.into(),
                    points: points.into_boxed_slice(),
                }
            })
            .collect::<Vec<_>>();

        let index_edge = RTree::bulk_load(fat);

        info!(
            "Froze network: {} vertices, {} edges in {:?}",
            graph.node_count(),
            graph.edge_count(),
            start_time.elapsed()
        );

        RoutingNetwork::assemble(graph, index_edge, profiles, edge_profile_count)
    }
}

/// Distance along a Hilbert curve over a `2^16 × 2^16` grid covering the
/// full lat/lon domain.
fn hilbert_distance(lat: f32, lon: f32) -> u64 {
    let side = 1u64 << HILBERT_ORDER;
    let scale = (side - 1) as f64;

    let x = (((lon as f64 + 180.0) / 360.0).clamp(0.0, 1.0) * scale) as u64;
    let y = (((lat as f64 + 90.0) / 180.0).clamp(0.0, 1.0) * scale) as u64;

    let (mut x, mut y) = (x, y);
    let mut d = 0u64;
    let mut s = side / 2;

    while s > 0 {
        let rx = u64::from(x & s > 0);
        let ry = u64::from(y & s > 0);
        d += s * s * ((3 * rx) ^ ry);

        // Rotate the quadrant so the curve stays continuous.
        if ry == 0 {
            if rx == 1 {
                x = side - 1 - x;
                y = side - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }

        s /= 2;
    }

    d
}

#[cfg(test)]
mod test {
    use super::hilbert_distance;

    #[test]
    fn hilbert_orders_neighbours_closely() {
        // Two points ~100m apart should sit far closer on the curve than
        // two points on opposite sides of the planet.
        let near = hilbert_distance(52.5200, 13.4050).abs_diff(hilbert_distance(52.5209, 13.4051));
        let far = hilbert_distance(52.5200, 13.4050).abs_diff(hilbert_distance(-33.8688, 151.2093));

        assert!(near < far, "near={near} far={far}");
    }
}
