//! Small hand-built networks and a test-grade contractor.
//!
//! Everything here exists to exercise the engine in tests, benches and
//! examples: the networks are a handful of vertices, and the contractor
//! skips witness searches entirely (it only has to be correct, not
//! small). Production hierarchies arrive pre-built from the import
//! pipeline.

use crate::contracted::{ContractedEdge, ContractedGraph, EdgeBasedContractedGraph};
use crate::network::{
    DirectedEdgeId, EdgeData, EdgeId, NetworkBuilder, RoutingNetwork, VertexId,
};
use crate::profile::{Factor, FactorDirection, Profile};
use crate::resolve::RouterPoint;
use crate::restriction::RestrictionIndex;

use rustc_hash::FxHashMap;

pub const PROFILE_NAME: &str = "unit";

/// Edge profiles understood by [`UnitProfile`].
pub const EP_BIDIRECTIONAL: u16 = 0;
pub const EP_ONEWAY_FORWARD: u16 = 1;
pub const EP_ONEWAY_BACKWARD: u16 = 2;
pub const EP_IMPASSABLE: u16 = 3;
pub const EP_NO_STOPPING: u16 = 4;

/// Roughly 100m of longitude at the equator.
pub const SPACING_DEG: f32 = 0.0009;

/// A profile with factor `1.0` everywhere it can go, so weights read
/// directly in meters.
pub struct UnitProfile;

impl Profile for UnitProfile {
    fn name(&self) -> &str {
        PROFILE_NAME
    }

    fn factor(&self, edge_profile: u16) -> Factor {
        match edge_profile {
            EP_BIDIRECTIONAL | EP_NO_STOPPING => Factor::new(1.0, FactorDirection::Both),
            EP_ONEWAY_FORWARD => Factor::new(1.0, FactorDirection::Forward),
            EP_ONEWAY_BACKWARD => Factor::new(1.0, FactorDirection::Backward),
            _ => Factor::impassable(),
        }
    }

    fn can_stop_on(&self, edge_profile: u16) -> bool {
        edge_profile != EP_NO_STOPPING
    }
}

/// A frozen scenario network plus the post-freeze identifiers of its
/// vertices (in declaration order) and edges (in insertion order).
pub struct TestNetwork {
    pub network: RoutingNetwork,
    pub vertices: Vec<VertexId>,
    pub edges: Vec<EdgeId>,
}

/// Builds and freezes a network from `(lat, lon)` vertices and
/// `(from, to, meters, edge_profile)` edges, then recovers the vertex
/// identifiers the Hilbert sort assigned.
pub fn build(points: &[(f32, f32)], edges: &[(usize, usize, f32, u16)]) -> TestNetwork {
    let mut builder = NetworkBuilder::new();
    builder.register_profile(PROFILE_NAME);

    let provisional = points
        .iter()
        .map(|(lat, lon)| builder.add_vertex(*lat, *lon))
        .collect::<Vec<_>>();

    let edge_ids = edges
        .iter()
        .enumerate()
        .map(|(meta, (from, to, meters, profile))| {
            builder.add_edge(
                provisional[*from],
                provisional[*to],
                EdgeData::new(*meters, *profile, meta as u32),
            )
        })
        .collect::<Vec<_>>();

    let network = builder.freeze();

    let vertices = points
        .iter()
        .map(|(lat, lon)| {
            network
                .vertices()
                .find(|(_, v)| v.lat == *lat && v.lon == *lon)
                .map(|(id, _)| id)
                .expect("fixture vertex survives the freeze")
        })
        .collect();

    TestNetwork {
        network,
        vertices,
        edges: edge_ids,
    }
}

/// A(0,0), B, C in a straight 200m line joined by two 100m edges.
pub fn straight_line() -> TestNetwork {
    build(
        &[(0.0, 0.0), (0.0, SPACING_DEG), (0.0, 2.0 * SPACING_DEG)],
        &[
            (0, 1, 100.0, EP_BIDIRECTIONAL),
            (1, 2, 100.0, EP_BIDIRECTIONAL),
        ],
    )
}

/// The straight line plus a direct A–C edge that may only be driven
/// C → A.
pub fn one_way_block() -> TestNetwork {
    build(
        &[(0.0, 0.0), (0.0, SPACING_DEG), (0.0, 2.0 * SPACING_DEG)],
        &[
            (0, 1, 100.0, EP_BIDIRECTIONAL),
            (1, 2, 100.0, EP_BIDIRECTIONAL),
            (0, 2, 500.0, EP_ONEWAY_BACKWARD),
        ],
    )
}

/// The straight line plus a bidirectional 500m A–C edge, with the turn
/// A → B → C forbidden, attached for [`PROFILE_NAME`].
pub fn restricted() -> TestNetwork {
    let mut fixture = build(
        &[(0.0, 0.0), (0.0, SPACING_DEG), (0.0, 2.0 * SPACING_DEG)],
        &[
            (0, 1, 100.0, EP_BIDIRECTIONAL),
            (1, 2, 100.0, EP_BIDIRECTIONAL),
            (0, 2, 500.0, EP_BIDIRECTIONAL),
        ],
    );

    let mut index = RestrictionIndex::new();
    index.add([
        fixture.vertices[0],
        fixture.vertices[1],
        fixture.vertices[2],
    ]);

    fixture.network = fixture.network.with_restrictions(PROFILE_NAME, index);
    fixture
}

/// Two islands: A–B and C–D, with no connection between them.
pub fn disconnected() -> TestNetwork {
    build(
        &[
            (0.0, 0.0),
            (0.0, SPACING_DEG),
            (0.01, 0.0),
            (0.01, SPACING_DEG),
        ],
        &[
            (0, 1, 100.0, EP_BIDIRECTIONAL),
            (2, 3, 100.0, EP_BIDIRECTIONAL),
        ],
    )
}

/// An `n × n` lattice with 100m bidirectional edges.
pub fn grid(n: usize) -> TestNetwork {
    let mut points = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            points.push((row as f32 * SPACING_DEG, col as f32 * SPACING_DEG));
        }
    }

    let mut edges = Vec::new();
    for row in 0..n {
        for col in 0..n {
            let here = row * n + col;
            if col + 1 < n {
                edges.push((here, here + 1, 100.0, EP_BIDIRECTIONAL));
            }
            if row + 1 < n {
                edges.push((here, here + n, 100.0, EP_BIDIRECTIONAL));
            }
        }
    }

    build(&points, &edges)
}

/// Directional arc used by the contractors: `cf` prices the forward
/// exploration of the arc, `cb` the backward one.
#[derive(Clone, Copy)]
struct Arc {
    cf: f32,
    cb: f32,
    via: Option<u32>,
}

/// Contraction order by the edge-difference heuristic: nodes whose
/// removal creates few shortcuts relative to the arcs they take with
/// them go first. Deliberately not the node numbering, so levels and
/// indices stay uncorrelated.
fn contraction_order(arcs: &FxHashMap<(u32, u32), Arc>, node_count: usize) -> Vec<u32> {
    let mut incoming = vec![0i64; node_count];
    let mut outgoing = vec![0i64; node_count];

    for (tail, head) in arcs.keys() {
        outgoing[*tail as usize] += 1;
        incoming[*head as usize] += 1;
    }

    let mut order = (0..node_count as u32).collect::<Vec<_>>();
    order.sort_by_key(|node| {
        let ix = *node as usize;
        let removed = incoming[ix] + outgoing[ix];
        let added = incoming[ix] * outgoing[ix];
        (added - removed / 2, *node)
    });

    order
}

/// Contraction level per node: its position in the contraction order.
fn levels_of(order: &[u32]) -> Vec<u32> {
    let mut level = vec![0u32; order.len()];
    for (position, node) in order.iter().enumerate() {
        level[*node as usize] = position as u32;
    }
    level
}

/// All-pairs contraction without witness searches: every in/out
/// neighbour pair of a contracted node gets a shortcut. Distances are
/// preserved exactly, at the cost of superfluous shortcuts nobody
/// minds in a fixture.
fn contract_arcs(arcs: &mut FxHashMap<(u32, u32), Arc>, order: &[u32]) {
    let mut live = vec![true; order.len()];

    for v in order.iter().copied() {
        live[v as usize] = false;

        let incoming = arcs
            .iter()
            .filter(|((tail, head), _)| *head == v && live[*tail as usize])
            .map(|((tail, _), arc)| (*tail, *arc))
            .collect::<Vec<_>>();

        let outgoing = arcs
            .iter()
            .filter(|((tail, head), _)| *tail == v && live[*head as usize])
            .map(|((_, head), arc)| (*head, *arc))
            .collect::<Vec<_>>();

        for (x, into) in &incoming {
            for (y, out) in &outgoing {
                if x == y {
                    continue;
                }

                let shortcut = Arc {
                    cf: into.cf + out.cf,
                    cb: into.cb + out.cb,
                    via: Some(v),
                };

                arcs.entry((*x, *y))
                    .and_modify(|existing| {
                        if shortcut.cf < existing.cf {
                            *existing = shortcut;
                        }
                    })
                    .or_insert(shortcut);
            }
        }
    }
}

/// Lays a symmetric arc set out the way the hierarchy API expects: one
/// stored edge per connection, oriented by the arcs' own endpoints with
/// both weight components on the same record. Levels play no part in
/// the stored orientation.
///
/// Opposite arcs merge onto one edge only when they bypass the same
/// node; otherwise each direction keeps its own record with the other
/// component closed.
fn assemble(arcs: FxHashMap<(u32, u32), Arc>, level: Vec<u32>) -> ContractedGraph {
    let mut hierarchy = ContractedGraph::new(level.len(), level);

    for (&(tail, head), arc) in &arcs {
        // Each unordered pair is laid down once, from its lower-numbered
        // endpoint's visit.
        if tail > head && arcs.contains_key(&(head, tail)) {
            continue;
        }

        match arcs.get(&(head, tail)) {
            Some(reverse) if reverse.via == arc.via => hierarchy.add_edge(
                tail,
                head,
                ContractedEdge {
                    weight_forward: arc.cf,
                    weight_backward: reverse.cf,
                    contracted: arc.via,
                },
            ),
            Some(reverse) => {
                hierarchy.add_edge(
                    tail,
                    head,
                    ContractedEdge {
                        weight_forward: arc.cf,
                        weight_backward: f32::INFINITY,
                        contracted: arc.via,
                    },
                );
                hierarchy.add_edge(
                    tail,
                    head,
                    ContractedEdge {
                        weight_forward: f32::INFINITY,
                        weight_backward: reverse.cf,
                        contracted: reverse.via,
                    },
                );
            }
            None => hierarchy.add_edge(
                tail,
                head,
                ContractedEdge {
                    weight_forward: arc.cf,
                    weight_backward: f32::INFINITY,
                    contracted: arc.via,
                },
            ),
        }
    }

    hierarchy
}

/// Lays a *directed* arc set out as an upward-only hierarchy, oriented
/// by level. Transitions between directed edges price their two
/// exploration directions differently, so the components of one stored
/// record cannot describe opposite arcs; instead each arc lands on the
/// one component its search direction reads, and the other stays
/// closed.
fn assemble_directed(arcs: FxHashMap<(u32, u32), Arc>, level: Vec<u32>) -> ContractedGraph {
    let mut hierarchy = ContractedGraph::new(level.len(), level.clone());

    for ((tail, head), arc) in arcs {
        if level[head as usize] > level[tail as usize] {
            hierarchy.add_edge(
                tail,
                head,
                ContractedEdge {
                    weight_forward: arc.cf,
                    weight_backward: f32::INFINITY,
                    contracted: arc.via,
                },
            );
        } else {
            hierarchy.add_edge(
                head,
                tail,
                ContractedEdge {
                    weight_forward: f32::INFINITY,
                    weight_backward: arc.cb,
                    contracted: arc.via,
                },
            );
        }
    }

    hierarchy
}

/// Contracts a network for one profile into a node-based hierarchy.
pub fn contract(network: &RoutingNetwork, profile: &dyn Profile) -> ContractedGraph {
    let mut arcs: FxHashMap<(u32, u32), Arc> = FxHashMap::default();

    for (id, data) in network.edges() {
        let factor = profile.factor(data.profile_id);
        if !factor.is_traversable() {
            continue;
        }

        let Some((from, to)) = network.edge_endpoints(id) else {
            continue;
        };
        let weight = data.distance / factor.value;

        let mut insert = |tail: u32, head: u32| {
            if tail == head {
                return;
            }

            let arc = Arc {
                cf: weight,
                cb: weight,
                via: None,
            };

            arcs.entry((tail, head))
                .and_modify(|existing| {
                    if arc.cf < existing.cf {
                        *existing = arc;
                    }
                })
                .or_insert(arc);
        };

        if factor.allows(true) {
            insert(from.0, to.0);
        }
        if factor.allows(false) {
            insert(to.0, from.0);
        }
    }

    let node_count = network.vertex_count();
    let order = contraction_order(&arcs, node_count);

    contract_arcs(&mut arcs, &order);
    assemble(arcs, levels_of(&order))
}

/// Contracts a network for one profile into an edge-based hierarchy,
/// leaving out every transition a restriction forbids.
pub fn contract_edge_based(
    network: &RoutingNetwork,
    profile: &dyn Profile,
    restrictions: Option<&RestrictionIndex>,
) -> EdgeBasedContractedGraph {
    let weight_of = |directed: DirectedEdgeId| -> Option<f32> {
        let (data, _) = network.get_edge(directed)?;
        let factor = profile.factor(data.profile_id);

        factor
            .allows(directed.is_forward())
            .then(|| data.distance / factor.value)
    };

    let mut arcs: FxHashMap<(u32, u32), Arc> = FxHashMap::default();

    for (id, _) in network.edges() {
        for forward in [true, false] {
            let directed = DirectedEdgeId::new(id, forward);
            let Some(own_weight) = weight_of(directed) else {
                continue;
            };
            let Some((_, (tail, head))) = network.get_edge(directed) else {
                continue;
            };

            for traversal in network.adjacent(head) {
                if traversal.edge == id {
                    continue;
                }

                let next = DirectedEdgeId::new(traversal.edge, traversal.forward);
                let Some(next_weight) = weight_of(next) else {
                    continue;
                };

                let turn = [tail, head, traversal.neighbour];
                if restrictions.is_some_and(|r| r.forbids(&turn)) {
                    continue;
                }

                let arc = Arc {
                    cf: next_weight,
                    cb: own_weight,
                    via: None,
                };

                arcs.entry((
                    EdgeBasedContractedGraph::node_of(directed),
                    EdgeBasedContractedGraph::node_of(next),
                ))
                .and_modify(|existing| {
                    if arc.cf < existing.cf {
                        *existing = arc;
                    }
                })
                .or_insert(arc);
            }
        }
    }

    let node_count = network.edge_count() * 2;
    let order = contraction_order(&arcs, node_count);

    contract_arcs(&mut arcs, &order);
    EdgeBasedContractedGraph::from_hierarchy(assemble_directed(arcs, levels_of(&order)))
}

/// Resolves a fixture vertex position into a [`RouterPoint`] sitting
/// exactly on one of its incident edges.
pub fn point_at_vertex(network: &RoutingNetwork, vertex: VertexId) -> RouterPoint {
    for (id, _) in network.edges() {
        let (from, to) = network.edge_endpoints(id).unwrap();
        let position = network.vertex(vertex).unwrap().position();

        if from == vertex {
            return RouterPoint::new(id, 0, position);
        }
        if to == vertex {
            return RouterPoint::new(id, u16::MAX, position);
        }
    }

    panic!("vertex {vertex:?} has no incident edge");
}
