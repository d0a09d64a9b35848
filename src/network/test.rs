use crate::fixture;
use crate::network::{DirectedEdgeId, EdgeData, EdgeId, NetworkBuilder, VertexId};

use std::error::Error;

#[test]
fn directed_id_round_trips() -> Result<(), Box<dyn Error>> {
    for id in [0u32, 1, 41, 65_000] {
        let edge = EdgeId(id);

        let forward = DirectedEdgeId::forward(edge);
        assert_eq!(forward.raw(), id as i64 + 1);
        assert_eq!(forward.edge(), edge);
        assert!(forward.is_forward());

        let backward = DirectedEdgeId::backward(edge);
        assert_eq!(backward.raw(), -(id as i64 + 1));
        assert_eq!(backward.edge(), edge);
        assert!(!backward.is_forward());

        assert_eq!(forward.reversed(), backward);
        assert_eq!(DirectedEdgeId::from_raw(forward.raw()), Some(forward));
    }

    // Zero is reserved and must not decode.
    assert_eq!(DirectedEdgeId::from_raw(0), None);

    Ok(())
}

#[test]
fn canonical_direction_follows_inversion() -> Result<(), Box<dyn Error>> {
    let mut builder = NetworkBuilder::new();
    let a = builder.add_vertex(0.0, 0.0);
    let b = builder.add_vertex(0.0, fixture::SPACING_DEG);

    let plain = builder.add_edge(a, b, EdgeData::new(100.0, 0, 0));
    let inverted = builder.add_edge(a, b, EdgeData::new(100.0, 0, 1).inverted());

    let network = builder.freeze();

    // The sign of the canonical directed id mirrors the inversion flag.
    assert!(network.id_directed(plain).unwrap().is_forward());
    assert!(!network.id_directed(inverted).unwrap().is_forward());

    // Resolving the directed id always lands back on the same record.
    for edge in [plain, inverted] {
        let directed = network.id_directed(edge).unwrap();
        let (data, _) = network.get_edge(directed).unwrap();
        assert_eq!(data, network.edge(edge).unwrap());
    }

    Ok(())
}

#[test]
fn vertex_ids_are_dense_after_freeze() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::grid(4);
    let network = &fixture.network;

    let mut seen = network.vertices().map(|(id, _)| id.0).collect::<Vec<_>>();
    seen.sort_unstable();

    assert_eq!(seen, (0..16).collect::<Vec<_>>());
    assert_eq!(network.vertex_count(), 16);
    assert_eq!(network.edge_count(), 24);

    Ok(())
}

#[test]
fn polyline_respects_shape_and_inversion() -> Result<(), Box<dyn Error>> {
    let mid = (0.0004, 0.0004);

    let mut builder = NetworkBuilder::new();
    let a = builder.add_vertex(0.0, 0.0);
    let b = builder.add_vertex(0.0, fixture::SPACING_DEG);

    let straight = builder.add_edge(a, b, EdgeData::new(100.0, 0, 0).with_shape(vec![mid]));
    // Same geometry, but stored against the logical direction.
    let flipped = builder.add_edge(a, b, EdgeData::new(100.0, 0, 1).with_shape(vec![mid]).inverted());

    let network = builder.freeze();

    let forward = network.edge_polyline(straight).unwrap();
    let inverted = network.edge_polyline(flipped).unwrap();

    assert_eq!(forward.len(), 3);
    assert_eq!(forward, inverted);
    assert!((forward[1].y() - mid.0 as f64).abs() < 1e-9);

    Ok(())
}

#[test]
fn adjacency_covers_both_orientations() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();
    let network = &fixture.network;
    let [a, b, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    // B sits between A and C: one incoming stored edge, one outgoing.
    let traversals = network.adjacent(b).collect::<Vec<_>>();
    assert_eq!(traversals.len(), 2);

    let neighbours = traversals
        .iter()
        .map(|t| t.neighbour)
        .collect::<Vec<_>>();
    assert!(neighbours.contains(&a));
    assert!(neighbours.contains(&c));

    assert_eq!(network.edges_between(a, b).count(), 1);
    assert_eq!(network.edges_between(b, a).count(), 1);
    assert_eq!(network.edges_between(a, c).count(), 0);

    Ok(())
}
