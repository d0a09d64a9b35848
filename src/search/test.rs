use crate::contracted::{ContractedEdge, ContractedGraph};
use crate::fixture::{self, TestNetwork, UnitProfile};
use crate::network::VertexId;
use crate::profile::FactorSource;
use crate::resolve::RouterPoint;
use crate::search::{
    BidirectionalDijkstra, CancellationToken, ContractedDijkstra, Dijkstra,
    EdgeContractedDijkstra, EdgeDijkstra, EdgePath, SearchBudget, SearchError,
};

use smallvec::SmallVec;
use std::error::Error;

static UNIT: UnitProfile = UnitProfile;

fn factors() -> FactorSource<'static> {
    FactorSource::Live(&UNIT)
}

fn ends(
    fixture: &TestNetwork,
    source: VertexId,
    target: VertexId,
) -> (
    SmallVec<[EdgePath; 2]>,
    SmallVec<[EdgePath; 2]>,
    RouterPoint,
    RouterPoint,
) {
    let source_point = fixture::point_at_vertex(&fixture.network, source);
    let target_point = fixture::point_at_vertex(&fixture.network, target);

    (
        EdgePath::for_source(&fixture.network, &factors(), &source_point),
        EdgePath::for_target(&fixture.network, &factors(), &target_point),
        source_point,
        target_point,
    )
}

fn plain_weight(fixture: &TestNetwork, source: VertexId, target: VertexId) -> Option<f32> {
    let (sources, targets, _, _) = ends(fixture, source, target);

    BidirectionalDijkstra::new(&fixture.network, factors())
        .run(&sources, &targets)
        .ok()
        .map(|outcome| outcome.weight)
}

#[test]
fn straight_line_costs_two_hundred() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();
    let [a, b, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    let (sources, targets, _, _) = ends(&fixture, a, c);
    let outcome = BidirectionalDijkstra::new(&fixture.network, factors()).run(&sources, &targets)?;

    assert!((outcome.weight - 200.0).abs() < 1e-3, "weight {}", outcome.weight);
    assert_eq!(outcome.path, vec![b]);

    Ok(())
}

#[test]
fn one_way_edge_is_not_a_shortcut() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::one_way_block();
    let [a, _, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    // A → C may not use the 500m edge (only driveable C → A), so the
    // two-hop 200m route wins; C → A may use it but the detour is
    // still cheaper.
    let forward = plain_weight(&fixture, a, c).expect("route must exist");
    let reverse = plain_weight(&fixture, c, a).expect("route must exist");

    assert!((forward - 200.0).abs() < 1e-3, "forward {forward}");
    assert!((reverse - 200.0).abs() < 1e-3, "reverse {reverse}");

    Ok(())
}

#[test]
fn restriction_forces_the_detour() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::restricted();
    let [a, b, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    let restrictions = fixture.network.restrictions(fixture::PROFILE_NAME).unwrap();
    let (sources, targets, _, _) = ends(&fixture, a, c);

    let outcome = EdgeDijkstra::new(&fixture.network, factors(), restrictions)
        .run(&sources, &targets)?;

    assert!((outcome.weight - 500.0).abs() < 1e-3, "weight {}", outcome.weight);

    // The forbidden sequence never appears contiguously in the path.
    assert!(
        !restrictions.forbids(&outcome.path),
        "restricted turn taken: {:?}",
        outcome.path
    );
    assert!(!outcome.path.windows(3).any(|w| w == [a, b, c]));

    Ok(())
}

#[test]
fn unrestricted_weights_are_symmetric() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::grid(4);

    for (i, j) in [(0usize, 15usize), (3, 12), (5, 10), (1, 14)] {
        let s = fixture.vertices[i];
        let t = fixture.vertices[j];

        let there = plain_weight(&fixture, s, t).expect("grid is connected");
        let back = plain_weight(&fixture, t, s).expect("grid is connected");

        assert!(
            (there - back).abs() < 1e-3,
            "asymmetry between {i} and {j}: {there} vs {back}"
        );
    }

    Ok(())
}

#[test]
fn weights_satisfy_the_triangle_inequality() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::grid(4);

    for (i, j, k) in [(0usize, 5usize, 15usize), (3, 6, 12), (1, 10, 14)] {
        let a = fixture.vertices[i];
        let b = fixture.vertices[j];
        let c = fixture.vertices[k];

        let ac = plain_weight(&fixture, a, c).unwrap();
        let ab = plain_weight(&fixture, a, b).unwrap();
        let bc = plain_weight(&fixture, b, c).unwrap();

        assert!(
            ac <= ab + bc + 1e-3,
            "triangle violated: {ac} > {ab} + {bc}"
        );
    }

    Ok(())
}

#[test]
fn contracted_search_matches_plain() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();
    let [a, b, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    let contracted = fixture::contract(&fixture.network, &UNIT);
    let (sources, targets, _, _) = ends(&fixture, a, c);

    let hierarchy = ContractedDijkstra::new(&contracted).run(&sources, &targets)?;
    let plain = BidirectionalDijkstra::new(&fixture.network, factors()).run(&sources, &targets)?;

    assert!((hierarchy.weight - plain.weight).abs() < 1e-3);
    // Expanding every shortcut recovers the same vertex sequence.
    assert_eq!(hierarchy.path, vec![b]);
    assert_eq!(hierarchy.path, plain.path);

    Ok(())
}

#[test]
fn contracted_levels_need_not_follow_vertex_numbering() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();
    let [a, b, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    // Hand-built hierarchy in the natural API shape: one record per
    // connection carrying both weight components. The middle vertex is
    // contracted first, so levels and vertex numbers do not line up,
    // and one connection is stored with its higher-level endpoint as
    // `from`.
    let mut level = vec![0u32; 3];
    level[b.0 as usize] = 0;
    level[a.0 as usize] = 1;
    level[c.0 as usize] = 2;

    let mut contracted = ContractedGraph::new(3, level);
    contracted.add_edge(a.0, b.0, ContractedEdge::original(100.0, 100.0));
    contracted.add_edge(c.0, b.0, ContractedEdge::original(100.0, 100.0));
    contracted.add_edge(a.0, c.0, ContractedEdge::shortcut(200.0, 200.0, b.0));

    let (sources, targets, _, _) = ends(&fixture, a, c);
    let outcome = ContractedDijkstra::new(&contracted).run(&sources, &targets)?;

    assert!(
        (outcome.weight - 200.0).abs() < 1e-3,
        "weight {}",
        outcome.weight
    );
    assert_eq!(outcome.path, vec![a, b, c]);

    // And back again, riding every connection against its stored
    // orientation.
    let (sources, targets, _, _) = ends(&fixture, c, a);
    let outcome = ContractedDijkstra::new(&contracted).run(&sources, &targets)?;
    assert!((outcome.weight - 200.0).abs() < 1e-3);

    Ok(())
}

#[test]
fn contracted_search_matches_plain_on_a_grid() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::grid(4);
    let contracted = fixture::contract(&fixture.network, &UNIT);

    for (i, j) in [(0usize, 15usize), (2, 13), (4, 11), (7, 8)] {
        let s = fixture.vertices[i];
        let t = fixture.vertices[j];

        let (sources, targets, _, _) = ends(&fixture, s, t);

        let hierarchy = ContractedDijkstra::new(&contracted).run(&sources, &targets)?;
        let plain =
            BidirectionalDijkstra::new(&fixture.network, factors()).run(&sources, &targets)?;

        assert!(
            (hierarchy.weight - plain.weight).abs() < 1e-3,
            "pair ({i}, {j}): {} vs {}",
            hierarchy.weight,
            plain.weight
        );
    }

    Ok(())
}

#[test]
fn edge_contracted_search_honours_restrictions() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::restricted();
    let [a, _, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    let restrictions = fixture.network.restrictions(fixture::PROFILE_NAME).unwrap();
    let contracted = fixture::contract_edge_based(&fixture.network, &UNIT, Some(restrictions));

    let (sources, targets, _, _) = ends(&fixture, a, c);

    let hierarchy = EdgeContractedDijkstra::new(&fixture.network, factors(), &contracted)
        .run(&sources, &targets)?;
    let plain = EdgeDijkstra::new(&fixture.network, factors(), restrictions)
        .run(&sources, &targets)?;

    assert!(
        (hierarchy.weight - plain.weight).abs() < 1e-3,
        "{} vs {}",
        hierarchy.weight,
        plain.weight
    );
    assert!((hierarchy.weight - 500.0).abs() < 1e-3);

    Ok(())
}

#[test]
fn disconnected_targets_exhaust_the_search() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::disconnected();
    let a = fixture.vertices[0];
    let c = fixture.vertices[2];

    let (sources, targets, _, _) = ends(&fixture, a, c);
    let result = BidirectionalDijkstra::new(&fixture.network, factors()).run(&sources, &targets);

    assert!(matches!(result, Err(SearchError::Exhausted)));
    Ok(())
}

#[test]
fn budgets_cut_the_search_short() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();
    let [a, _, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    let (sources, targets, _, _) = ends(&fixture, a, c);

    let result = BidirectionalDijkstra::new(&fixture.network, factors())
        .budget(SearchBudget::default().with_max_weight(50.0))
        .run(&sources, &targets);
    assert!(matches!(result, Err(SearchError::BudgetSpent)));

    let token = CancellationToken::new();
    token.cancel();

    let result = BidirectionalDijkstra::new(&fixture.network, factors())
        .budget(SearchBudget::default().with_cancellation(token))
        .run(&sources, &targets);
    assert!(matches!(result, Err(SearchError::Cancelled)));

    Ok(())
}

#[test]
fn settled_set_exposes_predecessors() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();
    let [a, b, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    let source = fixture::point_at_vertex(&fixture.network, a);
    let sources = EdgePath::for_source(&fixture.network, &factors(), &source);

    let settled = Dijkstra::new(&fixture.network, factors()).run(&sources)?;

    let (weight, predecessor) = settled.has_settled(c).expect("C is reachable");
    assert!((weight - 200.0).abs() < 1e-3);
    assert_eq!(predecessor, Some(b));

    // B is a root of the search tree: the point leaves its edge there.
    assert_eq!(settled.path(c), Some(vec![b, c]));
    assert!((settled.has_settled(a).unwrap().0).abs() < 1e-6);
    assert!(!settled.reached_limit());

    Ok(())
}
