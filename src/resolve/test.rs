use crate::fixture::{self, UnitProfile};
use crate::network::{EdgeData, EdgeId};
use crate::profile::Profile;
use crate::resolve::{EdgeResolver, Resolve, ResolveError, ResolveQuery};

use geo::point;
use std::error::Error;

fn accept_traversable(_: EdgeId, data: &EdgeData) -> bool {
    UnitProfile.factor(data.profile_id).is_traversable()
}

#[test]
fn resolves_midpoint_to_half_offset() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();

    let query = ResolveQuery {
        position: point! { x: fixture::SPACING_DEG as f64 / 2.0, y: 0.0 },
        max_distance: 50.0,
        is_acceptable: &accept_traversable,
        is_better: None,
    };

    let point = EdgeResolver.resolve(&fixture.network, &query)?;

    assert_eq!(point.edge, fixture.edges[0]);
    let half = u16::MAX / 2;
    assert!(
        point.offset.abs_diff(half) <= 2,
        "offset {} should sit at the middle of the edge",
        point.offset
    );

    Ok(())
}

#[test]
fn resolution_is_deterministic() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::grid(3);

    let query = ResolveQuery {
        position: point! { x: 0.00071, y: 0.00033 },
        max_distance: 50.0,
        is_acceptable: &accept_traversable,
        is_better: None,
    };

    let first = EdgeResolver.resolve(&fixture.network, &query)?;
    let second = EdgeResolver.resolve(&fixture.network, &query)?;

    assert_eq!(first.edge, second.edge);
    assert_eq!(first.offset, second.offset);

    Ok(())
}

#[test]
fn fails_outside_the_search_radius() {
    let fixture = fixture::straight_line();

    let query = ResolveQuery {
        // A degree of latitude is far beyond any 50m radius.
        position: point! { x: 0.0, y: 1.0 },
        max_distance: 50.0,
        is_acceptable: &accept_traversable,
        is_better: None,
    };

    let result = EdgeResolver.resolve(&fixture.network, &query);
    assert!(matches!(result, Err(ResolveError::NoEdgeInRange { .. })));
}

#[test]
fn acceptance_filters_before_distance() -> Result<(), Box<dyn Error>> {
    // An impassable edge right under the query, a passable one ~11m north.
    let fixture = fixture::build(
        &[
            (0.0, 0.0),
            (0.0, fixture::SPACING_DEG),
            (0.0001, 0.0),
            (0.0001, fixture::SPACING_DEG),
        ],
        &[
            (0, 1, 100.0, fixture::EP_IMPASSABLE),
            (2, 3, 100.0, fixture::EP_BIDIRECTIONAL),
        ],
    );

    let query = ResolveQuery {
        position: point! { x: fixture::SPACING_DEG as f64 / 2.0, y: 0.0 },
        max_distance: 50.0,
        is_acceptable: &accept_traversable,
        is_better: None,
    };

    let point = EdgeResolver.resolve(&fixture.network, &query)?;
    assert_eq!(point.edge, fixture.edges[1]);

    Ok(())
}

#[test]
fn preference_breaks_near_ties() -> Result<(), Box<dyn Error>> {
    // Two parallel edges with identical geometry; only profiles differ.
    let fixture = fixture::build(
        &[(0.0, 0.0), (0.0, fixture::SPACING_DEG)],
        &[
            (0, 1, 100.0, fixture::EP_BIDIRECTIONAL),
            (0, 1, 100.0, fixture::EP_ONEWAY_FORWARD),
        ],
    );

    let prefer_oneway =
        |_: EdgeId, data: &EdgeData| data.profile_id == fixture::EP_ONEWAY_FORWARD;

    let query = ResolveQuery {
        position: point! { x: fixture::SPACING_DEG as f64 / 2.0, y: 0.0 },
        max_distance: 50.0,
        is_acceptable: &accept_traversable,
        is_better: Some(&prefer_oneway),
    };

    let point = EdgeResolver.resolve(&fixture.network, &query)?;
    assert_eq!(point.edge, fixture.edges[1]);

    Ok(())
}
