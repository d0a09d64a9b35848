use crate::fixture::{self, UnitProfile};
use crate::network::{EdgeData, NetworkBuilder, VertexId};
use crate::profile::{Factor, FactorDirection, FactorSource, Profile};
use crate::resolve::RouterPoint;
use crate::route::{BuildRoute, DefaultRouteBuilder, RouteError};

use geo::point;
use std::error::Error;
use wkt::ToWkt;

static UNIT: UnitProfile = UnitProfile;

fn factors() -> FactorSource<'static> {
    FactorSource::Live(&UNIT)
}

fn on_edge(fixture: &fixture::TestNetwork, edge: usize, offset: u16) -> RouterPoint {
    // The position fields are informational; trimming runs on offsets.
    let fraction = offset as f64 / u16::MAX as f64;
    RouterPoint::new(
        fixture.edges[edge],
        offset,
        point! { x: fraction * fixture::SPACING_DEG as f64, y: 0.0 },
    )
}

#[test]
fn same_edge_trip_is_trimmed_between_offsets() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();

    let source = on_edge(&fixture, 0, 10_000);
    let target = on_edge(&fixture, 0, 20_000);

    let route = DefaultRouteBuilder.build(&fixture.network, &factors(), &source, &target, &[])?;

    let expected = (20_000.0 - 10_000.0) / u16::MAX as f32 * 100.0;
    assert!(
        (route.distance - expected).abs() < 1e-3,
        "distance {} expected {expected}",
        route.distance
    );

    // No intermediate vertex appears on a one-edge trip.
    assert_eq!(route.segments.len(), 1);
    assert_eq!(route.shape.len(), 2);
    assert!(route.shape[0].x() < route.shape[1].x());

    Ok(())
}

#[test]
fn reversed_same_edge_trip_flips_the_shape() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();

    let source = on_edge(&fixture, 0, 20_000);
    let target = on_edge(&fixture, 0, 10_000);

    let route = DefaultRouteBuilder.build(&fixture.network, &factors(), &source, &target, &[])?;

    let expected = (20_000.0 - 10_000.0) / u16::MAX as f32 * 100.0;
    assert!((route.distance - expected).abs() < 1e-3);
    assert!(route.shape[0].x() > route.shape[1].x());

    Ok(())
}

#[test]
fn a_path_stitches_trims_and_full_edges() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();
    let [a, b, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    let source = fixture::point_at_vertex(&fixture.network, a);
    let target = fixture::point_at_vertex(&fixture.network, c);

    let route =
        DefaultRouteBuilder.build(&fixture.network, &factors(), &source, &target, &[b])?;

    assert!((route.distance - 200.0).abs() < 1e-3);
    assert!((route.duration - 200.0).abs() < 1e-3);
    assert_eq!(route.segments.len(), 2);

    // Continuous geometry from A to C, printable for inspection.
    let a_pos = fixture.network.vertex(a).unwrap().position();
    let c_pos = fixture.network.vertex(c).unwrap().position();
    assert_eq!(route.shape.first(), Some(&a_pos));
    assert_eq!(route.shape.last(), Some(&c_pos));

    println!("{}", route.linestring().wkt_string());

    Ok(())
}

#[test]
fn durations_divide_distance_by_the_factor() -> Result<(), Box<dyn Error>> {
    struct Speedy;

    impl Profile for Speedy {
        fn name(&self) -> &str {
            "speedy"
        }

        fn factor(&self, _: u16) -> Factor {
            Factor::new(2.0, FactorDirection::Both)
        }
    }

    let fixture = fixture::straight_line();
    let [a, b, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    let source = fixture::point_at_vertex(&fixture.network, a);
    let target = fixture::point_at_vertex(&fixture.network, c);

    let speedy = Speedy;
    let route = DefaultRouteBuilder.build(
        &fixture.network,
        &FactorSource::Live(&speedy),
        &source,
        &target,
        &[b],
    )?;

    assert!((route.distance - 200.0).abs() < 1e-3);
    assert!((route.duration - 100.0).abs() < 1e-3);

    Ok(())
}

#[test]
fn a_detached_path_is_rejected() -> Result<(), Box<dyn Error>> {
    let fixture = fixture::straight_line();
    let [a, _, c]: [VertexId; 3] = fixture.vertices[..].try_into()?;

    let source = fixture::point_at_vertex(&fixture.network, a);
    let target = fixture::point_at_vertex(&fixture.network, c);

    // C is not an endpoint of the source edge.
    let result = DefaultRouteBuilder.build(&fixture.network, &factors(), &source, &target, &[c]);
    assert!(matches!(result, Err(RouteError::DetachedPath)));

    Ok(())
}

#[test]
fn shapes_follow_the_stored_inversion_flag() -> Result<(), Box<dyn Error>> {
    let mid = (0.0003, 0.00045);

    let mut builder = NetworkBuilder::new();
    builder.register_profile(fixture::PROFILE_NAME);
    let a = builder.add_vertex(0.0, 0.0);
    let b = builder.add_vertex(0.0, fixture::SPACING_DEG);
    let edge = builder.add_edge(
        a,
        b,
        EdgeData::new(120.0, fixture::EP_BIDIRECTIONAL, 0)
            .with_shape(vec![mid])
            .inverted(),
    );
    let network = builder.freeze();

    let source = RouterPoint::new(edge, 0, point! { x: 0.0, y: 0.0 });
    let target = RouterPoint::new(
        edge,
        u16::MAX,
        point! { x: fixture::SPACING_DEG as f64, y: 0.0 },
    );

    let route = DefaultRouteBuilder.build(&network, &factors(), &source, &target, &[])?;

    // The intermediate shape point survives, in travel order.
    assert_eq!(route.shape.len(), 3);
    assert!((route.shape[1].y() - mid.0 as f64).abs() < 1e-9);
    assert!((route.distance - 120.0).abs() < 1e-3);

    Ok(())
}
