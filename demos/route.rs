//! Routes across a small fixture grid and prints the result as WKT.
//!
//! ```sh
//! cargo run --example route
//! ```

use routier::fixture::{self, UnitProfile};
use routier::Router;

use wkt::ToWkt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let fixture = fixture::grid(6);
    let router = Router::new(&fixture.network);
    let profile = UnitProfile;

    let span = 5.0 * fixture::SPACING_DEG as f64;
    let route = router.try_calculate_from_coordinates(&profile, (0.0, 0.0), (span, span))?;

    println!(
        "route: {:.0}m in {:.0}s over {} segments",
        route.distance,
        route.duration,
        route.segments.len()
    );
    println!("{}", route.linestring().wkt_string());

    Ok(())
}
