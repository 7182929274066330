//! Fit command - compute the map region enclosing a set of points.
//!
//! Points come from the command line, from the saved locations, or both.

use std::path::Path;

use geofix::coord::Coordinate;
use geofix::record::PersistencePort;
use geofix::region::{Region, RegionFitCalculator};

use super::common::open_store;
use crate::error::CliError;

/// Arguments for the fit command.
pub struct FitArgs {
    pub points: Vec<Coordinate>,
    pub fallback: Option<Coordinate>,
    /// Include every saved location.
    pub saved: bool,
}

/// Run the fit command.
pub fn run(args: FitArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let mut points = args.points;
    if args.saved {
        let store = open_store(config_path)?;
        points.extend(store.list()?.iter().map(|record| record.coordinate));
    }

    let fallback = resolve_fallback(&points, args.fallback)?;
    let region = RegionFitCalculator::fit(&points, fallback);
    print_region(&region, points.len());
    Ok(())
}

/// Center to use when there are no points: `--fallback`, else the first point.
fn resolve_fallback(
    points: &[Coordinate],
    fallback: Option<Coordinate>,
) -> Result<Coordinate, CliError> {
    match (points.first(), fallback) {
        (_, Some(fallback)) => Ok(fallback),
        (Some(first), None) => Ok(*first),
        (None, None) => Err(CliError::InvalidArgument(
            "No points given. Pass at least one lat,lon, --saved, or --fallback.".to_string(),
        )),
    }
}

fn print_region(region: &Region, point_count: usize) {
    let (south_west, north_east) = region.bounds();

    println!("Points:      {}", point_count);
    println!("Center:      {}", region.center);
    println!(
        "Span:        {:.6}° lat × {:.6}° lon",
        region.span.latitude_delta, region.span.longitude_delta
    );
    println!("South-west:  {}", south_west);
    println!("North-east:  {}", north_east);
}
