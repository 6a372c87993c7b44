use crate::cli::CommandLineArgs;
use crate::models::*;

use clap::Parser;
use time::macros::datetime;

/// Create a Quake matching the first sample event.
pub(crate) fn get_test_quake() -> Quake {
    Quake {
        id: 1,
        magnitude: 0.5,
        depth: 5.2,
        latitude: 35.5,
        longitude: -120.3,
        timestamp: datetime!(2024-11-01 10:23:45),
    }
}

/// Create a Quake with the given id, magnitude and depth.
pub(crate) fn get_test_quake_with(id: i64, magnitude: f64, depth: f64) -> Quake {
    Quake {
        id,
        magnitude,
        depth,
        ..get_test_quake()
    }
}

/// Create command line arguments with every option left at its default.
pub(crate) fn get_test_args() -> CommandLineArgs {
    CommandLineArgs::parse_from(["quakeviz"])
}
