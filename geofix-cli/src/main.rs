//! GeoFix CLI - Command-line interface
//!
//! This binary provides a command-line interface to the GeoFix library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use geofix::coord::Coordinate;

use commands::{categories, edit, fit, list, locate, tag};
use error::CliError;

#[derive(Parser)]
#[command(name = "geofix")]
#[command(version = geofix::VERSION)]
#[command(about = "Converge noisy position samples into one fix and a street address", long_about = None)]
struct Cli {
    /// Config file (default: ~/.geofix/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one acquisition session against a recorded track
    Locate {
        /// JSON-lines track to replay
        #[arg(long, value_name = "TRACK")]
        replay: PathBuf,

        /// Skip reverse geocoding
        #[arg(long)]
        offline: bool,
    },

    /// Print the map region that encloses the given points
    Fit {
        /// Points as lat,lon
        #[arg(value_name = "LAT,LON", allow_hyphen_values = true)]
        points: Vec<Coordinate>,

        /// Region center when no points are given
        #[arg(long, value_name = "LAT,LON", allow_hyphen_values = true)]
        fallback: Option<Coordinate>,

        /// Include every saved location
        #[arg(long)]
        saved: bool,
    },

    /// Save a tagged location record
    Tag {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Street address to store with the record
        #[arg(long)]
        address: Option<String>,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,

        /// One of the categories listed by `geofix categories`
        #[arg(long)]
        category: Option<String>,

        /// Reserve a photo id for this record
        #[arg(long)]
        photo: bool,
    },

    /// List saved locations, oldest first
    List,

    /// Change the description or category of a saved location
    Edit {
        /// Row number from `geofix list`
        row: usize,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// Drop the photo from the record
        #[arg(long)]
        remove_photo: bool,
    },

    /// List the built-in record categories
    Categories,
}

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result: Result<(), CliError> = match cli.command {
        Commands::Locate { replay, offline } => {
            locate::run(locate::LocateArgs { replay, offline }, config_path)
        }
        Commands::Fit {
            points,
            fallback,
            saved,
        } => fit::run(
            fit::FitArgs {
                points,
                fallback,
                saved,
            },
            config_path,
        ),
        Commands::Tag {
            lat,
            lon,
            address,
            description,
            category,
            photo,
        } => tag::run(
            tag::TagArgs {
                lat,
                lon,
                address,
                description,
                category,
                with_photo: photo,
            },
            config_path,
        ),
        Commands::List => list::run(config_path),
        Commands::Edit {
            row,
            description,
            category,
            remove_photo,
        } => edit::run(
            edit::EditArgs {
                row,
                description,
                category,
                remove_photo,
            },
            config_path,
        ),
        Commands::Categories => {
            categories::run();
            Ok(())
        }
    };

    if let Err(e) = result {
        e.exit();
    }
}
