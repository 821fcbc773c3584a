use anyhow::Result;
use catalog::{build_snapshot, render_text, HitLine};
use clap::{Parser, Subcommand};
use recommender::persist::{load_snapshot, SnapshotPaths};
use recommender::{recommend_with, LoadOptions, Query, Strategy, DEFAULT_LIMIT};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Build and query travel post catalogs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a catalog snapshot from a CSV file or a directory of CSV files
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output snapshot directory
        #[arg(long)]
        output: String,
        /// Text encoding of the input tables (WHATWG label, e.g. utf-8, windows-1252)
        #[arg(long, default_value = "utf-8")]
        encoding: String,
        /// Field delimiter
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
    /// Print distinct locations
    Locations {
        #[arg(long, default_value = "./catalog")]
        catalog: String,
    },
    /// Print distinct hashtags
    Hashtags {
        #[arg(long, default_value = "./catalog")]
        catalog: String,
    },
    /// Rank posts for a location and hashtags
    Recommend {
        #[arg(long, default_value = "./catalog")]
        catalog: String,
        /// Comma or space separated hashtags
        #[arg(long)]
        hashtags: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        /// overlap or nearest
        #[arg(long, default_value = "overlap")]
        mode: Strategy,
        /// Base URL relative image references are resolved against
        #[arg(long)]
        image_base_url: Option<String>,
        /// Emit one JSON object per hit
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, encoding, delimiter } => {
            if !delimiter.is_ascii() {
                anyhow::bail!("delimiter must be a single ASCII character");
            }
            let opts = LoadOptions::default().with_encoding_label(&encoding)?.with_delimiter(delimiter as u8);
            build_snapshot(&input, &output, &opts)?;
            Ok(())
        }
        Commands::Locations { catalog } => {
            let catalog = load_snapshot(&SnapshotPaths::new(&catalog))?;
            for location in catalog.all_locations() {
                println!("{location}");
            }
            Ok(())
        }
        Commands::Hashtags { catalog } => {
            let catalog = load_snapshot(&SnapshotPaths::new(&catalog))?;
            for tag in catalog.all_hashtags() {
                println!("{tag}");
            }
            Ok(())
        }
        Commands::Recommend { catalog, hashtags, location, limit, mode, image_base_url, json } => {
            let catalog = load_snapshot(&SnapshotPaths::new(&catalog))?;
            let query = Query::new(location.as_deref(), &hashtags);
            let results = recommend_with(&catalog, &query, limit, mode)?;
            let hits: Vec<HitLine<'_>> = results.iter().map(|r| HitLine::new(r, image_base_url.as_deref())).collect();
            if json {
                for h in &hits {
                    println!("{}", serde_json::to_string(h)?);
                }
            } else {
                print!("{}", render_text(&hits));
            }
            Ok(())
        }
    }
}
