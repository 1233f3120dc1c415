use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config;
use crate::storage::{Storage, media::MediaStore};

#[derive(Parser)]
#[command(name = "playdeck")]
#[command(version = "0.1")]
#[command(about = "Music catalog and playlist service")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the http api server
    Serve,
    /// List tracks in the catalog
    Tracks {
        /// Maximum number of tracks to print
        #[arg(short, long)]
        limit: Option<i64>,

        /// Number of tracks to skip
        #[arg(short, long, default_value_t = 0)]
        offset: i64,
    },
    /// List playlists with their members
    Playlists,
}

/// Entrypoint for CLI
pub fn run() {
    env_logger::init();

    let cli = Cli::parse();

    let cfg = config::Config::load(&cli.config).unwrap();

    match &cli.command {
        Commands::Serve {} => {
            let storage = Storage::new(&cfg.database).expect("Failed to initialize storage");
            let media = MediaStore::new(&cfg.media);

            let http_server = crate::http::server::HttpServer::new(storage, media, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::Tracks { limit, offset } => {
            let mut storage = Storage::new(&cfg.database).expect("Failed to initialize storage");

            let page = storage.list_tracks(*limit, *offset).unwrap();

            println!("{} tracks in the catalog", page.total);
            for track in &page.items {
                println!(
                    "  [{}] {} - {} ({}, {})",
                    track.id, track.artist, track.title, track.album, track.duration
                );
            }
        }

        Commands::Playlists {} => {
            let mut storage = Storage::new(&cfg.database).expect("Failed to initialize storage");

            for playlist in storage.list_playlists().unwrap() {
                println!("[{}] {} ({} tracks)", playlist.id, playlist.name, playlist.tracks.len());
                for track in &playlist.tracks {
                    println!("    - {} - {}", track.artist, track.title);
                }
            }
        }
    }
}
