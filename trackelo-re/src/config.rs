//! Service configuration
//!
//! Only what is needed before the database opens: root folder and listen
//! port. Runtime parameters (K-factor, propagation threshold) live in the
//! settings table and are loaded through [`crate::engine::EngineParams`].

use clap::Parser;
use std::path::PathBuf;
use trackelo_common::config::{database_path, resolve_root_folder};

pub const DEFAULT_PORT: u16 = 5727;

#[derive(Debug, Parser)]
#[command(name = "trackelo-re", about = "TrackElo rating engine service", version)]
pub struct Args {
    /// Root folder holding trackelo.db (overrides TRACKELO_ROOT_FOLDER
    /// and the config.toml entry)
    #[arg(long, value_name = "DIR")]
    pub root_folder: Option<PathBuf>,

    /// Listen port
    #[arg(long, env = "TRACKELO_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

/// Fully resolved startup configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub database: PathBuf,
    pub port: u16,
}

impl ServiceConfig {
    pub fn resolve(args: &Args) -> Self {
        let root_folder = resolve_root_folder(args.root_folder.as_deref());
        let database = database_path(&root_folder);
        Self {
            root_folder,
            database,
            port: args.port,
        }
    }
}
