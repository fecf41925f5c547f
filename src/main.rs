//! Treasure Proofs
//!
//! Loads the treasure catalog, builds the tree, logs the root to publish, and
//! prints the JSON proof (or `null`) for each tile id given on the command line.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use treasure_proofs::{core::hash::to_hex, ProofService, ServiceSettings, TileId, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Treasure Proofs v{}", VERSION);

    let tiles = std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<TileId>().with_context(|| format!("invalid tile id: {}", arg)))
        .collect::<Result<Vec<_>>>()?;

    let settings = ServiceSettings::from_env().context("reading settings")?;
    let (catalog, tree_settings) = settings.load().context("loading treasure catalog")?;

    let service = ProofService::new(catalog, tree_settings);
    let root = service.root_when_ready().await.context("building treasure tree")?;
    info!("Root: {}", to_hex(&root));

    for tile_id in tiles {
        let proof = service.proof_for_tile(tile_id)?;
        if proof.is_none() {
            info!("Tile {} holds no treasure", tile_id);
        }
        println!("{}", serde_json::to_string(&proof)?);
    }

    Ok(())
}
