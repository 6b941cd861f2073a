//! Seed the catalog from a YAML file.
//!
//! Each entry goes through the same validation as the admin product form.
//! Products whose name already exists are skipped, so seeding is repeatable.

use std::path::Path;

use harbor_shop_core::{ProductInput, ValidationErrors};
use harbor_shop_storefront::db::{self, ProductRepository, RepositoryError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use super::database_url;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid product {name:?}: {errors}")]
    InvalidProduct {
        name: String,
        errors: ValidationErrors,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    products: Vec<ProductInput>,
}

/// Totals reported after a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

fn parse(content: &str) -> Result<Vec<harbor_shop_core::ProductDraft>, SeedError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    file.products
        .into_iter()
        .map(|input| {
            let name = input.name.clone();
            input
                .validate()
                .map_err(|errors| SeedError::InvalidProduct { name, errors })
        })
        .collect()
}

/// Insert the products listed in `file_path`.
///
/// The whole file is validated before connecting to the database.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or a database write fails.
pub async fn products(file_path: &str) -> Result<SeedSummary, SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let drafts = parse(&content)?;
    info!(products = drafts.len(), "Seed file validated");

    let database_url = database_url().ok_or(SeedError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;
    let pool = db::create_pool(&database_url).await?;
    let repo = ProductRepository::new(&pool);

    let mut summary = SeedSummary::default();
    for draft in &drafts {
        if repo.exists_by_name(&draft.name).await? {
            warn!(name = %draft.name, "Product already exists, skipping");
            summary.skipped += 1;
            continue;
        }
        let product = repo.create(draft).await?;
        info!(id = %product.id, name = %product.name, "Product inserted");
        summary.inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {}", summary.inserted);
    info!("  Products skipped (already exist): {}", summary.skipped);
    Ok(summary)
}
