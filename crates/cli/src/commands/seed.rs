//! Seed the document store with catalog products, farms and user profiles.
//!
//! The YAML file has three optional top-level lists:
//!
//! ```yaml
//! products:
//!   - id: prod-apel
//!     name: Apel Malang
//!     image: https://example.com/apel.jpg
//!     price: Rp10.000
//!     description: Apel segar dari Malang
//!     rate: 4.5
//!     category: buah
//!     type: organik
//! farmers:
//!   - id: farm-lembang
//!     storeName: Kebun Lembang
//!     owner: Pak Dedi
//!     contact: "0812-3456-7890"
//! users:
//!   - id: u-budi
//!     username: budi
//!     name: Budi Santoso
//! ```
//!
//! Users without a `cartId` get one equal to their id, matching what the
//! registration service writes. Existing documents with the same id are
//! replaced.

use std::collections::HashSet;
use std::path::Path;

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{error, info};

use farm_fresh_api::db::{self, FarmRepository, MEMORY_DATABASE_URL, ProductRepository, UserRepository};
use farm_fresh_api::models::{FarmRecord, ProductRecord, UserRecord};
use farm_fresh_core::{CartId, FarmId, ProductId, Rupiah, UserId};

/// Parsed seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub farmers: Vec<SeedFarm>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Deserialize)]
pub struct SeedFarm {
    pub id: FarmId,
    #[serde(flatten)]
    pub record: FarmRecord,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub id: ProductId,
    #[serde(flatten)]
    pub record: ProductRecord,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub id: UserId,
    #[serde(flatten)]
    pub record: UserRecord,
}

/// Check a seed file before touching the database.
///
/// Returns one message per problem found.
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    let mut product_ids = HashSet::new();
    for product in &seed.products {
        if !product_ids.insert(product.id.as_str()) {
            errors.push(format!("duplicate product id {}", product.id));
        }
        if let Err(e) = product.record.price.parse::<Rupiah>() {
            errors.push(format!("product {}: {e}", product.id));
        }
    }

    let mut farm_ids = HashSet::new();
    for farm in &seed.farmers {
        if !farm_ids.insert(farm.id.as_str()) {
            errors.push(format!("duplicate farm id {}", farm.id));
        }
    }

    let mut user_ids = HashSet::new();
    for user in &seed.users {
        if !user_ids.insert(user.id.as_str()) {
            errors.push(format!("duplicate user id {}", user.id));
        }
    }

    errors
}

/// Seed products and users from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if a
/// database write fails.
pub async fn from_file(file_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;
    if database_url.expose_secret() == MEMORY_DATABASE_URL {
        return Err("refusing to seed the in-memory store; it does not outlive this process".into());
    }

    info!(path = %file_path.display(), "Loading seed file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(file_path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let store = db::connect(&database_url).await?;
    info!("Connected to database");

    let products = ProductRepository::new(store.as_ref());
    for product in &seed.products {
        products.upsert(&product.id, &product.record).await?;
    }

    let farms = FarmRepository::new(store.as_ref());
    for farm in &seed.farmers {
        farms.upsert(&farm.id, &farm.record).await?;
    }

    let user_count = seed.users.len();
    let users = UserRepository::new(store.as_ref());
    for user in seed.users {
        let mut record = user.record;
        if record.cart_id.is_none() {
            record.cart_id = Some(CartId::new(user.id.as_str()));
        }
        users.upsert(&user.id, &record).await?;
    }

    info!("Seeding complete!");
    info!("  Products: {}", seed.products.len());
    info!("  Farms: {}", seed.farmers.len());
    info!("  Users: {user_count}");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r"
products:
  - id: prod-apel
    name: Apel Malang
    image: https://example.com/apel.jpg
    price: Rp10.000
    description: Apel segar
    rate: 4.5
    category: buah
    type: organik
farmers:
  - id: farm-lembang
    storeName: Kebun Lembang
    owner: Pak Dedi
    contact: 81234567
users:
  - id: u-budi
    username: budi
    address: Jl. Kenanga 3
";

    #[test]
    fn test_parse_seed_file() {
        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();

        assert_eq!(seed.products.len(), 1);
        assert_eq!(seed.products[0].id, ProductId::new("prod-apel"));
        assert_eq!(seed.products[0].record.kind, "organik");
        assert_eq!(seed.users[0].record.username.as_deref(), Some("budi"));
        assert!(seed.users[0].record.cart_id.is_none());
        assert_eq!(seed.farmers[0].id, FarmId::new("farm-lembang"));
        assert_eq!(seed.farmers[0].record.store_name.as_deref(), Some("Kebun Lembang"));
        assert_eq!(seed.farmers[0].record.contact, 81_234_567);
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_price_and_duplicates() {
        let mut seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        seed.products[0].record.price = "sepuluh ribu".to_string();
        let dup = SeedUser {
            id: UserId::new("u-budi"),
            record: UserRecord::default(),
        };
        seed.users.push(dup);
        seed.farmers.push(SeedFarm {
            id: FarmId::new("farm-lembang"),
            record: FarmRecord::default(),
        });

        let errors = validate(&seed);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("duplicate farm id farm-lembang")));
        assert!(errors.iter().any(|e| e.contains("prod-apel")));
        assert!(errors.iter().any(|e| e.contains("duplicate user id u-budi")));
    }

    #[test]
    fn test_empty_file_sections_default() {
        let seed: SeedFile = serde_yaml::from_str("products: []\n").unwrap();
        assert!(seed.users.is_empty());
        assert!(seed.farmers.is_empty());
        assert!(validate(&seed).is_empty());
    }
}
