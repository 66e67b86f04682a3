//! SQLite implementation of the catalog repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::domain::product::Product;
use crate::domain::repositories::{CatalogFilter, ProductRepository};

#[derive(Clone)]
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Product {
        let category_path: Vec<String> =
            serde_json::from_str(row.get::<String, _>("category_path").as_str())
                .unwrap_or_default();
        let images: Vec<String> =
            serde_json::from_str(row.get::<String, _>("images").as_str()).unwrap_or_default();

        let dimensions = match (
            row.get::<Option<f64>, _>("length_cm"),
            row.get::<Option<f64>, _>("width_cm"),
            row.get::<Option<f64>, _>("height_cm"),
        ) {
            (Some(l), Some(w), Some(h)) => Some((l, w, h)),
            _ => None,
        };

        Product {
            id: row.get("id"),
            sku: row.get("sku"),
            name: row.get("name"),
            slug: row.get("slug"),
            brand: row.get("brand"),
            price_cents: row.get("price_cents"),
            stock: row.get("stock"),
            in_stock: row.get("in_stock"),
            category: row.get("category"),
            category_path,
            weight_kg: row.get("weight_kg"),
            dimensions_cm: dimensions,
            description: row.get("description"),
            image: row.get("image"),
            images,
            datasheet: row.get("datasheet"),
            source_url: row.get("source_url"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn upsert(&self, product: &Product) -> Result<()> {
        let (length, width, height) = match product.dimensions_cm {
            Some((l, w, h)) => (Some(l), Some(w), Some(h)),
            None => (None, None, None),
        };

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO products
            (id, sku, name, slug, brand, price_cents, stock, in_stock, category,
             category_path, weight_kg, length_cm, width_cm, height_cm, description,
             image, images, datasheet, source_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.brand)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.in_stock)
        .bind(&product.category)
        .bind(serde_json::to_string(&product.category_path)?)
        .bind(product.weight_kg)
        .bind(length)
        .bind(width)
        .bind(height)
        .bind(&product.description)
        .bind(&product.image)
        .bind(serde_json::to_string(&product.images)?)
        .bind(&product.datasheet)
        .bind(&product.source_url)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::row_to_product))
    }

    async fn find_by_source_url(&self, url: &str) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE source_url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::row_to_product))
    }

    async fn find_all(&self, filter: &CatalogFilter) -> Result<Vec<Product>> {
        // Filters are optional and combined with AND; NULL parameters
        // disable their clause.
        let rows = sqlx::query(
            r#"
            SELECT * FROM products
            WHERE (?1 IS NULL OR category = ?1)
              AND (?2 IS NULL OR in_stock = ?2)
            ORDER BY name ASC
            "#,
        )
        .bind(&filter.category)
        .bind(filter.in_stock)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(Self::row_to_product).collect())
    }

    async fn update_probe_snapshot(
        &self,
        id: &str,
        price_cents: Option<i64>,
        in_stock: bool,
        stock: Option<i64>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET price_cents = COALESCE(?, price_cents),
                in_stock = ?,
                stock = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(price_cents)
        .bind(in_stock)
        .bind(stock)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::DatabaseConnection;
    use tempfile::tempdir;

    fn sample(id: &str, category: &str, in_stock: bool) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            sku: Some(format!("SKU-{id}")),
            name: format!("Produto {id}"),
            slug: format!("produto-{id}"),
            brand: Some("Weg".to_string()),
            price_cents: 9990,
            stock: Some(3),
            in_stock,
            category: Some(category.to_string()),
            category_path: vec!["Automação".to_string(), category.to_string()],
            weight_kg: Some(0.2),
            dimensions_cm: Some((10.0, 5.0, 3.0)),
            description: Some("desc".to_string()),
            image: Some("https://cdn.example.com/p.jpg".to_string()),
            images: vec!["https://cdn.example.com/p.jpg".to_string()],
            datasheet: None,
            source_url: format!("https://www.proesi.com.br/{id}"),
            created_at: now,
            updated_at: now,
        }
    }

    async fn repo() -> (SqliteProductRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("catalog.db").display());
        let db = DatabaseConnection::new(&url).await.unwrap();
        db.migrate().await.unwrap();
        (SqliteProductRepository::new(db.pool().clone()), dir)
    }

    #[tokio::test]
    async fn upsert_and_fetch_round_trip() {
        let (repo, _dir) = repo().await;
        repo.upsert(&sample("p1", "reles", true)).await.unwrap();

        let found = repo.find_by_id("p1").await.unwrap().unwrap();
        assert_eq!(found.name, "Produto p1");
        assert_eq!(found.category_path.len(), 2);
        assert_eq!(found.dimensions_cm, Some((10.0, 5.0, 3.0)));

        let by_url = repo
            .find_by_source_url("https://www.proesi.com.br/p1")
            .await
            .unwrap();
        assert!(by_url.is_some());
    }

    #[tokio::test]
    async fn filters_compose_with_and() {
        let (repo, _dir) = repo().await;
        repo.upsert(&sample("p1", "reles", true)).await.unwrap();
        repo.upsert(&sample("p2", "reles", false)).await.unwrap();
        repo.upsert(&sample("p3", "fontes", true)).await.unwrap();

        let all = repo.find_all(&CatalogFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let reles_in_stock = repo
            .find_all(&CatalogFilter {
                category: Some("reles".to_string()),
                in_stock: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(reles_in_stock.len(), 1);
        assert_eq!(reles_in_stock[0].id, "p1");
    }

    #[tokio::test]
    async fn probe_snapshot_updates_price_and_stock() {
        let (repo, _dir) = repo().await;
        repo.upsert(&sample("p1", "reles", true)).await.unwrap();

        repo.update_probe_snapshot("p1", Some(12_000), false, Some(0))
            .await
            .unwrap();
        let updated = repo.find_by_id("p1").await.unwrap().unwrap();
        assert_eq!(updated.price_cents, 12_000);
        assert!(!updated.in_stock);

        // A probe without a price keeps the stored price.
        repo.update_probe_snapshot("p1", None, true, Some(5)).await.unwrap();
        let kept = repo.find_by_id("p1").await.unwrap().unwrap();
        assert_eq!(kept.price_cents, 12_000);
        assert!(kept.in_stock);
    }
}
