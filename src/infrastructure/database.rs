//! Database connection and pool management
//!
//! SQLite via sqlx. The schema is applied on startup: five tables plus the
//! derived daily-revenue view.

use std::path::Path;

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    pub async fn new(database_url: &str) -> Result<Self> {
        let db_path = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");

        if db_path != ":memory:" {
            if let Some(parent) = Path::new(db_path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            if !Path::new(db_path).exists() {
                std::fs::File::create(db_path)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        let create_products_sql = r#"
            CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                sku TEXT,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                brand TEXT,
                price_cents INTEGER NOT NULL DEFAULT 0 CHECK (price_cents >= 0),
                stock INTEGER CHECK (stock IS NULL OR stock >= 0),
                in_stock BOOLEAN NOT NULL DEFAULT 1,
                category TEXT,
                category_path TEXT NOT NULL DEFAULT '[]',
                weight_kg REAL,
                length_cm REAL,
                width_cm REAL,
                height_cm REAL,
                description TEXT,
                image TEXT,
                images TEXT NOT NULL DEFAULT '[]',
                datasheet TEXT,
                source_url TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
        "#;

        let create_customers_sql = r#"
            CREATE TABLE IF NOT EXISTS customers (
                email TEXT PRIMARY KEY COLLATE NOCASE,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                tax_id TEXT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
        "#;

        let create_orders_sql = r#"
            CREATE TABLE IF NOT EXISTS orders (
                external_reference TEXT PRIMARY KEY,
                customer_email TEXT NOT NULL,
                customer_name TEXT NOT NULL,
                customer_phone TEXT NOT NULL,
                customer_tax_id TEXT,
                shipping_address TEXT,
                shipping_city TEXT,
                shipping_state TEXT,
                shipping_cep TEXT,
                subtotal_cents INTEGER NOT NULL,
                shipping_cents INTEGER NOT NULL DEFAULT 0,
                discount_cents INTEGER NOT NULL DEFAULT 0,
                total_cents INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                preference_id TEXT,
                payment_id TEXT,
                status_detail TEXT,
                payment_method TEXT,
                paid_at DATETIME,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
        "#;

        let create_order_items_sql = r#"
            CREATE TABLE IF NOT EXISTS order_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_reference TEXT NOT NULL,
                product_id TEXT NOT NULL,
                sku TEXT,
                name TEXT NOT NULL,
                image TEXT,
                unit_price_cents INTEGER NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 1),
                total_cents INTEGER NOT NULL,
                FOREIGN KEY (order_reference) REFERENCES orders (external_reference) ON DELETE CASCADE
            )
        "#;

        let create_webhook_logs_sql = r#"
            CREATE TABLE IF NOT EXISTS webhook_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                event_type TEXT NOT NULL,
                payload TEXT NOT NULL,
                processed BOOLEAN NOT NULL DEFAULT 0,
                error TEXT,
                received_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
        "#;

        let create_indexes_sql = r#"
            CREATE INDEX IF NOT EXISTS idx_products_category ON products (category);
            CREATE INDEX IF NOT EXISTS idx_products_source_url ON products (source_url);
            CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items (order_reference);
            CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status);
        "#;

        let create_revenue_view_sql = r#"
            CREATE VIEW IF NOT EXISTS daily_revenue AS
            SELECT date(paid_at) AS day,
                   COUNT(*) AS orders,
                   SUM(total_cents) AS revenue_cents
            FROM orders
            WHERE status = 'approved' AND paid_at IS NOT NULL
            GROUP BY date(paid_at)
        "#;

        sqlx::query(create_products_sql).execute(&self.pool).await?;
        sqlx::query(create_customers_sql).execute(&self.pool).await?;
        sqlx::query(create_orders_sql).execute(&self.pool).await?;
        sqlx::query(create_order_items_sql).execute(&self.pool).await?;
        sqlx::query(create_webhook_logs_sql).execute(&self.pool).await?;
        sqlx::query(create_indexes_sql).execute(&self.pool).await?;
        sqlx::query(create_revenue_view_sql).execute(&self.pool).await?;

        Ok(())
    }
}
