//! SQLite implementation of the order repository
//!
//! Order creation commits the customer upsert, the order row and every item
//! row in one transaction, so a mid-sequence failure can never leave a
//! payable order without items or items without a parent order.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::domain::customer::Customer;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::repositories::{OrderRepository, PaymentUpdate};

#[derive(Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Order {
        let status_text: String = row.get("status");
        Order {
            external_reference: row.get("external_reference"),
            customer_email: row.get("customer_email"),
            customer_name: row.get("customer_name"),
            customer_phone: row.get("customer_phone"),
            customer_tax_id: row.get("customer_tax_id"),
            shipping_address: row.get("shipping_address"),
            shipping_city: row.get("shipping_city"),
            shipping_state: row.get("shipping_state"),
            shipping_cep: row.get("shipping_cep"),
            subtotal_cents: row.get("subtotal_cents"),
            shipping_cents: row.get("shipping_cents"),
            discount_cents: row.get("discount_cents"),
            total_cents: row.get("total_cents"),
            status: OrderStatus::parse(&status_text).unwrap_or(OrderStatus::Pending),
            preference_id: row.get("preference_id"),
            payment_id: row.get("payment_id"),
            status_detail: row.get("status_detail"),
            payment_method: row.get("payment_method"),
            paid_at: row.get("paid_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> OrderItem {
        OrderItem {
            order_reference: row.get("order_reference"),
            product_id: row.get("product_id"),
            sku: row.get("sku"),
            name: row.get("name"),
            image: row.get("image"),
            unit_price_cents: row.get("unit_price_cents"),
            quantity: row.get("quantity"),
            total_cents: row.get("total_cents"),
        }
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn create_order(
        &self,
        customer: &Customer,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO customers (email, name, phone, tax_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (email) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                tax_id = COALESCE(excluded.tax_id, customers.tax_id),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&customer.email)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.tax_id)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO orders
            (external_reference, customer_email, customer_name, customer_phone,
             customer_tax_id, shipping_address, shipping_city, shipping_state,
             shipping_cep, subtotal_cents, shipping_cents, discount_cents,
             total_cents, status, preference_id, payment_id, status_detail,
             payment_method, paid_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.external_reference)
        .bind(&order.customer_email)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_tax_id)
        .bind(&order.shipping_address)
        .bind(&order.shipping_city)
        .bind(&order.shipping_state)
        .bind(&order.shipping_cep)
        .bind(order.subtotal_cents)
        .bind(order.shipping_cents)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .bind(order.status.as_str())
        .bind(&order.preference_id)
        .bind(&order.payment_id)
        .bind(&order.status_detail)
        .bind(&order.payment_method)
        .bind(order.paid_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items
                (order_reference, product_id, sku, name, image,
                 unit_price_cents, quantity, total_cents)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.order_reference)
            .bind(&item.product_id)
            .bind(&item.sku)
            .bind(&item.name)
            .bind(&item.image)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.total_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE external_reference = ?")
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::row_to_order))
    }

    async fn items_for(&self, reference: &str) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query("SELECT * FROM order_items WHERE order_reference = ? ORDER BY id")
            .bind(reference)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::row_to_item).collect())
    }

    async fn set_preference_id(&self, reference: &str, preference_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE orders SET preference_id = ?, updated_at = ? WHERE external_reference = ?",
        )
        .bind(preference_id)
        .bind(Utc::now())
        .bind(reference)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn apply_payment_update(&self, reference: &str, update: &PaymentUpdate) -> Result<()> {
        // paid_at is set only when the update carries one (the transition
        // into approved); re-deliveries keep the original timestamp.
        sqlx::query(
            r#"
            UPDATE orders
            SET status = ?,
                payment_id = ?,
                status_detail = ?,
                payment_method = ?,
                paid_at = COALESCE(?, paid_at),
                updated_at = ?
            WHERE external_reference = ?
            "#,
        )
        .bind(update.status.as_str())
        .bind(&update.payment_id)
        .bind(&update.status_detail)
        .bind(&update.payment_method)
        .bind(update.paid_at)
        .bind(Utc::now())
        .bind(reference)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customers WHERE email = ? COLLATE NOCASE")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| Customer {
            email: row.get("email"),
            name: row.get("name"),
            phone: row.get("phone"),
            tax_id: row.get("tax_id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }))
    }
}
