//! Checkout: order creation against the catalog and the payment processor
//!
//! Validation accumulates every customer and cart failure before rejecting.
//! Prices are always re-read from the catalog; the request body carries no
//! unit price anywhere. Customer upsert, order insert and item inserts are
//! committed atomically by the repository.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::application::dto::{CartItemInput, CheckoutConfirmation, CheckoutRequest};
use crate::application::shipping::normalize_cep;
use crate::application::validation::validate_customer;
use crate::domain::customer::Customer;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::product::Product;
use crate::domain::repositories::{
    CheckoutSessionRequest, OrderRepository, PaymentGateway, ProductRepository, SessionItem,
};
use crate::domain::value_objects::{cents_to_reais, format_brl};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::config::ShippingConfig;

pub struct CheckoutService {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    shipping: ShippingConfig,
}

/// A cart line revalidated against the catalog, carrying the stored price.
struct PricedLine {
    product: Product,
    quantity: i64,
}

impl CheckoutService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        shipping: ShippingConfig,
    ) -> Self {
        Self { products, orders, gateway, shipping }
    }

    /// Revalidate every cart line against the catalog, accumulating all
    /// failures. The stored price is authoritative.
    async fn price_lines(
        &self,
        items: &[CartItemInput],
        errors: &mut Vec<String>,
    ) -> ServiceResult<Vec<PricedLine>> {
        if items.is_empty() {
            errors.push("carrinho vazio".to_string());
            return Ok(Vec::new());
        }

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity < 1 {
                errors.push(format!("quantidade inválida para {}", item.id));
                continue;
            }
            let Some(product) = self.products.find_by_id(&item.id).await? else {
                errors.push(format!("produto não encontrado: {}", item.id));
                continue;
            };
            if !product.in_stock {
                errors.push(format!("produto sem estoque: {}", product.name));
                continue;
            }
            if let Some(stock) = product.stock {
                if stock < item.quantity {
                    errors.push(format!(
                        "estoque insuficiente para {}: {} disponíveis",
                        product.name, stock
                    ));
                    continue;
                }
            }
            lines.push(PricedLine { product, quantity: item.quantity });
        }
        Ok(lines)
    }

    pub async fn create_order(&self, request: CheckoutRequest) -> ServiceResult<CheckoutConfirmation> {
        let mut errors = validate_customer(&request.customer);
        let lines = self.price_lines(&request.items, &mut errors).await?;
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let subtotal_cents: i64 = lines
            .iter()
            .map(|line| line.product.price_cents * line.quantity)
            .sum();

        let shipping_cep = request.shipping.cep.as_deref().and_then(normalize_cep);
        let free_zone = shipping_cep
            .as_deref()
            .map(|cep| {
                self.shipping
                    .free_zone_prefixes
                    .iter()
                    .any(|prefix| cep.starts_with(prefix.as_str()))
            })
            .unwrap_or(false);
        let shipping_cents = if free_zone {
            0
        } else {
            request.shipping.price_cents.unwrap_or(0).max(0)
        };

        let discount_cents = 0;
        let total_cents = subtotal_cents + shipping_cents - discount_cents;
        let external_reference = Uuid::new_v4().to_string();
        let now = Utc::now();

        let customer = Customer {
            email: request.customer.email.trim().to_lowercase(),
            name: request.customer.name.trim().to_string(),
            phone: request.customer.phone.trim().to_string(),
            tax_id: request
                .customer
                .tax_id
                .as_deref()
                .map(|raw| raw.chars().filter(char::is_ascii_digit).collect::<String>())
                .filter(|digits| !digits.is_empty()),
            created_at: now,
            updated_at: now,
        };

        let order = Order {
            external_reference: external_reference.clone(),
            customer_email: customer.email.clone(),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            customer_tax_id: customer.tax_id.clone(),
            shipping_address: request.shipping.address.clone(),
            shipping_city: request.shipping.city.clone(),
            shipping_state: request.shipping.state.clone(),
            shipping_cep: shipping_cep.clone(),
            subtotal_cents,
            shipping_cents,
            discount_cents,
            total_cents,
            status: OrderStatus::Pending,
            preference_id: None,
            payment_id: None,
            status_detail: None,
            payment_method: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };

        let items: Vec<OrderItem> = lines
            .iter()
            .map(|line| OrderItem {
                order_reference: external_reference.clone(),
                product_id: line.product.id.clone(),
                sku: line.product.sku.clone(),
                name: line.product.name.clone(),
                image: line.product.image.clone(),
                unit_price_cents: line.product.price_cents,
                quantity: line.quantity,
                total_cents: line.product.price_cents * line.quantity,
            })
            .collect();

        self.orders.create_order(&customer, &order, &items).await?;
        info!(reference = %external_reference, total_cents, "order created");

        let session_request = CheckoutSessionRequest {
            external_reference: external_reference.clone(),
            items: items
                .iter()
                .map(|item| SessionItem {
                    title: item.name.clone(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents,
                })
                .collect(),
            payer_name: customer.name.clone(),
            payer_email: customer.email.clone(),
            payer_phone: customer.phone.clone(),
            shipping_address: order.shipping_address.clone(),
            shipping_cep,
        };

        let session = match self.gateway.create_checkout_session(&session_request).await {
            Ok(session) => session,
            Err(cause) => {
                // The pending order stays addressable by its reference, so a
                // later retry or manual reconciliation can pick it up.
                error!(reference = %external_reference, %cause, "payment session creation failed");
                return Err(match cause.downcast::<ServiceError>() {
                    Ok(service_error) => service_error,
                    Err(_) => ServiceError::upstream("payment processor"),
                });
            }
        };

        self.orders
            .set_preference_id(&external_reference, &session.preference_id)
            .await?;

        Ok(CheckoutConfirmation {
            external_reference,
            init_point: session.init_point,
            preference_id: session.preference_id,
            subtotal: cents_to_reais(subtotal_cents),
            shipping_cost: cents_to_reais(shipping_cents),
            total: cents_to_reais(total_cents),
            total_formatted: format_brl(total_cents),
        })
    }
}
