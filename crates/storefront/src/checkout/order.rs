//! Order confirmation view-model.

use chrono::{DateTime, Utc};
use petal_core::{OrderId, PaymentMethod, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{CheckoutSelection, Totals, line_amount};
use crate::api::{Address, ProductColor};

/// A placed order, shown once on the confirmation view.
///
/// Nothing is persisted; the backend has no order endpoint yet, so the id is
/// a client-side placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub order_date: DateTime<Utc>,
    pub items: Vec<OrderLine>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub totals: Totals,
}

/// One purchased line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub size: Option<String>,
    pub color: Option<ProductColor>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Package a checkout into an [`Order`].
#[must_use]
pub fn assemble(
    selection: &CheckoutSelection,
    totals: &Totals,
    shipping_address: Address,
    payment_method: PaymentMethod,
) -> Order {
    let items = match selection {
        CheckoutSelection::FromCart { items, .. } => items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product.id.clone(),
                name: item.product.name.clone(),
                image: item
                    .selected_image
                    .clone()
                    .or_else(|| item.product.primary_image().map(str::to_owned)),
                size: item.size.clone(),
                color: item.color.clone(),
                quantity: item.quantity.get(),
                unit_price: item.unit_price(),
                line_total: item.line_total(),
            })
            .collect(),
        CheckoutSelection::BuyNow {
            product,
            size,
            color,
            image,
            quantity,
        } => vec![OrderLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image: image.clone(),
            size: size.clone(),
            color: color.clone(),
            quantity: quantity.get(),
            unit_price: product.price,
            line_total: line_amount(product.price, *quantity),
        }],
    };

    Order {
        order_id: OrderId::new(format!("ORD-{}", Uuid::new_v4().simple())),
        order_date: Utc::now(),
        items,
        shipping_address,
        payment_method,
        totals: *totals,
    }
}
