//! Checkout totals and order placement.
//!
//! A checkout starts either from the cart or from a single "buy now"
//! product. [`calculate`] derives the numbers shown at checkout from exactly
//! one of those shapes. Server-supplied cart totals pass through unchanged;
//! only missing fields are filled in locally.

mod order;

pub use order::{Order, OrderLine, assemble};

use petal_core::{PaymentMethod, Quantity, QuantityError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;

use crate::api::{Address, Cart, CartItem, CartTotals, Product, ProductColor};

/// Flat shipping charge when the server does not supply one.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Placeholder tax rate (5%) when the server does not supply tax.
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Errors that block a checkout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// Buy-now quantity below one.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// Checkout from an empty cart.
    #[error("your cart is empty")]
    EmptyCart,

    /// No saved address to ship to.
    #[error("add a shipping address before placing the order")]
    NoAddress,

    /// The chosen address index is out of range.
    #[error("address {0} does not exist")]
    AddressNotFound(usize),
}

/// What is being checked out.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutSelection {
    /// Every line of the current cart, with the server's totals.
    FromCart {
        items: Vec<CartItem>,
        totals: CartTotals,
    },
    /// One product, bypassing the cart.
    BuyNow {
        product: Product,
        size: Option<String>,
        color: Option<ProductColor>,
        image: Option<String>,
        quantity: Quantity,
    },
}

impl CheckoutSelection {
    /// Whether the selection came from the cart.
    #[must_use]
    pub const fn is_from_cart(&self) -> bool {
        matches!(self, Self::FromCart { .. })
    }
}

/// Money shown at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Derive totals for a selection.
#[must_use]
pub fn calculate(selection: &CheckoutSelection) -> Totals {
    match selection {
        CheckoutSelection::FromCart { totals, .. } => {
            let subtotal = totals.subtotal.unwrap_or(Decimal::ZERO);
            let shipping = totals.shipping.unwrap_or(FLAT_SHIPPING);
            let tax = totals.tax.unwrap_or_else(|| tax_on(subtotal));
            let discount = totals.discount.unwrap_or(Decimal::ZERO);
            let total = totals
                .total
                .unwrap_or_else(|| fallback_total(subtotal, discount, shipping, tax));
            Totals {
                subtotal,
                shipping,
                tax,
                discount,
                total,
            }
        }
        CheckoutSelection::BuyNow {
            product, quantity, ..
        } => {
            let subtotal = line_amount(product.price, *quantity);
            let shipping = FLAT_SHIPPING;
            let tax = tax_on(subtotal);
            Totals {
                subtotal,
                shipping,
                tax,
                discount: Decimal::ZERO,
                total: fallback_total(subtotal, Decimal::ZERO, shipping, tax),
            }
        }
    }
}

/// `price * quantity`, saturating at `Decimal::MAX`.
pub(crate) fn line_amount(price: Decimal, quantity: Quantity) -> Decimal {
    price.saturating_mul(Decimal::from(quantity.get()))
}

/// `subtotal - discount + shipping + tax`, saturating at the `Decimal` bounds.
fn fallback_total(
    subtotal: Decimal,
    discount: Decimal,
    shipping: Decimal,
    tax: Decimal,
) -> Decimal {
    subtotal
        .saturating_sub(discount)
        .saturating_add(shipping)
        .saturating_add(tax)
}

/// 5% of `subtotal`, rounded to a whole rupee with halves away from zero.
fn tax_on(subtotal: Decimal) -> Decimal {
    subtotal
        .saturating_mul(TAX_RATE)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Cart Page
// =============================================================================

/// Cart view projection.
#[derive(Debug, Clone, PartialEq)]
pub struct CartPage {
    pub items: Vec<CartItem>,
    pub totals: Totals,
}

impl CartPage {
    /// Project the last known cart. An absent or empty cart totals zero.
    #[must_use]
    pub fn from_snapshot(cart: Option<&Cart>) -> Self {
        match cart {
            Some(cart) if !cart.is_empty() => Self {
                items: cart.items.clone(),
                totals: calculate(&CheckoutSelection::FromCart {
                    items: cart.items.clone(),
                    totals: cart.totals.clone(),
                }),
            },
            _ => Self {
                items: Vec::new(),
                totals: Totals::default(),
            },
        }
    }

    /// Whether the checkout action is available.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        !self.items.is_empty()
    }
}

// =============================================================================
// Checkout Session
// =============================================================================

/// One checkout in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    selection: CheckoutSelection,
    totals: Totals,
}

impl CheckoutSession {
    /// Check out the whole cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    pub fn from_cart(cart: &Cart) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self::new(CheckoutSelection::FromCart {
            items: cart.items.clone(),
            totals: cart.totals.clone(),
        }))
    }

    /// Check out a single product.
    ///
    /// Defaults the image to the product's first image.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidQuantity` for quantities below one.
    pub fn buy_now(
        product: Product,
        quantity: i64,
        size: Option<String>,
        color: Option<ProductColor>,
    ) -> Result<Self, CheckoutError> {
        let quantity = Quantity::new(quantity)?;
        let image = product.primary_image().map(str::to_owned);
        Ok(Self::new(CheckoutSelection::BuyNow {
            product,
            size,
            color,
            image,
            quantity,
        }))
    }

    fn new(selection: CheckoutSelection) -> Self {
        let totals = calculate(&selection);
        Self { selection, totals }
    }

    /// What is being bought.
    #[must_use]
    pub const fn selection(&self) -> &CheckoutSelection {
        &self.selection
    }

    /// Totals for this checkout.
    #[must_use]
    pub const fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Assemble the order for the address at `address_index`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NoAddress` when `addresses` is empty and
    /// `CheckoutError::AddressNotFound` for an out-of-range index.
    pub fn place(
        &self,
        addresses: &[Address],
        address_index: usize,
        payment_method: PaymentMethod,
    ) -> Result<Order, CheckoutError> {
        if addresses.is_empty() {
            return Err(CheckoutError::NoAddress);
        }
        let address = addresses
            .get(address_index)
            .ok_or(CheckoutError::AddressNotFound(address_index))?;

        Ok(assemble(
            &self.selection,
            &self.totals,
            address.clone(),
            payment_method,
        ))
    }
}
