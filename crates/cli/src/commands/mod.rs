//! Command implementations.
//!
//! Each command drives the [`Storefront`](petal_storefront::Storefront)
//! facade and prints a plain-text summary to stdout. Logs go to stderr.

#![allow(clippy::print_stdout)]

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod wishlist;

use petal_core::Price;
use petal_storefront::api::{Cart, Wishlist};
use petal_storefront::checkout::{CartPage, Totals};
use rust_decimal::Decimal;

/// Format an amount in rupees.
pub(crate) fn money(amount: Decimal) -> String {
    Price::inr(amount).display()
}

pub(crate) fn print_cart(cart: &Cart) {
    let page = CartPage::from_snapshot(Some(cart));
    if !page.can_checkout() {
        println!("Your cart is empty.");
        return;
    }

    for item in &page.items {
        println!(
            "{}  {} x{}{}  {}",
            item.id,
            item.product.name,
            item.quantity,
            item.size
                .as_deref()
                .map(|size| format!(" ({size})"))
                .unwrap_or_default(),
            money(item.line_total()),
        );
    }
    if let Some(coupon) = cart.applied_coupon.as_ref().or(cart.applied_voucher.as_ref()) {
        println!("Discount code: {}", coupon.code);
    }
    print_totals(&page.totals);
}

pub(crate) fn print_totals(totals: &Totals) {
    println!("Subtotal: {}", money(totals.subtotal));
    if !totals.discount.is_zero() {
        println!("Discount: -{}", money(totals.discount));
    }
    println!("Shipping: {}", money(totals.shipping));
    println!("Tax:      {}", money(totals.tax));
    println!("Total:    {}", money(totals.total));
}

pub(crate) fn print_wishlist(wishlist: &Wishlist) {
    if wishlist.items.is_empty() {
        println!("Your wishlist is empty.");
        return;
    }
    for item in &wishlist.items {
        println!(
            "{}  {}  {}",
            item.product.id,
            item.product.name,
            money(item.product.price)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formats_rupees() {
        assert_eq!(money(Decimal::from(888)), "₹888");
        assert_eq!(money(Decimal::new(4950, 2)), "₹49.50");
    }
}
