//! Checkout command.

use petal_core::{PaymentMethod, ProductId};
use petal_storefront::Storefront;
use petal_storefront::error::Result;

use super::{money, print_totals};

/// Check out the cart, or `product` alone when given, and place the order.
pub async fn run(
    storefront: &Storefront,
    product: Option<&ProductId>,
    quantity: i64,
    size: Option<String>,
    payment: PaymentMethod,
    address: usize,
) -> Result<()> {
    let session = match product {
        Some(product) => storefront.buy_now(product, quantity, size, None).await?,
        None => storefront.checkout_from_cart().await?,
    };

    let order = storefront.place_order(&session, address, payment).await?;

    println!("Order {} confirmed.", order.order_id);
    println!("Placed: {}", order.order_date.format("%d %b %Y, %H:%M UTC"));
    for line in &order.items {
        println!(
            "  {} x{}  {}",
            line.name,
            line.quantity,
            money(line.line_total)
        );
    }
    print_totals(&order.totals);
    println!("Ship to: {}", order.shipping_address.one_line());
    println!("Payment: {}", order.payment_method.label());
    Ok(())
}
