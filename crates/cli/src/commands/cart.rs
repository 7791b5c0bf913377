//! Cart commands. Guests use the guest cart keyed by the persisted session id.

use petal_core::{CartItemId, ProductId, Quantity};
use petal_storefront::Storefront;
use petal_storefront::api::{AddToCartInput, DiscountCode};
use petal_storefront::error::Result;
use petal_storefront::store::StoreError;

use super::print_cart;

/// Show the current cart.
pub async fn show(storefront: &Storefront) -> Result<()> {
    let cart = storefront.load_cart().await?;
    print_cart(&cart);
    Ok(())
}

/// Add a product.
pub async fn add(
    storefront: &Storefront,
    product: ProductId,
    quantity: i64,
    size: Option<String>,
) -> Result<()> {
    let quantity = Quantity::new(quantity).map_err(StoreError::from)?;
    let mut input = AddToCartInput::new(product, quantity);
    input.size = size;

    let cart = storefront.add_to_cart(input).await?;
    println!("Added to cart ({} items).", cart.item_count());
    Ok(())
}

/// Set a line's quantity; zero or less removes it.
pub async fn set(storefront: &Storefront, item: CartItemId, quantity: i64) -> Result<()> {
    let cart = storefront.set_quantity(item, quantity).await?;
    print_cart(&cart);
    Ok(())
}

/// Remove a line.
pub async fn remove(storefront: &Storefront, item: CartItemId) -> Result<()> {
    let cart = storefront.remove_from_cart(item).await?;
    print_cart(&cart);
    Ok(())
}

/// Remove every line.
pub async fn clear(storefront: &Storefront) -> Result<()> {
    storefront.clear_cart().await?;
    println!("Cart cleared.");
    Ok(())
}

/// Apply or remove a coupon or voucher.
pub async fn discount(
    storefront: &Storefront,
    code: Option<String>,
    voucher: bool,
    remove: bool,
) -> Result<()> {
    let cart = match code {
        Some(code) if !remove => {
            let code = if voucher {
                DiscountCode::Voucher(code)
            } else {
                DiscountCode::Coupon(code)
            };
            storefront.apply_discount(code).await?
        }
        _ => storefront.remove_discount().await?,
    };
    print_cart(&cart);
    Ok(())
}

/// Check stock and pricing.
pub async fn validate(storefront: &Storefront) -> Result<()> {
    let validation = storefront.validate_cart().await?;
    if validation.valid {
        println!("Cart is ready for checkout.");
    }
    for issue in &validation.issues {
        match &issue.item_id {
            Some(item) => println!("{item}: {}", issue.message),
            None => println!("{}", issue.message),
        }
    }
    Ok(())
}
