//! Wishlist commands. Signed-in users only.

use petal_core::{ProductId, Quantity};
use petal_storefront::Storefront;
use petal_storefront::api::MoveToCartInput;
use petal_storefront::error::Result;
use petal_storefront::store::StoreError;

use super::print_wishlist;

/// Show the wishlist.
pub async fn show(storefront: &Storefront) -> Result<()> {
    let wishlist = storefront.load_wishlist().await?;
    print_wishlist(&wishlist);
    Ok(())
}

/// Save a product.
pub async fn add(storefront: &Storefront, product: ProductId) -> Result<()> {
    let wishlist = storefront.add_to_wishlist(product).await?;
    println!("Saved ({} on your wishlist).", wishlist.count());
    Ok(())
}

/// Save or unsave a product.
pub async fn toggle(storefront: &Storefront, product: ProductId) -> Result<()> {
    if storefront.toggle_wishlist(product).await? {
        println!("Saved to wishlist.");
    } else {
        println!("Removed from wishlist.");
    }
    Ok(())
}

/// Unsave a product.
pub async fn remove(storefront: &Storefront, product: ProductId) -> Result<()> {
    let wishlist = storefront.remove_from_wishlist(product).await?;
    print_wishlist(&wishlist);
    Ok(())
}

/// Move a product to the cart.
pub async fn move_to_cart(storefront: &Storefront, product: ProductId, quantity: i64) -> Result<()> {
    let input = MoveToCartInput {
        product_id: product,
        quantity: Quantity::new(quantity).map_err(StoreError::from)?,
        size: None,
        color: None,
    };
    storefront.move_to_cart(input).await?;
    println!(
        "Moved to cart ({} items in cart).",
        storefront.snapshot().cart_count()
    );
    Ok(())
}

/// Unsave everything.
pub async fn clear(storefront: &Storefront) -> Result<()> {
    storefront.clear_wishlist().await?;
    println!("Wishlist cleared.");
    Ok(())
}
