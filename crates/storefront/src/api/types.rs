//! Domain types for the storefront REST API.
//!
//! Field names follow the backend's camelCase JSON. Document IDs arrive as
//! `_id`; each `id` field accepts that alias.

use chrono::{DateTime, Utc};
use petal_core::{
    AddressId, CartId, CartItemId, CategoryId, GuestSessionId, ProductId, Quantity, SubCategoryId,
    UserId, WishlistId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog Types
// =============================================================================

/// A named color option on a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColor {
    /// Display name (e.g., "Blush Pink").
    pub color_name: String,
    /// Hex swatch (e.g., "#F4C2C2").
    pub color_hex: String,
}

/// Either a bare category ID or the populated category document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(CategoryId),
    Populated(Box<Category>),
}

impl CategoryRef {
    /// The referenced category's ID.
    #[must_use]
    pub fn id(&self) -> &CategoryId {
        match self {
            Self::Id(id) => id,
            Self::Populated(category) => &category.id,
        }
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Current selling price.
    pub price: Decimal,
    /// List price before markdown, when the product is on sale.
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<ProductColor>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub stock: Option<u32>,
}

impl Product {
    /// First image, used as the default selection.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A top-level catalog category (e.g., "Bouquets").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A sub-category nested under a [`Category`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    #[serde(alias = "_id")]
    pub id: SubCategoryId,
    pub name: String,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub image: Option<String>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Which identity a cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
    /// The authenticated user's cart (identified by the bearer token).
    User,
    /// An anonymous visitor's cart.
    Guest(GuestSessionId),
}

impl CartOwner {
    /// Whether this is a guest-keyed cart.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }
}

/// One line in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(alias = "_id")]
    pub id: CartItemId,
    pub product: Product,
    pub quantity: Quantity,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<ProductColor>,
    #[serde(default)]
    pub selected_image: Option<String>,
    /// Unit price captured when the line was added, if the backend records it.
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl CartItem {
    /// Unit price for this line.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price.unwrap_or(self.product.price)
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price()
            .saturating_mul(Decimal::from(self.quantity.get()))
    }
}

/// A discount code applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub code: String,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
}

/// Server-computed totals. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub shipping: Option<Decimal>,
    #[serde(default)]
    pub tax: Option<Decimal>,
    #[serde(default)]
    pub total: Option<Decimal>,
}

/// A shopping cart as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(alias = "_id")]
    pub id: CartId,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub session_id: Option<GuestSessionId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub applied_coupon: Option<AppliedDiscount>,
    #[serde(default)]
    pub applied_voucher: Option<AppliedDiscount>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub totals: CartTotals,
}

const fn default_true() -> bool {
    true
}

impl Cart {
    /// Total number of units across all lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |n, i| n.saturating_add(i.quantity.get()))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by ID.
    #[must_use]
    pub fn item(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == id)
    }
}

/// A problem reported by cart validation (e.g. out of stock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartIssue {
    #[serde(default)]
    pub item_id: Option<CartItemId>,
    pub message: String,
}

/// Result of `POST /cart/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartValidation {
    pub valid: bool,
    #[serde(default)]
    pub issues: Vec<CartIssue>,
}

/// Input for adding a product to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartInput {
    pub product_id: ProductId,
    pub quantity: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ProductColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_image: Option<String>,
}

impl AddToCartInput {
    /// Add `quantity` units of a product with no variant selection.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            product_id,
            quantity,
            size: None,
            color: None,
            selected_image: None,
        }
    }
}

/// Body for cart line quantity updates.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct UpdateQuantityRequest {
    pub quantity: Quantity,
}

/// A coupon or voucher code to apply to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountCode {
    #[serde(rename = "couponCode")]
    Coupon(String),
    #[serde(rename = "voucherCode")]
    Voucher(String),
}

impl DiscountCode {
    /// The code text.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Coupon(code) | Self::Voucher(code) => code,
        }
    }
}

/// Body for `POST /cart/merge`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MergeRequest<'a> {
    pub session_id: &'a GuestSessionId,
}

// =============================================================================
// Wishlist Types
// =============================================================================

/// A product saved to the wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product: Product,
    pub price_when_added: Decimal,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

/// A user's wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    #[serde(alias = "_id")]
    pub id: WishlistId,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub items: Vec<WishlistItem>,
    #[serde(default)]
    pub is_public: bool,
}

impl Wishlist {
    /// Number of saved products.
    #[must_use]
    pub fn count(&self) -> u32 {
        u32::try_from(self.items.len()).unwrap_or(u32::MAX)
    }

    /// Whether a product is saved.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|i| &i.product.id == product_id)
    }
}

/// Result of `GET /wishlist/count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistCount {
    pub count: u32,
}

/// Result of `POST /wishlist/toggle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    /// `true` if the product was added, `false` if it was removed.
    pub added: bool,
    pub wishlist: Wishlist,
}

/// Result of `POST /wishlist/move-to-cart`: both snapshots after the move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveToCartOutcome {
    pub cart: Cart,
    pub wishlist: Wishlist,
}

/// Body for wishlist endpoints that take a single product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WishlistProductRequest<'a> {
    pub product_id: &'a ProductId,
}

/// Input for moving a wishlist product into the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToCartInput {
    pub product_id: ProductId,
    pub quantity: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ProductColor>,
}

// =============================================================================
// Account Types
// =============================================================================

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(alias = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    pub full_name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(alias = "postalCode")]
    pub pincode: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

fn default_country() -> String {
    "India".to_string()
}

impl Address {
    /// Single-line representation for confirmations.
    #[must_use]
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {}, {} - {}, {}",
            self.full_name, self.street, self.city, self.state, self.pincode, self.country
        )
    }
}

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl Profile {
    /// "First Last", trimmed.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// The default address, or the first one stored.
    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses
            .iter()
            .find(|a| a.is_default)
            .or_else(|| self.addresses.first())
    }
}

/// Partial profile update for `PATCH /auth/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
}

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body for `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignupRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
}

/// Response of login and signup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: Profile,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_json(id: &str, price: u32) -> serde_json::Value {
        json!({ "_id": id, "name": "Rose Bouquet", "price": price, "images": ["rose.jpg"] })
    }

    #[test]
    fn test_product_accepts_mongo_id_and_defaults() {
        let product: Product = serde_json::from_value(product_json("p1", 399)).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Decimal::from(399));
        assert!(product.sizes.is_empty());
        assert_eq!(product.primary_image(), Some("rose.jpg"));
    }

    #[test]
    fn test_category_ref_untagged() {
        let id: CategoryRef = serde_json::from_value(json!("c1")).unwrap();
        assert_eq!(id.id().as_str(), "c1");

        let populated: CategoryRef =
            serde_json::from_value(json!({ "_id": "c2", "name": "Bouquets" })).unwrap();
        assert_eq!(populated.id().as_str(), "c2");
    }

    #[test]
    fn test_cart_item_count_and_line_total() {
        let cart: Cart = serde_json::from_value(json!({
            "_id": "cart1",
            "items": [
                { "_id": "i1", "product": product_json("p1", 399), "quantity": 2 },
                { "_id": "i2", "product": product_json("p2", 100), "quantity": 1, "price": 90 }
            ]
        }))
        .unwrap();

        assert_eq!(cart.item_count(), 3);
        assert!(cart.is_active);
        assert_eq!(cart.items[0].line_total(), Decimal::from(798));
        assert_eq!(cart.items[1].line_total(), Decimal::from(90));
        assert_eq!(cart.totals, CartTotals::default());
    }

    #[test]
    fn test_huge_quantities_saturate() {
        let max = u32::MAX;
        let cart: Cart = serde_json::from_value(json!({
            "_id": "cart1",
            "items": [
                { "_id": "i1", "product": product_json("p1", 399), "quantity": max },
                { "_id": "i2", "product": product_json("p2", 100), "quantity": max },
                {
                    "_id": "i3",
                    "product": { "_id": "p3", "name": "Orchid", "price": Decimal::MAX.to_string() },
                    "quantity": 2
                }
            ]
        }))
        .unwrap();

        assert_eq!(cart.item_count(), u32::MAX);
        assert_eq!(cart.items[2].line_total(), Decimal::MAX);
    }

    #[test]
    fn test_cart_rejects_zero_quantity_line() {
        let result = serde_json::from_value::<Cart>(json!({
            "_id": "cart1",
            "items": [{ "_id": "i1", "product": product_json("p1", 399), "quantity": 0 }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_discount_code_wire_shape() {
        let coupon = serde_json::to_value(DiscountCode::Coupon("SPRING10".into())).unwrap();
        assert_eq!(coupon, json!({ "couponCode": "SPRING10" }));

        let voucher = serde_json::to_value(DiscountCode::Voucher("GIFT500".into())).unwrap();
        assert_eq!(voucher, json!({ "voucherCode": "GIFT500" }));
    }

    #[test]
    fn test_add_to_cart_input_skips_empty_options() {
        let input = AddToCartInput::new(ProductId::new("p1"), Quantity::ONE);
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({ "productId": "p1", "quantity": 1 })
        );
    }

    #[test]
    fn test_profile_default_address() {
        let profile: Profile = serde_json::from_value(json!({
            "_id": "u1",
            "firstName": "Asha",
            "email": "asha@example.com",
            "addresses": [
                { "fullName": "Asha", "phone": "9876543210", "street": "1 MG Road",
                  "city": "Pune", "state": "MH", "pincode": "411001" },
                { "fullName": "Asha", "phone": "9876543210", "street": "2 FC Road",
                  "city": "Pune", "state": "MH", "pincode": "411004", "isDefault": true }
            ]
        }))
        .unwrap();

        assert_eq!(profile.display_name(), "Asha");
        assert_eq!(profile.default_address().unwrap().street, "2 FC Road");
        assert_eq!(profile.addresses[0].country, "India");
    }
}
