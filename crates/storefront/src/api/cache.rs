//! Cache types for REST API responses.

use petal_core::{CategoryId, ProductId, UserId};

use crate::api::types::{Cart, CartOwner, Category, Product, Profile, SubCategory, Wishlist};

/// Cache key for every cacheable read.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products { page: u32 },
    Product(ProductId),
    ProductsByCategory(CategoryId),
    Categories,
    Category(CategoryId),
    SubCategories,
    SubCategoriesByCategory(CategoryId),
    Cart(CartOwner),
    CartDetails(CartOwner),
    Wishlist,
    WishlistCount,
    Profile,
    User(UserId),
}

/// Invalidation group a cache key belongs to.
///
/// Mutations name the tags they invalidate; every key carrying one of those
/// tags is dropped so the next reader refetches.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheTag {
    Catalog,
    Cart(CartOwner),
    Wishlist,
    Profile,
}

impl CacheKey {
    /// The invalidation tag this key belongs to.
    #[must_use]
    pub fn tag(&self) -> CacheTag {
        match self {
            Self::Products { .. }
            | Self::Product(_)
            | Self::ProductsByCategory(_)
            | Self::Categories
            | Self::Category(_)
            | Self::SubCategories
            | Self::SubCategoriesByCategory(_) => CacheTag::Catalog,
            Self::Cart(owner) | Self::CartDetails(owner) => CacheTag::Cart(owner.clone()),
            Self::Wishlist | Self::WishlistCount => CacheTag::Wishlist,
            Self::Profile | Self::User(_) => CacheTag::Profile,
        }
    }
}

impl CacheTag {
    /// Keys belonging to this tag, when they can be enumerated.
    ///
    /// Catalog and profile keys are open-ended and return `None`; those tags
    /// are invalidated with a predicate instead.
    #[must_use]
    pub fn keys(&self) -> Option<Vec<CacheKey>> {
        match self {
            Self::Cart(owner) => Some(vec![
                CacheKey::Cart(owner.clone()),
                CacheKey::CartDetails(owner.clone()),
            ]),
            Self::Wishlist => Some(vec![CacheKey::Wishlist, CacheKey::WishlistCount]),
            Self::Catalog | Self::Profile => None,
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Categories(Vec<Category>),
    Category(Box<Category>),
    SubCategories(Vec<SubCategory>),
    Cart(Box<Cart>),
    Wishlist(Box<Wishlist>),
    WishlistCount(u32),
    Profile(Box<Profile>),
}

/// Conversion between a response type and its cache slot.
pub(crate) trait Cacheable: Sized {
    fn into_value(self) -> CacheValue;
    fn from_value(value: CacheValue) -> Option<Self>;
}

macro_rules! cacheable {
    ($ty:ty, $variant:ident) => {
        impl Cacheable for $ty {
            fn into_value(self) -> CacheValue {
                CacheValue::$variant(self)
            }

            fn from_value(value: CacheValue) -> Option<Self> {
                match value {
                    CacheValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
    (boxed $ty:ty, $variant:ident) => {
        impl Cacheable for $ty {
            fn into_value(self) -> CacheValue {
                CacheValue::$variant(Box::new(self))
            }

            fn from_value(value: CacheValue) -> Option<Self> {
                match value {
                    CacheValue::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

cacheable!(Vec<Product>, Products);
cacheable!(Vec<Category>, Categories);
cacheable!(Vec<SubCategory>, SubCategories);
cacheable!(u32, WishlistCount);
cacheable!(boxed Product, Product);
cacheable!(boxed Category, Category);
cacheable!(boxed Cart, Cart);
cacheable!(boxed Wishlist, Wishlist);
cacheable!(boxed Profile, Profile);

#[cfg(test)]
mod tests {
    use petal_core::GuestSessionId;

    use super::*;

    #[test]
    fn test_cart_keys_share_owner_tag() {
        let owner = CartOwner::Guest(GuestSessionId::generate());
        let tag = CacheKey::CartDetails(owner.clone()).tag();
        assert_eq!(tag, CacheTag::Cart(owner.clone()));
        assert_eq!(
            tag.keys(),
            Some(vec![
                CacheKey::Cart(owner.clone()),
                CacheKey::CartDetails(owner)
            ])
        );
    }

    #[test]
    fn test_guest_and_user_cart_tags_differ() {
        let guest = CacheKey::Cart(CartOwner::Guest(GuestSessionId::generate())).tag();
        assert_ne!(guest, CacheKey::Cart(CartOwner::User).tag());
    }

    #[test]
    fn test_catalog_keys_are_not_enumerable() {
        assert_eq!(CacheKey::Categories.tag(), CacheTag::Catalog);
        assert!(CacheTag::Catalog.keys().is_none());
    }

    #[test]
    fn test_cacheable_rejects_wrong_variant() {
        assert!(<u32 as Cacheable>::from_value(CacheValue::Categories(vec![])).is_none());
        assert_eq!(
            <u32 as Cacheable>::from_value(7u32.into_value()),
            Some(7)
        );
    }
}
