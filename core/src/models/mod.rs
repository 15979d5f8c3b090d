// core/src/models/mod.rs

//! Data structures representing storefront entities and their read views.

pub mod cart;
pub mod category;
pub mod order;
pub mod page;
pub mod product;
pub mod review;
pub mod user;

pub use cart::{Cart, CartItem, CartLine, CartView};
pub use category::{Category, NewCategory};
pub use order::{NewOrder, NewOrderLine, Order, OrderItem, OrderLine, OrderStatus, PlaceOrder};
pub use page::{Page, PageMeta, PageRequest};
pub use product::{NewProduct, Product, ProductChanges, ProductDetail, ProductQuery, ProductSort, ProductSummary, SortField, SortOrder};
pub use review::{NewReview, Review, ReviewChanges};
pub use user::{NewUser, User, UserContact, UserSummary};
