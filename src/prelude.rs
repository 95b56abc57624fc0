//! Lattice Cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, clamp_quantity},
    checkout::{
        CheckoutError, CheckoutOutcome, CheckoutRequest, GatewayError, OrderConfirmation,
        OrderGateway, OrderLine, PaymentMethod, PaymentRedirect, ShippingAddress, checkout,
        order_lines, select_address,
    },
    fixtures::{Fixture, FixtureError},
    items::{LineItem, LineItemKey, ProductId},
    pricing::{Price, PriceError, parse_price, total_price},
    products::{CatalogError, Product, Variant},
    storage::{
        CartSnapshot, FileStore, KeyValueStore, MemoryStore, PersistentCart, StorageError,
    },
    summary::{SummaryError, write_summary},
};
