//! Checkout
//!
//! Builds an order request from a read-only view of the cart, hands it to the
//! host's order gateway, and empties the cart once an order is confirmed. A
//! payment redirect leaves the cart alone; the gateway's return flow settles
//! the payment out of band.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cart::Cart,
    items::{LineItem, ProductId},
    storage::{KeyValueStore, PersistentCart, StorageError},
};

pub mod address;

pub use address::{ShippingAddress, select_address};

/// Errors raised while checking out.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// No shipping address was chosen.
    #[error("A shipping address is required")]
    MissingAddress,

    /// The payment method is not offered yet.
    #[error("Payment method {0:?} is not supported")]
    UnsupportedPaymentMethod(PaymentMethod),

    /// The order gateway failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Emptying the persisted cart failed after the order was confirmed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors reported by an [`OrderGateway`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatewayError {
    /// The order was refused.
    #[error("Order rejected: {0}")]
    Rejected(String),

    /// The gateway could not be reached.
    #[error("Order gateway unavailable: {0}")]
    Unavailable(String),
}

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery
    Cash,

    /// `VNPay` hosted payment page
    #[value(name = "vnpay")]
    VnPay,

    /// `MoMo` wallet
    Momo,
}

/// One line of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product id
    pub product: ProductId,

    /// Units ordered
    pub quantity: u32,

    /// Size, omitted when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Color, omitted when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<&LineItem> for OrderLine {
    fn from(item: &LineItem) -> Self {
        let present = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);

        Self {
            product: item.product_id().clone(),
            quantity: item.quantity(),
            size: present(item.size()),
            color: present(item.color()),
        }
    }
}

/// Order lines for every line in the cart, in cart order.
pub fn order_lines(cart: &Cart) -> Vec<OrderLine> {
    cart.iter().map(OrderLine::from).collect()
}

/// Everything the order gateway needs to place an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutRequest {
    /// Cart total in minor units
    pub amount: i64,

    /// ISO currency code of `amount`
    pub currency: &'static str,

    /// Ordered lines
    pub products: Vec<OrderLine>,

    /// Where to ship
    pub address: ShippingAddress,

    /// How the shopper pays
    pub payment_method: PaymentMethod,
}

impl CheckoutRequest {
    /// Build a request from the cart.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: the cart has no lines.
    /// - [`CheckoutError::MissingAddress`]: no address was chosen.
    /// - [`CheckoutError::UnsupportedPaymentMethod`]: the method is not offered yet.
    pub fn new(
        cart: &Cart,
        address: Option<&ShippingAddress>,
        payment_method: PaymentMethod,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let address = address.ok_or(CheckoutError::MissingAddress)?;

        if payment_method == PaymentMethod::Momo {
            return Err(CheckoutError::UnsupportedPaymentMethod(payment_method));
        }

        Ok(Self {
            amount: cart.total_amount().to_minor_units(),
            currency: cart.currency().iso_alpha_code,
            products: order_lines(cart),
            address: address.clone(),
            payment_method,
        })
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderConfirmation {
    /// Id assigned by the order service
    pub order_id: String,
}

/// Where to send the shopper to pay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentRedirect {
    /// Payment page URL
    pub payment_url: String,
}

/// Result of submitting an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order was placed.
    Confirmed(OrderConfirmation),

    /// The shopper must complete payment on an external page.
    Redirect(PaymentRedirect),
}

/// The host's order and payment API.
#[cfg_attr(test, mockall::automock)]
pub trait OrderGateway {
    /// Submit an order request.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the order could not be placed.
    fn submit(&self, request: &CheckoutRequest) -> Result<CheckoutOutcome, GatewayError>;
}

/// Check out the persisted cart.
///
/// The cart is emptied (and the empty cart persisted) only when the gateway
/// confirms the order.
///
/// # Errors
///
/// Returns a [`CheckoutError`] if the request cannot be built, the gateway
/// fails, or the emptied cart cannot be persisted.
pub fn checkout<S: KeyValueStore>(
    cart: &mut PersistentCart<S>,
    address: Option<&ShippingAddress>,
    payment_method: PaymentMethod,
    gateway: &impl OrderGateway,
) -> Result<CheckoutOutcome, CheckoutError> {
    let request = CheckoutRequest::new(cart.cart(), address, payment_method)?;

    debug!(
        lines = request.products.len(),
        amount = request.amount,
        ?payment_method,
        "submitting order"
    );

    let outcome = gateway.submit(&request)?;

    match &outcome {
        CheckoutOutcome::Confirmed(confirmation) => {
            info!(order_id = %confirmation.order_id, "order confirmed");
            cart.reset()?;
        }
        CheckoutOutcome::Redirect(redirect) => {
            info!(url = %redirect.payment_url, "redirecting to payment page");
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use crate::storage::MemoryStore;

    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            id: "a1".to_string(),
            street: "12 Ly Thuong Kiet".to_string(),
            city: "Hanoi".to_string(),
            state: "HN".to_string(),
            zip: "100000".to_string(),
            country: "VN".to_string(),
        }
    }

    fn filled_cart() -> Result<PersistentCart<MemoryStore>, StorageError> {
        let mut cart = PersistentCart::load_or_new(MemoryStore::new(), "cart", iso::VND)?;

        cart.add_item(
            LineItem::new("tee", "Basic tee", Money::from_minor(199_000, iso::VND), 2)
                .with_size("M"),
        )?;
        cart.add_item(LineItem::new(
            "cap",
            "Cap",
            Money::from_minor(99_000, iso::VND),
            1,
        ))?;

        Ok(cart)
    }

    #[test]
    fn order_lines_omit_absent_variants() -> TestResult {
        let cart = filled_cart()?;

        let json = serde_json::to_value(order_lines(cart.cart()))?;

        assert_eq!(
            json,
            serde_json::json!([
                { "product": "tee", "quantity": 2, "size": "M" },
                { "product": "cap", "quantity": 1 },
            ])
        );

        Ok(())
    }

    #[test]
    fn request_carries_total_and_lines() -> TestResult {
        let cart = filled_cart()?;

        let request = CheckoutRequest::new(cart.cart(), Some(&address()), PaymentMethod::VnPay)?;

        assert_eq!(request.amount, 497_000);
        assert_eq!(request.currency, "VND");
        assert_eq!(request.products.len(), 2);

        let json = serde_json::to_value(&request)?;
        assert_eq!(json["payment_method"], "vnpay");

        Ok(())
    }

    #[test]
    fn request_requires_lines_and_address() -> TestResult {
        let empty = PersistentCart::load_or_new(MemoryStore::new(), "cart", iso::VND)?;

        assert!(matches!(
            CheckoutRequest::new(empty.cart(), Some(&address()), PaymentMethod::Cash),
            Err(CheckoutError::EmptyCart)
        ));

        let cart = filled_cart()?;

        assert!(matches!(
            CheckoutRequest::new(cart.cart(), None, PaymentMethod::Cash),
            Err(CheckoutError::MissingAddress)
        ));

        Ok(())
    }

    #[test]
    fn momo_is_not_offered() -> TestResult {
        let cart = filled_cart()?;

        assert!(matches!(
            CheckoutRequest::new(cart.cart(), Some(&address()), PaymentMethod::Momo),
            Err(CheckoutError::UnsupportedPaymentMethod(PaymentMethod::Momo))
        ));

        Ok(())
    }

    #[test]
    fn confirmed_order_empties_cart() -> TestResult {
        let mut cart = filled_cart()?;
        let mut gateway = MockOrderGateway::new();

        gateway
            .expect_submit()
            .withf(|request| request.amount == 497_000 && request.products.len() == 2)
            .times(1)
            .returning(|_| {
                Ok(CheckoutOutcome::Confirmed(OrderConfirmation {
                    order_id: "ord-1".to_string(),
                }))
            });

        let outcome = checkout(&mut cart, Some(&address()), PaymentMethod::Cash, &gateway)?;

        assert!(matches!(outcome, CheckoutOutcome::Confirmed(_)));
        assert!(cart.cart().is_empty());
        assert_eq!(cart.cart().total_quantity(), 0);

        Ok(())
    }

    #[test]
    fn redirect_keeps_cart() -> TestResult {
        let mut cart = filled_cart()?;
        let before = cart.cart().clone();
        let mut gateway = MockOrderGateway::new();

        gateway.expect_submit().times(1).returning(|_| {
            Ok(CheckoutOutcome::Redirect(PaymentRedirect {
                payment_url: "https://pay.example/checkout/1".to_string(),
            }))
        });

        let outcome = checkout(&mut cart, Some(&address()), PaymentMethod::VnPay, &gateway)?;

        assert!(matches!(outcome, CheckoutOutcome::Redirect(_)));
        assert_eq!(cart.cart(), &before);

        Ok(())
    }

    #[test]
    fn gateway_failure_keeps_cart() -> TestResult {
        let mut cart = filled_cart()?;
        let before = cart.cart().clone();
        let mut gateway = MockOrderGateway::new();

        gateway
            .expect_submit()
            .returning(|_| Err(GatewayError::Unavailable("timeout".to_string())));

        let result = checkout(&mut cart, Some(&address()), PaymentMethod::Cash, &gateway);

        assert!(matches!(result, Err(CheckoutError::Gateway(_))));
        assert_eq!(cart.cart(), &before);

        Ok(())
    }

    #[test]
    fn invalid_request_never_reaches_gateway() -> TestResult {
        let mut cart = filled_cart()?;
        let mut gateway = MockOrderGateway::new();

        gateway.expect_submit().never();

        let result = checkout(&mut cart, None, PaymentMethod::Cash, &gateway);

        assert!(matches!(result, Err(CheckoutError::MissingAddress)));

        Ok(())
    }
}
