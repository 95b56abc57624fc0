//! Cart Example
//!
//! Fills a cart from a fixture set, walks it through the cart screen's
//! controls, prints a summary and checks out against a local gateway.
//!
//! Use `-f` to load a fixture set by name
//! Use `-s` to persist the cart as JSON in a directory
//! Use `-p` to pick the payment method (cash, vnpay, momo)

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use lattice_cart::{
    checkout::{
        CheckoutOutcome, CheckoutRequest, GatewayError, OrderConfirmation, OrderGateway,
        PaymentMethod, PaymentRedirect, ShippingAddress, checkout, select_address,
    },
    fixtures::Fixture,
    storage::{FileStore, KeyValueStore, MemoryStore, PersistentCart},
    summary::write_summary,
    utils::{ExampleCartArgs, LogFormat, LoggingArgs},
};

/// Gateway that confirms cash orders and redirects card payments.
#[derive(Debug)]
struct LocalGateway;

impl OrderGateway for LocalGateway {
    fn submit(&self, request: &CheckoutRequest) -> Result<CheckoutOutcome, GatewayError> {
        match request.payment_method {
            PaymentMethod::Cash => Ok(CheckoutOutcome::Confirmed(OrderConfirmation {
                order_id: format!("local-{}", request.amount),
            })),
            PaymentMethod::VnPay => Ok(CheckoutOutcome::Redirect(PaymentRedirect {
                payment_url: format!("https://pay.local/vnpay?amount={}", request.amount),
            })),
            PaymentMethod::Momo => Err(GatewayError::Rejected("momo is not enabled".to_string())),
        }
    }
}

fn init_logging(args: &LoggingArgs) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);

    match args.log_format {
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_target(true))
            .try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?,
    }

    Ok(())
}

fn run<S: KeyValueStore>(args: &ExampleCartArgs, store: S) -> Result<()> {
    let fixture = Fixture::from_set(&args.fixture)?;
    let mut cart = PersistentCart::load_or_new(store, args.key.as_str(), fixture.currency()?)?;

    info!(lines = cart.cart().len(), "cart loaded");

    for item in fixture.items() {
        cart.add_item(item.clone())?;
    }

    if let Some(first) = cart.cart().items().first().map(|item| item.key().clone()) {
        cart.update(|cart| cart.increment(&first))?;
        cart.update(|cart| cart.set_quantity_clamped(&first, 0))?;
    }

    let stdout = io::stdout();
    write_summary(stdout.lock(), cart.cart())?;

    let addresses = [ShippingAddress {
        id: "home".to_string(),
        street: "12 Ly Thuong Kiet".to_string(),
        city: "Hanoi".to_string(),
        state: "HN".to_string(),
        zip: "100000".to_string(),
        country: "VN".to_string(),
    }];

    let outcome = checkout(
        &mut cart,
        select_address(&addresses, None),
        args.payment,
        &LocalGateway,
    )?;

    match outcome {
        CheckoutOutcome::Confirmed(confirmation) => {
            info!(order_id = %confirmation.order_id, lines = cart.cart().len(), "checkout complete");
        }
        CheckoutOutcome::Redirect(redirect) => {
            info!(url = %redirect.payment_url, lines = cart.cart().len(), "awaiting payment");
        }
    }

    Ok(())
}

/// Cart Example
pub fn main() -> Result<()> {
    let args = ExampleCartArgs::parse();

    init_logging(&args.logging)?;

    match &args.store_dir {
        Some(dir) => run(&args, FileStore::open(dir)?),
        None => run(&args, MemoryStore::new()),
    }
}
