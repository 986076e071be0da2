//! Domain services
//!
//! Checkout and settlement own the order state machine between them:
//! checkout creates orders (UNPAID or UNSEND), settlement advances
//! UNPAID → UNSEND exactly once per verified callback.

pub mod checkout;
pub mod gateway;
pub mod notify;
pub mod settlement;

pub use checkout::{CheckoutError, CheckoutService};
pub use gateway::{PaymentGateway, SandboxGateway};
pub use notify::{LogSmsNotifier, SmsNotifier};
pub use settlement::{SettlementError, SettlementService};
