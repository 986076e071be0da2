//! Payment gateway
//!
//! The storefront speaks to exactly one gateway, picked at startup. The
//! sandbox implementation signs parameters with a shared secret; a real
//! integration would swap in the provider's SDK behind the same trait.

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

pub trait PaymentGateway: Send + Sync {
    /// Redirect URL that sends the user to the gateway's cashier page
    fn pay_url(&self, order_id: &str, total_amount: Decimal) -> String;

    /// Check the signature a settlement callback carries
    fn verify(&self, order_id: &str, trade_id: &str, sign: &str) -> bool;
}

pub struct SandboxGateway {
    endpoint: String,
    secret: String,
}

impl SandboxGateway {
    pub fn new(endpoint: String, secret: String) -> Self {
        Self { endpoint, secret }
    }

    fn sign(&self, payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hasher.update(self.secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl PaymentGateway for SandboxGateway {
    fn pay_url(&self, order_id: &str, total_amount: Decimal) -> String {
        let payload = format!("order_id={order_id}&total_amount={total_amount}");
        let sign = self.sign(&payload);
        format!("{}?{payload}&sign={sign}", self.endpoint)
    }

    fn verify(&self, order_id: &str, trade_id: &str, sign: &str) -> bool {
        let payload = format!("order_id={order_id}&trade_id={trade_id}");
        self.sign(&payload) == sign
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn gateway() -> SandboxGateway {
        SandboxGateway::new(
            "https://sandbox.pay.example.com/gateway".to_string(),
            "test-secret".to_string(),
        )
    }

    #[test]
    fn test_pay_url_carries_signed_params() {
        let url = gateway().pay_url("202608220001", Decimal::from_str("170.00").unwrap());
        assert!(url.starts_with("https://sandbox.pay.example.com/gateway?"));
        assert!(url.contains("order_id=202608220001"));
        assert!(url.contains("total_amount=170.00"));
        assert!(url.contains("&sign="));
    }

    #[test]
    fn test_verify_roundtrip_and_tamper() {
        let gw = gateway();
        let sign = gw.sign("order_id=202608220001&trade_id=T-100");
        assert!(gw.verify("202608220001", "T-100", &sign));
        assert!(!gw.verify("202608220001", "T-999", &sign));
        assert!(!gw.verify("202608220001", "T-100", "deadbeef"));

        // A different secret produces a different signature
        let other = SandboxGateway::new(
            "https://sandbox.pay.example.com/gateway".to_string(),
            "other-secret".to_string(),
        );
        assert!(!other.verify("202608220001", "T-100", &sign));
    }
}
