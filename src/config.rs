use std::fmt;

/// A secret value whose `Debug` and `Display` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Payment settings shared by the order preparer and the signature verifier.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Gateway key secret used to sign `orderId|paymentId`.
    pub key_secret: Secret,
    /// ISO currency code sent with every order.
    pub currency: String,
}

impl PaymentConfig {
    pub fn new(key_secret: Secret, currency: impl Into<String>) -> Self {
        Self {
            key_secret,
            currency: currency.into(),
        }
    }
}

/// Everything the service needs at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    pub payment: PaymentConfig,
    pub auth_secret: Secret,
    /// Lifetime of issued bearer tokens, in seconds.
    pub token_ttl_secs: i64,
    pub notification_queue: usize,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub const DEFAULT_NOTIFICATION_QUEUE: usize = 256;
    pub const DEFAULT_CURRENCY: &'static str = "INR";
    pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let config = PaymentConfig::new(Secret::new("hunter2"), "INR");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("redacted"));
        assert_eq!(config.key_secret.expose(), b"hunter2");
    }
}
