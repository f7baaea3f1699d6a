use rand::Rng;

const TOKEN_BYTES: usize = 16;

/// Opaque confirmation secret: 128 bits from a CSPRNG, hex encoded (32 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(String);

impl SubscriptionToken {
    pub fn generate() -> SubscriptionToken {
        // thread_rng is a ChaCha based CSPRNG reseeded from the OS
        let bytes: [u8; TOKEN_BYTES] = rand::thread_rng().gen();

        Self(hex::encode(bytes))
    }

    /// Accepts any non-empty string. Tokens are compared as-is, so a value that was never
    /// issued simply matches no subscriber.
    pub fn parse(token: String) -> Result<SubscriptionToken, String> {
        if token.trim().is_empty() {
            return Err(String::from("token cannot be empty"));
        }

        Ok(Self(token))
    }
}

impl AsRef<str> for SubscriptionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
