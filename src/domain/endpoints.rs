use super::transport::SeedMode;

pub const ATTESTATION_PATH: &str = "v2/platform/attestation";
pub const PLATFORM_PATH: &str = "v2/platform";

/// Which short-lived token an assertion is exchanged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Public,
    Private,
}

impl TokenKind {
    pub fn path(&self) -> &'static str {
        match self {
            TokenKind::Public => "v2/token/public/platform",
            TokenKind::Private => "v2/token/private/platform",
        }
    }

    /// Response field carrying the token.
    pub fn field(&self) -> &'static str {
        match self {
            TokenKind::Public => "publicToken",
            TokenKind::Private => "privateToken",
        }
    }

    pub fn challenge_seed(&self) -> Option<SeedMode> {
        match self {
            TokenKind::Public => None,
            TokenKind::Private => Some(SeedMode::Public),
        }
    }

    pub fn submit_seed(&self) -> Option<SeedMode> {
        match self {
            TokenKind::Public => None,
            TokenKind::Private => Some(SeedMode::Public),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_routes() {
        assert_eq!(TokenKind::Public.path(), "v2/token/public/platform");
        assert_eq!(TokenKind::Private.path(), "v2/token/private/platform");
        assert_eq!(TokenKind::Public.field(), "publicToken");
        assert_eq!(TokenKind::Private.field(), "privateToken");
    }

    #[test]
    fn test_private_token_is_signed_with_public_seed() {
        assert_eq!(TokenKind::Private.challenge_seed(), Some(SeedMode::Public));
        assert_eq!(TokenKind::Private.submit_seed(), Some(SeedMode::Public));
        assert_eq!(TokenKind::Public.challenge_seed(), None);
        assert_eq!(TokenKind::Public.submit_seed(), None);
    }
}
