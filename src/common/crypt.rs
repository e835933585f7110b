use ring::hmac;
use ring::rand::SystemRandom;

/// Constant-time comparison of the configured callback token against the one a request carries.
/// Both sides are MACed under a throwaway key so `hmac::verify` does the comparison.
pub fn callback_token_verify(expected: &str, provided: &str) -> anyhow::Result<()> {
    let rng = SystemRandom::new();
    let key = hmac::Key::generate(hmac::HMAC_SHA256, &rng)?;
    let tag = hmac::sign(&key, expected.as_bytes());
    hmac::verify(&key, provided.as_bytes(), tag.as_ref()).map_err(Into::into)
}

#[test]
fn test_callback_token_verify() {
    assert!(callback_token_verify("xnd_token_123", "xnd_token_123").is_ok());
    assert!(callback_token_verify("xnd_token_123", "xnd_token_124").is_err());
    assert!(callback_token_verify("xnd_token_123", "").is_err());
    assert!(callback_token_verify("xnd_token_123", "xnd_token_1234").is_err());
}
