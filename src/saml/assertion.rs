use crate::error::Result;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;

/// Decode a base64 SAML payload. The service emits unpadded standard
/// base64; a malformed payload is surfaced as a decode error.
pub fn decode_assertion(encoded: &[u8]) -> Result<Vec<u8>> {
    Ok(STANDARD_NO_PAD.decode(encoded)?)
}

/// Verification details recorded while walking the MFA flow.
#[derive(Debug, Clone)]
pub struct MfaVerifyInfo {
    pub device_id: i64,
    pub device_type: String,
    /// OTP code entered by the caller, when one was used.
    pub otp_token: Option<String>,
}

/// Outcome of a successful SAML authentication, ready to hand to AWS STS
/// (or any other relying service).
#[derive(Debug, Clone)]
pub struct AwsSamlAssertion {
    /// Decoded SAML response XML.
    pub saml_response: Vec<u8>,
    /// The base64 payload exactly as the service returned it.
    pub encoded_saml_response: Vec<u8>,
    /// Present only when the account required a second factor.
    pub mfa_verify_info: Option<MfaVerifyInfo>,
    pub user: String,
    pub password: String,
    pub subdomain: String,
}

impl AwsSamlAssertion {
    pub fn new(user: &str, password: &str, subdomain: &str) -> Self {
        Self {
            saml_response: Vec::new(),
            encoded_saml_response: Vec::new(),
            mfa_verify_info: None,
            user: user.to_string(),
            password: password.to_string(),
            subdomain: subdomain.to_string(),
        }
    }

    /// Store the raw payload and its decoded form.
    pub fn set_decoded(&mut self, encoded: &[u8]) -> Result<()> {
        self.saml_response = decode_assertion(encoded)?;
        self.encoded_saml_response = encoded.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OneLoginError;

    #[test]
    fn test_decode_round_trip() {
        let inputs: Vec<Vec<u8>> = vec![
            b"".to_vec(),
            b"<saml>".to_vec(),
            b"a".to_vec(),
            (0u8..=255).collect(),
        ];
        for input in inputs {
            let encoded = STANDARD_NO_PAD.encode(&input);
            assert_eq!(decode_assertion(encoded.as_bytes()).unwrap(), input);
        }
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        let err = decode_assertion(b"!!not base64!!").unwrap_err();
        assert!(matches!(err, OneLoginError::Decode(_)));
    }

    #[test]
    fn test_set_decoded_keeps_raw_payload() {
        let mut assertion = AwsSamlAssertion::new("jdoe", "pw", "acme");
        assertion.set_decoded(b"PHNhbWw+").unwrap();
        assert_eq!(assertion.saml_response, b"<saml>");
        assert_eq!(assertion.encoded_saml_response, b"PHNhbWw+");
        assert!(assertion.mfa_verify_info.is_none());
    }

    #[test]
    fn test_set_decoded_failure_leaves_no_partial_result() {
        let mut assertion = AwsSamlAssertion::new("jdoe", "pw", "acme");
        assert!(assertion.set_decoded(b"%%%").is_err());
        assert!(assertion.saml_response.is_empty());
        assert!(assertion.encoded_saml_response.is_empty());
    }
}
