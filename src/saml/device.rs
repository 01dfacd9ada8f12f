use serde::Deserialize;

/// Second-factor device registered for a user, as listed by the SAML
/// assertion endpoint when MFA is required.
#[derive(Debug, Clone, Deserialize)]
pub struct MfaDevice {
    pub device_id: i64,
    pub device_type: String,
}

impl MfaDevice {
    /// The verification strategy this device calls for.
    pub fn kind(&self) -> DeviceKind {
        DeviceKind::from_type(&self.device_type)
    }
}

/// Verification strategy discriminator, keyed off the device-type string.
///
/// `Other` is the explicit fallback for any type this library does not
/// special-case: the caller supplies an OTP code read from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// OTP code delivered over SMS, entered by the caller.
    Sms,
    /// Push notification confirmed out-of-band, polled for completion.
    Push,
    /// Any other factor; the caller supplies the code directly.
    Other,
}

impl DeviceKind {
    pub fn from_type(device_type: &str) -> Self {
        match device_type {
            "OneLogin SMS" => DeviceKind::Sms,
            "OneLogin Protect" => DeviceKind::Push,
            _ => DeviceKind::Other,
        }
    }
}
