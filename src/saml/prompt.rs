use crate::error::{OneLoginError, Result};
use crate::saml::device::MfaDevice;
use std::io::{BufRead, Write};

/// Caller-supplied capability for the interactive parts of the MFA flow:
/// choosing a device and entering OTP codes. The flow itself never touches
/// a terminal, which keeps it deterministic and testable.
#[cfg_attr(test, mockall::automock)]
pub trait MfaPrompt {
    /// Present the device list and return the ordinal index of the chosen
    /// device. The returned index must be within `0..devices.len()`.
    fn select_device(&self, devices: &[MfaDevice]) -> Result<usize>;

    /// Ask for the OTP code read from the given device.
    fn request_code(&self, device: &MfaDevice) -> Result<String>;
}

/// Console implementation of [`MfaPrompt`]: device list and prompts on
/// stderr, answers read from stdin. Re-prompts until the input is usable.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl StdinPrompt {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self) -> Result<String> {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| OneLoginError::Prompt(e.to_string()))?;
        Ok(line.trim().to_string())
    }
}

impl MfaPrompt for StdinPrompt {
    fn select_device(&self, devices: &[MfaDevice]) -> Result<usize> {
        eprintln!("\nMFA Required");
        eprintln!("Authenticate using one of these devices:");
        eprintln!("-----------------------------------------------------------------------");
        for (index, device) in devices.iter().enumerate() {
            eprintln!(" {} | {}", index, device.device_type);
        }
        eprintln!("-----------------------------------------------------------------------");

        loop {
            eprint!("Enter the value (0 ... {}): ", devices.len() - 1);
            let _ = std::io::stderr().flush();
            let line = self.read_line()?;
            if let Ok(index) = line.parse::<usize>() {
                if index < devices.len() {
                    return Ok(index);
                }
            }
            eprintln!(
                "Your choice must be between 0 and {}. You entered '{}'.",
                devices.len() - 1,
                line
            );
        }
    }

    fn request_code(&self, device: &MfaDevice) -> Result<String> {
        loop {
            eprint!("Enter the {} OTP code: ", device.device_type);
            let _ = std::io::stderr().flush();
            let code = self.read_line()?;
            if !code.is_empty() {
                return Ok(code);
            }
            eprintln!("Please enter a code.");
        }
    }
}
