//! Store address normalization.

use crate::error::{CoreError, CoreResult};
use std::fmt;

/// Scheme prefix of every normalized store address.
pub const SCHEME: &str = "mirrorkv://";

/// File extension of every normalized store address.
pub const EXTENSION: &str = ".mirror";

/// A normalized durable-store address.
///
/// Any user-supplied address is brought to the form
/// `mirrorkv://<path>.mirror`. Both the scheme and the extension are added
/// when missing and kept when present.
///
/// ```rust
/// use mirrorkv_core::StoreAddress;
///
/// let address = StoreAddress::parse("data/settings").unwrap();
/// assert_eq!(address.uri(), "mirrorkv://data/settings.mirror");
/// assert_eq!(address.location(), "data/settings.mirror");
/// assert_eq!(address.name(), "data/settings");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreAddress {
    location: String,
}

impl StoreAddress {
    /// Normalizes a user-supplied address.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAddress`] if nothing but whitespace,
    /// scheme or extension is left.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        let path = trimmed.strip_prefix(SCHEME).unwrap_or(trimmed);
        let stem = path.strip_suffix(EXTENSION).unwrap_or(path);

        if stem.trim().is_empty() {
            return Err(CoreError::InvalidAddress(format!(
                "address {input:?} names no store"
            )));
        }

        Ok(Self {
            location: format!("{stem}{EXTENSION}"),
        })
    }

    /// Returns the full address, scheme included.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("{SCHEME}{}", self.location)
    }

    /// Returns the address without its scheme, as handed to a connector.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the human-readable name used in log messages.
    #[must_use]
    pub fn name(&self) -> &str {
        self.location
            .strip_suffix(EXTENSION)
            .unwrap_or(&self.location)
    }
}

impl fmt::Display for StoreAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}", self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_gets_scheme_and_extension() {
        let address = StoreAddress::parse("cache").unwrap();
        assert_eq!(address.uri(), "mirrorkv://cache.mirror");
        assert_eq!(address.location(), "cache.mirror");
        assert_eq!(address.name(), "cache");
    }

    #[test]
    fn existing_parts_are_not_doubled() {
        for input in [
            "cache.mirror",
            "mirrorkv://cache",
            "mirrorkv://cache.mirror",
            "  mirrorkv://cache.mirror  ",
        ] {
            let address = StoreAddress::parse(input).unwrap();
            assert_eq!(address.uri(), "mirrorkv://cache.mirror", "input {input:?}");
        }
    }

    #[test]
    fn nested_paths_are_kept() {
        let address = StoreAddress::parse("/var/lib/app/users").unwrap();
        assert_eq!(address.location(), "/var/lib/app/users.mirror");
        assert_eq!(address.name(), "/var/lib/app/users");
    }

    #[test]
    fn empty_addresses_are_rejected() {
        for input in ["", "   ", "mirrorkv://", ".mirror", "mirrorkv://.mirror"] {
            assert!(
                matches!(StoreAddress::parse(input), Err(CoreError::InvalidAddress(_))),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn display_matches_uri() {
        let address = StoreAddress::parse("x").unwrap();
        assert_eq!(address.to_string(), address.uri());
    }
}
