//! Origin and Same-Origin Policy
//!
//! Web origin model used for cross-document access checks.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::SecurityError;

/// Security origin of a document
///
/// Tuple origins compare by scheme, host and port. Opaque origins (`data:`,
/// `file:`, sandboxed documents) only match clones of themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityOrigin {
    origin: url::Origin,
    local: bool,
    universal_access: bool,
}

impl SecurityOrigin {
    /// Origin of a document loaded from `url`
    pub fn from_url(url: &Url) -> Self {
        Self {
            origin: url.origin(),
            local: url.scheme() == "file",
            universal_access: false,
        }
    }

    /// A fresh opaque origin
    pub fn opaque() -> Self {
        Self {
            origin: url::Origin::new_opaque(),
            local: false,
            universal_access: false,
        }
    }

    /// Grant access to every other origin (privileged documents)
    pub fn grant_universal_access(&mut self) {
        self.universal_access = true;
    }

    /// Loaded from the local filesystem
    pub fn is_local(&self) -> bool {
        self.local
    }

    pub fn is_opaque(&self) -> bool {
        !self.origin.is_tuple()
    }

    /// Whether script running in `self` may touch content of `other`
    pub fn can_access(&self, other: &SecurityOrigin) -> bool {
        if self.universal_access {
            return true;
        }
        self.origin == other.origin
    }

    /// ASCII serialization (`null` for opaque origins)
    pub fn serialize(&self) -> String {
        self.origin.ascii_serialization()
    }
}

impl FromStr for SecurityOrigin {
    type Err = SecurityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s.trim()).map_err(|e| SecurityError::InvalidUrl(e.to_string()))?;
        Ok(Self::from_url(&url))
    }
}

impl fmt::Display for SecurityOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_origin() {
        let a: SecurityOrigin = "https://example.com/page".parse().unwrap();
        let b: SecurityOrigin = "https://example.com:443/other".parse().unwrap();
        let c: SecurityOrigin = "https://evil.com/".parse().unwrap();

        assert!(a.can_access(&b));
        assert!(!a.can_access(&c));
        assert_eq!(a.serialize(), "https://example.com");
    }

    #[test]
    fn test_file_origin_is_local_and_opaque() {
        let a: SecurityOrigin = "file:///tmp/a.html".parse().unwrap();
        let b: SecurityOrigin = "file:///tmp/a.html".parse().unwrap();

        assert!(a.is_local());
        assert!(a.is_opaque());
        assert!(a.can_access(&a.clone()));
        assert!(!a.can_access(&b));
    }

    #[test]
    fn test_universal_access() {
        let mut privileged = SecurityOrigin::opaque();
        let other: SecurityOrigin = "https://example.com/".parse().unwrap();
        assert!(!privileged.can_access(&other));
        privileged.grant_universal_access();
        assert!(privileged.can_access(&other));
        assert!(!other.can_access(&privileged));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            "not a url".parse::<SecurityOrigin>(),
            Err(SecurityError::InvalidUrl(_))
        ));
    }
}
