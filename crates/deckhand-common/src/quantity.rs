//! Byte quantity representation.
//!
//! Used to render memory readings in heartbeat attributes:
//! - "512 B" below one kibibyte
//! - "1.5 KiB", "42.0 MiB", "2.0 GiB" above, one decimal place

use std::fmt;

const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

/// A quantity of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteQuantity(u64);

impl ByteQuantity {
    /// Create a quantity from bytes.
    #[must_use]
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ByteQuantity {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 1024 {
            return write!(f, "{} B", self.0);
        }

        let mut value = self.0 as f64 / 1024.0;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        write!(f, "{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn display_bytes() {
        assert_eq!(ByteQuantity::from_bytes(0).to_string(), "0 B");
        assert_eq!(ByteQuantity::from_bytes(1023).to_string(), "1023 B");
    }

    #[test]
    fn display_binary_units() {
        assert_eq!(ByteQuantity::from_bytes(1536).to_string(), "1.5 KiB");
        assert_eq!(ByteQuantity::from_bytes(42 * MIB).to_string(), "42.0 MiB");
        assert_eq!(ByteQuantity::from_bytes(2048 * MIB).to_string(), "2.0 GiB");
        assert_eq!(ByteQuantity::from_bytes(u64::MAX).to_string(), "16777216.0 TiB");
    }

    proptest! {
        #[test]
        fn display_always_has_a_unit(bytes in any::<u64>()) {
            let rendered = ByteQuantity::from_bytes(bytes).to_string();
            prop_assert!(rendered.ends_with('B'));
        }
    }
}
