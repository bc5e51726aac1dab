//! Kernel device numbers and the character/block discriminator.

use std::fmt;

/// A (major, minor) pair identifying a character or block device node.
///
/// Wraps the kernel `dev_t` encoding; construction and field extraction go
/// through `libc::makedev`/`major`/`minor` so extended (>16-bit) majors and
/// minors round-trip correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Devnum(libc::dev_t);

impl Devnum {
    /// Pack a major/minor pair into a device number.
    pub fn new(major: u32, minor: u32) -> Self {
        Self(libc::makedev(major, minor))
    }

    /// The major component.
    pub fn major(self) -> u32 {
        libc::major(self.0)
    }

    /// The minor component.
    pub fn minor(self) -> u32 {
        libc::minor(self.0)
    }

    /// The raw `dev_t` value.
    pub fn as_raw(self) -> libc::dev_t {
        self.0
    }
}

impl From<libc::dev_t> for Devnum {
    fn from(raw: libc::dev_t) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Devnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major(), self.minor())
    }
}

/// Kernel device node type, used to disambiguate device-number lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// A character device (`'c'`).
    Character,
    /// A block device (`'b'`).
    Block,
}

impl DeviceType {
    /// The single-character discriminator libudev expects.
    pub fn as_char(self) -> char {
        match self {
            Self::Character => 'c',
            Self::Block => 'b',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devnum_round_trips_major_and_minor() {
        let d = Devnum::new(1, 8);
        assert_eq!(d.major(), 1);
        assert_eq!(d.minor(), 8);
    }

    #[test]
    fn devnum_round_trips_extended_values() {
        // Majors and minors wider than the historical 8/8-bit split.
        for (major, minor) in [(0, 0), (259, 65_535), (4_095, 1_048_575), (511, 1_048_570)] {
            let d = Devnum::new(major, minor);
            assert_eq!(d.major(), major, "major for {}:{}", major, minor);
            assert_eq!(d.minor(), minor, "minor for {}:{}", major, minor);
        }
    }

    #[test]
    fn devnum_display_is_major_colon_minor() {
        assert_eq!(Devnum::new(1, 5).to_string(), "1:5");
    }

    #[test]
    fn device_type_discriminators() {
        assert_eq!(DeviceType::Character.as_char(), 'c');
        assert_eq!(DeviceType::Block.as_char(), 'b');
    }
}
