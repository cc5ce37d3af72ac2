use core::fmt;

/// Access currently granted on a resident page.
///
/// Permissions only ever widen in response to an actual access:
/// `NONE → READ` on a read, `READ → READ_WRITE` on a write. A timer tick may
/// drop a page back to `NONE` to observe its next access.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(u8)]
pub enum Permission {
    /// Every access faults.
    #[default]
    None = 0,
    /// Reads succeed, writes fault.
    Read = 1,
    /// Reads and writes succeed.
    ReadWrite = 2,
}

impl Permission {
    #[inline]
    #[must_use]
    pub const fn into_bits(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub const fn from_bits(v: u8) -> Self {
        match v & 0b11 {
            0 => Self::None,
            1 => Self::Read,
            _ => Self::ReadWrite,
        }
    }

    #[inline]
    #[must_use]
    pub const fn allows_read(self) -> bool {
        !matches!(self, Self::None)
    }

    #[inline]
    #[must_use]
    pub const fn allows_write(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "NONE",
            Self::Read => "READ",
            Self::ReadWrite => "READ_WRITE",
        })
    }
}
