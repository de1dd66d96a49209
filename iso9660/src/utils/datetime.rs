//! Date/time parsing
//!
//! ISO9660 has two datetime formats: 7-byte and 17-byte.

/// 7-byte directory record datetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime7 {
    /// Years since 1900
    pub year: u8,

    /// Month (1-12)
    pub month: u8,

    /// Day (1-31)
    pub day: u8,

    /// Hour (0-23)
    pub hour: u8,

    /// Minute (0-59)
    pub minute: u8,

    /// Second (0-59)
    pub second: u8,

    /// GMT offset in 15-minute intervals (-48 to +52)
    pub gmt_offset: i8,
}

impl DateTime7 {
    /// Parse from 7-byte array
    pub fn from_bytes(bytes: &[u8; 7]) -> Self {
        Self {
            year: bytes[0],
            month: bytes[1],
            day: bytes[2],
            hour: bytes[3],
            minute: bytes[4],
            second: bytes[5],
            gmt_offset: bytes[6] as i8,
        }
    }

    /// Get full year (1900 + year)
    pub fn full_year(&self) -> u16 {
        1900 + self.year as u16
    }

    /// All-zero timestamps mean "not recorded"
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }
}

/// 17-byte ASCII datetime (volume descriptors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTime17 {
    /// Year (4 ASCII digits)
    pub year: u16,

    /// Month (2 ASCII digits, 1-12)
    pub month: u8,

    /// Day (2 ASCII digits, 1-31)
    pub day: u8,

    /// Hour (2 ASCII digits, 0-23)
    pub hour: u8,

    /// Minute (2 ASCII digits, 0-59)
    pub minute: u8,

    /// Second (2 ASCII digits, 0-59)
    pub second: u8,

    /// Hundredths (2 ASCII digits)
    pub hundredths: u8,

    /// GMT offset in 15-minute intervals
    pub gmt_offset: i8,
}

impl DateTime17 {
    /// Parse from 17-byte ASCII string
    ///
    /// Returns `None` for the "not specified" form (digits all `0`, or NUL
    /// fill) and for anything that is not 16 ASCII digits.
    pub fn from_bytes(bytes: &[u8; 17]) -> Option<Self> {
        let digits = &bytes[..16];
        if !digits.iter().all(u8::is_ascii_digit) || digits.iter().all(|&b| b == b'0') {
            return None;
        }

        let field = |start: usize, len: usize| -> u16 {
            digits[start..start + len]
                .iter()
                .fold(0u16, |acc, &d| acc * 10 + u16::from(d - b'0'))
        };

        Some(Self {
            year: field(0, 4),
            month: field(4, 2) as u8,
            day: field(6, 2) as u8,
            hour: field(8, 2) as u8,
            minute: field(10, 2) as u8,
            second: field(12, 2) as u8,
            hundredths: field(14, 2) as u8,
            gmt_offset: bytes[16] as i8,
        })
    }
}

impl core::fmt::Display for DateTime17 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
