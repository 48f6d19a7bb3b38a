//! Core types shared across the extraction pipeline

use std::fmt;

use crate::error::Error;

/// Frame rate code carried in the low nibble of an OFMD header and in the
/// high nibble of an OFS frame-rate byte.
///
/// Codes 0, 5 and anything above 7 are not defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "u8", try_from = "u8")
)]
#[repr(u8)]
pub enum FrameRate {
    /// 23.976 fps (24000/1001)
    Fps23_976 = 1,
    /// 24 fps
    Fps24 = 2,
    /// 25 fps
    Fps25 = 3,
    /// 29.97 fps (30000/1001), the only rate with a drop-frame timecode
    Fps29_97 = 4,
    /// 50 fps
    Fps50 = 6,
    /// 59.94 fps (60000/1001)
    Fps59_94 = 7,
}

impl FrameRate {
    /// All defined frame rates, in code order.
    pub const ALL: [FrameRate; 6] = [
        FrameRate::Fps23_976,
        FrameRate::Fps24,
        FrameRate::Fps25,
        FrameRate::Fps29_97,
        FrameRate::Fps50,
        FrameRate::Fps59_94,
    ];

    /// Numeric code as stored in the bitstream.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a frame rate by its 4-bit code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(FrameRate::Fps23_976),
            2 => Some(FrameRate::Fps24),
            3 => Some(FrameRate::Fps25),
            4 => Some(FrameRate::Fps29_97),
            6 => Some(FrameRate::Fps50),
            7 => Some(FrameRate::Fps59_94),
            _ => None,
        }
    }

    /// Whether a drop-frame timecode makes sense at this rate.
    pub fn supports_drop_frame(self) -> bool {
        self == FrameRate::Fps29_97
    }

    /// Human-readable frames-per-second value.
    pub fn name(self) -> &'static str {
        match self {
            FrameRate::Fps23_976 => "23.976",
            FrameRate::Fps24 => "24",
            FrameRate::Fps25 => "25",
            FrameRate::Fps29_97 => "29.97",
            FrameRate::Fps50 => "50",
            FrameRate::Fps59_94 => "59.94",
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<FrameRate> for u8 {
    fn from(rate: FrameRate) -> Self {
        rate.code()
    }
}

impl TryFrom<u8> for FrameRate {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        FrameRate::from_code(code).ok_or_else(|| {
            Error::invalid_record(format!(
                "frame rate code {} is not one of 1, 2, 3, 4, 6, 7",
                code
            ))
        })
    }
}
