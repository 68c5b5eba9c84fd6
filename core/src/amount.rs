use crate::utils::{Deserialize, Serialize, Stream};
use anyhow::Result;
use once_cell::sync::Lazy;

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Amount {
    raw: u128, // native endian!
}

impl Amount {
    pub const MAX: Amount = Amount::raw(u128::MAX);

    pub const fn raw(value: u128) -> Self {
        Self { raw: value }
    }

    pub const fn btcnew(value: u128) -> Self {
        Self {
            raw: value * 10u128.pow(30),
        }
    }

    pub fn zero() -> Self {
        Self::raw(0)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    pub fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self {
            raw: u128::from_be_bytes(bytes),
        }
    }

    pub fn to_be_bytes(self) -> [u8; 16] {
        self.raw.to_be_bytes()
    }

    pub fn encode_hex(&self) -> String {
        format!("{:032X}", self.raw)
    }

    pub fn decode_hex(s: impl AsRef<str>) -> Result<Self> {
        let value = u128::from_str_radix(s.as_ref(), 16)?;
        Ok(Amount::raw(value))
    }

    pub fn decode_dec(s: impl AsRef<str>) -> Result<Self> {
        Ok(Self::raw(s.as_ref().parse::<u128>()?))
    }

    pub fn to_string_dec(self) -> String {
        self.raw.to_string()
    }

    pub fn number(&self) -> u128 {
        self.raw
    }

    pub fn format_balance(&self, precision: usize) -> String {
        let precision = std::cmp::min(precision, 30);
        if self.raw == 0 || self.raw >= *MBTN_RATIO / num_traits::pow(10, precision) {
            let whole = self.raw / *MBTN_RATIO;
            let decimals = self.raw % *MBTN_RATIO;
            let mut buf = num_format::Buffer::default();
            buf.write_formatted(&whole, &num_format::Locale::en);
            let mut result = buf.to_string();
            if decimals != 0 && precision > 0 {
                result.push('.');
                let decimals_string = format!("{:030}", decimals);
                let trimmed = decimals_string.trim_end_matches('0');
                let decimals_count = std::cmp::min(
                    precision,
                    trimmed[..std::cmp::min(precision, trimmed.len())].len(),
                );
                result.push_str(&decimals_string[..decimals_count]);
            }
            result
        } else if precision == 0 {
            "< 1".to_owned()
        } else {
            format!("< 0.{:0width$}", 1, width = precision)
        }
    }

    pub fn wrapping_add(&self, other: Amount) -> Amount {
        self.raw.wrapping_add(other.raw).into()
    }

    pub fn wrapping_sub(&self, other: Amount) -> Amount {
        self.raw.wrapping_sub(other.raw).into()
    }

    pub fn checked_add(&self, other: Amount) -> Option<Amount> {
        self.raw.checked_add(other.raw).map(Amount::raw)
    }

    pub fn checked_sub(&self, other: Amount) -> Option<Amount> {
        self.raw.checked_sub(other.raw).map(Amount::raw)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount::raw(value)
    }
}

impl Serialize for Amount {
    fn serialized_size() -> usize {
        std::mem::size_of::<u128>()
    }

    fn serialize(&self, stream: &mut dyn Stream) -> Result<()> {
        stream.write_bytes(&self.raw.to_be_bytes())
    }
}

impl Deserialize for Amount {
    type Target = Self;
    fn deserialize(stream: &mut dyn Stream) -> Result<Self> {
        let mut buffer = [0u8; 16];
        let len = buffer.len();
        stream.read_bytes(&mut buffer, len)?;
        Ok(Amount::raw(u128::from_be_bytes(buffer)))
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.raw += rhs.raw;
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::raw(self.raw + rhs.raw)
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount::raw(self.raw - rhs.raw)
    }
}

impl std::cmp::PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for Amount {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

pub static BTN_RATIO: Lazy<u128> = Lazy::new(|| str::parse("1000000000000000000000000").unwrap()); // 10^24
pub static KBTN_RATIO: Lazy<u128> =
    Lazy::new(|| str::parse("1000000000000000000000000000").unwrap()); // 10^27
pub static MBTN_RATIO: Lazy<u128> =
    Lazy::new(|| str::parse("1000000000000000000000000000000").unwrap()); // 10^30
pub static GBTN_RATIO: Lazy<u128> =
    Lazy::new(|| str::parse("1000000000000000000000000000000000").unwrap()); // 10^33
