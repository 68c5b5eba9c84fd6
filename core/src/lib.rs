#[macro_use]
extern crate anyhow;

#[macro_use]
extern crate static_assertions;

#[macro_use]
extern crate num_derive;

macro_rules! u256_struct {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name {
            inner: [u8; 32],
        }

        #[allow(dead_code)]
        impl $name {
            pub fn zero() -> Self {
                Self { inner: [0; 32] }
            }

            pub fn is_zero(&self) -> bool {
                self.inner == [0; 32]
            }

            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self { inner: bytes }
            }

            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                match bytes.try_into() {
                    Ok(value) => Some(Self { inner: value }),
                    Err(_) => None,
                }
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.inner
            }

            pub fn number(&self) -> primitive_types::U256 {
                primitive_types::U256::from_big_endian(&self.inner)
            }

            /// The next id in byte order, or None at the end of the key space
            pub fn inc(&self) -> Option<Self> {
                let mut bytes = self.inner;
                for byte in bytes.iter_mut().rev() {
                    let (value, overflow) = byte.overflowing_add(1);
                    *byte = value;
                    if !overflow {
                        return Some(Self::from_bytes(bytes));
                    }
                }
                None
            }

            pub fn encode_hex(&self) -> String {
                use std::fmt::Write;
                let mut result = String::with_capacity(64);
                for byte in self.inner {
                    write!(&mut result, "{:02X}", byte).unwrap();
                }
                result
            }

            pub fn decode_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
                let s = s.as_ref();
                if s.is_empty() || s.len() > 64 {
                    bail!("invalid length");
                }
                let mut padded = String::with_capacity(64);
                for _ in s.len()..64 {
                    padded.push('0');
                }
                padded.push_str(s);
                let bytes = hex::decode(padded)?;
                Self::from_slice(&bytes).ok_or_else(|| anyhow!("invalid hex"))
            }

            pub const fn serialized_size() -> usize {
                32
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                let mut bytes = [0u8; 32];
                bytes[24..].copy_from_slice(&value.to_be_bytes());
                Self { inner: bytes }
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.encode_hex())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.encode_hex())
            }
        }

        impl crate::utils::Serialize for $name {
            fn serialized_size() -> usize {
                32
            }

            fn serialize(&self, stream: &mut dyn crate::utils::Stream) -> anyhow::Result<()> {
                stream.write_bytes(&self.inner)
            }
        }

        impl crate::utils::Deserialize for $name {
            type Target = Self;

            fn deserialize(stream: &mut dyn crate::utils::Stream) -> anyhow::Result<Self> {
                let mut bytes = [0u8; 32];
                stream.read_bytes(&mut bytes, 32)?;
                Ok(Self { inner: bytes })
            }
        }
    };
}

mod account;
pub use account::{Account, PublicKey};

mod amount;
pub use amount::{Amount, BTN_RATIO, GBTN_RATIO, KBTN_RATIO, MBTN_RATIO};

mod block_hash;
pub use block_hash::{BlockHash, BlockHashBuilder, HashOrAccount};

mod link;
pub use link::Link;

mod root;
pub use root::{QualifiedRoot, Root};

mod signature;
pub use signature::Signature;

mod key_pair;
pub use key_pair::{sign_message, validate_message, KeyPair, RawKey};

mod epoch;
pub use epoch::{Epoch, EpochInfo, Epochs};

mod account_info;
pub use account_info::AccountInfo;

mod pending_key;
pub use pending_key::PendingKey;

mod pending_info;
pub use pending_info::PendingInfo;

mod confirmation_height_info;
pub use confirmation_height_info::ConfirmationHeightInfo;

mod endpoint_key;
pub use endpoint_key::EndpointKey;

mod unchecked_info;
pub use unchecked_info::{SignatureVerification, UncheckedInfo, UncheckedKey};

mod vote;
pub use vote::Vote;

mod blocks;
pub use blocks::*;

pub mod utils;
pub mod work;
