use crate::{
    deserialize_block_enum, serialize_block_enum,
    utils::{seconds_since_epoch, Deserialize, Serialize, Stream},
    BlockEnum, BlockHash,
};
use num::FromPrimitive;

/// Tracks how far a block's signature check has progressed before it
/// reaches the ledger
#[repr(u8)]
#[derive(PartialEq, Eq, Debug, Clone, Copy, FromPrimitive)]
pub enum SignatureVerification {
    Unknown = 0,
    Invalid = 1,
    Valid = 2,
    ValidEpoch = 3,
}

/// Key of the unchecked table: the hash the buffered block is waiting for
/// and the hash of the block itself
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UncheckedKey {
    pub previous: BlockHash,
    pub hash: BlockHash,
}

impl UncheckedKey {
    pub fn new(previous: BlockHash, hash: BlockHash) -> Self {
        Self { previous, hash }
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut result = [0; 64];
        result[..32].copy_from_slice(self.previous.as_bytes());
        result[32..].copy_from_slice(self.hash.as_bytes());
        result
    }

    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        let previous = BlockHash::from_slice(&bytes[..32]).unwrap();
        let hash = BlockHash::from_slice(&bytes[32..]).unwrap();
        Self { previous, hash }
    }
}

impl Serialize for UncheckedKey {
    fn serialized_size() -> usize {
        BlockHash::serialized_size() * 2
    }

    fn serialize(&self, stream: &mut dyn Stream) -> anyhow::Result<()> {
        self.previous.serialize(stream)?;
        self.hash.serialize(stream)
    }
}

impl Deserialize for UncheckedKey {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let previous = BlockHash::deserialize(stream)?;
        let hash = BlockHash::deserialize(stream)?;
        Ok(Self { previous, hash })
    }
}

/// A block buffered while one of its dependencies is missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncheckedInfo {
    pub block: BlockEnum,
    /// Seconds since posix epoch when the block arrived
    pub modified: u64,
    pub verified: SignatureVerification,
}

impl UncheckedInfo {
    pub fn new(block: BlockEnum) -> Self {
        Self {
            block,
            modified: seconds_since_epoch(),
            verified: SignatureVerification::Unknown,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut stream = crate::utils::MemoryStream::new();
        self.serialize(&mut stream).unwrap();
        stream.to_vec()
    }
}

impl Serialize for UncheckedInfo {
    fn serialized_size() -> usize {
        unimplemented!("unchecked records are variable length")
    }

    fn serialize(&self, stream: &mut dyn Stream) -> anyhow::Result<()> {
        serialize_block_enum(stream, &self.block)?;
        stream.write_u64_be(self.modified)?;
        stream.write_u8(self.verified as u8)
    }
}

impl Deserialize for UncheckedInfo {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let block = deserialize_block_enum(stream)?;
        let modified = stream.read_u64_be()?;
        let verified = SignatureVerification::from_u8(stream.read_u8()?)
            .ok_or_else(|| anyhow!("invalid verification status"))?;
        Ok(Self {
            block,
            modified,
            verified,
        })
    }
}
