use crate::{
    utils::{Deserialize, Serialize, Stream},
    BlockHash,
};

/// How far an account chain has been confirmed, together with the hash of
/// the last confirmed block. Monotonically non-decreasing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfirmationHeightInfo {
    pub height: u64,
    pub frontier: BlockHash,
}

impl ConfirmationHeightInfo {
    pub fn new(height: u64, frontier: BlockHash) -> Self {
        Self { height, frontier }
    }

    pub fn create_test_instance() -> Self {
        Self::new(42, BlockHash::from(7))
    }

    pub fn to_bytes(&self) -> [u8; 40] {
        let mut result = [0; 40];
        result[..8].copy_from_slice(&self.height.to_be_bytes());
        result[8..].copy_from_slice(self.frontier.as_bytes());
        result
    }
}

impl Serialize for ConfirmationHeightInfo {
    fn serialized_size() -> usize {
        std::mem::size_of::<u64>() + BlockHash::serialized_size()
    }

    fn serialize(&self, stream: &mut dyn Stream) -> anyhow::Result<()> {
        stream.write_u64_be(self.height)?;
        self.frontier.serialize(stream)
    }
}

impl Deserialize for ConfirmationHeightInfo {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let height = stream.read_u64_be()?;
        let frontier = BlockHash::deserialize(stream)?;
        Ok(Self { height, frontier })
    }
}
