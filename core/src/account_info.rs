use crate::{
    utils::{Deserialize, Serialize, Stream},
    Account, Amount, BlockHash, Epoch,
};
use num::FromPrimitive;

/// Latest information about an account
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AccountInfo {
    pub head: BlockHash,
    pub representative: Account,
    pub open_block: BlockHash,
    pub balance: Amount,
    /// Seconds since posix epoch
    pub modified: u64,
    pub block_count: u64,
    pub epoch: Epoch,
}

impl Default for AccountInfo {
    fn default() -> Self {
        Self {
            head: BlockHash::zero(),
            representative: Account::zero(),
            open_block: BlockHash::zero(),
            balance: Amount::zero(),
            modified: 0,
            block_count: 0,
            epoch: Epoch::Epoch0,
        }
    }
}

impl AccountInfo {
    pub fn create_test_instance() -> Self {
        Self {
            head: BlockHash::from(1),
            representative: Account::from(2),
            open_block: BlockHash::from(3),
            balance: Amount::raw(42),
            modified: 4,
            block_count: 5,
            epoch: Epoch::Epoch2,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut stream = crate::utils::MemoryStream::new();
        self.serialize(&mut stream).unwrap();
        stream.to_vec()
    }
}

impl Serialize for AccountInfo {
    fn serialized_size() -> usize {
        BlockHash::serialized_size() // head
            + Account::serialized_size() // representative
            + BlockHash::serialized_size() // open_block
            + Amount::serialized_size() // balance
            + std::mem::size_of::<u64>() // modified
            + std::mem::size_of::<u64>() // block_count
            + std::mem::size_of::<Epoch>()
    }

    fn serialize(&self, stream: &mut dyn Stream) -> anyhow::Result<()> {
        self.head.serialize(stream)?;
        self.representative.serialize(stream)?;
        self.open_block.serialize(stream)?;
        self.balance.serialize(stream)?;
        stream.write_u64_be(self.modified)?;
        stream.write_u64_be(self.block_count)?;
        stream.write_u8(self.epoch as u8)
    }
}

impl Deserialize for AccountInfo {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        Ok(Self {
            head: BlockHash::deserialize(stream)?,
            representative: Account::deserialize(stream)?,
            open_block: BlockHash::deserialize(stream)?,
            balance: Amount::deserialize(stream)?,
            modified: stream.read_u64_be()?,
            block_count: stream.read_u64_be()?,
            epoch: Epoch::from_u8(stream.read_u8()?).ok_or_else(|| anyhow!("invalid epoch"))?,
        })
    }
}
