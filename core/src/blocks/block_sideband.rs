use anyhow::Result;
use num::FromPrimitive;

use super::{BlockDetails, BlockType};
use crate::{
    utils::{Deserialize, Serialize, Stream},
    Account, Amount, BlockHash, Epoch,
};

/// Per block metadata computed at commit time. Stored alongside the block
/// and read only afterwards, except during schema upgrades.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BlockSideband {
    pub height: u64,
    pub timestamp: u64,
    /// Successor to the current block on this chain, or zero at the head
    pub successor: BlockHash,
    pub account: Account,
    pub balance: Amount,
    pub details: BlockDetails,
    pub source_epoch: Epoch,
}

impl BlockSideband {
    pub fn new(
        account: Account,
        successor: BlockHash,
        balance: Amount,
        height: u64,
        timestamp: u64,
        details: BlockDetails,
        source_epoch: Epoch,
    ) -> Self {
        Self {
            height,
            timestamp,
            successor,
            account,
            balance,
            details,
            source_epoch,
        }
    }

    pub fn create_test_instance() -> Self {
        Self::new(
            Account::from(1),
            BlockHash::from(2),
            Amount::raw(42),
            3,
            4,
            BlockDetails::new(Epoch::Epoch1, false, true, false),
            Epoch::Epoch0,
        )
    }

    pub fn serialized_size(block_type: BlockType) -> usize {
        let mut size = BlockHash::serialized_size(); // successor

        if block_type != BlockType::State && block_type != BlockType::LegacyOpen {
            size += Account::serialized_size();
        }

        if block_type != BlockType::LegacyOpen {
            size += std::mem::size_of::<u64>(); // height
        }

        if block_type == BlockType::LegacyReceive
            || block_type == BlockType::LegacyChange
            || block_type == BlockType::LegacyOpen
        {
            size += Amount::serialized_size();
        }

        size += std::mem::size_of::<u64>(); // timestamp

        if block_type == BlockType::State {
            size += BlockDetails::serialized_size() + std::mem::size_of::<Epoch>();
        }

        size
    }

    pub fn serialize(&self, stream: &mut dyn Stream, block_type: BlockType) -> Result<()> {
        self.successor.serialize(stream)?;

        if block_type != BlockType::State && block_type != BlockType::LegacyOpen {
            self.account.serialize(stream)?;
        }

        if block_type != BlockType::LegacyOpen {
            stream.write_u64_be(self.height)?;
        }

        if block_type == BlockType::LegacyReceive
            || block_type == BlockType::LegacyChange
            || block_type == BlockType::LegacyOpen
        {
            self.balance.serialize(stream)?;
        }

        stream.write_u64_be(self.timestamp)?;

        if block_type == BlockType::State {
            self.details.serialize(stream)?;
            stream.write_u8(self.source_epoch as u8)?;
        }

        Ok(())
    }

    pub fn from_stream(stream: &mut dyn Stream, block_type: BlockType) -> Result<Self> {
        let successor = BlockHash::deserialize(stream)?;

        let account = if block_type != BlockType::State && block_type != BlockType::LegacyOpen {
            Account::deserialize(stream)?
        } else {
            Account::zero()
        };

        let height = if block_type != BlockType::LegacyOpen {
            stream.read_u64_be()?
        } else {
            1
        };

        let balance = if block_type == BlockType::LegacyReceive
            || block_type == BlockType::LegacyChange
            || block_type == BlockType::LegacyOpen
        {
            Amount::deserialize(stream)?
        } else {
            Amount::zero()
        };

        let timestamp = stream.read_u64_be()?;

        let (details, source_epoch) = if block_type == BlockType::State {
            let details = BlockDetails::deserialize(stream)?;
            let source_epoch = Epoch::from_u8(stream.read_u8()?)
                .ok_or_else(|| anyhow!("invalid source epoch"))?;
            (details, source_epoch)
        } else {
            (
                BlockDetails::new(Epoch::Epoch0, false, false, false),
                Epoch::Epoch0,
            )
        };

        Ok(Self {
            height,
            timestamp,
            successor,
            account,
            balance,
            details,
            source_epoch,
        })
    }
}
