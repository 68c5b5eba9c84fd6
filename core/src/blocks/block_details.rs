use anyhow::Result;
use num::FromPrimitive;

use crate::{epoch::Epoch, utils::Stream};

// Epoch is bit packed in BlockDetails. That's why its max is limited to 5 bits
const_assert!((Epoch::MAX as u8) < (1 << 5));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockDetails {
    pub epoch: Epoch,
    pub is_send: bool,
    pub is_receive: bool,
    pub is_epoch: bool,
}

impl BlockDetails {
    pub fn new(epoch: Epoch, is_send: bool, is_receive: bool, is_epoch: bool) -> Self {
        Self {
            epoch,
            is_send,
            is_receive,
            is_epoch,
        }
    }

    pub const fn serialized_size() -> usize {
        1
    }

    pub fn serialize(&self, stream: &mut dyn Stream) -> Result<()> {
        stream.write_u8(self.packed())
    }

    pub fn deserialize(stream: &mut dyn Stream) -> Result<BlockDetails> {
        BlockDetails::unpack(stream.read_u8()?)
    }

    pub fn packed(&self) -> u8 {
        let mut result = self.epoch as u8;
        if self.is_send {
            result |= 0b1000_0000;
        }
        if self.is_receive {
            result |= 0b0100_0000;
        }
        if self.is_epoch {
            result |= 0b0010_0000;
        }

        result
    }

    pub fn unpack(value: u8) -> Result<Self> {
        let epoch_mask = 0b0001_1111u8;
        let epoch_value = value & epoch_mask;
        let epoch = match FromPrimitive::from_u8(epoch_value) {
            Some(e) => e,
            None => return Err(anyhow!("unknown epoch value: {}", epoch_value)),
        };

        Ok(BlockDetails {
            epoch,
            is_send: (0b1000_0000 & value) != 0,
            is_receive: (0b0100_0000 & value) != 0,
            is_epoch: (0b0010_0000 & value) != 0,
        })
    }
}
