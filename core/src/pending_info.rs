use crate::{
    utils::{Deserialize, Serialize, Stream},
    Account, Amount, Epoch,
};
use num::FromPrimitive;

/// A send that has been committed but not yet received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInfo {
    pub source: Account,
    pub amount: Amount,
    pub epoch: Epoch,
}

impl Default for PendingInfo {
    fn default() -> Self {
        Self {
            source: Account::zero(),
            amount: Amount::zero(),
            epoch: Epoch::Epoch0,
        }
    }
}

impl PendingInfo {
    pub fn new(source: Account, amount: Amount, epoch: Epoch) -> Self {
        Self {
            source,
            amount,
            epoch,
        }
    }

    pub fn create_test_instance() -> Self {
        Self::new(Account::from(3), Amount::raw(4), Epoch::Epoch1)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut stream = crate::utils::MemoryStream::new();
        self.serialize(&mut stream).unwrap();
        stream.to_vec()
    }
}

impl Serialize for PendingInfo {
    fn serialized_size() -> usize {
        Account::serialized_size() + Amount::serialized_size() + std::mem::size_of::<Epoch>()
    }

    fn serialize(&self, stream: &mut dyn Stream) -> anyhow::Result<()> {
        self.source.serialize(stream)?;
        self.amount.serialize(stream)?;
        stream.write_u8(self.epoch as u8)
    }
}

impl Deserialize for PendingInfo {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        Ok(Self {
            source: Account::deserialize(stream)?,
            amount: Amount::deserialize(stream)?,
            epoch: Epoch::from_u8(stream.read_u8()?).ok_or_else(|| anyhow!("invalid epoch"))?,
        })
    }
}
