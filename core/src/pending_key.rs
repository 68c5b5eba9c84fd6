use crate::{
    utils::{Deserialize, Serialize, Stream},
    Account, BlockHash,
};

/// Key of the receivable table: the receiving account and the hash of the
/// send block that is waiting to be received. Ordered by byte
/// representation, values never participate in the ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PendingKey {
    pub account: Account,
    pub hash: BlockHash,
}

impl PendingKey {
    pub fn new(account: Account, hash: BlockHash) -> Self {
        Self { account, hash }
    }

    pub fn for_send_block(destination: Account, send_hash: BlockHash) -> Self {
        Self::new(destination, send_hash)
    }

    pub fn create_test_instance() -> Self {
        Self::new(Account::from(1), BlockHash::from(2))
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut result = [0; 64];
        result[..32].copy_from_slice(self.account.as_bytes());
        result[32..].copy_from_slice(self.hash.as_bytes());
        result
    }

    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        let account = Account::from_slice(&bytes[..32]).unwrap();
        let hash = BlockHash::from_slice(&bytes[32..]).unwrap();
        Self { account, hash }
    }
}

impl Serialize for PendingKey {
    fn serialized_size() -> usize {
        Account::serialized_size() + BlockHash::serialized_size()
    }

    fn serialize(&self, stream: &mut dyn Stream) -> anyhow::Result<()> {
        self.account.serialize(stream)?;
        self.hash.serialize(stream)
    }
}

impl Deserialize for PendingKey {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let account = Account::deserialize(stream)?;
        let hash = BlockHash::deserialize(stream)?;
        Ok(Self { account, hash })
    }
}
