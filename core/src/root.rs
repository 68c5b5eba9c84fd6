use crate::{
    utils::{Deserialize, Serialize, Stream},
    Account, BlockHash, HashOrAccount,
};

u256_struct!(Root);

impl From<Account> for Root {
    fn from(account: Account) -> Self {
        Root::from_bytes(*account.as_bytes())
    }
}

impl From<&Account> for Root {
    fn from(account: &Account) -> Self {
        Root::from_bytes(*account.as_bytes())
    }
}

impl From<BlockHash> for Root {
    fn from(hash: BlockHash) -> Self {
        Root::from_bytes(*hash.as_bytes())
    }
}

impl From<HashOrAccount> for Root {
    fn from(source: HashOrAccount) -> Self {
        Root::from_bytes(*source.as_bytes())
    }
}

impl From<Root> for Account {
    fn from(root: Root) -> Self {
        Account::from_bytes(*root.as_bytes())
    }
}

impl From<Root> for BlockHash {
    fn from(root: Root) -> Self {
        BlockHash::from_bytes(*root.as_bytes())
    }
}

/// A root and the previous hash it was computed against. Uniquely
/// identifies the slot a block competes for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct QualifiedRoot {
    pub root: Root,
    pub previous: BlockHash,
}

impl QualifiedRoot {
    pub fn new(root: Root, previous: BlockHash) -> Self {
        Self { root, previous }
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut result = [0; 64];
        result[..32].copy_from_slice(self.root.as_bytes());
        result[32..].copy_from_slice(self.previous.as_bytes());
        result
    }

    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        let root = Root::from_slice(&bytes[..32]).unwrap();
        let previous = BlockHash::from_slice(&bytes[32..]).unwrap();
        Self { root, previous }
    }
}

impl Serialize for QualifiedRoot {
    fn serialized_size() -> usize {
        Root::serialized_size() + BlockHash::serialized_size()
    }

    fn serialize(&self, stream: &mut dyn Stream) -> anyhow::Result<()> {
        self.root.serialize(stream)?;
        self.previous.serialize(stream)
    }
}

impl Deserialize for QualifiedRoot {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let root = Root::deserialize(stream)?;
        let previous = BlockHash::deserialize(stream)?;
        Ok(QualifiedRoot { root, previous })
    }
}
