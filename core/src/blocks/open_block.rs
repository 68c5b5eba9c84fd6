use crate::{
    sign_message,
    utils::{
        to_hex_string, u64_from_hex_str, Deserialize, PropertyTreeReader, PropertyTreeWriter,
        Serialize, Stream,
    },
    Account, Amount, BlockHash, BlockHashBuilder, Link, PublicKey, RawKey, Root, Signature,
};
use anyhow::Result;

use super::{Block, BlockSideband, BlockType, BlockVisitor, LazyBlockHash};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OpenHashables {
    /// Block with first send transaction to this account
    pub source: BlockHash,
    pub representative: Account,
    pub account: Account,
}

impl OpenHashables {
    fn serialized_size() -> usize {
        BlockHash::serialized_size() + Account::serialized_size() + Account::serialized_size()
    }
}

impl From<&OpenHashables> for BlockHash {
    fn from(hashables: &OpenHashables) -> Self {
        BlockHashBuilder::new()
            .update(hashables.source.as_bytes())
            .update(hashables.representative.as_bytes())
            .update(hashables.account.as_bytes())
            .build()
    }
}

#[derive(Clone, Debug)]
pub struct OpenBlock {
    pub work: u64,
    pub signature: Signature,
    pub hashables: OpenHashables,
    pub hash: LazyBlockHash,
    pub sideband: Option<BlockSideband>,
}

impl OpenBlock {
    pub fn new(
        source: BlockHash,
        representative: Account,
        account: Account,
        priv_key: &RawKey,
        pub_key: &PublicKey,
        work: u64,
    ) -> Self {
        let hashables = OpenHashables {
            source,
            representative,
            account,
        };
        let hash = LazyBlockHash::new();
        let signature = sign_message(priv_key, pub_key, hash.hash(&hashables).as_bytes());

        Self {
            work,
            signature,
            hashables,
            hash,
            sideband: None,
        }
    }

    // Open blocks always have a source
    pub fn mandatory_source(&self) -> BlockHash {
        self.hashables.source
    }

    // Open blocks always have a representative
    pub fn mandatory_representative(&self) -> Account {
        self.hashables.representative
    }

    pub fn serialized_size() -> usize {
        OpenHashables::serialized_size()
            + Signature::serialized_size()
            + std::mem::size_of::<u64>()
    }

    pub fn deserialize_json(reader: &impl PropertyTreeReader) -> Result<Self> {
        let source = BlockHash::decode_hex(reader.get_string("source")?)?;
        let representative = Account::decode_account(reader.get_string("representative")?)?;
        let account = Account::decode_account(reader.get_string("account")?)?;
        let signature = Signature::decode_hex(reader.get_string("signature")?)?;
        let work = u64_from_hex_str(reader.get_string("work")?)?;
        Ok(Self {
            work,
            signature,
            hashables: OpenHashables {
                source,
                representative,
                account,
            },
            hash: LazyBlockHash::new(),
            sideband: None,
        })
    }

    pub fn deserialize(stream: &mut dyn Stream) -> Result<Self> {
        let source = BlockHash::deserialize(stream)?;
        let representative = Account::deserialize(stream)?;
        let account = Account::deserialize(stream)?;
        let signature = Signature::deserialize(stream)?;
        let mut work_bytes = [0u8; 8];
        stream.read_bytes(&mut work_bytes, 8)?;
        let work = u64::from_be_bytes(work_bytes);
        Ok(Self {
            work,
            signature,
            hashables: OpenHashables {
                source,
                representative,
                account,
            },
            hash: LazyBlockHash::new(),
            sideband: None,
        })
    }
}

impl PartialEq for OpenBlock {
    fn eq(&self, other: &Self) -> bool {
        self.work == other.work
            && self.signature == other.signature
            && self.hashables == other.hashables
    }
}

impl Eq for OpenBlock {}

impl Block for OpenBlock {
    fn sideband(&'_ self) -> Option<&'_ BlockSideband> {
        self.sideband.as_ref()
    }

    fn set_sideband(&mut self, sideband: BlockSideband) {
        self.sideband = Some(sideband)
    }

    fn block_type(&self) -> BlockType {
        BlockType::LegacyOpen
    }

    fn account(&self) -> Account {
        self.hashables.account
    }

    fn hash(&self) -> BlockHash {
        self.hash.hash(&self.hashables)
    }

    fn link(&self) -> Link {
        Link::zero()
    }

    fn block_signature(&self) -> &Signature {
        &self.signature
    }

    fn set_block_signature(&mut self, signature: &Signature) {
        self.signature = signature.clone();
    }

    fn set_work(&mut self, work: u64) {
        self.work = work;
    }

    fn work(&self) -> u64 {
        self.work
    }

    fn previous(&self) -> BlockHash {
        BlockHash::zero()
    }

    fn serialize(&self, stream: &mut dyn Stream) -> Result<()> {
        self.hashables.source.serialize(stream)?;
        self.hashables.representative.serialize(stream)?;
        self.hashables.account.serialize(stream)?;
        self.signature.serialize(stream)?;
        stream.write_bytes(&self.work.to_be_bytes())?;
        Ok(())
    }

    fn serialize_json(&self, writer: &mut dyn PropertyTreeWriter) -> Result<()> {
        writer.put_string("type", "open")?;
        writer.put_string("source", &self.hashables.source.encode_hex())?;
        writer.put_string(
            "representative",
            &self.hashables.representative.encode_account(),
        )?;
        writer.put_string("account", &self.hashables.account.encode_account())?;
        writer.put_string("work", &to_hex_string(self.work))?;
        writer.put_string("signature", &self.signature.encode_hex())?;
        Ok(())
    }

    fn root(&self) -> Root {
        self.account().into()
    }

    fn visit(&self, visitor: &mut dyn BlockVisitor) {
        visitor.open_block(self);
    }

    fn balance(&self) -> Amount {
        Amount::zero()
    }

    fn source(&self) -> Option<BlockHash> {
        Some(self.hashables.source)
    }

    fn representative(&self) -> Option<Account> {
        Some(self.hashables.representative)
    }

    fn visit_mut(&mut self, visitor: &mut dyn super::MutableBlockVisitor) {
        visitor.open_block(self)
    }

    fn valid_predecessor(&self, _block_type: BlockType) -> bool {
        false
    }

    fn destination(&self) -> Option<Account> {
        None
    }
}
