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
pub struct SendHashables {
    pub previous: BlockHash,
    pub destination: Account,
    pub balance: Amount,
}

impl SendHashables {
    fn serialized_size() -> usize {
        BlockHash::serialized_size() + Account::serialized_size() + Amount::serialized_size()
    }
}

impl From<&SendHashables> for BlockHash {
    fn from(hashables: &SendHashables) -> Self {
        BlockHashBuilder::new()
            .update(hashables.previous.as_bytes())
            .update(hashables.destination.as_bytes())
            .update(hashables.balance.to_be_bytes())
            .build()
    }
}

#[derive(Clone, Debug)]
pub struct SendBlock {
    pub work: u64,
    pub signature: Signature,
    pub hashables: SendHashables,
    pub hash: LazyBlockHash,
    pub sideband: Option<BlockSideband>,
}

impl SendBlock {
    pub fn new(
        previous: BlockHash,
        destination: Account,
        balance: Amount,
        priv_key: &RawKey,
        pub_key: &PublicKey,
        work: u64,
    ) -> Self {
        let hashables = SendHashables {
            previous,
            destination,
            balance,
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

    // Send blocks always have a destination
    pub fn mandatory_destination(&self) -> Account {
        self.hashables.destination
    }

    pub fn serialized_size() -> usize {
        SendHashables::serialized_size()
            + Signature::serialized_size()
            + std::mem::size_of::<u64>()
    }

    pub fn deserialize_json(reader: &impl PropertyTreeReader) -> Result<Self> {
        let previous = BlockHash::decode_hex(reader.get_string("previous")?)?;
        let destination = Account::decode_account(reader.get_string("destination")?)?;
        let balance = Amount::decode_hex(reader.get_string("balance")?)?;
        let signature = Signature::decode_hex(reader.get_string("signature")?)?;
        let work = u64_from_hex_str(reader.get_string("work")?)?;
        Ok(Self {
            work,
            signature,
            hashables: SendHashables {
                previous,
                destination,
                balance,
            },
            hash: LazyBlockHash::new(),
            sideband: None,
        })
    }

    pub fn deserialize(stream: &mut dyn Stream) -> Result<Self> {
        let previous = BlockHash::deserialize(stream)?;
        let destination = Account::deserialize(stream)?;
        let balance = Amount::deserialize(stream)?;
        let signature = Signature::deserialize(stream)?;
        let mut work_bytes = [0u8; 8];
        stream.read_bytes(&mut work_bytes, 8)?;
        let work = u64::from_be_bytes(work_bytes);
        Ok(Self {
            work,
            signature,
            hashables: SendHashables {
                previous,
                destination,
                balance,
            },
            hash: LazyBlockHash::new(),
            sideband: None,
        })
    }
}

pub fn valid_send_block_predecessor(predecessor: BlockType) -> bool {
    matches!(
        predecessor,
        BlockType::LegacySend
            | BlockType::LegacyReceive
            | BlockType::LegacyOpen
            | BlockType::LegacyChange
    )
}

impl PartialEq for SendBlock {
    fn eq(&self, other: &Self) -> bool {
        self.work == other.work
            && self.signature == other.signature
            && self.hashables == other.hashables
    }
}

impl Eq for SendBlock {}

impl Block for SendBlock {
    fn sideband(&'_ self) -> Option<&'_ BlockSideband> {
        self.sideband.as_ref()
    }

    fn set_sideband(&mut self, sideband: BlockSideband) {
        self.sideband = Some(sideband)
    }

    fn block_type(&self) -> BlockType {
        BlockType::LegacySend
    }

    fn account(&self) -> Account {
        Account::zero()
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
        self.hashables.previous
    }

    fn serialize(&self, stream: &mut dyn Stream) -> Result<()> {
        self.hashables.previous.serialize(stream)?;
        self.hashables.destination.serialize(stream)?;
        self.hashables.balance.serialize(stream)?;
        self.signature.serialize(stream)?;
        stream.write_bytes(&self.work.to_be_bytes())?;
        Ok(())
    }

    fn serialize_json(&self, writer: &mut dyn PropertyTreeWriter) -> Result<()> {
        writer.put_string("type", "send")?;
        writer.put_string("previous", &self.hashables.previous.encode_hex())?;
        writer.put_string("destination", &self.hashables.destination.encode_account())?;
        writer.put_string("balance", &self.hashables.balance.encode_hex())?;
        writer.put_string("work", &to_hex_string(self.work))?;
        writer.put_string("signature", &self.signature.encode_hex())?;
        Ok(())
    }

    fn root(&self) -> Root {
        self.previous().into()
    }

    fn visit(&self, visitor: &mut dyn BlockVisitor) {
        visitor.send_block(self);
    }

    fn balance(&self) -> Amount {
        self.hashables.balance
    }

    fn source(&self) -> Option<BlockHash> {
        None
    }

    fn representative(&self) -> Option<Account> {
        None
    }

    fn visit_mut(&mut self, visitor: &mut dyn super::MutableBlockVisitor) {
        visitor.send_block(self)
    }

    fn valid_predecessor(&self, block_type: BlockType) -> bool {
        valid_send_block_predecessor(block_type)
    }

    fn destination(&self) -> Option<Account> {
        Some(self.hashables.destination)
    }
}
