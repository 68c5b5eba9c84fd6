use crate::{
    sign_message, validate_message,
    utils::{Deserialize, Serialize, Stream},
    Account, BlockHash, BlockHashBuilder, RawKey, Signature,
};

/// A sequenced vote for a set of block hashes, signed by the voting account
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vote {
    pub voting_account: Account,
    pub signature: Signature,
    pub sequence: u64,
    pub hashes: Vec<BlockHash>,
}

impl Vote {
    pub fn new(
        account: Account,
        prv: &RawKey,
        sequence: u64,
        hashes: Vec<BlockHash>,
    ) -> Self {
        let mut result = Self {
            voting_account: account,
            signature: Signature::new(),
            sequence,
            hashes,
        };
        result.signature = sign_message(prv, &account.into(), result.hash().as_bytes());
        result
    }

    /// The digest that gets signed: a domain prefix, the voted hashes and
    /// the sequence number
    pub fn hash(&self) -> BlockHash {
        let mut builder = BlockHashBuilder::new().update(b"vote ");
        for hash in &self.hashes {
            builder = builder.update(hash.as_bytes());
        }
        builder.update(self.sequence.to_be_bytes()).build()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_message(
            &self.voting_account.into(),
            self.hash().as_bytes(),
            &self.signature,
        )
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut stream = crate::utils::MemoryStream::new();
        self.serialize(&mut stream).unwrap();
        stream.to_vec()
    }

    /// Votes are stored without a length field; hashes run until the end of
    /// the record
    pub fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let voting_account = Account::deserialize(stream)?;
        let signature = Signature::deserialize(stream)?;
        let sequence = stream.read_u64_be()?;
        let mut hashes = Vec::new();
        while stream.bytes_left() >= BlockHash::serialized_size() {
            hashes.push(BlockHash::deserialize(stream)?);
        }
        Ok(Self {
            voting_account,
            signature,
            sequence,
            hashes,
        })
    }
}

impl Serialize for Vote {
    fn serialized_size() -> usize {
        unimplemented!("vote records are variable length")
    }

    fn serialize(&self, stream: &mut dyn Stream) -> anyhow::Result<()> {
        self.voting_account.serialize(stream)?;
        self.signature.serialize(stream)?;
        stream.write_u64_be(self.sequence)?;
        for hash in &self.hashes {
            hash.serialize(stream)?;
        }
        Ok(())
    }
}
