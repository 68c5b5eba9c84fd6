use crate::{
    work::DEV_WORK_POOL, Account, Amount, Block, BlockDetails, BlockEnum, BlockHash, BlockSideband,
    ChangeBlock, Epoch, KeyPair,
};

pub struct LegacyChangeBlockBuilder {
    previous: Option<BlockHash>,
    representative: Option<Account>,
    key_pair: Option<KeyPair>,
    work: Option<u64>,
    build_sideband: bool,
}

impl LegacyChangeBlockBuilder {
    pub fn new() -> Self {
        Self {
            previous: None,
            representative: None,
            key_pair: None,
            work: None,
            build_sideband: false,
        }
    }

    pub fn previous(mut self, previous: BlockHash) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn representative(mut self, representative: impl Into<Account>) -> Self {
        self.representative = Some(representative.into());
        self
    }

    pub fn sign(mut self, key_pair: &KeyPair) -> Self {
        self.key_pair = Some(key_pair.clone());
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.work = Some(work);
        self
    }

    pub fn with_sideband(mut self) -> Self {
        self.build_sideband = true;
        self
    }

    pub fn build(self) -> BlockEnum {
        let key_pair = self.key_pair.unwrap_or_default();
        let previous = self.previous.unwrap_or(BlockHash::from(1));
        let representative = self.representative.unwrap_or(Account::from(2));
        let work = self
            .work
            .unwrap_or_else(|| DEV_WORK_POOL.generate_dev2(previous.into()).unwrap());

        let mut block = ChangeBlock::new(
            previous,
            representative,
            &key_pair.private_key(),
            &key_pair.public_key(),
            work,
        );

        if self.build_sideband {
            block.set_sideband(BlockSideband::new(
                key_pair.public_key().into(),
                BlockHash::zero(),
                Amount::raw(5),
                2,
                3,
                BlockDetails::new(Epoch::Epoch0, false, false, false),
                Epoch::Epoch0,
            ));
        }

        BlockEnum::LegacyChange(block)
    }
}

impl Default for LegacyChangeBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
