use crate::{
    work::DEV_WORK_POOL, Account, Amount, Block, BlockDetails, BlockEnum, BlockHash, BlockSideband,
    Epoch, KeyPair, OpenBlock,
};

pub struct LegacyOpenBlockBuilder {
    source: Option<BlockHash>,
    representative: Option<Account>,
    account: Option<Account>,
    key_pair: Option<KeyPair>,
    work: Option<u64>,
    build_sideband: bool,
}

impl LegacyOpenBlockBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            representative: None,
            account: None,
            key_pair: None,
            work: None,
            build_sideband: false,
        }
    }

    pub fn source(mut self, source: BlockHash) -> Self {
        self.source = Some(source);
        self
    }

    pub fn representative(mut self, representative: impl Into<Account>) -> Self {
        self.representative = Some(representative.into());
        self
    }

    pub fn account(mut self, account: impl Into<Account>) -> Self {
        self.account = Some(account.into());
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
        let source = self.source.unwrap_or(BlockHash::from(1));
        let representative = self.representative.unwrap_or(Account::from(2));
        let account = self
            .account
            .unwrap_or_else(|| key_pair.public_key().into());
        let work = self
            .work
            .unwrap_or_else(|| DEV_WORK_POOL.generate_dev2(account.into()).unwrap());

        let mut block = OpenBlock::new(
            source,
            representative,
            account,
            &key_pair.private_key(),
            &key_pair.public_key(),
            work,
        );

        if self.build_sideband {
            block.set_sideband(BlockSideband::new(
                block.account(),
                BlockHash::zero(),
                Amount::raw(5),
                1,
                2,
                BlockDetails::new(Epoch::Epoch0, false, true, false),
                Epoch::Epoch0,
            ));
        }

        BlockEnum::LegacyOpen(block)
    }
}

impl Default for LegacyOpenBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
