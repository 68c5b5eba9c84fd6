use crate::{
    work::DEV_WORK_POOL, Account, Amount, Block, BlockDetails, BlockEnum, BlockHash, BlockSideband,
    Epoch, KeyPair, SendBlock,
};

pub struct LegacySendBlockBuilder {
    previous: Option<BlockHash>,
    destination: Option<Account>,
    balance: Option<Amount>,
    previous_balance: Option<Amount>,
    amount: Option<Amount>,
    key_pair: Option<KeyPair>,
    work: Option<u64>,
    build_sideband: bool,
}

impl LegacySendBlockBuilder {
    pub fn new() -> Self {
        Self {
            previous: None,
            destination: None,
            balance: None,
            previous_balance: None,
            amount: None,
            key_pair: None,
            work: None,
            build_sideband: false,
        }
    }

    pub fn previous(mut self, previous: BlockHash) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn destination(mut self, destination: impl Into<Account>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn balance(mut self, balance: Amount) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Together with `amount` computes the new balance
    pub fn previous_balance(mut self, balance: Amount) -> Self {
        self.previous_balance = Some(balance);
        self
    }

    pub fn amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
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
        let destination = self.destination.unwrap_or(Account::from(2));
        let balance = match self.balance {
            Some(balance) => balance,
            None => {
                let previous_balance = self.previous_balance.unwrap_or(Amount::raw(100));
                previous_balance - self.amount.unwrap_or(Amount::raw(1))
            }
        };
        let work = self
            .work
            .unwrap_or_else(|| DEV_WORK_POOL.generate_dev2(previous.into()).unwrap());

        let mut block = SendBlock::new(
            previous,
            destination,
            balance,
            &key_pair.private_key(),
            &key_pair.public_key(),
            work,
        );

        if self.build_sideband {
            block.set_sideband(BlockSideband::new(
                key_pair.public_key().into(),
                BlockHash::zero(),
                balance,
                2,
                3,
                BlockDetails::new(Epoch::Epoch0, true, false, false),
                Epoch::Epoch0,
            ));
        }

        BlockEnum::LegacySend(block)
    }
}

impl Default for LegacySendBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
