use crate::{
    work::DEV_WORK_POOL, Account, Amount, Block, BlockDetails, BlockEnum, BlockHash, BlockSideband,
    Epoch, KeyPair, Link, StateBlock,
};

pub struct StateBlockBuilder {
    account: Option<Account>,
    previous: Option<BlockHash>,
    representative: Option<Account>,
    balance: Option<Amount>,
    previous_balance: Option<Amount>,
    amount_sent: Option<Amount>,
    amount_received: Option<Amount>,
    link: Option<Link>,
    key_pair: Option<KeyPair>,
    work: Option<u64>,
    build_sideband: bool,
}

impl StateBlockBuilder {
    pub fn new() -> Self {
        Self {
            account: None,
            previous: None,
            representative: None,
            balance: None,
            previous_balance: None,
            amount_sent: None,
            amount_received: None,
            link: None,
            key_pair: None,
            work: None,
            build_sideband: false,
        }
    }

    pub fn account(mut self, account: impl Into<Account>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn previous(mut self, previous: impl Into<BlockHash>) -> Self {
        self.previous = Some(previous.into());
        self
    }

    pub fn representative(mut self, representative: impl Into<Account>) -> Self {
        self.representative = Some(representative.into());
        self
    }

    pub fn balance(mut self, balance: impl Into<Amount>) -> Self {
        self.balance = Some(balance.into());
        self
    }

    /// Together with `amount_sent` / `amount_received` computes the new
    /// balance
    pub fn previous_balance(mut self, balance: Amount) -> Self {
        self.previous_balance = Some(balance);
        self
    }

    pub fn amount_sent(mut self, amount: Amount) -> Self {
        self.amount_sent = Some(amount);
        self
    }

    pub fn amount_received(mut self, amount: Amount) -> Self {
        self.amount_received = Some(amount);
        self
    }

    pub fn link(mut self, link: impl Into<Link>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn key(self, key_pair: &KeyPair) -> Self {
        self.sign(key_pair)
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
        let account = self
            .account
            .unwrap_or_else(|| key_pair.public_key().into());
        let previous = self.previous.unwrap_or(BlockHash::from(1));
        let representative = self.representative.unwrap_or(Account::from(2));
        let balance = match self.balance {
            Some(balance) => balance,
            None => {
                let previous_balance = self.previous_balance.unwrap_or(Amount::raw(100));
                if let Some(sent) = self.amount_sent {
                    previous_balance - sent
                } else if let Some(received) = self.amount_received {
                    previous_balance + received
                } else {
                    previous_balance
                }
            }
        };
        let link = self.link.unwrap_or(Link::from(3));
        let root = if previous.is_zero() {
            account.into()
        } else {
            previous.into()
        };
        let work = self
            .work
            .unwrap_or_else(|| DEV_WORK_POOL.generate_dev2(root).unwrap());

        let mut block = StateBlock::new(
            account,
            previous,
            representative,
            balance,
            link,
            &key_pair.private_key(),
            &key_pair.public_key(),
            work,
        );

        if self.build_sideband {
            block.set_sideband(BlockSideband::new(
                account,
                BlockHash::zero(),
                balance,
                2,
                3,
                BlockDetails::new(Epoch::Epoch0, false, false, false),
                Epoch::Epoch0,
            ));
        }

        BlockEnum::State(block)
    }
}

impl Default for StateBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
