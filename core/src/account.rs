u256_struct!(PublicKey);
u256_struct!(Account);

impl Account {
    pub fn decode_account(source: impl AsRef<str>) -> anyhow::Result<Account> {
        Self::decode_hex(source)
    }

    pub fn encode_account(&self) -> String {
        self.encode_hex()
    }
}

impl From<PublicKey> for Account {
    fn from(key: PublicKey) -> Self {
        Account::from_bytes(*key.as_bytes())
    }
}

impl From<&PublicKey> for Account {
    fn from(key: &PublicKey) -> Self {
        Account::from_bytes(*key.as_bytes())
    }
}

impl From<Account> for PublicKey {
    fn from(account: Account) -> Self {
        PublicKey::from_bytes(*account.as_bytes())
    }
}

impl From<&Account> for PublicKey {
    fn from(account: &Account) -> Self {
        PublicKey::from_bytes(*account.as_bytes())
    }
}
