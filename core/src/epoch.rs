use crate::{Account, Link, PublicKey};
use std::collections::BTreeMap;

/// Protocol version of an account chain. Epochs advance only through
/// signed epoch blocks and never go backwards outside of rollback.
#[repr(u8)]
#[derive(PartialEq, Eq, Debug, Clone, Copy, FromPrimitive, Hash, PartialOrd, Ord)]
pub enum Epoch {
    Invalid = 0,
    Unspecified = 1,
    Epoch0 = 2,
    Epoch1 = 3,
    Epoch2 = 4,
}

impl Epoch {
    pub const EPOCH_BEGIN: Epoch = Epoch::Epoch0;
    pub const MAX: Epoch = Epoch::Epoch2;

    pub fn epoch_number(&self) -> u8 {
        if *self == Epoch::Invalid || *self < Epoch::EPOCH_BEGIN {
            return 0;
        }
        *self as u8 - Epoch::EPOCH_BEGIN as u8
    }
}

impl Default for Epoch {
    fn default() -> Self {
        Epoch::Epoch0
    }
}

#[derive(Clone)]
pub struct EpochInfo {
    pub signer: PublicKey,
    pub link: Link,
}

/// Registry of the epochs a network recognizes, with the link value that
/// marks an epoch block and the authority allowed to sign it
#[derive(Default, Clone)]
pub struct Epochs {
    epochs: BTreeMap<Epoch, EpochInfo>,
}

impl Epochs {
    pub fn new() -> Self {
        Self {
            epochs: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, epoch: Epoch, signer: PublicKey, link: Link) {
        self.epochs.insert(epoch, EpochInfo { signer, link });
    }

    pub fn is_epoch_link(&self, link: &Link) -> bool {
        self.epochs.values().any(|info| &info.link == link)
    }

    pub fn link(&self, epoch: Epoch) -> Option<&Link> {
        self.epochs.get(&epoch).map(|info| &info.link)
    }

    pub fn signer(&self, epoch: Epoch) -> Option<&PublicKey> {
        self.epochs.get(&epoch).map(|info| &info.signer)
    }

    pub fn epoch(&self, link: &Link) -> Option<Epoch> {
        for (epoch, info) in &self.epochs {
            if &info.link == link {
                return Some(*epoch);
            }
        }
        None
    }

    pub fn epoch_signer(&self, link: &Link) -> Option<Account> {
        Some((*self.signer(self.epoch(link)?)?).into())
    }

    /// Checks that a new epoch is the immediate successor of the current one
    pub fn is_sequential(previous: Epoch, next: Epoch) -> bool {
        let previous_number = previous as u8;
        let next_number = next as u8;
        previous_number >= Epoch::EPOCH_BEGIN as u8 && next_number == previous_number + 1
    }
}
