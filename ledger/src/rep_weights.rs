use rsbtcnew_core::{Account, Amount};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

/// In-memory aggregate `representative -> delegated weight`. Mutated only
/// while the single write transaction is held, so readers always observe a
/// state that matches a committed ledger state.
pub struct RepWeights {
    rep_amounts: Mutex<HashMap<Account, Amount>>,
}

impl RepWeights {
    pub fn new() -> Self {
        Self {
            rep_amounts: Mutex::new(HashMap::new()),
        }
    }

    fn get(guard: &MutexGuard<HashMap<Account, Amount>>, account: &Account) -> Amount {
        guard.get(account).copied().unwrap_or_default()
    }

    fn put(guard: &mut MutexGuard<HashMap<Account, Amount>>, account: Account, amount: Amount) {
        if amount.is_zero() {
            guard.remove(&account);
        } else {
            guard.insert(account, amount);
        }
    }

    pub fn representation_add(&self, source_rep: Account, amount: Amount) {
        let mut guard = self.rep_amounts.lock().unwrap();
        let source_previous = Self::get(&guard, &source_rep);
        Self::put(&mut guard, source_rep, source_previous.wrapping_add(amount));
    }

    /// Adjusts two representatives under a single lock so observers never
    /// see the weight partially moved
    pub fn representation_add_dual(
        &self,
        source_rep_1: Account,
        amount_1: Amount,
        source_rep_2: Account,
        amount_2: Amount,
    ) {
        if source_rep_1 != source_rep_2 {
            let mut guard = self.rep_amounts.lock().unwrap();
            let previous_1 = Self::get(&guard, &source_rep_1);
            Self::put(&mut guard, source_rep_1, previous_1.wrapping_add(amount_1));
            let previous_2 = Self::get(&guard, &source_rep_2);
            Self::put(&mut guard, source_rep_2, previous_2.wrapping_add(amount_2));
        } else {
            self.representation_add(source_rep_1, amount_1.wrapping_add(amount_2));
        }
    }

    pub fn representation_get(&self, account: &Account) -> Amount {
        let guard = self.rep_amounts.lock().unwrap();
        Self::get(&guard, account)
    }

    /// Only for bootstrapping the cache from the store
    pub fn representation_put(&self, account: Account, weight: Amount) {
        let mut guard = self.rep_amounts.lock().unwrap();
        Self::put(&mut guard, account, weight);
    }

    pub fn get_rep_amounts(&self) -> HashMap<Account, Amount> {
        self.rep_amounts.lock().unwrap().clone()
    }
}

impl Default for RepWeights {
    fn default() -> Self {
        Self::new()
    }
}
