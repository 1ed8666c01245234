use std::collections::BTreeSet;

use gatekeeper_primitives::Account;

/// An operator-administered set of excluded accounts.
///
/// Whether membership has any effect is decided by the engine's
/// [`BlacklistPolicy`](crate::BlacklistPolicy).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    accounts: BTreeSet<Account>,
}

impl Blacklist {
    /// Returns `true` if `account` is blacklisted.
    pub fn contains(&self, account: &Account) -> bool {
        self.accounts.contains(account)
    }

    /// Returns the number of blacklisted accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns `true` if no account is blacklisted.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Returns an iterator over the blacklisted accounts, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    /// Adds `account`. Returns `false` if it was already present.
    pub(crate) fn insert(&mut self, account: Account) -> bool {
        self.accounts.insert(account)
    }

    /// Removes `account`. Returns `false` if it was not present.
    pub(crate) fn remove(&mut self, account: &Account) -> bool {
        self.accounts.remove(account)
    }
}

impl FromIterator<Account> for Blacklist {
    fn from_iter<I: IntoIterator<Item = Account>>(iter: I) -> Self {
        Self { accounts: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Blacklist {
    type Item = &'a Account;
    type IntoIter = std::collections::btree_set::Iter<'a, Account>;

    fn into_iter(self) -> Self::IntoIter {
        self.accounts.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;

    #[test]
    fn insert_and_remove_are_idempotent() {
        let account = Address::repeat_byte(0xaa);
        let mut blacklist = Blacklist::default();

        assert!(blacklist.insert(account));
        assert!(!blacklist.insert(account));
        assert!(blacklist.contains(&account));
        assert_eq!(blacklist.len(), 1);

        assert!(blacklist.remove(&account));
        assert!(!blacklist.remove(&account));
        assert!(blacklist.is_empty());
    }
}
