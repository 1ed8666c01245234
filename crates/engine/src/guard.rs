use gatekeeper_primitives::Account;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Single-operator access control.
///
/// The operator is fixed at creation. It can only change through a two-step handover: the
/// current operator nominates a successor, and the nominee accepts. Until the nominee accepts,
/// the current operator keeps all privileges and can replace or cancel the nomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGuard {
    operator: Account,
    pending_operator: Option<Account>,
}

impl AccessGuard {
    /// Creates a new guard for the given operator.
    pub const fn new(operator: Account) -> Self {
        Self { operator, pending_operator: None }
    }

    /// Restores a guard with a handover in progress.
    pub(crate) const fn with_pending(operator: Account, pending_operator: Option<Account>) -> Self {
        Self { operator, pending_operator }
    }

    /// Returns the current operator.
    pub const fn operator(&self) -> Account {
        self.operator
    }

    /// Returns the nominated successor, if a handover is in progress.
    pub const fn pending_operator(&self) -> Option<Account> {
        self.pending_operator
    }

    /// Returns `true` if `caller` is the operator.
    pub fn is_operator(&self, caller: Account) -> bool {
        caller == self.operator
    }

    /// Fails with [`EngineError::Unauthorized`] unless `caller` is the operator.
    pub fn ensure_operator(&self, caller: Account) -> EngineResult<()> {
        if self.is_operator(caller) { Ok(()) } else { Err(EngineError::Unauthorized { caller }) }
    }

    /// Nominates `nominee` as the next operator. Passing `None` cancels a pending nomination.
    pub(crate) fn nominate(&mut self, caller: Account, nominee: Option<Account>) -> EngineResult<()> {
        self.ensure_operator(caller)?;
        self.pending_operator = nominee;
        Ok(())
    }

    /// Completes the handover. Only the pending nominee may call this.
    ///
    /// Returns the previous operator.
    pub(crate) fn accept(&mut self, caller: Account) -> EngineResult<Account> {
        if self.pending_operator != Some(caller) {
            return Err(EngineError::Unauthorized { caller });
        }

        let previous = self.operator;
        self.operator = caller;
        self.pending_operator = None;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;

    const OPERATOR: Address = Address::repeat_byte(0x01);
    const NOMINEE: Address = Address::repeat_byte(0x02);
    const STRANGER: Address = Address::repeat_byte(0x03);

    #[test]
    fn only_operator_passes() {
        let guard = AccessGuard::new(OPERATOR);
        assert!(guard.ensure_operator(OPERATOR).is_ok());
        assert_eq!(
            guard.ensure_operator(STRANGER),
            Err(EngineError::Unauthorized { caller: STRANGER })
        );
    }

    #[test]
    fn handover_requires_nominee_acceptance() {
        let mut guard = AccessGuard::new(OPERATOR);

        assert_eq!(
            guard.nominate(STRANGER, Some(NOMINEE)),
            Err(EngineError::Unauthorized { caller: STRANGER })
        );

        guard.nominate(OPERATOR, Some(NOMINEE)).unwrap();
        assert_eq!(guard.pending_operator(), Some(NOMINEE));
        // The operator keeps its privileges until the nominee accepts.
        assert!(guard.is_operator(OPERATOR));

        assert_eq!(guard.accept(STRANGER), Err(EngineError::Unauthorized { caller: STRANGER }));
        assert_eq!(guard.accept(NOMINEE), Ok(OPERATOR));
        assert_eq!(guard.operator(), NOMINEE);
        assert_eq!(guard.pending_operator(), None);
        assert!(guard.ensure_operator(OPERATOR).is_err());
    }

    #[test]
    fn nomination_can_be_cancelled() {
        let mut guard = AccessGuard::new(OPERATOR);
        guard.nominate(OPERATOR, Some(NOMINEE)).unwrap();
        guard.nominate(OPERATOR, None).unwrap();

        assert!(guard.accept(NOMINEE).is_err());
        assert_eq!(guard.operator(), OPERATOR);
    }
}
