use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::watch;

/// The currently connected wallet account.
///
/// Owned by the composition root and handed to the gateway. Clones share the
/// same state.
#[derive(Clone, Debug)]
pub struct SessionAccount {
    inner: Arc<watch::Sender<Option<Address>>>,
}

impl Default for SessionAccount {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionAccount {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { inner: Arc::new(tx) }
    }

    pub fn get(&self) -> Option<Address> {
        *self.inner.borrow()
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }

    pub(crate) fn set(&self, account: Address) {
        self.inner.send_replace(Some(account));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_starts_unset() {
        let session = SessionAccount::new();
        assert_eq!(session.get(), None);
        assert!(!session.is_set());
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionAccount::new();
        let clone = session.clone();
        let account = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

        clone.set(account);

        assert_eq!(session.get(), Some(account));
        assert!(session.is_set());
    }
}
