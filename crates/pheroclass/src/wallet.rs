//! Connected wallet

use pheroclass_classroom::{Classroom, ClassroomError, ClassroomResult, ContractAddress};
use tracing::info;

/// The account a dashboard acts as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    pub account: ContractAddress,
    pub chain_id: u64,
    /// Native balance in ether
    pub balance: String,
}

impl WalletSession {
    /// Connect through a binding
    ///
    /// Fails with a wallet error when no signing account is configured or the
    /// endpoint serves another chain.
    pub async fn connect(classroom: &dyn Classroom) -> ClassroomResult<Self> {
        let account = classroom
            .account()
            .ok_or_else(|| ClassroomError::wallet("No wallet connected. Configure a private key to continue."))?;
        classroom.verify_network().await?;
        let balance = classroom.balance(&account).await?;

        info!("Connected {} on chain {} with balance {}", account, classroom.chain_id(), balance);
        Ok(Self {
            account,
            chain_id: classroom.chain_id(),
            balance,
        })
    }

    pub async fn refresh_balance(&mut self, classroom: &dyn Classroom) -> ClassroomResult<()> {
        self.balance = classroom.balance(&self.account).await?;
        Ok(())
    }

    /// `0x1234...abcd` form of the account
    pub fn short_account(&self) -> String {
        self.account.short()
    }
}
