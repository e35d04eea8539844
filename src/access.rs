//! Role-based access control.
//!
//! Two roles gate the privileged surface of the vault:
//!
//! | Role | Holds | May |
//! |------|-------|-----|
//! | [`Role::Owner`] | configuration authority | change oracle/guard/tolerance, pause, move capital, emergency exit, salvage, reassign roles |
//! | [`Role::Governance`] | operator | compound, harvest, withdraw on behalf of any depositor |
//!
//! Both start at the deployer and may diverge.  Holding one role never
//! implies the other.

use core::fmt;

use alloy_primitives::Address;

use crate::error::{Result, VaultError};

/// A privileged role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Configuration authority.
    Owner,
    /// Operator.
    Governance,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Owner => "owner",
            Self::Governance => "governance",
        })
    }
}

/// Current holders of each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessControl {
    owner: Address,
    governance: Address,
}

impl AccessControl {
    /// Creates the role table.
    #[must_use]
    pub const fn new(owner: Address, governance: Address) -> Self {
        Self { owner, governance }
    }

    /// Current owner.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Current governance.
    #[must_use]
    pub const fn governance(&self) -> Address {
        self.governance
    }

    /// Address currently holding `role`.
    #[must_use]
    pub const fn holder(&self, role: Role) -> Address {
        match role {
            Role::Owner => self.owner,
            Role::Governance => self.governance,
        }
    }

    /// Returns `true` if `caller` holds `role`.
    #[must_use]
    pub fn has_role(&self, caller: Address, role: Role) -> bool {
        self.holder(role) == caller
    }

    /// Fails unless `caller` holds `role`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::AccessDenied`].
    pub fn require(&self, caller: Address, role: Role) -> Result<()> {
        if self.has_role(caller, role) {
            Ok(())
        } else {
            Err(VaultError::AccessDenied { caller, role })
        }
    }

    /// Fails unless `caller` is `account` itself or holds governance.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::AccessDenied`] naming the governance role.
    pub fn require_self_or_governance(&self, caller: Address, account: Address) -> Result<()> {
        if caller == account {
            return Ok(());
        }
        self.require(caller, Role::Governance)
    }

    /// Assigns `role` to `holder` and returns the previous holder.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] for the zero address.
    pub fn assign(&mut self, role: Role, holder: Address) -> Result<Address> {
        if holder.is_zero() {
            return Err(VaultError::InvalidConfiguration("role holder is zero"));
        }
        let slot = match role {
            Role::Owner => &mut self.owner,
            Role::Governance => &mut self.governance,
        };
        Ok(core::mem::replace(slot, holder))
    }
}
