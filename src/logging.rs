//! `tracing-subscriber` setup for binaries and tests that embed the vault.
//!
//! The library itself only emits `tracing` events under the targets
//! `vault`, `guard`, `ledger` and `compounder`; installing a subscriber is
//! left to the host.  [`init`] is a convenience for hosts without one.

use std::str::FromStr;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Result, VaultError};

/// Installs a global subscriber filtered by `filter`.
///
/// `filter` is an [`EnvFilter`] directive string.  A bare level such as
/// `"debug"` applies to the vault targets only; anything containing `,` or
/// `=` is used as-is.  `json` selects JSON lines over the compact format.
///
/// # Errors
///
/// Returns [`VaultError::Logging`] for a malformed filter or if a global
/// subscriber is already installed.
pub fn init(filter: &str, json: bool) -> Result<()> {
    let directive = directives(filter);
    let filter =
        EnvFilter::from_str(&directive).map_err(|err| VaultError::Logging(err.to_string()))?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).compact())
            .try_init()
    };
    installed.map_err(|err| VaultError::Logging(err.to_string()))?;
    tracing::debug!(target: "vault", filter = %directive, json, "logging initialised");
    Ok(())
}

fn directives(filter: &str) -> String {
    let filter = filter.trim();
    if filter.contains(',') || filter.contains('=') {
        return filter.to_owned();
    }
    let level = if filter.is_empty() { "info" } else { filter };
    format!("warn,vault={level},guard={level},ledger={level},compounder={level}")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_scopes_to_vault_targets() {
        assert_eq!(
            directives(" debug "),
            "warn,vault=debug,guard=debug,ledger=debug,compounder=debug"
        );
        assert_eq!(
            directives(""),
            "warn,vault=info,guard=info,ledger=info,compounder=info"
        );
    }

    #[test]
    fn explicit_directives_pass_through() {
        assert_eq!(directives("trace,ledger=off"), "trace,ledger=off");
    }

    #[test]
    fn second_init_is_an_error() {
        // The first call may lose to another test's subscriber; the second never wins.
        let _ = init("info", false);
        assert!(matches!(init("info", true), Err(VaultError::Logging(_))));
    }

    #[test]
    fn malformed_filter_is_an_error() {
        assert!(matches!(init("vault=notalevel", false), Err(VaultError::Logging(_))));
    }
}
