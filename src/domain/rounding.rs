//! Explicit rounding direction for vault arithmetic.

/// Rounding direction for every division in the vault.
///
/// Share issuance, redemption and capacity quotes round [`Down`](Self::Down)
/// so the vault never hands out more than it holds; swap input quotes round
/// [`Up`](Self::Up) so the vault never under-pays a pool.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::Rounding;
///
/// assert!(Rounding::Up.is_up());
/// assert!(Rounding::Down.is_down());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Towards positive infinity (ceiling).
    Up,
    /// Towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` for [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` for [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }
}
