//! Raffle configuration: pool size and extra-ticket pricing.

use crate::types::{Money, TicketNumber};
use serde::{Deserialize, Serialize};

/// Default number of tickets in the pool.
pub const DEFAULT_POOL_SIZE: u32 = 1000;

/// Default price of one purchase unit, in cents.
pub const DEFAULT_UNIT_PRICE_CENTS: u64 = 700;

/// Default tickets granted per purchase unit.
pub const DEFAULT_TICKETS_PER_UNIT: u32 = 5;

/// Raffle cycle constants.
///
/// These are configuration, not code: the pool size bounds every ticket
/// number, and the pricing pair converts a purchase amount into an
/// extra-ticket count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleConfig {
    /// Total tickets offered, numbered `1..=pool_size`.
    pub pool_size: u32,
    /// Price of one purchase unit.
    pub unit_price: Money,
    /// Tickets granted per purchase unit.
    pub tickets_per_unit: u32,
}

impl RaffleConfig {
    /// Creates a new `RaffleConfig`.
    #[must_use]
    pub const fn new(pool_size: u32, unit_price: Money, tickets_per_unit: u32) -> Self {
        Self {
            pool_size,
            unit_price,
            tickets_per_unit,
        }
    }

    /// Whether a number lies within this pool.
    #[must_use]
    pub const fn contains(&self, number: TicketNumber) -> bool {
        number.get() <= self.pool_size
    }

    /// Whether an amount meets the minimum purchase (one unit).
    #[must_use]
    pub fn meets_minimum(&self, amount: Money) -> bool {
        amount >= self.unit_price
    }

    /// Extra tickets owed for a purchase amount:
    /// `floor(amount / unit_price) * tickets_per_unit`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rifa_core::config::RaffleConfig;
    /// use rifa_core::types::Money;
    ///
    /// let config = RaffleConfig::default();
    /// assert_eq!(config.extra_tickets_for(Money::from_cents(2100)), 15);
    /// assert_eq!(config.extra_tickets_for(Money::from_cents(699)), 0);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // unit counts are tiny
    pub fn extra_tickets_for(&self, amount: Money) -> u32 {
        let units = amount
            .cents()
            .checked_div(self.unit_price.cents())
            .unwrap_or(0);
        (units as u32).saturating_mul(self.tickets_per_unit)
    }
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_POOL_SIZE,
            Money::from_cents(DEFAULT_UNIT_PRICE_CENTS),
            DEFAULT_TICKETS_PER_UNIT,
        )
    }
}
