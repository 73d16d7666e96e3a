use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::types::WeekdayConvention;

/// engine configuration: how schedule slots map to weekdays and how long
/// rapid edits are coalesced before a reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub weekday_convention: WeekdayConvention,
    pub debounce_millis: i64,
}

impl LedgerConfig {
    /// monday-first slots, 400ms debounce
    pub fn standard() -> Self {
        Self {
            weekday_convention: WeekdayConvention::MondayFirst,
            debounce_millis: 400,
        }
    }

    /// sunday-first slots for datasets recorded under the other convention
    pub fn sunday_first() -> Self {
        Self {
            weekday_convention: WeekdayConvention::SundayFirst,
            ..Self::standard()
        }
    }

    pub fn with_convention(mut self, convention: WeekdayConvention) -> Self {
        self.weekday_convention = convention;
        self
    }

    pub fn with_debounce_millis(mut self, millis: i64) -> Self {
        self.debounce_millis = millis;
        self
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::milliseconds(self.debounce_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.debounce_millis < 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("negative debounce: {}ms", self.debounce_millis),
            });
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::standard()
    }
}
