//! Tariff tiers, tariff configuration and ride extras

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Hour (local time) at which the day tier starts
pub const DAY_TIER_START_HOUR: u32 = 7;
/// Hour (local time) at which the night tier starts
pub const NIGHT_TIER_START_HOUR: u32 = 19;

/// Per-kilometer price bracket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TariffTier {
    /// Day rate
    #[default]
    A,
    /// Night and weekend rate
    B,
    /// Reserved higher tier, selected explicitly
    C,
    /// Reserved higher tier, selected explicitly
    D,
}

impl TariffTier {
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Get a human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::A => "Day",
            Self::B => "Night/Weekend",
            Self::C => "Special C",
            Self::D => "Special D",
        }
    }

    /// Default tier for a pickup at the given local time
    ///
    /// B before 07:00, from 19:00 and all day on Saturday and Sunday, A otherwise.
    /// C and D are never selected automatically.
    #[must_use]
    pub fn for_local_time<Tz: TimeZone>(local: &DateTime<Tz>) -> Self {
        let hour = local.hour();
        let weekend = matches!(local.weekday(), Weekday::Sat | Weekday::Sun);
        if weekend || !(DAY_TIER_START_HOUR..NIGHT_TIER_START_HOUR).contains(&hour) {
            Self::B
        } else {
            Self::A
        }
    }

    /// Default tier for an instant, evaluated in the given timezone
    #[must_use]
    pub fn for_instant(at: DateTime<Utc>, tz: chrono_tz::Tz) -> Self {
        Self::for_local_time(&at.with_timezone(&tz))
    }
}

impl fmt::Display for TariffTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TariffTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            other => Err(DomainError::ValidationError(format!(
                "unknown tariff tier '{other}' (expected A, B, C or D)"
            ))),
        }
    }
}

/// Per-kilometer prices in cents, one per tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KmRates {
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
    #[serde(rename = "C")]
    pub c: u32,
    #[serde(rename = "D")]
    pub d: u32,
}

impl KmRates {
    #[must_use]
    pub const fn for_tier(&self, tier: TariffTier) -> u32 {
        match tier {
            TariffTier::A => self.a,
            TariffTier::B => self.b,
            TariffTier::C => self.c,
            TariffTier::D => self.d,
        }
    }
}

/// Tariff formula parameters, all amounts in cents
///
/// Unsigned fields carry the "never negative" invariant in the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffConfig {
    pub base_charge_cents: u32,
    pub km_cents: KmRates,
    pub wait_per_hour_cents: u32,
    pub baggage_fee_cents: u32,
    pub fifth_passenger_cents: u32,
}

impl TariffConfig {
    /// Reject configurations that cannot price a ride
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` when every per-kilometer rate is zero
    pub fn validate(&self) -> Result<(), DomainError> {
        if TariffTier::ALL
            .iter()
            .all(|tier| self.km_cents.for_tier(*tier) == 0)
        {
            return Err(DomainError::ValidationError(
                "at least one per-kilometer rate must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            base_charge_cents: 420,
            km_cents: KmRates {
                a: 120,
                b: 180,
                c: 240,
                d: 300,
            },
            wait_per_hour_cents: 3_600,
            baggage_fee_cents: 200,
            fifth_passenger_cents: 400,
        }
    }
}

/// A stored version of the tariff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffSnapshot {
    /// Monotonically increasing version, starting at 1
    pub version: u64,
    pub config: TariffConfig,
    pub updated_at: DateTime<Utc>,
}

/// Optional surcharges applied on top of distance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideExtras {
    pub fifth_passenger: bool,
    pub baggage_count: u32,
    pub wait_minutes: u32,
}
