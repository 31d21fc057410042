//! Density setting

use serde::{Deserialize, Serialize};

/// Key of the density row in `settings`
pub const DENSITY_KEY: &str = "density";

/// Office density percentage, always within 0..=100
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Density(u8);

impl Density {
    pub const ZERO: Density = Density(0);

    /// Clamp any integer into 0..=100
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<i64> for Density {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<Density> for i64 {
    fn from(d: Density) -> Self {
        d.0 as i64
    }
}

/// Body of `PUT /api/density` and the `GET /api/density` response
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DensityUpdate {
    pub value: i64,
}

/// Raw `settings` row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SettingRow {
    pub key: String,
    pub value: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Density::clamped(-5).value(), 0);
        assert_eq!(Density::clamped(42).value(), 42);
        assert_eq!(Density::clamped(250).value(), 100);
    }

    #[test]
    fn deserializing_clamps_too() {
        let d: Density = serde_json::from_str("130").unwrap();
        assert_eq!(d.value(), 100);
        assert_eq!(serde_json::to_string(&Density::clamped(7)).unwrap(), "7");
    }
}
