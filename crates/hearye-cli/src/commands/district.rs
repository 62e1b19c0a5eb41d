//! Congressional district codes as entered by the user (`KS-03`, `WY-AL`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DistrictCodeError {
    #[error("expected STATE-NN or STATE-AL, got '{0}'")]
    Format(String),

    #[error("'{0}' is not a two-letter state code")]
    State(String),

    #[error("'{0}' is not a district number")]
    District(String),
}

/// A parsed district code. At-large districts are number 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictCode {
    pub state: String,
    pub district: u32,
}

impl DistrictCode {
    pub fn parse(raw: &str) -> Result<Self, DistrictCodeError> {
        let (state, district) = raw
            .trim()
            .split_once('-')
            .ok_or_else(|| DistrictCodeError::Format(raw.to_string()))?;

        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DistrictCodeError::State(state.to_string()));
        }

        let district = if district.eq_ignore_ascii_case("AL") {
            0
        } else {
            district
                .parse()
                .map_err(|_| DistrictCodeError::District(district.to_string()))?
        };

        Ok(Self {
            state: state.to_ascii_uppercase(),
            district,
        })
    }

    /// Canonical `STATE-NN` form, `STATE-AL` for at-large.
    pub fn code(&self) -> String {
        if self.district == 0 {
            format!("{}-AL", self.state)
        } else {
            format!("{}-{:02}", self.state, self.district)
        }
    }
}
