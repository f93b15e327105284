use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of dimensions in persona and car-type feature vectors
pub const FEATURE_DIMENSIONS: usize = 8;

/// Dense feature vector laid out as
/// `[eco, luxury, budget, fuel-efficiency, environmental, practical, electric, hybrid]`
pub type FeatureVector = [f64; FEATURE_DIMENSIONS];

/// Shopper archetype driving content-based scoring
///
/// Also used as the car "type" in the catalog, so every car belongs to
/// exactly one persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Eco,
    Luxury,
    Budget,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown persona: {0}")]
pub struct UnknownPersona(pub String);

impl Persona {
    pub const ALL: [Persona; 3] = [Persona::Eco, Persona::Luxury, Persona::Budget];

    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Eco => "eco",
            Persona::Luxury => "luxury",
            Persona::Budget => "budget",
        }
    }

    /// What a shopper with this persona is looking for
    pub fn profile(&self) -> FeatureVector {
        match self {
            Persona::Eco => [1.0, 0.0, 0.0, 0.9, 0.9, 0.7, 0.8, 0.6],
            Persona::Luxury => [0.0, 1.0, 0.0, 0.3, 0.2, 0.6, 0.4, 0.3],
            Persona::Budget => [0.0, 0.0, 1.0, 0.7, 0.5, 0.9, 0.5, 0.6],
        }
    }

    /// What a car of this type offers
    pub fn car_features(&self) -> FeatureVector {
        match self {
            Persona::Eco => [1.0, 0.0, 0.0, 0.9, 0.9, 0.7, 0.8, 0.6],
            Persona::Luxury => [0.0, 1.0, 0.0, 0.4, 0.3, 0.6, 0.4, 0.3],
            Persona::Budget => [0.0, 0.0, 1.0, 0.8, 0.6, 0.9, 0.5, 0.6],
        }
    }

    /// Budget shoppers see cheaper cars first among equal scores
    pub fn prefers_lower_price(&self) -> bool {
        matches!(self, Persona::Budget)
    }
}

impl Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Persona {
    type Err = UnknownPersona;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eco" => Ok(Persona::Eco),
            "luxury" => Ok(Persona::Luxury),
            "budget" => Ok(Persona::Budget),
            _ => Err(UnknownPersona(s.to_string())),
        }
    }
}
