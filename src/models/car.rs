use serde::{Deserialize, Serialize};

use super::Persona;

/// Stable catalog identifier of a car
pub type CarId = u32;

/// A car in the static catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: CarId,
    pub name: String,
    /// Persona this car is aimed at
    #[serde(rename = "type")]
    pub persona: Persona,
    /// Body style or drivetrain (e.g. "sedan", "electric")
    pub category: String,
    /// Price in whole US dollars
    pub price: u32,
    pub year: u16,
    /// Fuel economy (MPGe for electric cars)
    pub mpg: u16,
    pub features: Vec<String>,
    pub brand: String,
    pub made_in: String,
}

impl Car {
    /// Checks whether the car carries the given feature tag
    pub fn has_feature(&self, tag: &str) -> bool {
        self.features.iter().any(|f| f == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf() -> Car {
        Car {
            id: 2,
            name: "Nissan Leaf".to_string(),
            persona: Persona::Eco,
            category: "electric".to_string(),
            price: 28140,
            year: 2024,
            mpg: 123,
            features: vec!["electric".to_string(), "quiet".to_string()],
            brand: "Nissan".to_string(),
            made_in: "USA".to_string(),
        }
    }

    #[test]
    fn test_has_feature() {
        let car = leaf();
        assert!(car.has_feature("electric"));
        assert!(!car.has_feature("hybrid"));
    }

    #[test]
    fn test_serializes_with_catalog_field_names() {
        let json = serde_json::to_value(leaf()).unwrap();
        assert_eq!(json["type"], "eco");
        assert_eq!(json["madeIn"], "USA");
        assert_eq!(json["price"], 28140);
    }
}
