//! Data models for the nutrition webhook.
//!
//! This module contains the per-turn data structures: the food records
//! returned by the nutrient lookup service, the totals folded from them,
//! and the user-supplied query and profile fragments.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One parsed food item as returned by the nutrient lookup API.
///
/// Every nutrient is optional. Missing, `null`, non-numeric or non-finite
/// values all deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodNutrientRecord {
    /// Name of the food as recognized by the lookup service.
    #[serde(default)]
    pub food_name: Option<String>,
    /// Quantity of the serving described.
    #[serde(default, deserialize_with = "lenient_number")]
    pub serving_qty: Option<f64>,
    /// Unit of the serving described (e.g. "medium", "cup").
    #[serde(default)]
    pub serving_unit: Option<String>,
    /// Energy in kcal.
    #[serde(rename = "nf_calories", default, deserialize_with = "lenient_number")]
    pub calories: Option<f64>,
    /// Total fat in grams.
    #[serde(rename = "nf_total_fat", default, deserialize_with = "lenient_number")]
    pub total_fat: Option<f64>,
    /// Total carbohydrate in grams.
    #[serde(
        rename = "nf_total_carbohydrate",
        default,
        deserialize_with = "lenient_number"
    )]
    pub total_carbohydrate: Option<f64>,
    /// Protein in grams.
    #[serde(rename = "nf_protein", default, deserialize_with = "lenient_number")]
    pub protein: Option<f64>,
    /// Dietary fiber in grams.
    #[serde(
        rename = "nf_dietary_fiber",
        default,
        deserialize_with = "lenient_number"
    )]
    pub dietary_fiber: Option<f64>,
    /// Sugars in grams.
    #[serde(rename = "nf_sugars", default, deserialize_with = "lenient_number")]
    pub sugars: Option<f64>,
    /// Cholesterol in milligrams.
    #[serde(rename = "nf_cholesterol", default, deserialize_with = "lenient_number")]
    pub cholesterol: Option<f64>,
}

/// Accepts a JSON number or a numeric string; anything else becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

/// Successful body of the natural-language nutrients endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct NutrientsResponse {
    /// One entry per distinct food found in the query.
    pub foods: Vec<FoodNutrientRecord>,
}

/// Per-turn nutrient totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: i64,
    pub fat: i64,
    pub carbohydrate: i64,
    pub protein: i64,
    pub fiber: i64,
    pub sugar: i64,
    pub cholesterol: i64,
}

impl NutrientTotals {
    /// Field-wise sum of two totals.
    pub fn combine(self, other: NutrientTotals) -> NutrientTotals {
        NutrientTotals {
            calories: self.calories.saturating_add(other.calories),
            fat: self.fat.saturating_add(other.fat),
            carbohydrate: self.carbohydrate.saturating_add(other.carbohydrate),
            protein: self.protein.saturating_add(other.protein),
            fiber: self.fiber.saturating_add(other.fiber),
            sugar: self.sugar.saturating_add(other.sugar),
            cholesterol: self.cholesterol.saturating_add(other.cholesterol),
        }
    }
}

/// The raw text a user spoke in one turn, plus the locale it is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceQuery {
    pub text: String,
    pub locale: String,
}

impl UtteranceQuery {
    pub fn new(text: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: locale.into(),
        }
    }

    /// Returns true when there is nothing to look up.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Personalization data taken from the platform's user object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// First name only.
    pub first_name: String,
}

impl UserProfile {
    /// Builds a profile from a full display name, keeping the first word.
    ///
    /// Returns `None` for an empty or whitespace-only name.
    pub fn from_display_name(display_name: &str) -> Option<Self> {
        display_name
            .split_whitespace()
            .next()
            .map(|first| Self {
                first_name: first.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parses_nutritionix_fields() {
        let json = r#"{
            "food_name": "banana",
            "serving_qty": 1,
            "serving_unit": "medium (7\" to 7-7/8\" long)",
            "nf_calories": 105.02,
            "nf_total_fat": 0.39,
            "nf_saturated_fat": 0.13,
            "nf_cholesterol": 0,
            "nf_sodium": 1.18,
            "nf_total_carbohydrate": 26.95,
            "nf_dietary_fiber": 3.07,
            "nf_sugars": 14.43,
            "nf_protein": 1.29,
            "nf_potassium": 422.44
        }"#;

        let record: FoodNutrientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.food_name.as_deref(), Some("banana"));
        assert_eq!(record.calories, Some(105.02));
        assert_eq!(record.total_fat, Some(0.39));
        assert_eq!(record.total_carbohydrate, Some(26.95));
        assert_eq!(record.protein, Some(1.29));
        assert_eq!(record.dietary_fiber, Some(3.07));
        assert_eq!(record.sugars, Some(14.43));
        assert_eq!(record.cholesterol, Some(0.0));
    }

    #[test]
    fn test_record_tolerates_missing_and_malformed_fields() {
        let json = r#"{
            "food_name": "mystery",
            "nf_calories": null,
            "nf_total_fat": "2.5",
            "nf_protein": "lots",
            "nf_sugars": {"value": 3}
        }"#;

        let record: FoodNutrientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.calories, None);
        assert_eq!(record.total_fat, Some(2.5));
        assert_eq!(record.protein, None);
        assert_eq!(record.sugars, None);
        assert_eq!(record.cholesterol, None);
    }

    #[test]
    fn test_response_requires_foods_list() {
        assert!(serde_json::from_str::<NutrientsResponse>(r#"{"foods": []}"#).is_ok());
        assert!(serde_json::from_str::<NutrientsResponse>(r#"{"message": "x"}"#).is_err());
        assert!(serde_json::from_str::<NutrientsResponse>(r#"{"foods": 3}"#).is_err());
    }

    #[test]
    fn test_totals_combine() {
        let a = NutrientTotals {
            calories: 100,
            fat: 1,
            carbohydrate: 2,
            protein: 3,
            fiber: 4,
            sugar: 5,
            cholesterol: 6,
        };
        let b = NutrientTotals {
            calories: 50,
            ..NutrientTotals::default()
        };
        let sum = a.combine(b);
        assert_eq!(sum.calories, 150);
        assert_eq!(sum.cholesterol, 6);

        let max = NutrientTotals {
            calories: i64::MAX,
            ..NutrientTotals::default()
        };
        assert_eq!(max.combine(a).calories, i64::MAX);
    }

    #[test]
    fn test_user_profile_first_name() {
        let profile = UserProfile::from_display_name("Jane Q Doe").unwrap();
        assert_eq!(profile.first_name, "Jane");
        assert!(UserProfile::from_display_name("   ").is_none());
    }

    #[test]
    fn test_blank_utterance() {
        assert!(UtteranceQuery::new("  ", "en_US").is_blank());
        assert!(!UtteranceQuery::new("1 banana", "en_US").is_blank());
    }
}
