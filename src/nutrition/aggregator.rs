//! Nutrient aggregation and summary text.
//!
//! Folds the per-food records of one turn into a single totals record and
//! renders the spoken breakdown.

use crate::models::{FoodNutrientRecord, NutrientTotals};

/// Line spoken before the breakdown when the entry was logged.
pub const LOGGED_CONFIRMATION: &str = "I logged your entry to your macroS account!";

/// Heading line of every breakdown.
pub const BREAKDOWN_HEADING: &str = "Here's the full nutritional breakdown!";

/// Round half up (toward positive infinity at exactly .5).
///
/// Missing and non-finite values contribute zero.
fn round_contribution(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v.is_finite() => {
            let floor = v.floor();
            let rounded = if v - floor >= 0.5 { floor + 1.0 } else { floor };
            // `as` saturates at the i64 bounds
            rounded as i64
        }
        _ => 0,
    }
}

/// Sum every nutrient across the records, rounding each record's
/// contribution individually before accumulating.
pub fn aggregate(records: &[FoodNutrientRecord]) -> NutrientTotals {
    records
        .iter()
        .map(|food| NutrientTotals {
            calories: round_contribution(food.calories),
            fat: round_contribution(food.total_fat),
            carbohydrate: round_contribution(food.total_carbohydrate),
            protein: round_contribution(food.protein),
            fiber: round_contribution(food.dietary_fiber),
            sugar: round_contribution(food.sugars),
            cholesterol: round_contribution(food.cholesterol),
        })
        .fold(NutrientTotals::default(), NutrientTotals::combine)
}

/// Render the totals as the multi-line breakdown spoken to the user.
pub fn format_summary(totals: &NutrientTotals, logged: bool) -> String {
    let mut lines = Vec::new();

    if logged {
        lines.push(LOGGED_CONFIRMATION.to_string());
    }

    lines.push(BREAKDOWN_HEADING.to_string());
    lines.push(format!("Total Calories: {},", totals.calories));
    lines.push(format!("Total Fat: {} grams,", totals.fat));
    lines.push(format!("Total Carbohydrates: {} grams,", totals.carbohydrate));
    lines.push(format!("Total Protein: {} grams,", totals.protein));
    lines.push(format!("Total Fiber: {} grams,", totals.fiber));
    lines.push(format!("Total Sugar: {} grams,", totals.sugar));
    lines.push(format!("Total Cholesterol: {} milligrams", totals.cholesterol));

    lines.join("\n")
}
