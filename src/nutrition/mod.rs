//! Nutrition modules.
//!
//! This module provides the nutrient lookup client and the aggregation
//! of its results into spoken totals.

pub mod aggregator;
pub mod client;

pub use aggregator::{aggregate, format_summary};
pub use client::{LookupError, NutrientLookup, NutritionixClient};
