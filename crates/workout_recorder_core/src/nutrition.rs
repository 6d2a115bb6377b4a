//! crates/workout_recorder_core/src/nutrition.rs
//!
//! Daily target calories: Mifflin-St Jeor BMR, scaled by activity level into
//! TDEE, then shifted for the user's goal. Also holds the food log the
//! intake is counted against.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NutritionError {
    #[error("{field} must be a positive number")]
    NonPositive { field: &'static str },
    #[error("{field} cannot be negative")]
    Negative { field: &'static str },
    #[error("A food needs a name")]
    MissingFoodName,
    #[error("No food with id {0} in the log")]
    UnknownFood(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise.
    Sedentary,
    /// 1-3 sessions a week.
    Light,
    /// 3-5 sessions a week.
    Moderate,
    /// 6-7 sessions a week.
    Active,
    /// Training twice a day.
    VeryActive,
}

impl ActivityLevel {
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Maintenance,
    Bulk,
    Cut,
}

impl Goal {
    pub fn adjustment_kcal(self) -> f64 {
        match self {
            Goal::Maintenance => 0.0,
            Goal::Bulk => 300.0,
            Goal::Cut => -500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyProfile {
    pub sex: Sex,
    pub age_years: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity: ActivityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalorieTarget {
    pub bmr: f64,
    pub tdee: f64,
    pub target_kcal: i64,
}

impl BodyProfile {
    pub fn bmr(&self) -> Result<f64, NutritionError> {
        self.validate()?;
        let base = 10.0 * self.weight_kg + 6.25 * self.height_cm - 5.0 * f64::from(self.age_years);
        Ok(match self.sex {
            Sex::Male => base + 5.0,
            Sex::Female => base - 161.0,
        })
    }

    pub fn tdee(&self) -> Result<f64, NutritionError> {
        Ok(self.bmr()? * self.activity.factor())
    }

    pub fn target_calories(&self, goal: Goal) -> Result<CalorieTarget, NutritionError> {
        let bmr = self.bmr()?;
        let tdee = bmr * self.activity.factor();
        Ok(CalorieTarget {
            bmr,
            tdee,
            target_kcal: (tdee + goal.adjustment_kcal()).round() as i64,
        })
    }

    fn validate(&self) -> Result<(), NutritionError> {
        if self.age_years == 0 {
            return Err(NutritionError::NonPositive { field: "age_years" });
        }
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(NutritionError::NonPositive { field: "weight_kg" });
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(NutritionError::NonPositive { field: "height_cm" });
        }
        Ok(())
    }
}

//=========================================================================================
// Food Log
//=========================================================================================

fn default_amount() -> f64 {
    100.0
}

/// A food as entered by the user, before it gets an id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewFoodItem {
    pub name: String,
    pub calories: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
    /// Portion in grams.
    #[serde(default = "default_amount")]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FoodTotals {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
}

/// The foods eaten so far, in the order they were added. Lives in memory
/// only.
#[derive(Debug, Clone, Default)]
pub struct FoodLog {
    items: Vec<FoodItem>,
}

impl FoodLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, food: NewFoodItem) -> Result<&FoodItem, NutritionError> {
        let name = food.name.trim();
        if name.is_empty() {
            return Err(NutritionError::MissingFoodName);
        }
        if !(food.calories.is_finite() && food.calories > 0.0) {
            return Err(NutritionError::NonPositive { field: "calories" });
        }
        for (field, value) in [
            ("carbs", food.carbs),
            ("protein", food.protein),
            ("fat", food.fat),
            ("amount", food.amount),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(NutritionError::Negative { field });
            }
        }

        let index = self.items.len();
        self.items.push(FoodItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            calories: food.calories,
            carbs: food.carbs,
            protein: food.protein,
            fat: food.fat,
            amount: food.amount,
        });
        Ok(&self.items[index])
    }

    pub fn remove(&mut self, id: Uuid) -> Result<FoodItem, NutritionError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(NutritionError::UnknownFood(id))?;
        Ok(self.items.remove(index))
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn totals(&self) -> FoodTotals {
        self.items.iter().fold(FoodTotals::default(), |mut totals, item| {
            totals.calories += item.calories;
            totals.carbs += item.carbs;
            totals.protein += item.protein;
            totals.fat += item.fat;
            totals
        })
    }
}
