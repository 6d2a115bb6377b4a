//! crates/workout_recorder_core/src/catalog.rs
//!
//! The built-in exercise catalog. Names are stable keys; display text is a
//! presentation concern.

use crate::domain::BodyPart;
use crate::ports::ExerciseCatalog;

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl ExerciseCatalog for StaticCatalog {
    fn exercises(&self, body_part: BodyPart) -> &[&'static str] {
        match body_part {
            BodyPart::Back => &["pullUp", "latPullDown", "barbellRow", "dumbbellRow", "seatedRow"],
            BodyPart::Shoulder => &["overheadPress", "sideLateralRaise", "frontRaise", "rearDeltFly"],
            BodyPart::Chest => &["benchPress", "inclineBenchPress", "dumbbellFly", "pushUp", "chestPress"],
            BodyPart::Biceps => &["barbellCurl", "dumbbellCurl", "hammerCurl", "preacherCurl"],
            BodyPart::Triceps => &["tricepsExtension", "closeGripBenchPress", "dips", "cablePushdown"],
            BodyPart::Legs => &["squat", "legPress", "lunge", "legCurl", "legExtension"],
            BodyPart::Abs => &["crunch", "plank", "legRaise", "russianTwist"],
            BodyPart::Cardio => &["running", "cycling", "rowing", "burpee", "jumpingJack"],
        }
    }
}
