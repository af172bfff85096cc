//! Closed vocabularies used on the wire and in storage.
//!
//! Every enum serializes as its `snake_case` name, and the same name is stored in
//! the database and accepted by `FromStr`.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
            Display, EnumString, AsRefStr, EnumIter,
        )]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[serde(rename_all = "snake_case")]
        #[strum(serialize_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }
    };
}

vocabulary! {
    /// Access level of an account.
    Role { User, Pro, Admin }
}

vocabulary! {
    Gender { Male, Female }
}

vocabulary! {
    /// Daily activity; drives the TDEE multiplier.
    Lifestyle { Low, Medium, High }
}

vocabulary! {
    Level { Beginner, Amateur, Professional }
}

vocabulary! {
    GoalType { WeightLoss, MuscleGain, Maintenance, Endurance }
}

vocabulary! {
    MealType { Breakfast, Lunch, Dinner, Snack }
}

vocabulary! {
    /// Target of a whole workout. Exercises carry free-text groups.
    MuscleGroup { UpperBodyPush, UpperBodyPull, LowerBody, Core, FullBody, Cardio }
}

vocabulary! {
    /// Owner kinds an attachment can be linked to.
    EntityType { User, Workout, Progress }
}

vocabulary! {
    Weekday { Mon, Tue, Wed, Thu, Fri, Sat, Sun }
}

vocabulary! {
    /// Series available for progress analysis.
    ProgressMetric { Weight, Workouts, Recovery }
}

impl Role {
    /// `pro` and `admin` have unlimited AI features.
    #[must_use]
    pub const fn is_pro(self) -> bool {
        matches!(self, Self::Pro | Self::Admin)
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl Weekday {
    /// Position in the week, Monday first.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn names_round_trip_through_from_str() {
        for group in MuscleGroup::iter() {
            assert_eq!(MuscleGroup::from_str(group.as_ref()).ok(), Some(group));
        }
        assert_eq!(MuscleGroup::UpperBodyPush.to_string(), "upper_body_push");
        assert!(Role::from_str("superadmin").is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&GoalType::WeightLoss).unwrap();
        assert_eq!(json, "\"weight_loss\"");
        let role: Role = serde_json::from_str("\"pro\"").unwrap();
        assert!(role.is_pro());
        assert!(!role.is_admin());
    }
}
