use crate::enums::Weekday;
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Preferred training days of a week.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    pub struct TrainingDays: u8 {
        const MON = 1 << 0;
        const TUE = 1 << 1;
        const WED = 1 << 2;
        const THU = 1 << 3;
        const FRI = 1 << 4;
        const SAT = 1 << 5;
        const SUN = 1 << 6;
    }
}

impl From<Weekday> for TrainingDays {
    fn from(day: Weekday) -> Self {
        Self::from_bits_truncate(1 << day.index())
    }
}

impl FromIterator<Weekday> for TrainingDays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |acc, day| acc | Self::from(day))
    }
}

impl From<i64> for TrainingDays {
    fn from(bits: i64) -> Self {
        Self::from_bits_truncate(u8::try_from(bits & 0x7f).unwrap_or_default())
    }
}

impl TrainingDays {
    /// Selected days, Monday first.
    #[must_use]
    pub fn days(self) -> Vec<Weekday> {
        use strum::IntoEnumIterator;
        Weekday::iter().filter(|day| self.contains(Self::from(*day))).collect()
    }

    /// Storage form.
    #[must_use]
    pub fn to_i64(self) -> i64 {
        i64::from(self.bits())
    }
}

impl Serialize for TrainingDays {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.days().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TrainingDays {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let days = Vec::<Weekday>::deserialize(deserializer)?;
        Ok(days.into_iter().collect())
    }
}
