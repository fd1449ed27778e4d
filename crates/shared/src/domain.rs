use std::{fmt, iter::Sum, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(ItemId);
id_newtype!(PlanName);

impl PlanName {
    /// Plans are chosen by display name in any letter case ("monthly" picks "Monthly").
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.eq_ignore_ascii_case(candidate.trim())
    }
}

/// Amount of money in paise (1/100 of a rupee).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_rupees(rupees: u64) -> Self {
        Self(rupees * 100)
    }

    pub const fn paise(self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }

    pub fn times(self, quantity: u32) -> Money {
        Money(self.0.saturating_mul(u64::from(quantity)))
    }

    /// Parses the rupee notation used on price tags: `180`, `1,200`, `₹4,800`, `180.50`.
    pub fn parse_rupees(raw: &str) -> Result<Money, MoneyParseError> {
        let cleaned: String = raw
            .trim()
            .trim_start_matches('₹')
            .trim_start_matches("Rs.")
            .trim()
            .chars()
            .filter(|c| *c != ',')
            .collect();
        if cleaned.is_empty() {
            return Err(MoneyParseError(raw.to_string()));
        }

        let (whole, fraction) = match cleaned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (cleaned.as_str(), ""),
        };
        if whole.is_empty()
            || !whole.chars().all(|c| c.is_ascii_digit())
            || fraction.len() > 2
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(MoneyParseError(raw.to_string()));
        }

        let rupees: u64 = whole
            .parse()
            .map_err(|_| MoneyParseError(raw.to_string()))?;
        let paise: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().unwrap_or(0) * 10,
            _ => fraction.parse::<u64>().unwrap_or(0),
        };
        rupees
            .checked_mul(100)
            .and_then(|value| value.checked_add(paise))
            .map(Money)
            .ok_or_else(|| MoneyParseError(raw.to_string()))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rupees = group_indian(self.0 / 100);
        match self.0 % 100 {
            0 => write!(f, "₹{rupees}"),
            paise => write!(f, "₹{rupees}.{paise:02}"),
        }
    }
}

// Lakh/crore grouping: last three digits, then pairs (1,00,000).
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rupee amount: {0:?}")]
pub struct MoneyParseError(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub original_price: Money,
    pub features: Vec<String>,
    pub rating: f32,
    pub prep_time_minutes: u32,
}

impl MenuItem {
    pub fn savings(&self) -> Money {
        self.original_price.saturating_sub(self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPlan {
    pub name: PlanName,
    pub price: Money,
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_label: Option<String>,
    pub features: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl PricingPlan {
    pub fn savings(&self) -> Money {
        self.original_price
            .map(|original| original.saturating_sub(self.price))
            .unwrap_or(Money::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MealPreference {
    NorthIndian,
    SouthIndian,
    Vegetarian,
    Mixed,
}

impl MealPreference {
    pub const ALL: [MealPreference; 4] = [
        MealPreference::NorthIndian,
        MealPreference::SouthIndian,
        MealPreference::Vegetarian,
        MealPreference::Mixed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MealPreference::NorthIndian => "north-indian",
            MealPreference::SouthIndian => "south-indian",
            MealPreference::Vegetarian => "vegetarian",
            MealPreference::Mixed => "mixed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MealPreference::NorthIndian => "North Indian Delight",
            MealPreference::SouthIndian => "South Indian Traditional",
            MealPreference::Vegetarian => "Healthy Vegetarian",
            MealPreference::Mixed => "Mixed Variety",
        }
    }
}

impl FromStr for MealPreference {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        MealPreference::ALL
            .into_iter()
            .find(|preference| preference.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| format!("unknown meal preference '{raw}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Phone,
    Email,
    Address,
    MealType,
    Message,
}

impl ContactField {
    pub const REQUIRED: [ContactField; 3] =
        [ContactField::Name, ContactField::Phone, ContactField::Address];

    pub fn as_str(self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Phone => "phone",
            ContactField::Email => "email",
            ContactField::Address => "address",
            ContactField::MealType => "meal_type",
            ContactField::Message => "message",
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
