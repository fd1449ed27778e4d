use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ContactField, ItemId, Money, PlanName};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub meal_type: String,
    #[serde(default)]
    pub message: String,
}

impl ContactFormInput {
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Phone => &self.phone,
            ContactField::Email => &self.email,
            ContactField::Address => &self.address,
            ContactField::MealType => &self.meal_type,
            ContactField::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let slot = match field {
            ContactField::Name => &mut self.name,
            ContactField::Phone => &mut self.phone,
            ContactField::Email => &mut self.email,
            ContactField::Address => &mut self.address,
            ContactField::MealType => &mut self.meal_type,
            ContactField::Message => &mut self.message,
        };
        *slot = value.into();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// Owned copy of cart quantities. Never holds a zero quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<ItemId, u32>", into = "BTreeMap<ItemId, u32>")]
pub struct CartSnapshot(BTreeMap<ItemId, u32>);

impl From<BTreeMap<ItemId, u32>> for CartSnapshot {
    fn from(quantities: BTreeMap<ItemId, u32>) -> Self {
        quantities.into_iter().collect()
    }
}

impl From<CartSnapshot> for BTreeMap<ItemId, u32> {
    fn from(snapshot: CartSnapshot) -> Self {
        snapshot.0
    }
}

impl CartSnapshot {
    pub fn quantity_of(&self, item_id: &ItemId) -> u32 {
        self.0.get(item_id).copied().unwrap_or(0)
    }

    pub fn total_items(&self) -> u64 {
        self.0.values().map(|qty| u64::from(*qty)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> + '_ {
        self.0.iter().map(|(id, qty)| (id, *qty))
    }
}

impl FromIterator<(ItemId, u32)> for CartSnapshot {
    fn from_iter<T: IntoIterator<Item = (ItemId, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().filter(|(_, qty)| *qty > 0).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub request_id: Uuid,
    pub contact: ContactFormInput,
    pub cart: CartSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_plan: Option<PlanName>,
    pub composed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateLine {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEstimate {
    pub lines: Vec<EstimateLine>,
    pub items_subtotal: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanName>,
    pub plan_price: Money,
    pub total: Money,
    pub savings: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            message: message.into(),
        }
    }
}
