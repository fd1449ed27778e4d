use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::{collections::HashSet, fs, path::Path};
use tracing::info;

use shared::{
    domain::{ItemId, MenuItem, Money, PlanName, PricingPlan},
    error::OrderError,
    protocol::{EstimateLine, OrderEstimate, OrderRequest},
};

/// Read-only menu and plan catalog, built once at startup.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    menu_items: Vec<MenuItem>,
    plans: Vec<PricingPlan>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    menu_items: Vec<MenuItemRecord>,
    #[serde(default)]
    plans: Vec<PlanRecord>,
}

#[derive(Debug, Deserialize)]
struct MenuItemRecord {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    price: PriceValue,
    original_price: Option<PriceValue>,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    rating: f32,
    #[serde(default)]
    prep_time_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct PlanRecord {
    name: String,
    price: PriceValue,
    #[serde(default)]
    period: String,
    original_price: Option<PriceValue>,
    savings: Option<String>,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    popular: bool,
}

/// Prices may be written as whole rupees (`180`) or as a price tag (`"₹1,200"`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Rupees(u64),
    Tag(String),
}

impl PriceValue {
    fn to_money(&self) -> Result<Money> {
        match self {
            PriceValue::Rupees(rupees) => rupees
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| anyhow!("price {rupees} is too large")),
            PriceValue::Tag(raw) => Money::parse_rupees(raw).map_err(|err| anyhow!(err)),
        }
    }
}

impl CatalogStore {
    pub fn new(menu_items: Vec<MenuItem>, plans: Vec<PricingPlan>) -> Result<Self> {
        validate(&menu_items, &plans)?;
        Ok(Self { menu_items, plans })
    }

    /// The tiffin menu and the Daily / Weekly / Monthly plans.
    pub fn tiffin_default() -> Self {
        let menu_items = vec![
            menu_item(
                "north-indian",
                "North Indian Delight",
                "Dal makhani, butter chicken, basmati rice, naan, raita & pickle",
                (180, 220),
                &["Rich & creamy", "Protein-rich", "Authentic taste"],
                4.8,
                35,
            ),
            menu_item(
                "south-indian",
                "South Indian Traditional",
                "Sambar, rasam, rice, vegetable curry, coconut chutney & papadum",
                (160, 190),
                &["Light & healthy", "Coconut-based", "Traditional spices"],
                4.7,
                30,
            ),
            menu_item(
                "vegetarian",
                "Healthy Vegetarian",
                "Mixed vegetables, chapati, yellow dal, salad & fresh yogurt",
                (150, 180),
                &["Low calories", "High fiber", "Balanced nutrition"],
                4.6,
                25,
            ),
        ];

        let plans = vec![
            PricingPlan {
                name: PlanName::from("Daily"),
                price: Money::from_rupees(180),
                period: "per meal".into(),
                original_price: None,
                savings_label: None,
                features: strings(&[
                    "Fresh daily preparation",
                    "Free delivery",
                    "Quality guarantee",
                    "Customer support",
                ]),
                is_featured: false,
            },
            PricingPlan {
                name: PlanName::from("Weekly"),
                price: Money::from_rupees(1_200),
                period: "7 meals".into(),
                original_price: Some(Money::from_rupees(1_260)),
                savings_label: Some("Save ₹60".into()),
                features: strings(&[
                    "5% discount",
                    "Priority delivery",
                    "Menu customization",
                    "Weekly menu planning",
                ]),
                is_featured: false,
            },
            PricingPlan {
                name: PlanName::from("Monthly"),
                price: Money::from_rupees(4_800),
                period: "30 meals".into(),
                original_price: Some(Money::from_rupees(5_400)),
                savings_label: Some("Save ₹600".into()),
                features: strings(&[
                    "12% discount",
                    "Premium packaging",
                    "Flexible schedule",
                    "Dedicated support",
                    "Free weekend meals",
                ]),
                is_featured: true,
            },
        ];

        Self { menu_items, plans }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(raw).context("failed to parse catalog toml")?;

        let menu_items = file
            .menu_items
            .into_iter()
            .map(MenuItemRecord::into_menu_item)
            .collect::<Result<Vec<_>>>()?;
        let plans = file
            .plans
            .into_iter()
            .map(PlanRecord::into_plan)
            .collect::<Result<Vec<_>>>()?;

        Self::new(menu_items, plans)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file '{}'", path.display()))?;
        let catalog = Self::from_toml_str(&raw)
            .with_context(|| format!("invalid catalog file '{}'", path.display()))?;
        info!(
            path = %path.display(),
            menu_items = catalog.menu_items.len(),
            plans = catalog.plans.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    pub fn list_menu_items(&self) -> &[MenuItem] {
        &self.menu_items
    }

    pub fn list_plans(&self) -> &[PricingPlan] {
        &self.plans
    }

    pub fn menu_item(&self, item_id: &ItemId) -> Option<&MenuItem> {
        self.menu_items.iter().find(|item| &item.id == item_id)
    }

    pub fn contains_item(&self, item_id: &ItemId) -> bool {
        self.menu_item(item_id).is_some()
    }

    pub fn plan(&self, name: &str) -> Option<&PricingPlan> {
        self.plans.iter().find(|plan| plan.name.matches(name))
    }

    pub fn featured_plan(&self) -> Option<&PricingPlan> {
        self.plans.iter().find(|plan| plan.is_featured)
    }

    /// Prices an order against this catalog.
    pub fn estimate(&self, request: &OrderRequest) -> Result<OrderEstimate, OrderError> {
        let mut lines = Vec::with_capacity(request.cart.len());
        let mut savings = Money::ZERO;
        for (item_id, quantity) in request.cart.iter() {
            let item = self
                .menu_item(item_id)
                .ok_or_else(|| OrderError::UnknownItem {
                    item_id: item_id.clone(),
                })?;
            savings = savings.saturating_add(item.savings().times(quantity));
            lines.push(EstimateLine {
                item_id: item_id.clone(),
                name: item.name.clone(),
                quantity,
                unit_price: item.price,
                subtotal: item.price.times(quantity),
            });
        }
        let items_subtotal: Money = lines.iter().map(|line| line.subtotal).sum();

        let plan = match &request.selected_plan {
            Some(name) => Some(self.plan(name.as_str()).ok_or_else(|| OrderError::UnknownPlan {
                plan: name.clone(),
            })?),
            None => None,
        };
        let plan_price = plan.map(|plan| plan.price).unwrap_or(Money::ZERO);
        if let Some(plan) = plan {
            savings = savings.saturating_add(plan.savings());
        }

        Ok(OrderEstimate {
            lines,
            items_subtotal,
            plan: plan.map(|plan| plan.name.clone()),
            plan_price,
            total: items_subtotal.saturating_add(plan_price),
            savings,
        })
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::tiffin_default()
    }
}

impl MenuItemRecord {
    fn into_menu_item(self) -> Result<MenuItem> {
        let price = self
            .price
            .to_money()
            .with_context(|| format!("menu item '{}' has an invalid price", self.id))?;
        let original_price = match &self.original_price {
            Some(raw) => raw.to_money().with_context(|| {
                format!("menu item '{}' has an invalid original_price", self.id)
            })?,
            None => price,
        };
        Ok(MenuItem {
            id: ItemId::new(self.id.trim()),
            name: self.name,
            description: self.description,
            price,
            original_price,
            features: self.features,
            rating: self.rating,
            prep_time_minutes: self.prep_time_minutes,
        })
    }
}

impl PlanRecord {
    fn into_plan(self) -> Result<PricingPlan> {
        let price = self
            .price
            .to_money()
            .with_context(|| format!("plan '{}' has an invalid price", self.name))?;
        let original_price = self
            .original_price
            .as_ref()
            .map(PriceValue::to_money)
            .transpose()
            .with_context(|| format!("plan '{}' has an invalid original_price", self.name))?;
        Ok(PricingPlan {
            name: PlanName::new(self.name.trim()),
            price,
            period: self.period,
            original_price,
            savings_label: self.savings,
            features: self.features,
            is_featured: self.popular,
        })
    }
}

fn validate(menu_items: &[MenuItem], plans: &[PricingPlan]) -> Result<()> {
    if menu_items.is_empty() {
        bail!("catalog must contain at least one menu item");
    }

    let mut item_ids = HashSet::new();
    for item in menu_items {
        if item.id.as_str().is_empty() || item.name.trim().is_empty() {
            bail!("menu items need a non-empty id and name");
        }
        if !item_ids.insert(item.id.as_str()) {
            bail!("duplicate menu item id '{}'", item.id);
        }
        if !(0.0..=5.0).contains(&item.rating) {
            bail!(
                "menu item '{}' has rating {} outside 0..=5",
                item.id,
                item.rating
            );
        }
    }

    let mut plan_names = HashSet::new();
    for plan in plans {
        if plan.name.as_str().is_empty() {
            bail!("plans need a non-empty name");
        }
        if !plan_names.insert(plan.name.as_str().to_ascii_lowercase()) {
            bail!("duplicate plan name '{}'", plan.name);
        }
    }

    Ok(())
}

fn menu_item(
    id: &str,
    name: &str,
    description: &str,
    (price, original_price): (u64, u64),
    features: &[&str],
    rating: f32,
    prep_time_minutes: u32,
) -> MenuItem {
    MenuItem {
        id: ItemId::from(id),
        name: name.into(),
        description: description.into(),
        price: Money::from_rupees(price),
        original_price: Money::from_rupees(original_price),
        features: strings(features),
        rating,
        prep_time_minutes,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
