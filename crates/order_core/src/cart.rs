use std::{collections::BTreeMap, sync::Arc};

use catalog::CatalogStore;
use shared::{domain::ItemId, error::OrderError, protocol::CartSnapshot};
use tracing::debug;

/// Per-item quantities for one session. Stored quantities are always positive.
#[derive(Debug, Clone)]
pub struct CartState {
    catalog: Arc<CatalogStore>,
    quantities: BTreeMap<ItemId, u32>,
}

impl CartState {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        Self {
            catalog,
            quantities: BTreeMap::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    /// Adds `delta` to the item's quantity, clamping at zero. Reaching zero drops the entry.
    pub fn adjust(&mut self, item_id: &ItemId, delta: i32) -> Result<u32, OrderError> {
        if !self.catalog.contains_item(item_id) {
            return Err(OrderError::UnknownItem {
                item_id: item_id.clone(),
            });
        }

        let current = i64::from(self.quantity_of(item_id));
        let next = (current + i64::from(delta)).clamp(0, i64::from(u32::MAX));
        let next = u32::try_from(next).unwrap_or(u32::MAX);
        if next == 0 {
            self.quantities.remove(item_id);
        } else {
            self.quantities.insert(item_id.clone(), next);
        }

        debug!(item_id = %item_id, delta, quantity = next, "cart adjusted");
        Ok(next)
    }

    pub fn quantity_of(&self, item_id: &ItemId) -> u32 {
        self.quantities.get(item_id).copied().unwrap_or(0)
    }

    pub fn total_items(&self) -> u64 {
        self.quantities.values().map(|qty| u64::from(*qty)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = (&ItemId, u32)> + '_ {
        self.quantities.iter().map(|(id, qty)| (id, *qty))
    }

    pub fn snapshot(&self) -> CartSnapshot {
        self.quantities
            .iter()
            .map(|(id, qty)| (id.clone(), *qty))
            .collect()
    }

    pub fn clear(&mut self) {
        self.quantities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> CartState {
        CartState::new(Arc::new(CatalogStore::tiffin_default()))
    }

    fn id(raw: &str) -> ItemId {
        ItemId::from(raw)
    }

    #[test]
    fn fresh_cart_is_empty() {
        let cart = cart();
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.quantity_of(&id("north-indian")), 0);
        assert!(cart.snapshot().is_empty());
    }

    #[test]
    fn adjust_accumulates_and_total_follows() {
        let mut cart = cart();
        assert_eq!(cart.adjust(&id("north-indian"), 1).expect("adjust"), 1);
        assert_eq!(cart.adjust(&id("north-indian"), 1).expect("adjust"), 2);
        assert_eq!(cart.adjust(&id("vegetarian"), 3).expect("adjust"), 3);
        assert_eq!(cart.total_items(), 5);
        assert_eq!(
            cart.total_items(),
            cart.lines().map(|(_, qty)| u64::from(qty)).sum::<u64>()
        );
    }

    #[test]
    fn reaching_zero_removes_the_entry() {
        let mut cart = cart();
        cart.adjust(&id("south-indian"), 2).expect("adjust");
        assert_eq!(cart.adjust(&id("south-indian"), -2).expect("adjust"), 0);
        assert!(cart.is_empty());
        assert!(cart.lines().next().is_none());
    }

    #[test]
    fn decrement_below_zero_is_clamped() {
        let mut cart = cart();
        assert_eq!(cart.adjust(&id("vegetarian"), -5).expect("adjust"), 0);
        assert!(cart.is_empty());

        cart.adjust(&id("vegetarian"), 2).expect("adjust");
        assert_eq!(cart.adjust(&id("vegetarian"), -7).expect("adjust"), 0);
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn increment_then_decrement_restores_prior_state() {
        let mut cart = cart();
        cart.adjust(&id("north-indian"), 2).expect("adjust");
        cart.adjust(&id("vegetarian"), 1).expect("adjust");
        let before = cart.snapshot();

        cart.adjust(&id("north-indian"), 1).expect("adjust");
        cart.adjust(&id("north-indian"), -1).expect("adjust");
        assert_eq!(cart.snapshot(), before);

        cart.adjust(&id("south-indian"), 1).expect("adjust");
        cart.adjust(&id("south-indian"), -1).expect("adjust");
        assert_eq!(cart.snapshot(), before);
    }

    #[test]
    fn unknown_item_is_rejected_without_side_effects() {
        let mut cart = cart();
        cart.adjust(&id("north-indian"), 1).expect("adjust");
        let before = cart.snapshot();

        let err = cart
            .adjust(&id("nonexistent-id"), 1)
            .expect_err("unknown item");
        assert_eq!(
            err,
            OrderError::UnknownItem {
                item_id: id("nonexistent-id")
            }
        );
        assert_eq!(cart.snapshot(), before);
    }

    #[test]
    fn large_increments_saturate() {
        let mut cart = cart();
        cart.adjust(&id("north-indian"), i32::MAX).expect("adjust");
        cart.adjust(&id("north-indian"), i32::MAX).expect("adjust");
        assert_eq!(
            cart.adjust(&id("north-indian"), i32::MAX).expect("adjust"),
            u32::MAX
        );
    }

    #[test]
    fn random_walk_never_goes_negative() {
        let mut cart = cart();
        let ids = [id("north-indian"), id("south-indian"), id("vegetarian")];
        let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
        for _ in 0..2_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let item = &ids[(seed % 3) as usize];
            let delta = (seed >> 8) as i32 % 7 - 3;
            cart.adjust(item, delta).expect("adjust");

            let snapshot = cart.snapshot();
            assert!(snapshot.iter().all(|(_, qty)| qty > 0));
            assert_eq!(snapshot.total_items(), cart.total_items());
        }
    }

    #[test]
    fn clear_empties_the_cart() {
        let mut cart = cart();
        cart.adjust(&id("north-indian"), 2).expect("adjust");
        cart.adjust(&id("vegetarian"), 1).expect("adjust");
        cart.clear();
        assert_eq!(cart.total_items(), 0);
        assert!(cart.is_empty());
    }
}
