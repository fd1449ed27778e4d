use chrono::Utc;
use shared::{
    domain::PlanName,
    error::OrderError,
    protocol::{CartSnapshot, ContactFormInput, OrderRequest},
};
use uuid::Uuid;

/// Builds the request handed to the submission collaborator.
///
/// Inputs are copied, never modified. Contact validation happens in the
/// pipeline; the only check here is that the order asks for something: at
/// least one cart item or a subscription plan.
pub fn compose(
    cart: &CartSnapshot,
    contact: &ContactFormInput,
    plan: Option<&PlanName>,
) -> Result<OrderRequest, OrderError> {
    if cart.total_items() == 0 && plan.is_none() {
        return Err(OrderError::EmptyOrder);
    }

    Ok(OrderRequest {
        request_id: Uuid::new_v4(),
        contact: contact.clone(),
        cart: cart.clone(),
        selected_plan: plan.cloned(),
        composed_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::ItemId;

    fn contact() -> ContactFormInput {
        ContactFormInput {
            name: "Asha".into(),
            phone: "+91 98765 43210".into(),
            address: "4 Lake View Road".into(),
            ..ContactFormInput::default()
        }
    }

    #[test]
    fn empty_cart_without_plan_is_rejected() {
        let err = compose(&CartSnapshot::default(), &contact(), None).expect_err("empty");
        assert_eq!(err, OrderError::EmptyOrder);
    }

    #[test]
    fn plan_alone_is_a_valid_order() {
        let plan = PlanName::from("Monthly");
        let request = compose(&CartSnapshot::default(), &contact(), Some(&plan)).expect("compose");
        assert_eq!(request.selected_plan, Some(plan));
        assert!(request.cart.is_empty());
    }

    #[test]
    fn request_copies_inputs_and_gets_a_fresh_id() {
        let cart: CartSnapshot = [(ItemId::from("vegetarian"), 2)].into_iter().collect();
        let first = compose(&cart, &contact(), None).expect("compose");
        let second = compose(&cart, &contact(), None).expect("compose");

        assert_eq!(first.cart, cart);
        assert_eq!(first.contact, contact());
        assert_ne!(first.request_id, second.request_id);
    }

    #[test]
    fn blank_contact_is_not_composer_business() {
        let cart: CartSnapshot = [(ItemId::from("vegetarian"), 1)].into_iter().collect();
        let request = compose(&cart, &ContactFormInput::default(), None).expect("compose");
        assert!(request.contact.is_blank());
    }
}
