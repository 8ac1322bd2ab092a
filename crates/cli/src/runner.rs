use tracing::info;

use storefront_analytics::DataLayer;
use storefront_core::{Destination, Navigation};
use storefront_session::{KeyValueStore, SessionError, Storefront, User};

use crate::script::Step;

/// Perform one scripted step against the session.
pub fn execute<P, S, D>(
    store: &mut Storefront<P, S, D>,
    step: &Step,
) -> Result<Navigation, SessionError>
where
    P: KeyValueStore,
    S: KeyValueStore,
    D: DataLayer,
{
    let navigation = match step {
        Step::Visit(destination) => {
            let title = title(destination);
            store.page_view(destination, &title)?;
            if *destination == Destination::Cart {
                store.view_cart()?;
            }
            Navigation::Navigate(destination.clone())
        }
        Step::List(filter) => {
            let products = store.show_listing(*filter)?;
            info!(list = %filter.list_name(), products = products.len(), "listing shown");
            Navigation::Navigate(Destination::Shop)
        }
        Step::Select { id, index } => store.select_product(id, *index)?,
        Step::View(id) => match store.view_product(id)? {
            Navigation::Stay => Navigation::Navigate(Destination::Product(id.clone())),
            other => other,
        },
        Step::Add { id, quantity } => {
            store.add_to_cart(id, *quantity)?;
            Navigation::Stay
        }
        Step::Update { id, delta } => {
            store.update_quantity(id, *delta)?;
            Navigation::Stay
        }
        Step::Remove(id) => {
            store.remove_from_cart(id)?;
            Navigation::Stay
        }
        Step::Cart => {
            let cart = store.cart();
            info!(
                lines = cart.items().len(),
                items = cart.item_count(),
                subtotal = %cart.subtotal(),
                total = %cart.total(),
                "cart"
            );
            Navigation::Stay
        }
        Step::Checkout => store.enter_delivery()?,
        Step::Delivery(info) => store.submit_delivery(info.clone())?,
        Step::Payment => store.enter_payment()?,
        Step::Pay(payment) => store.submit_payment(payment.clone())?,
        Step::Confirm => {
            let confirmation = store.enter_confirmation()?;
            if let Some(order) = &confirmation.order {
                info!(order_id = %order.id, total = %order.total, "order confirmed");
            }
            confirmation.navigation
        }
        Step::Login { id, name, email } => {
            store.login(User::new(id.clone(), name.clone(), email.clone()))?;
            Navigation::Stay
        }
        Step::Logout => {
            store.logout()?;
            Navigation::Navigate(Destination::Home)
        }
        Step::Newsletter(location) => {
            store.newsletter_signup(location)?;
            Navigation::Stay
        }
        Step::Field { form_id, field } => {
            store.form_interaction(form_id, field)?;
            Navigation::Stay
        }
    };

    Ok(navigation)
}

fn title(destination: &Destination) -> String {
    match destination {
        Destination::Home => "Home".to_string(),
        Destination::Shop => "Shop".to_string(),
        Destination::Category(name) => format!("{name} Collection"),
        Destination::Product(id) => format!("Product {id}"),
        Destination::Cart => "Cart".to_string(),
        Destination::CheckoutDelivery => "Checkout - Delivery".to_string(),
        Destination::CheckoutPayment => "Checkout - Payment".to_string(),
        Destination::CheckoutConfirmation => "Order Confirmation".to_string(),
        Destination::Account => "Account".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use storefront_analytics::InMemoryDataLayer;
    use storefront_catalog::Catalog;
    use storefront_checkout::SequentialOrderIdGenerator;
    use storefront_session::{InMemoryKeyValueStore, StorefrontConfig};

    use crate::script::{DEMO_SCRIPT, parse_script};

    #[test]
    fn demo_script_records_one_purchase() {
        let layer = Arc::new(InMemoryDataLayer::new());
        let mut store = Storefront::load(
            StorefrontConfig::default(),
            Arc::new(Catalog::bundled().unwrap()),
            InMemoryKeyValueStore::new(),
            InMemoryKeyValueStore::new(),
            layer.clone(),
        )
        .unwrap()
        .with_order_ids(Arc::new(SequentialOrderIdGenerator::new()));

        let mut after_pay = None;
        for step in parse_script(DEMO_SCRIPT).unwrap() {
            let nav = execute(&mut store, &step).unwrap();
            if matches!(step, Step::Pay(_)) {
                after_pay = Some(nav);
            }
        }

        assert_eq!(
            after_pay,
            Some(Navigation::Navigate(Destination::CheckoutConfirmation))
        );
        assert!(store.cart().is_empty());
        assert!(store.user().is_none());

        let purchases = layer.named("purchase").unwrap();
        assert_eq!(purchases.len(), 1);
        let payload = serde_json::to_value(purchases[0].payload()).unwrap();
        assert_eq!(payload["ecommerce"]["transaction_id"], "ORD-0001");
        assert_eq!(payload["ecommerce"]["value"], 279.97);

        let names = layer.names().unwrap();
        assert_eq!(names.first(), Some(&"page_view"));
        assert_eq!(names.last(), Some(&"logout"));
    }
}
