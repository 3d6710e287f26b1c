//! Cart Store

use std::fmt;

use tracing::{debug, warn};

use crate::cart::{
    Cart, CartError, CartStorage, Dish, DishUuid, SpiceLevel, StoreError, VendorCartGroup,
    VendorRef, VendorUuid,
};

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Cart) + Send>;

/// Owns the cart, writes it through to storage and notifies subscribers after each change.
///
/// Subscribers receive the new cart and derive whatever they need from it (item counts,
/// totals); the store keeps no derived state of its own.
pub struct CartStore<S> {
    cart: Cart,
    storage: S,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S> fmt::Debug for CartStore<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("storage", &self.storage)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S: CartStorage> CartStore<S> {
    /// Open the store, restoring any previously saved cart.
    ///
    /// A stored cart that cannot be read is discarded and the store starts empty.
    pub fn open(storage: S) -> Self {
        let cart = match storage.load() {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::default(),
            Err(error) => {
                warn!("discarding unreadable stored cart: {error}");

                Cart::default()
            }
        };

        Self {
            cart,
            storage,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// An owned copy of the current cart for totals and submission.
    pub fn snapshot(&self) -> Cart {
        self.cart.clone()
    }

    /// Total number of portions in the cart.
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Register a listener called with the new cart after every successful change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Cart) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);

        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));

        id
    }

    /// Remove a listener. Returns `false` when it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();

        self.listeners.retain(|(listener_id, _)| *listener_id != id);

        self.listeners.len() != before
    }

    /// Add `quantity` portions of a dish from a vendor.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Cart`] when the item is rejected and [`StoreError::Storage`] when
    /// the cart cannot be saved. The cart is unchanged in both cases.
    pub fn add_item(
        &mut self,
        vendor: &VendorRef,
        dish: &Dish,
        quantity: u32,
        option: Option<SpiceLevel>,
    ) -> Result<(), StoreError> {
        self.mutate(|cart| cart.add_item(vendor, dish, quantity, option))
    }

    /// Remove `quantity` portions of a line, dropping it at zero.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_item`].
    pub fn remove_item(
        &mut self,
        vendor: VendorUuid,
        dish: DishUuid,
        option: Option<SpiceLevel>,
        quantity: u32,
    ) -> Result<(), StoreError> {
        self.mutate(|cart| cart.remove_item(vendor, dish, option, quantity))
    }

    /// Remove a line regardless of its quantity.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_item`].
    pub fn delete_item(
        &mut self,
        vendor: VendorUuid,
        dish: DishUuid,
        option: Option<SpiceLevel>,
    ) -> Result<(), StoreError> {
        self.mutate(|cart| cart.delete_item(vendor, dish, option))
    }

    /// Set a line's quantity. Zero removes the line; negative quantities are rejected.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_item`].
    pub fn set_quantity(
        &mut self,
        vendor: VendorUuid,
        dish: DishUuid,
        option: Option<SpiceLevel>,
        quantity: i64,
    ) -> Result<(), StoreError> {
        self.mutate(|cart| cart.set_quantity(vendor, dish, option, quantity))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] when the empty cart cannot be saved.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.mutate(|cart| {
            cart.clear();

            Ok(())
        })
    }

    /// Take back the portions of a submitted order, keeping anything added since.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] when the cart cannot be saved.
    pub fn remove_submitted(&mut self, submitted: &[VendorCartGroup]) -> Result<(), StoreError> {
        self.mutate(|cart| cart.remove_submitted(submitted))
    }

    fn mutate<F>(&mut self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CartError>,
    {
        let mut next = self.cart.clone();

        change(&mut next)?;

        self.storage.save(&next)?;
        self.cart = next;

        debug!(
            groups = self.cart.groups().len(),
            items = self.cart.item_count(),
            "cart.changed"
        );

        for (_, listener) in &mut self.listeners {
            listener(&self.cart);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    };

    use testresult::TestResult;

    use crate::cart::{
        CART_STORAGE_KEY, MemoryStorage, StorageError,
        fixtures::{dish, vendor},
    };

    use super::*;

    #[derive(Debug, Default)]
    struct FailingStorage;

    impl CartStorage for FailingStorage {
        fn load(&self) -> Result<Option<Cart>, StorageError> {
            Ok(None)
        }

        fn save(&mut self, _cart: &Cart) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[test]
    fn every_change_is_persisted() -> TestResult {
        let mut store = CartStore::open(MemoryStorage::new());

        store.add_item(&vendor(1, "Thai", 500), &dish(10, "Pad Thai", 1200), 1, None)?;

        let stored = store.storage.load()?;

        assert_eq!(stored.as_ref(), Some(store.cart()));

        store.clear()?;

        assert_eq!(store.storage.load()?, Some(Cart::default()));

        Ok(())
    }

    #[test]
    fn reopening_restores_saved_cart() -> TestResult {
        let mut store = CartStore::open(MemoryStorage::new());

        store.add_item(&vendor(1, "Thai", 500), &dish(10, "Pad Thai", 1200), 3, None)?;

        let reopened = CartStore::open(store.storage.clone());

        assert_eq!(reopened.item_count(), 3);

        Ok(())
    }

    #[test]
    fn unreadable_stored_cart_opens_empty() {
        let mut storage = MemoryStorage::new();

        storage.insert(CART_STORAGE_KEY, "{not json");

        assert!(CartStore::open(storage).cart().is_empty());
    }

    #[test]
    fn listeners_see_every_change_once() -> TestResult {
        let mut store = CartStore::open(MemoryStorage::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let badge = Arc::new(AtomicU64::new(0));

        let seen_calls = Arc::clone(&calls);
        let seen_badge = Arc::clone(&badge);

        store.subscribe(move |cart| {
            seen_calls.fetch_add(1, Ordering::SeqCst);
            seen_badge.store(cart.item_count(), Ordering::SeqCst);
        });

        let thai = vendor(1, "Thai", 500);
        let pad_thai = dish(10, "Pad Thai", 1200);

        store.add_item(&thai, &pad_thai, 2, None)?;
        store.add_item(&vendor(2, "Pizza", 350), &dish(20, "Margherita", 800), 1, None)?;
        store.set_quantity(thai.uuid, pad_thai.uuid, None, 5)?;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(badge.load(Ordering::SeqCst), store.item_count());
        assert_eq!(store.item_count(), 6);

        Ok(())
    }

    #[test]
    fn rejected_change_does_not_notify() -> TestResult {
        let mut store = CartStore::open(MemoryStorage::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let thai = vendor(1, "Thai", 500);
        let pad_thai = dish(10, "Pad Thai", 1200);

        store.add_item(&thai, &pad_thai, 2, None)?;
        store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let result = store.set_quantity(thai.uuid, pad_thai.uuid, None, -3);

        assert!(matches!(
            result,
            Err(StoreError::Cart(CartError::NegativeQuantity(-3)))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.item_count(), 2);

        Ok(())
    }

    #[test]
    fn unsubscribed_listener_is_not_called() -> TestResult {
        let mut store = CartStore::open(MemoryStorage::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let id = store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));

        store.add_item(&vendor(1, "Thai", 500), &dish(10, "Pad Thai", 1200), 1, None)?;

        assert_eq!(calls.load(Ordering::SeqCst), 0);

        Ok(())
    }

    #[test]
    fn failed_save_leaves_cart_untouched() {
        let mut store = CartStore::open(FailingStorage);

        let result = store.add_item(&vendor(1, "Thai", 500), &dish(10, "Pad Thai", 1200), 1, None);

        assert!(matches!(result, Err(StoreError::Storage(_))));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() -> TestResult {
        let mut store = CartStore::open(MemoryStorage::new());
        let thai = vendor(1, "Thai", 500);

        store.add_item(&thai, &dish(10, "Pad Thai", 1200), 1, None)?;

        let snapshot = store.snapshot();

        store.clear()?;

        assert_eq!(snapshot.item_count(), 1);
        assert!(store.cart().is_empty());

        Ok(())
    }
}
