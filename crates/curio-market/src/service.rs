//! Async marketplace facade.
//!
//! Wraps the ledger behind a single writer lock so that every mutation
//! (listing, sale, fee change, withdrawal) is serialized against every other
//! mutation, while query views run concurrently against consistent snapshots.
//! Status notifications are published to the broadcast feed only after an
//! operation has committed.

use crate::error::Result;
use crate::events::{ItemStatus, StatusFeed};
use crate::item::{ItemId, MarketItem};
use crate::ledger::MarketLedger;
use curio_registry::{Address, Registry, TokenId, Wallet};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

/// The marketplace service: the authoritative, sequential point of truth for
/// one [`MarketLedger`].
pub struct MarketService {
    registry: Arc<Registry>,
    ledger: RwLock<MarketLedger>,
    feed: StatusFeed,
}

impl MarketService {
    /// Create a marketplace over `registry`, administered by `owner`, with a
    /// freshly generated escrow identity.
    ///
    /// # Errors
    ///
    /// Returns error if the escrow identity cannot be generated.
    pub fn new(registry: Arc<Registry>, owner: Address, listing_fee: u64) -> Result<Self> {
        let escrow = Wallet::generate()?.address().clone();
        Ok(Self {
            registry,
            ledger: RwLock::new(MarketLedger::new(owner, escrow, listing_fee)),
            feed: StatusFeed::default(),
        })
    }

    /// The registry this marketplace trades against.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Subscribe to item status notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ItemStatus> {
        self.feed.subscribe()
    }

    /// The current listing fee.
    pub async fn listing_fee(&self) -> u64 {
        self.ledger.read().await.listing_fee()
    }

    /// Change the listing fee. Owner only.
    pub async fn set_listing_fee(&self, caller: &Address, fee: u64) -> Result<()> {
        self.ledger.write().await.set_listing_fee(caller, fee)
    }

    /// List a token for sale. See [`MarketLedger::create_market_item`].
    pub async fn create_market_item(
        &self,
        token_id: TokenId,
        price: u64,
        paid_fee: u64,
        seller: &Address,
    ) -> Result<ItemId> {
        let mut ledger = self.ledger.write().await;
        let (item_id, status) =
            ledger.create_market_item(&self.registry, token_id, price, paid_fee, seller)?;
        // Published before the lock is released so feed order matches commit
        // order; the send is synchronous and never blocks.
        self.feed.publish(status);
        drop(ledger);
        Ok(item_id)
    }

    /// Purchase a listed item. See [`MarketLedger::create_market_sale`].
    pub async fn create_market_sale(
        &self,
        item_id: ItemId,
        paid: u64,
        buyer: &Address,
    ) -> Result<()> {
        let mut ledger = self.ledger.write().await;
        let status = ledger.create_market_sale(&self.registry, item_id, paid, buyer)?;
        // Same ordering rule as listing: publish under the write lock.
        self.feed.publish(status);
        drop(ledger);
        Ok(())
    }

    /// All unsold items.
    pub async fn fetch_market_items(&self) -> Vec<MarketItem> {
        self.ledger.read().await.fetch_market_items()
    }

    /// Items the caller bought.
    pub async fn fetch_my_nfts(&self, caller: &Address) -> Vec<MarketItem> {
        self.ledger.read().await.fetch_my_nfts(caller)
    }

    /// Items the caller listed.
    pub async fn fetch_items_created(&self, caller: &Address) -> Vec<MarketItem> {
        self.ledger.read().await.fetch_items_created(caller)
    }

    /// The administrative owner's address. Owner only.
    pub async fn owner(&self, caller: &Address) -> Result<Address> {
        self.ledger.read().await.owner(caller)
    }

    /// The owner's withdrawable fee balance. Owner only.
    pub async fn owner_balance(&self, caller: &Address) -> Result<u64> {
        self.ledger.read().await.owner_balance(caller)
    }

    /// Withdraw accumulated fees. Owner only.
    pub async fn withdraw_fees(&self, caller: &Address) -> Result<u64> {
        self.ledger.write().await.withdraw_fees(caller)
    }

    /// Sale proceeds credited to a seller so far.
    pub async fn proceeds_of(&self, seller: &Address) -> u64 {
        self.ledger.read().await.proceeds_of(seller)
    }

    /// Number of records ever created.
    pub async fn item_count(&self) -> u64 {
        self.ledger.read().await.item_count()
    }
}

#[allow(clippy::missing_fields_in_debug)]
impl std::fmt::Debug for MarketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketService")
            .field("registry", &self.registry.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketError;
    use curio_registry::{MetadataStore, TokenMetadata};

    const FEE: u64 = 25;

    fn addr() -> Address {
        Wallet::generate().expect("wallet").address().clone()
    }

    fn setup() -> (Arc<MarketService>, Arc<Registry>, MetadataStore, Address) {
        let registry = Arc::new(Registry::new().expect("registry"));
        let owner = addr();
        let service =
            Arc::new(MarketService::new(Arc::clone(&registry), owner.clone(), FEE).expect("service"));
        (service, registry, MetadataStore::new(), owner)
    }

    fn mint(registry: &Registry, store: &MetadataStore, holder: &Address) -> TokenId {
        let pointer = store
            .put(&TokenMetadata::new("t", "test", "curio://img"))
            .expect("put");
        registry.mint(holder, pointer)
    }

    #[tokio::test]
    async fn list_and_sell_through_facade() {
        let (service, registry, store, owner) = setup();
        let seller = addr();
        let buyer = addr();
        let token = mint(&registry, &store, &seller);

        let item_id = service
            .create_market_item(token, 1000, FEE, &seller)
            .await
            .expect("list");
        assert_eq!(item_id, 1);
        assert_eq!(service.fetch_market_items().await.len(), 1);

        service
            .create_market_sale(item_id, 1000, &buyer)
            .await
            .expect("sale");

        assert!(service.fetch_market_items().await.is_empty());
        assert_eq!(service.fetch_my_nfts(&buyer).await.len(), 1);
        assert_eq!(service.proceeds_of(&seller).await, 1000);
        assert_eq!(service.owner_balance(&owner).await.expect("balance"), FEE);
        assert_eq!(registry.owner_of(token).expect("owner"), buyer);
    }

    #[tokio::test]
    async fn exactly_two_notifications_per_item() {
        let (service, registry, store, _owner) = setup();
        let seller = addr();
        let buyer = addr();
        let token = mint(&registry, &store, &seller);
        let mut rx = service.subscribe();

        let item_id = service
            .create_market_item(token, 500, FEE, &seller)
            .await
            .expect("list");
        service
            .create_market_sale(item_id, 500, &buyer)
            .await
            .expect("sale");

        let created = rx.recv().await.expect("created event");
        assert_eq!(created.item_id, item_id);
        assert!(!created.sold);

        let sold = rx.recv().await.expect("sold event");
        assert_eq!(sold.item_id, item_id);
        assert!(sold.sold);

        // No further emissions for this item
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn failed_operations_emit_nothing() {
        let (service, registry, store, _owner) = setup();
        let seller = addr();
        let token = mint(&registry, &store, &seller);
        let mut rx = service.subscribe();

        let result = service.create_market_item(token, 1000, FEE + 1, &seller).await;
        assert!(matches!(result, Err(MarketError::FeeMismatch { .. })));
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn concurrent_listings_stay_gapless() {
        let (service, registry, store, _owner) = setup();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let seller = addr();
            let token = mint(&registry, &store, &seller);
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .create_market_item(token, 100, FEE, &seller)
                    .await
                    .expect("list")
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("join"));
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
        assert_eq!(service.item_count().await, 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn feed_never_reports_sold_before_created() {
        let (service, registry, store, _owner) = setup();
        let mut rx = service.subscribe();

        // Race several full list-then-sell lifecycles against each other.
        let mut handles = Vec::new();
        for _ in 0..6 {
            let seller = addr();
            let buyer = addr();
            let token = mint(&registry, &store, &seller);
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                let item_id = service
                    .create_market_item(token, 100, FEE, &seller)
                    .await
                    .expect("list");
                service
                    .create_market_sale(item_id, 100, &buyer)
                    .await
                    .expect("sale");
            }));
        }
        for handle in handles {
            handle.await.expect("join");
        }

        // Two notifications per item, and for every item the unsold snapshot
        // arrives strictly before the sold one.
        let mut seen_created = std::collections::HashSet::new();
        for _ in 0..12 {
            let status = rx.recv().await.expect("recv");
            if status.sold {
                assert!(
                    seen_created.contains(&status.item_id),
                    "item {} reported sold before it was created",
                    status.item_id
                );
            } else {
                assert!(seen_created.insert(status.item_id));
            }
        }
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn views_snapshot_consistently_during_mutations() {
        let (service, registry, store, _owner) = setup();
        let buyer = addr();

        let mut writers = Vec::new();
        for _ in 0..6 {
            let seller = addr();
            let token = mint(&registry, &store, &seller);
            let service = Arc::clone(&service);
            let buyer = buyer.clone();
            writers.push(tokio::spawn(async move {
                let item_id = service
                    .create_market_item(token, 100, FEE, &seller)
                    .await
                    .expect("list");
                service
                    .create_market_sale(item_id, 100, &buyer)
                    .await
                    .expect("sale");
            }));
        }

        // Read snapshots while the writers are in flight. Each snapshot must
        // be internally consistent: a record is either listed or bought,
        // never both and never torn.
        let reader = {
            let service = Arc::clone(&service);
            let buyer = buyer.clone();
            tokio::spawn(async move {
                let mut last_total = 0u64;
                for _ in 0..50 {
                    let unsold = service.fetch_market_items().await;
                    let bought = service.fetch_my_nfts(&buyer).await;

                    assert!(unsold.iter().all(|i| !i.sold && i.owner.is_escrow()));
                    assert!(bought
                        .iter()
                        .all(|i| i.sold && i.owner.as_address() == Some(&buyer)));

                    let unsold_ids: Vec<u64> = unsold.iter().map(|i| i.item_id).collect();
                    assert!(unsold_ids.windows(2).all(|w| w[0] < w[1]));
                    assert!(!unsold
                        .iter()
                        .any(|u| bought.iter().any(|b| b.item_id == u.item_id)));

                    let total = service.item_count().await;
                    assert!(total >= last_total, "record count went backwards");
                    last_total = total;

                    tokio::task::yield_now().await;
                }
            })
        };

        for handle in writers {
            handle.await.expect("join writer");
        }
        reader.await.expect("join reader");

        // All lifecycles completed: nothing listed, everything bought.
        assert!(service.fetch_market_items().await.is_empty());
        assert_eq!(service.fetch_my_nfts(&buyer).await.len(), 6);
    }

    #[tokio::test]
    async fn admin_surface_gated() {
        let (service, _registry, _store, owner) = setup();
        let stranger = addr();

        assert!(matches!(
            service.owner(&stranger).await,
            Err(MarketError::Unauthorized)
        ));
        assert!(matches!(
            service.withdraw_fees(&stranger).await,
            Err(MarketError::Unauthorized)
        ));
        assert_eq!(service.owner(&owner).await.expect("owner"), owner);
    }

    #[tokio::test]
    async fn fee_change_applies_to_later_listings() {
        let (service, registry, store, owner) = setup();
        let seller = addr();
        let token = mint(&registry, &store, &seller);

        service.set_listing_fee(&owner, 40).await.expect("set fee");
        assert_eq!(service.listing_fee().await, 40);

        let result = service.create_market_item(token, 1000, FEE, &seller).await;
        assert!(matches!(
            result,
            Err(MarketError::FeeMismatch { required: 40, .. })
        ));

        service
            .create_market_item(token, 1000, 40, &seller)
            .await
            .expect("list at new fee");
    }
}
