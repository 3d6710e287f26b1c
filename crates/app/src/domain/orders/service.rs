//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use dishpatch::{
    Cart, CartLineItem, RoundedTotals, VendorCartGroup,
    cart::{CartError, DishUuid, VendorUuid},
    compute_totals,
    schedule::validate_schedule,
};
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        orders::{
            data::{BackfillReport, CheckoutPolicy, NewOrder, OrderPage, OrderQuery},
            errors::{OrdersServiceError, is_searchable_id_conflict},
            records::{OrderRecord, OrderStatus, OrderUuid},
            repositories::{OrderInsert, OrderRow, PgOrderLinesRepository, PgOrdersRepository},
            search::SearchFilter,
            searchable_id::{SearchableIdGenerator, SearchableIdSource},
        },
        vendors::{
            records::{DishRecord, VendorRecord},
            repositories::{PgDishesRepository, PgVendorsRepository},
        },
    },
};

/// Attempts at a unique searchable id before giving up.
pub const MAX_SEARCHABLE_ID_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    policy: CheckoutPolicy,
    ids: Arc<dyn SearchableIdSource>,
    orders: PgOrdersRepository,
    lines: PgOrderLinesRepository,
    vendors: PgVendorsRepository,
    dishes: PgDishesRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, policy: CheckoutPolicy) -> Self {
        Self {
            db,
            policy,
            ids: Arc::new(SearchableIdGenerator::new()),
            orders: PgOrdersRepository::new(),
            lines: PgOrderLinesRepository::new(),
            vendors: PgVendorsRepository::new(),
            dishes: PgDishesRepository::new(),
        }
    }

    /// Take searchable ids from `ids` instead of a fresh [`SearchableIdGenerator`].
    #[must_use]
    pub fn with_searchable_ids(mut self, ids: Arc<dyn SearchableIdSource>) -> Self {
        self.ids = ids;

        self
    }

    /// Rebuild the submitted groups from vendor records and menus. Only the vendor, dish,
    /// option and quantity of each line are taken from the payload.
    async fn reprice(&self, groups: Vec<VendorCartGroup>) -> Result<Cart, OrdersServiceError> {
        let vendor_uuids: Vec<VendorUuid> = groups.iter().map(|group| group.vendor).collect();

        let dish_uuids: Vec<DishUuid> = groups
            .iter()
            .flat_map(|group| group.items.iter().map(|item| item.dish))
            .collect();

        let mut tx = self.db.begin().await?;

        let vendors: FxHashMap<VendorUuid, VendorRecord> = self
            .vendors
            .get_vendors(&mut tx, &vendor_uuids)
            .await?
            .into_iter()
            .map(|record| (record.uuid, record))
            .collect();

        let menu: FxHashMap<DishUuid, DishRecord> = self
            .dishes
            .get_dishes(&mut tx, &dish_uuids)
            .await?
            .into_iter()
            .map(|record| (record.uuid, record))
            .collect();

        tx.commit().await?;

        let groups = groups
            .into_iter()
            .map(|group| -> Result<VendorCartGroup, OrdersServiceError> {
                let record = vendors
                    .get(&group.vendor)
                    .ok_or(OrdersServiceError::UnknownVendor(group.vendor))?;

                let items = group
                    .items
                    .iter()
                    .map(|item| reprice_line(&menu, group.vendor, item))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(VendorCartGroup {
                    vendor: group.vendor,
                    store_name: record.store_name.clone(),
                    delivery_fee: record.delivery_fee,
                    items,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Cart::from_groups(groups)?)
    }

    async fn attach_groups(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        rows: Vec<OrderRow>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let uuids: Vec<OrderUuid> = rows.iter().map(|row| row.uuid).collect();

        let mut groups = self.lines.list_groups(tx, &uuids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let order_groups = groups.remove(&row.uuid.into_uuid()).unwrap_or_default();

                row.into_record(order_groups)
            })
            .collect())
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn create_order(
        &self,
        order: NewOrder,
        submitted_at: Timestamp,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let now = submitted_at
            .to_zoned(self.policy.time_zone.clone())
            .datetime();

        validate_schedule(&order.schedule, now)?;

        order
            .contact
            .validate()
            .map_err(|_blank| OrdersServiceError::MissingRequiredData)?;

        let cart = self.reprice(order.groups).await?;

        if cart.is_empty() {
            return Err(OrdersServiceError::EmptyOrder);
        }

        let totals: RoundedTotals =
            compute_totals(&cart, order.schedule.delivery_mode, self.policy.tax_rate)?
                .rounded()?;

        let grand_total_display = self.policy.display_amount(totals.grand_total)?;

        if let Some(client_totals) = order.client_totals
            && client_totals != totals
        {
            warn!(
                order = %order.uuid,
                client_grand_total = client_totals.grand_total,
                grand_total = totals.grand_total,
                "order.totals_mismatch"
            );
        }

        for attempt in 1..=MAX_SEARCHABLE_ID_ATTEMPTS {
            let searchable_order_id = self.ids.next_id(submitted_at);

            let mut tx = self.db.begin().await?;

            let inserted = self
                .orders
                .create_order(
                    &mut tx,
                    OrderInsert {
                        uuid: order.uuid,
                        searchable_order_id,
                        status: OrderStatus::Pending,
                        contact: &order.contact,
                        schedule: &order.schedule,
                        totals: &totals,
                        created_at: submitted_at,
                    },
                )
                .await;

            let row = match inserted {
                Ok(row) => row,
                Err(error) if is_searchable_id_conflict(&error) => {
                    warn!(attempt, searchable_order_id, "order.searchable_id_conflict");

                    continue;
                }
                Err(error) => return Err(error.into()),
            };

            self.lines.create_lines(&mut tx, row.uuid, cart.groups()).await?;

            tx.commit().await?;

            info!(
                order = %row.uuid,
                searchable_order_id,
                customer_order_id = row.customer_order_id,
                grand_total = totals.grand_total,
                grand_total_display = %grand_total_display,
                "order.created"
            );

            return Ok(row.into_record(cart.groups().to_vec()));
        }

        Err(OrdersServiceError::SearchableIdExhausted {
            attempts: MAX_SEARCHABLE_ID_ATTEMPTS,
        })
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let row = self.orders.get_order(&mut tx, order).await?;

        let record = self
            .attach_groups(&mut tx, vec![row])
            .await?
            .pop()
            .ok_or(OrdersServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_orders(&self, query: OrderQuery) -> Result<OrderPage, OrdersServiceError> {
        let query = query.normalized();
        let filter = query.search.as_deref().and_then(SearchFilter::parse);

        let mut tx = self.db.begin().await?;

        let rows = self
            .orders
            .list_orders(
                &mut tx,
                filter.as_ref(),
                query.status,
                i64::from(query.per_page),
                query.offset(),
            )
            .await?;

        let total = self
            .orders
            .count_orders(&mut tx, filter.as_ref(), query.status)
            .await?;

        let orders = self.attach_groups(&mut tx, rows).await?;

        tx.commit().await?;

        Ok(OrderPage {
            orders,
            total: u64::try_from(total)?,
            page: query.page,
            per_page: query.per_page,
        })
    }

    async fn backfill_searchable_ids(&self) -> Result<BackfillReport, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let pending = self.orders.list_unassigned(&mut tx).await?;

        tx.commit().await?;

        let mut report = BackfillReport::default();

        for order in pending {
            let mut done = false;

            for _ in 0..MAX_SEARCHABLE_ID_ATTEMPTS {
                let candidate = self.ids.backfill_id(order.created_at);

                let mut tx = self.db.begin().await?;

                match self
                    .orders
                    .assign_searchable_order_id(&mut tx, order.uuid, candidate)
                    .await
                {
                    Ok(updated) => {
                        tx.commit().await?;

                        if updated {
                            report.assigned += 1;
                        }

                        done = true;

                        break;
                    }
                    Err(error) if is_searchable_id_conflict(&error) => {
                        report.retries += 1;
                    }
                    Err(error) => return Err(error.into()),
                }
            }

            if !done {
                return Err(OrdersServiceError::SearchableIdExhausted {
                    attempts: MAX_SEARCHABLE_ID_ATTEMPTS,
                });
            }
        }

        let mut tx = self.db.begin().await?;

        self.orders.require_searchable_order_id(&mut tx).await?;

        tx.commit().await?;

        info!(
            assigned = report.assigned,
            retries = report.retries,
            "orders.searchable_ids_backfilled"
        );

        Ok(report)
    }
}

/// A submitted line priced from the vendor's menu entry.
fn reprice_line(
    menu: &FxHashMap<DishUuid, DishRecord>,
    vendor: VendorUuid,
    item: &CartLineItem,
) -> Result<CartLineItem, OrdersServiceError> {
    let dish = menu
        .get(&item.dish)
        .filter(|dish| dish.vendor == vendor)
        .ok_or(OrdersServiceError::UnknownDish(item.dish))?;

    let line = dish
        .to_dish()
        .line_item(item.quantity, item.option)
        .map_err(|error| match error {
            CartError::ZeroQuantity => OrdersServiceError::InvalidCart(error),
            other => OrdersServiceError::DishNotOrderable(other),
        })?;

    if line.unit_price != item.unit_price {
        warn!(
            vendor = %vendor,
            dish = %item.dish,
            submitted_unit_price = item.unit_price,
            unit_price = line.unit_price,
            "order.price_mismatch"
        );
    }

    Ok(line)
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Re-validate, re-price and persist a submitted order.
    async fn create_order(
        &self,
        order: NewOrder,
        submitted_at: Timestamp,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve a single order.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Search and page through orders, newest first.
    async fn list_orders(&self, query: OrderQuery) -> Result<OrderPage, OrdersServiceError>;

    /// Give every order created before searchable ids existed an id, then require one.
    async fn backfill_searchable_ids(&self) -> Result<BackfillReport, OrdersServiceError>;
}
