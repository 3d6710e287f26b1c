//! Order Lines Repository
//!
//! Vendor groups and their items, stored in display order.

use dishpatch::{
    CartLineItem, SpiceLevel, VendorCartGroup,
    cart::{DishUuid, VendorUuid},
};
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::orders::{
    records::OrderUuid,
    repositories::orders::{to_i64, to_u64},
};

const CREATE_ORDER_VENDOR_SQL: &str = include_str!("../sql/create_order_vendor.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("../sql/create_order_item.sql");
const LIST_ORDER_VENDORS_SQL: &str = include_str!("../sql/list_order_vendors.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("../sql/list_order_items.sql");

struct VendorRow {
    order: Uuid,
    vendor: VendorUuid,
    store_name: String,
    delivery_fee: u64,
}

struct ItemRow {
    order: Uuid,
    vendor: VendorUuid,
    item: CartLineItem,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderLinesRepository;

impl PgOrderLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        groups: &[VendorCartGroup],
    ) -> Result<(), sqlx::Error> {
        for (group_position, group) in groups.iter().enumerate() {
            query(CREATE_ORDER_VENDOR_SQL)
                .bind(order.into_uuid())
                .bind(group.vendor.into_uuid())
                .bind(to_i32("position", group_position)?)
                .bind(&group.store_name)
                .bind(to_i64("delivery_fee", group.delivery_fee)?)
                .execute(&mut **tx)
                .await?;

            for (item_position, item) in group.items.iter().enumerate() {
                query(CREATE_ORDER_ITEM_SQL)
                    .bind(order.into_uuid())
                    .bind(group.vendor.into_uuid())
                    .bind(to_i32("position", item_position)?)
                    .bind(item.dish.into_uuid())
                    .bind(&item.name)
                    .bind(to_i64("unit_price", item.unit_price)?)
                    .bind(to_i32("quantity", item.quantity)?)
                    .bind(item.option.map(SpiceLevel::as_str))
                    .execute(&mut **tx)
                    .await?;
            }
        }

        Ok(())
    }

    /// Vendor groups for each of `orders`, keyed by order uuid.
    pub(crate) async fn list_groups(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderUuid],
    ) -> Result<FxHashMap<Uuid, Vec<VendorCartGroup>>, sqlx::Error> {
        let uuids: Vec<Uuid> = orders.iter().map(|order| order.into_uuid()).collect();

        let vendors = query_as::<Postgres, VendorRow>(LIST_ORDER_VENDORS_SQL)
            .bind(uuids.as_slice())
            .fetch_all(&mut **tx)
            .await?;

        let items = query_as::<Postgres, ItemRow>(LIST_ORDER_ITEMS_SQL)
            .bind(uuids.as_slice())
            .fetch_all(&mut **tx)
            .await?;

        let mut groups: FxHashMap<Uuid, Vec<VendorCartGroup>> = FxHashMap::default();

        for row in vendors {
            groups.entry(row.order).or_default().push(VendorCartGroup {
                vendor: row.vendor,
                store_name: row.store_name,
                delivery_fee: row.delivery_fee,
                items: Vec::new(),
            });
        }

        for row in items {
            let group = groups
                .get_mut(&row.order)
                .and_then(|groups| groups.iter_mut().find(|group| group.vendor == row.vendor));

            if let Some(group) = group {
                group.items.push(row.item);
            }
        }

        Ok(groups)
    }
}

fn to_i32<T>(column: &str, value: T) -> Result<i32, sqlx::Error>
where
    i32: TryFrom<T, Error = std::num::TryFromIntError>,
{
    i32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for VendorRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order: row.try_get("order_uuid")?,
            vendor: VendorUuid::from_uuid(row.try_get("vendor_uuid")?),
            store_name: row.try_get("store_name")?,
            delivery_fee: to_u64("delivery_fee", row.try_get("delivery_fee")?)?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i32 = row.try_get("quantity")?;
        let spice_level: Option<String> = row.try_get("spice_level")?;

        let option = spice_level
            .map(|level| level.parse::<SpiceLevel>())
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "spice_level".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            order: row.try_get("order_uuid")?,
            vendor: VendorUuid::from_uuid(row.try_get("vendor_uuid")?),
            item: CartLineItem {
                dish: DishUuid::from_uuid(row.try_get("dish_uuid")?),
                name: row.try_get("name")?,
                unit_price: to_u64("unit_price", row.try_get("unit_price")?)?,
                quantity: u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "quantity".to_string(),
                    source: Box::new(e),
                })?,
                option,
            },
        })
    }
}
