use diesel::prelude::*;

use crate::error::{Error, Result};
use crate::models::{Item, NewItem};
use crate::schema::items;
use crate::store::Store;

/// Inserts a new item and returns its generated id.
pub async fn create_item(store: &Store, name: String, quantity: i32) -> Result<i32> {
    if name.trim().is_empty() {
        return Err(Error::Validation("name must not be empty".into()));
    }
    if quantity < 0 {
        return Err(Error::Validation("quantity must not be negative".into()));
    }

    store
        .with_conn(move |conn| {
            let id = diesel::insert_into(items::table)
                .values(&NewItem { name, quantity })
                .returning(items::item_id)
                .get_result::<i32>(conn)?;
            Ok(id)
        })
        .await
}

pub async fn list_items(store: &Store) -> Result<Vec<Item>> {
    store
        .with_conn(|conn| Ok(items::table.load::<Item>(conn)?))
        .await
}

/// Overwrites the stored quantity unconditionally. No existence check:
/// updating an unknown item is a no-op, matching the observed contract.
/// Used internally by movement recording; external callers must keep the
/// net-quantity invariant themselves.
pub async fn update_item_quantity(store: &Store, item_id: i32, quantity: i32) -> Result<()> {
    store
        .with_conn(move |conn| {
            diesel::update(items::table.find(item_id))
                .set(items::quantity.eq(quantity))
                .execute(conn)?;
            Ok(())
        })
        .await
}

/// Deletes the item row. Does not cascade: logs referencing the item are
/// left in place as orphans.
pub async fn delete_item(store: &Store, item_id: i32) -> Result<()> {
    store
        .with_conn(move |conn| {
            diesel::delete(items::table.find(item_id)).execute(conn)?;
            Ok(())
        })
        .await
}
