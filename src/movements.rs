use diesel::prelude::*;

use crate::error::{Error, Result};
use crate::models::{Item, MovementRow, MovementType, NewLog};
use crate::schema::{items, logs};
use crate::store::Store;

/// A movement as it arrives from the wire. `kind` stays a raw string so an
/// unknown value surfaces as a domain validation failure.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub item_id: i32,
    pub kind: String,
    pub qty: i32,
    pub date: String,
}

/// Records a stock movement and adjusts the owning item's quantity, both
/// inside one transaction: either the log row and the new quantity commit
/// together or neither does.
pub async fn record_movement(store: &Store, movement: NewMovement) -> Result<()> {
    store
        .with_conn(move |conn| {
            // The immediate transaction takes SQLite's write lock before the
            // read, so two concurrent movements on one item cannot both see
            // the same starting quantity.
            conn.immediate_transaction(|conn| {
                let item = items::table
                    .find(movement.item_id)
                    .first::<Item>(conn)
                    .optional()?
                    .ok_or(Error::NotFound("Item not found"))?;

                let kind = MovementType::parse(&movement.kind)
                    .ok_or_else(|| Error::Validation("Invalid type".into()))?;

                if movement.qty <= 0 {
                    return Err(Error::Validation("qty must be positive".into()));
                }

                let new_quantity = match kind {
                    MovementType::In => item
                        .quantity
                        .checked_add(movement.qty)
                        .ok_or(Error::Conflict("Stock quantity overflow"))?,
                    MovementType::Out => {
                        if movement.qty > item.quantity {
                            return Err(Error::Conflict("Not enough stock"));
                        }
                        item.quantity - movement.qty
                    }
                };

                diesel::insert_into(logs::table)
                    .values(&NewLog {
                        item_id: movement.item_id,
                        kind: kind.as_str().to_string(),
                        qty: movement.qty,
                        date: movement.date.clone(),
                    })
                    .execute(conn)?;

                diesel::update(items::table.find(movement.item_id))
                    .set(items::quantity.eq(new_quantity))
                    .execute(conn)?;

                Ok(())
            })
        })
        .await
}

/// All movements joined with the owning item's name, newest date first.
/// The ordering is SQLite's TEXT comparison on the stored date string.
pub async fn list_movements(store: &Store) -> Result<Vec<MovementRow>> {
    store
        .with_conn(|conn| {
            let rows = logs::table
                .inner_join(items::table)
                .select((logs::log_id, items::name, logs::kind, logs::qty, logs::date))
                .order(logs::date.desc())
                .load::<MovementRow>(conn)?;
            Ok(rows)
        })
        .await
}

/// Deletes the log row only. The item's quantity is deliberately not
/// recomputed; see DESIGN.md on the inherited delete asymmetry.
pub async fn delete_movement(store: &Store, log_id: i32) -> Result<()> {
    store
        .with_conn(move |conn| {
            diesel::delete(logs::table.find(log_id)).execute(conn)?;
            Ok(())
        })
        .await
}
