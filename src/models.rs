use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::items, primary_key(item_id))]
pub struct Item {
    pub item_id: i32,
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::items)]
pub struct NewItem {
    pub name: String,
    pub quantity: i32,
}

/// A stock movement direction. Stored as TEXT (`IN` / `OUT`); parsed from
/// the raw request string so an unknown value is a domain validation
/// failure rather than a deserialization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IN" => Some(MovementType::In),
            "OUT" => Some(MovementType::Out),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::logs)]
pub struct NewLog {
    pub item_id: i32,
    pub kind: String,
    pub qty: i32,
    pub date: String,
}

/// One row of `GET /logs`: a Log joined with the owning Item's name.
#[derive(Debug, Clone, Queryable, Serialize)]
pub struct MovementRow {
    pub log_id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub qty: i32,
    pub date: String,
}
