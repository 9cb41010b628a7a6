use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    cart::Cart,
    error::{AppError, AppResult},
    store::{Document, DocumentStore, Filter, Record, collections::ORDERS},
};

use super::{parse_id, require_datetime, require_i64, require_id, require_price, require_str};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_FULFILLED: &str = "fulfilled";

/// One checkout line, frozen at the moment the order was placed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub title: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub line_total: i64,
}

/// Line items and total never change after creation; only `status` does,
/// through the admin surface.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub items: Vec<OrderLine>,
    pub total: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    fn from_value(value: &Value) -> AppResult<Self> {
        let doc = value
            .as_object()
            .ok_or_else(|| super::corrupt(ORDERS, "items"))?;
        Ok(Self {
            product_id: require_id(doc, ORDERS, "product_id")?,
            title: require_str(doc, ORDERS, "title")?,
            unit_price: require_price(doc, ORDERS, "unit_price")?,
            quantity: require_i64(doc, ORDERS, "quantity")?,
            line_total: require_price(doc, ORDERS, "line_total")?,
        })
    }

    fn to_value(&self) -> Value {
        let mut doc = Document::new();
        doc.insert(
            "product_id".to_string(),
            Value::String(self.product_id.to_string()),
        );
        doc.insert("title".to_string(), Value::String(self.title.clone()));
        doc.insert("unit_price".to_string(), Value::from(self.unit_price));
        doc.insert("quantity".to_string(), Value::from(self.quantity));
        doc.insert("line_total".to_string(), Value::from(self.line_total));
        Value::Object(doc)
    }
}

impl Order {
    /// Snapshot the cart as it stands. Prices are expected to have been
    /// refreshed from the catalog immediately before this.
    pub fn from_cart(cart: &Cart, user_id: Uuid) -> Self {
        let items = cart
            .items
            .iter()
            .map(|line| OrderLine {
                product_id: line.product_id,
                title: line.title.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
                line_total: line.line_total,
            })
            .collect();
        Self {
            id: None,
            user_id,
            items,
            total: cart.grand_total,
            status: STATUS_PENDING.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn from_record(record: Record) -> AppResult<Self> {
        let doc = &record.doc;
        let items = doc
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| super::corrupt(ORDERS, "items"))?
            .iter()
            .map(OrderLine::from_value)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self {
            id: Some(record.id),
            user_id: require_id(doc, ORDERS, "user_id")?,
            items,
            total: require_price(doc, ORDERS, "total")?,
            status: require_str(doc, ORDERS, "status")?,
            created_at: require_datetime(doc, ORDERS, "created_at")?,
        })
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(
            "user_id".to_string(),
            Value::String(self.user_id.to_string()),
        );
        doc.insert(
            "items".to_string(),
            Value::Array(self.items.iter().map(OrderLine::to_value).collect()),
        );
        doc.insert("total".to_string(), Value::from(self.total));
        doc.insert("status".to_string(), Value::String(self.status.clone()));
        doc.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        doc
    }

    pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> AppResult<Self> {
        let id = parse_id(id)?;
        let record = store
            .find_one(ORDERS, Filter::Id(id))
            .await?
            .ok_or(AppError::NotFound)?;
        Self::from_record(record)
    }

    pub async fn find_by_user(store: &dyn DocumentStore, user_id: Uuid) -> AppResult<Vec<Self>> {
        let records = store
            .find(ORDERS, Filter::Eq("user_id", user_id.to_string()))
            .await?;
        records.into_iter().map(Self::from_record).collect()
    }

    pub async fn find_all(store: &dyn DocumentStore) -> AppResult<Vec<Self>> {
        let records = store.find(ORDERS, Filter::All).await?;
        records.into_iter().map(Self::from_record).collect()
    }

    /// Orders are insert-only; `update_status` is the one sanctioned change.
    pub async fn save(&mut self, store: &dyn DocumentStore) -> AppResult<()> {
        if self.id.is_some() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "orders are immutable once created"
            )));
        }
        self.id = Some(store.insert_one(ORDERS, self.to_document()).await?);
        Ok(())
    }

    pub async fn update_status(
        &mut self,
        store: &dyn DocumentStore,
        status: String,
    ) -> AppResult<()> {
        let id = self.id.ok_or(AppError::NotFound)?;
        let mut changes = Document::new();
        changes.insert("status".to_string(), Value::String(status.clone()));
        if !store.update_one(ORDERS, id, changes).await? {
            return Err(AppError::NotFound);
        }
        self.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn line(title: &str, unit_price: i64, quantity: i64) -> OrderLine {
        OrderLine {
            product_id: Uuid::new_v4(),
            title: title.to_string(),
            unit_price,
            quantity,
            line_total: unit_price * quantity,
        }
    }

    #[tokio::test]
    async fn order_round_trips_with_lines_intact() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let mut order = Order {
            id: None,
            user_id,
            items: vec![line("Shoe", 50_000, 2), line("Hat", 30_000, 1)],
            total: 130_000,
            status: STATUS_PENDING.to_string(),
            created_at: Utc::now(),
        };
        order.save(&store).await.unwrap();

        let loaded = Order::find_by_user(&store, user_id).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].items.len(), 2);
        assert_eq!(loaded[0].items[0].line_total, 100_000);
        assert_eq!(loaded[0].total, 130_000);
    }

    #[tokio::test]
    async fn saving_an_already_persisted_order_is_rejected() {
        let store = MemoryStore::new();
        let mut order = Order {
            id: None,
            user_id: Uuid::new_v4(),
            items: vec![line("Shoe", 50_000, 1)],
            total: 50_000,
            status: STATUS_PENDING.to_string(),
            created_at: Utc::now(),
        };
        order.save(&store).await.unwrap();
        assert!(order.save(&store).await.is_err());
    }

    #[tokio::test]
    async fn status_update_leaves_lines_and_total_alone() {
        let store = MemoryStore::new();
        let mut order = Order {
            id: None,
            user_id: Uuid::new_v4(),
            items: vec![line("Shoe", 50_000, 2)],
            total: 100_000,
            status: STATUS_PENDING.to_string(),
            created_at: Utc::now(),
        };
        order.save(&store).await.unwrap();
        let id = order.id.unwrap().to_string();

        order
            .update_status(&store, STATUS_FULFILLED.to_string())
            .await
            .unwrap();

        let loaded = Order::find_by_id(&store, &id).await.unwrap();
        assert_eq!(loaded.status, STATUS_FULFILLED);
        assert_eq!(loaded.total, 100_000);
        assert_eq!(loaded.items.len(), 1);
    }
}
