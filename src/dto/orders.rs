use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::Order;

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
