//! Manufacturing orders and the design files attached to them

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

/// Board parameters of one order.
///
/// The `*_id` fields and the finishing options are indices into the
/// manufacturing option catalog, which this backend stores opaquely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BoardSpec {
    pub material_id: u32,
    pub layer_id: u32,
    /// mm
    #[validate(range(min = 1))]
    pub size_x: u32,
    /// mm
    #[validate(range(min = 1))]
    pub size_y: u32,
    #[validate(range(min = 1))]
    pub count: u32,
    pub board_thickness: u32,
    pub foil_thickness: u32,
    pub board_window: u32,
    pub lamellas: u32,
    #[validate(range(min = 1))]
    pub quantity: u32,
    pub mask_type_id: u32,
    pub mask_side_id: u32,
    pub mask_color_id: u32,
    pub marking_side_id: u32,
    pub marking_color_id: u32,
    pub marking_data_id: u32,
    pub finished_sites_id: u32,
    pub finished_connector_id: u32,
    pub finished_corner: u32,
    pub conductor_id: u32,
    pub counter_id: u32,
    pub drilling_id: u32,
    pub mask_hole: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    AwaitingConfirmation,
}

/// Uploaded design archive, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignUpload {
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignFile {
    pub id: u64,
    pub owner_id: String,
    pub file_name: String,
    pub data: Bytes,
}

/// Everything the store needs to persist a new order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: String,
    pub order_number: String,
    pub price: u32,
    pub status: OrderStatus,
    pub build_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub spec: BoardSpec,
    pub design: DesignUpload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    #[serde(skip)]
    pub user_id: String,
    pub order_number: String,
    pub price: u32,
    pub status: OrderStatus,
    pub build_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub spec: BoardSpec,
    pub file_id: u64,
}

/// Row of a user's order list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: u64,
    pub order_number: String,
    pub build_time: DateTime<Utc>,
    pub price: u32,
    pub status: OrderStatus,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            build_time: order.build_time,
            price: order.price,
            status: order.status,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_spec() -> BoardSpec {
    BoardSpec {
        layer_id: 1,
        size_x: 100,
        size_y: 80,
        count: 1,
        board_thickness: 2,
        quantity: 5,
        mask_color_id: 1,
        ..BoardSpec::default()
    }
}
