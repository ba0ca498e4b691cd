//! PCB orders: submission, the caller's order book and design downloads

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;

use gerber_core::{BoardSpec, DesignUpload, Order, OrderSummary};

use crate::error::ApiError;
use crate::extract::AuthenticatedUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Text fields of the order form, by field name.
struct OrderForm(HashMap<String, String>);

impl OrderForm {
    fn number(&self, name: &str) -> Result<u32, ApiError> {
        let raw = self
            .0
            .get(name)
            .ok_or_else(|| ApiError::BadRequest(format!("{} is missing", name)))?;
        raw.trim()
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("{} must be a non-negative integer", name)))
    }

    fn board_spec(&self) -> Result<BoardSpec, ApiError> {
        Ok(BoardSpec {
            material_id: self.number("materialId")?,
            layer_id: self.number("layerId")?,
            size_x: self.number("sizeX")?,
            size_y: self.number("sizeY")?,
            count: self.number("count")?,
            board_thickness: self.number("board_thickness")?,
            foil_thickness: self.number("foil_thickness")?,
            board_window: self.number("board_window")?,
            lamellas: self.number("lamellas")?,
            quantity: self.number("quantity")?,
            mask_type_id: self.number("maskTypeId")?,
            mask_side_id: self.number("maskSideId")?,
            mask_color_id: self.number("maskColorId")?,
            marking_side_id: self.number("markingSideId")?,
            marking_color_id: self.number("markingColorId")?,
            marking_data_id: self.number("markingDataId")?,
            finished_sites_id: self.number("finishedSitesId")?,
            finished_connector_id: self.number("finishedConnectorId")?,
            finished_corner: self.number("finishedCorner")?,
            conductor_id: self.number("conductorId")?,
            counter_id: self.number("counterId")?,
            drilling_id: self.number("drillingId")?,
            mask_hole: self.number("mask_hole")?,
        })
    }
}

/// POST /api/gerber/post-gerber (multipart board fields plus `file`)
pub async fn post_gerber(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<OrderSummary>>), ApiError> {
    let mut fields = HashMap::new();
    let mut design: Option<DesignUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "file" {
            let file_name = field.file_name().unwrap_or("design").to_string();
            let data: Bytes = field.bytes().await?;
            design = Some(DesignUpload { file_name, data });
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    let design = design.ok_or_else(|| ApiError::BadRequest("File is missing".to_string()))?;
    let spec = OrderForm(fields).board_spec()?;

    let order = state.orders.place_order(user.user_id(), spec, design).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(OrderSummary::from(&order))),
    ))
}

/// GET /api/gerber/get-gerber
pub async fn get_gerber(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<OrderSummary>>>, ApiError> {
    let orders = state.orders.orders_for(user.user_id()).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// GET /api/gerber/get-full-gerber/{id}
pub async fn get_full_gerber(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let order = state.orders.order_details(user.user_id(), id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// GET /api/gerber/get-gerber-file/{id}
pub async fn get_gerber_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let file = state
        .orders
        .design_file(user.user_id(), &user.roles(), id)
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        file.file_name.replace(['"', '\\', '\r', '\n'], "_")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.data,
    ))
}
