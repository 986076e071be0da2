//! Address API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, address, user};
use crate::utils::{AppError, AppResult, ErrorCode, validate};
use shared::models::{AddressCreate, AddressTitleUpdate, AddressView, USER_ADDRESS_LIMIT};

fn address_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::AddressNotFound, format!("Address {} not found", id))
}

/// repo 的 NotFound 换成地址专用错误码，其余原样转换
fn remap_not_found(err: RepoError, id: i64) -> AppError {
    match err {
        RepoError::NotFound(_) => address_not_found(id),
        other => other.into(),
    }
}

/// GET /api/addresses - 有效地址列表 (标记默认地址)
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<AddressView>>> {
    let account = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current_user.id)))?;

    let addresses = address::find_live_by_user(&state.pool, current_user.id).await?;

    Ok(Json(
        addresses
            .into_iter()
            .map(|a| AddressView::from_entity(a, account.default_address_id))
            .collect(),
    ))
}

/// POST /api/addresses - 新增地址
///
/// 每用户最多 20 条有效地址；用户的第一条地址自动设为默认。
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<AddressCreate>,
) -> AppResult<Json<AddressView>> {
    validate(&payload)?;

    if address::count_live(&state.pool, current_user.id).await? >= USER_ADDRESS_LIMIT {
        return Err(AppError::with_message(
            ErrorCode::AddressLimitReached,
            format!("At most {} addresses per user", USER_ADDRESS_LIMIT),
        ));
    }

    let account = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current_user.id)))?;

    let created = address::create(&state.pool, current_user.id, &payload).await?;

    let default_address_id = match account.default_address_id {
        Some(existing) => Some(existing),
        None => {
            user::set_default_address(&state.pool, current_user.id, created.id).await?;
            Some(created.id)
        }
    };

    Ok(Json(AddressView::from_entity(created, default_address_id)))
}

/// PUT /api/addresses/{id} - 整体更新 (标签走单独的 title 接口)
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AddressCreate>,
) -> AppResult<Json<AddressView>> {
    validate(&payload)?;

    let updated = address::update(&state.pool, id, current_user.id, &payload)
        .await
        .map_err(|e| remap_not_found(e, id))?;

    let account = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current_user.id)))?;

    Ok(Json(AddressView::from_entity(
        updated,
        account.default_address_id,
    )))
}

/// DELETE /api/addresses/{id} - 逻辑删除
///
/// 行保留在表里，已有订单的地址引用继续有效。
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let removed = address::soft_delete(&state.pool, id, current_user.id).await?;
    if !removed {
        return Err(address_not_found(id));
    }
    Ok(Json(removed))
}

/// PUT /api/addresses/{id}/default - 设为默认地址
pub async fn set_default(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<()>> {
    address::find_by_id_for_user(&state.pool, id, current_user.id)
        .await?
        .ok_or_else(|| address_not_found(id))?;

    user::set_default_address(&state.pool, current_user.id, id).await?;

    Ok(Json(()))
}

/// PUT /api/addresses/{id}/title - 只改标签
pub async fn update_title(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AddressTitleUpdate>,
) -> AppResult<Json<()>> {
    validate(&payload)?;

    address::update_title(&state.pool, id, current_user.id, &payload.title)
        .await
        .map_err(|e| remap_not_found(e, id))?;

    Ok(Json(()))
}
