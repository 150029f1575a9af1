use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartItemResponse, CartView, UpdateQuantityRequest},
    error::{AppError, AppResult},
    middleware::session::SessionKey,
    models::Cart,
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart).delete(delete_cart))
        .route("/items", post(add_to_cart).delete(clear_cart))
        .route("/items/{item_id}", patch(update_item).delete(remove_item))
}

async fn render(state: &AppState, cart: &Cart) -> AppResult<(CartView, Meta)> {
    let contents = cart_service::load_contents(state.store.as_ref(), cart).await?;
    let meta = Meta::new(contents.lines.len() as i64);
    Ok((CartView::from(&contents), meta))
}

async fn existing_cart(state: &AppState, session: &SessionKey) -> AppResult<Cart> {
    cart_service::find_cart(state.store.as_ref(), session.as_str())
        .await?
        .ok_or(AppError::NotFound)
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(
        ("x-session-key" = String, Header, description = "Session key of the cart owner")
    ),
    responses(
        (status = 200, description = "Cart contents and totals", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    session: SessionKey,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = cart_service::open_cart(state.store.as_ref(), session.as_str()).await?;
    let (view, meta) = render(&state, &cart).await?;
    Ok(Json(ApiResponse::success("OK", view, Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    params(
        ("x-session-key" = String, Header, description = "Session key of the cart owner")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add a product size or increase its quantity", body = ApiResponse<CartItemResponse>),
        (status = 400, description = "Bad request"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: SessionKey,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartItemResponse>>> {
    let (product, size) = cart_service::resolve_selection(
        state.catalog.as_ref(),
        payload.product_id,
        payload.product_size_id,
    )
    .await?;

    let cart = cart_service::open_cart(state.store.as_ref(), session.as_str()).await?;
    let item = cart_service::add_product(
        state.store.as_ref(),
        &cart,
        &product,
        &size,
        payload.quantity,
    )
    .await?;

    let (view, meta) = render(&state, &cart).await?;
    Ok(Json(ApiResponse::success(
        "OK",
        CartItemResponse { item, cart: view },
        Some(meta),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{item_id}",
    params(
        ("x-session-key" = String, Header, description = "Session key of the cart owner"),
        ("item_id" = Uuid, Path, description = "Cart item ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity set, or item removed when quantity <= 0", body = ApiResponse<CartView>),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "Cart"
)]
pub async fn update_item(
    State(state): State<AppState>,
    session: SessionKey,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = existing_cart(&state, &session).await?;
    let applied =
        cart_service::update_item_quantity(state.store.as_ref(), &cart, item_id, payload.quantity)
            .await?;
    if !applied {
        return Err(AppError::NotFound);
    }

    let (view, meta) = render(&state, &cart).await?;
    Ok(Json(ApiResponse::success("Cart updated", view, Some(meta))))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{item_id}",
    params(
        ("x-session-key" = String, Header, description = "Session key of the cart owner"),
        ("item_id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "OK", body = ApiResponse<CartView>),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    session: SessionKey,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = existing_cart(&state, &session).await?;
    if !cart_service::remove_item(state.store.as_ref(), &cart, item_id).await? {
        return Err(AppError::NotFound);
    }

    let (view, meta) = render(&state, &cart).await?;
    Ok(Json(ApiResponse::success("Removed from cart", view, Some(meta))))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items",
    params(
        ("x-session-key" = String, Header, description = "Session key of the cart owner")
    ),
    responses(
        (status = 200, description = "All items removed", body = ApiResponse<CartView>),
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    session: SessionKey,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = cart_service::open_cart(state.store.as_ref(), session.as_str()).await?;
    cart_service::clear(state.store.as_ref(), &cart).await?;

    let (view, meta) = render(&state, &cart).await?;
    Ok(Json(ApiResponse::success("Cart cleared", view, Some(meta))))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    params(
        ("x-session-key" = String, Header, description = "Session key of the cart owner")
    ),
    responses(
        (status = 200, description = "Cart and its items deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Cart not found"),
    ),
    tag = "Cart"
)]
pub async fn delete_cart(
    State(state): State<AppState>,
    session: SessionKey,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let cart = existing_cart(&state, &session).await?;
    if !cart_service::delete_cart(state.store.as_ref(), &cart).await? {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::success(
        "Cart deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
