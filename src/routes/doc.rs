use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::cart::{AddToCartRequest, CartItemResponse, CartLineDto, CartView, UpdateQuantityRequest},
    models::{Cart, CartItem, Product, ProductSize},
    response::{ApiResponse, Meta},
    routes::{cart, health},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cart::view_cart,
        cart::add_to_cart,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        cart::delete_cart
    ),
    components(
        schemas(
            Cart,
            CartItem,
            Product,
            ProductSize,
            AddToCartRequest,
            UpdateQuantityRequest,
            CartLineDto,
            CartView,
            CartItemResponse,
            health::HealthData,
            Meta,
            ApiResponse<CartView>,
            ApiResponse<CartItemResponse>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Cart", description = "Session cart endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
