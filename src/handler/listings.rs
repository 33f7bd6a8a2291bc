use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        listingdb::{ListingExt, ListingSearchFilters},
        UserExt,
    },
    dtos::listingdtos::{BrowseQueryDto, CreateListingDto, ListingFilterDto, PaymentDto, SubmitProofDto},
    error::HttpError,
    middleware::{auth, owner_check, JWTAuthMiddeware},
    AppState,
};

pub fn listings_handler() -> Router {
    let protected_routes = Router::new()
        .route(
            "/create",
            post(create_listing).layer(middleware::from_fn(owner_check)),
        )
        .route(
            "/my-listings",
            get(get_owner_listings).layer(middleware::from_fn(owner_check)),
        )
        .route("/:listing_id/proof", post(submit_payment_proof))
        .route("/:listing_id/deactivate", put(deactivate_listing))
        .layer(middleware::from_fn(auth));

    let public_routes = Router::new()
        .route("/", get(browse_listings))
        .route("/:listing_id", get(get_listing_by_id));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
}

pub async fn create_listing(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateListingDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (listing, payment) = app_state
        .listing_service
        .submit(&user.user, body)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": format!(
            "Listing created. Pay the K{} listing fee using reference {} and upload your proof of payment to publish it",
            payment.amount, payment.reference
        ),
        "data": {
            "listing": ListingFilterDto::from_listing(&listing, Some(user.user.name.clone())),
            "payment": PaymentDto::from_payment(&payment),
        }
    })))
}

pub async fn get_owner_listings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let listings = app_state.db_client
        .get_listings_by_owner(user.user.id)
        .await;

    let data: Vec<serde_json::Value> = listings
        .iter()
        .map(|(listing, payment)| {
            serde_json::json!({
                "listing": ListingFilterDto::from_listing(listing, Some(user.user.name.clone())),
                "payment": payment.as_ref().map(PaymentDto::from_payment),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "listings": data,
            "total": data.len()
        }
    })))
}

pub async fn browse_listings(
    Query(query): Query<BrowseQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(12);
    let filters = ListingSearchFilters {
        listing_type: query.listing_type,
        property_type: query.property_type,
        location: query.location,
        min_price: query.min_price,
        max_price: query.max_price,
        bedrooms: query.bedrooms,
        search: query.search,
    };

    let (listings, total) = app_state.db_client
        .get_active_listings(filters, page, limit)
        .await;

    let mut filtered = Vec::with_capacity(listings.len());
    for listing in &listings {
        let owner_name = app_state.db_client
            .get_user(Some(listing.owner_id), None)
            .await
            .map(|owner| owner.name);
        filtered.push(ListingFilterDto::from_listing(listing, owner_name));
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "listings": filtered,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": total
            }
        }
    })))
}

pub async fn get_listing_by_id(
    Path(listing_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let listing = app_state.listing_service
        .view_listing(listing_id)
        .await?;

    if !listing.is_active() {
        return Err(HttpError::not_found("Listing is not available"));
    }

    let owner = app_state.db_client
        .get_user(Some(listing.owner_id), None)
        .await;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "listing": ListingFilterDto::from_listing(&listing, owner.as_ref().map(|o| o.name.clone())),
            "owner_contact": owner.map(|o| serde_json::json!({
                "id": o.id,
                "name": o.name,
                "phone": o.phone,
            })),
        }
    })))
}

pub async fn submit_payment_proof(
    Path(listing_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<SubmitProofDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (listing, payment) = app_state.listing_service
        .submit_proof(user.user.id, listing_id, body.proof_image.as_deref())
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Proof of payment received. Your listing will be published once an administrator confirms the payment",
        "data": {
            "listing": ListingFilterDto::from_listing(&listing, Some(user.user.name.clone())),
            "payment": PaymentDto::from_payment(&payment),
        }
    })))
}

pub async fn deactivate_listing(
    Path(listing_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let listing = app_state.listing_service
        .deactivate(&user.user, listing_id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Listing deactivated",
        "data": {
            "listing": ListingFilterDto::from_listing(&listing, None),
        }
    })))
}
