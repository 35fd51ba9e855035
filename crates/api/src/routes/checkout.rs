//! Checkout route handlers.
//!
//! `POST` and `PUT` take `multipart/form-data`. Text fields `customer`,
//! `shipping` and `items` carry JSON; `total` is an amount such as `50000`
//! or `Rp50.000`; the file field `image` is the payment receipt.

use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::instrument;

use farm_fresh_core::{CheckoutId, Rupiah};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{Checkout, CustomerInfo, ShippingInfo};
use crate::services::checkout::{CheckoutChanges, CheckoutDraft};
use crate::state::AppState;
use crate::storage::Upload;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Response of `POST /api/checkout`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub message: &'static str,
    pub checkout: Checkout,
    /// `false` when the order was placed but the cart still holds its lines.
    pub cart_cleared: bool,
}

/// Response of `PUT /api/checkout/{checkoutId}`.
#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub message: &'static str,
    pub checkout: Checkout,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Parsed multipart checkout form. Every field is optional at this stage.
#[derive(Debug, Default)]
struct CheckoutForm {
    customer: Option<CustomerInfo>,
    shipping: Option<ShippingInfo>,
    items: Option<Vec<Value>>,
    total: Option<Rupiah>,
    image: Option<Upload>,
}

impl CheckoutForm {
    async fn read(mut multipart: Multipart, max_upload_bytes: usize) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&e, max_upload_bytes))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "image" => form.image = Some(read_upload(field, max_upload_bytes).await?),
                "customer" => form.customer = Some(json_field(&name, field, max_upload_bytes).await?),
                "shipping" => form.shipping = Some(json_field(&name, field, max_upload_bytes).await?),
                "items" => form.items = Some(json_field(&name, field, max_upload_bytes).await?),
                "total" => {
                    let text = text_field(field, max_upload_bytes).await?;
                    form.total = Some(parse_total(&text)?);
                }
                _ => tracing::debug!(field = %name, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

fn multipart_error(err: &MultipartError, max_upload_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(max_upload_bytes)
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Accept a display amount (`Rp50.000`, `50000`) or a plain decimal
/// number (`50000.5`). Display grouping wins, so `50.000` is fifty thousand.
fn parse_total(text: &str) -> Result<Rupiah> {
    text.parse::<Rupiah>().or_else(|err| {
        serde_json::from_str::<serde_json::Number>(text.trim())
            .ok()
            .and_then(|n| serde_json::from_value::<Rupiah>(Value::Number(n)).ok())
            .ok_or_else(|| err.into())
    })
}

async fn read_upload(field: Field<'_>, max_upload_bytes: usize) -> Result<Upload> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let content_type = field
        .content_type()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_owned();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| multipart_error(&e, max_upload_bytes))?;

    if bytes.len() > max_upload_bytes {
        return Err(AppError::PayloadTooLarge(max_upload_bytes));
    }
    if bytes.is_empty() {
        return Err(AppError::BadRequest("image is empty".to_string()));
    }

    Ok(Upload {
        file_name,
        content_type,
        bytes,
    })
}

async fn text_field(field: Field<'_>, max_upload_bytes: usize) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| multipart_error(&e, max_upload_bytes))
}

async fn json_field<T: DeserializeOwned>(
    name: &str,
    field: Field<'_>,
    max_upload_bytes: usize,
) -> Result<T> {
    let text = text_field(field, max_upload_bytes).await?;
    serde_json::from_str(&text).map_err(|e| AppError::BadRequest(format!("{name} is not valid: {e}")))
}

/// List the caller's checkouts.
#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Vec<Checkout>>> {
    let checkouts = state
        .checkout_service()
        .list_for_user(&identity.user_id)
        .await?;
    Ok(Json(checkouts))
}

/// List every checkout. Any authenticated user may call this.
#[instrument(skip(state, _identity))]
pub async fn all(
    State(state): State<AppState>,
    RequireAuth(_identity): RequireAuth,
) -> Result<Json<Vec<Checkout>>> {
    let checkouts = state.checkout_service().list_all().await?;
    Ok(Json(checkouts))
}

/// Show one checkout, subject to the configured read policy.
#[instrument(skip(state, identity), fields(checkout_id = %checkout_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(checkout_id): Path<CheckoutId>,
) -> Result<Json<Checkout>> {
    let checkout = state
        .checkout_service()
        .get(&checkout_id, &identity.user_id)
        .await?;
    Ok(Json(checkout))
}

/// Place a checkout with a payment receipt.
#[instrument(skip(state, identity, multipart), fields(user_id = %identity.user_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let form = CheckoutForm::read(multipart, state.config().max_upload_bytes).await?;

    let receipt = form
        .image
        .ok_or_else(|| AppError::BadRequest("image is required".to_string()))?;
    let customer = form
        .customer
        .ok_or_else(|| AppError::BadRequest("customer is required".to_string()))?;
    let shipping = form
        .shipping
        .ok_or_else(|| AppError::BadRequest("shipping is required".to_string()))?;

    let draft = CheckoutDraft {
        customer,
        shipping,
        items: form.items,
        total: form.total,
    };

    let outcome = state
        .checkout_service()
        .create(&identity, draft, &receipt)
        .await?;

    add_breadcrumb(
        "checkout",
        "Checkout placed",
        &[
            ("checkout_id", outcome.checkout.checkout_id.as_str()),
            ("cart_cleared", if outcome.cart_cleared { "true" } else { "false" }),
        ],
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Checkout created",
            checkout: outcome.checkout,
            cart_cleared: outcome.cart_cleared,
        }),
    ))
}

/// Update a checkout owned by the caller. The receipt is optional.
#[instrument(skip(state, identity, multipart), fields(checkout_id = %checkout_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(checkout_id): Path<CheckoutId>,
    multipart: Multipart,
) -> Result<Json<UpdatedResponse>> {
    let form = CheckoutForm::read(multipart, state.config().max_upload_bytes).await?;

    let changes = CheckoutChanges {
        customer: form.customer,
        shipping: form.shipping,
        items: form.items,
        total: form.total,
    };

    let checkout = state
        .checkout_service()
        .update(&checkout_id, &identity.user_id, changes, form.image.as_ref())
        .await?;

    Ok(Json(UpdatedResponse {
        message: "Checkout updated",
        checkout,
    }))
}

/// Delete a checkout owned by the caller.
#[instrument(skip(state, identity), fields(checkout_id = %checkout_id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(checkout_id): Path<CheckoutId>,
) -> Result<Json<MessageResponse>> {
    state
        .checkout_service()
        .delete(&checkout_id, &identity.user_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Checkout deleted",
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_total_accepts_display_and_decimal() {
        assert_eq!(parse_total("Rp50.000").unwrap(), Rupiah::from(50_000));
        assert_eq!(parse_total("50.000").unwrap(), Rupiah::from(50_000));
        assert_eq!(parse_total("50000").unwrap(), Rupiah::from(50_000));
        assert_eq!(parse_total("12500.5").unwrap().to_string(), "Rp12.500,5");
    }

    #[test]
    fn test_parse_total_rejects_words() {
        assert!(matches!(parse_total("lima puluh"), Err(AppError::BadRequest(_))));
    }
}
