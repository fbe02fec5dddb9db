//! Customer profile route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use super::PageContext;
use crate::db::CustomerRepository;
use crate::error::AppError;
use crate::filters;
use crate::flash::{self, MessageQuery};
use crate::middleware::RequireIdentity;
use crate::models::{
    CustomerProfile, Membership, OrderLine, OrderSummary, PaymentRecord, ProfileUpdate,
};
use crate::services::{IdentityService, ServiceError, ValidationError};
use crate::state::AppState;

/// Personal info form data, as submitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub date_of_birth: String,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ProfileForm {
    /// Validate the form into a profile update.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for a blank first or last
    /// name and `ValidationError::InvalidField` for a malformed date.
    pub fn into_update(self) -> Result<ProfileUpdate, ValidationError> {
        let first_name =
            optional(&self.first_name).ok_or(ValidationError::MissingField("first name"))?;
        let last_name =
            optional(&self.last_name).ok_or(ValidationError::MissingField("last name"))?;
        let date_of_birth = optional(&self.date_of_birth)
            .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
            .transpose()
            .map_err(|_| ValidationError::InvalidField("date of birth"))?;

        Ok(ProfileUpdate {
            first_name,
            middle_name: optional(&self.middle_name),
            last_name,
            email: optional(&self.email),
            phone_number: optional(&self.phone_number),
            address: optional(&self.address),
            date_of_birth,
        })
    }
}

/// An order with its books and payment, for the history page.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub summary: OrderSummary,
    pub lines: Vec<OrderLine>,
    pub payment: Option<PaymentRecord>,
}

/// Attach lines and payments to their orders, keeping order-list order.
fn group_orders(
    orders: Vec<OrderSummary>,
    lines: &[OrderLine],
    payments: &[PaymentRecord],
) -> Vec<OrderView> {
    orders
        .into_iter()
        .map(|summary| OrderView {
            lines: lines
                .iter()
                .filter(|l| l.order_id == summary.order_id)
                .cloned()
                .collect(),
            payment: payments
                .iter()
                .find(|p| p.order_id == summary.order_id)
                .cloned(),
            summary,
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Profile landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
}

/// Personal info page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/personal_info.html")]
pub struct PersonalInfoTemplate {
    pub page: PageContext,
    pub profile: CustomerProfile,
}

/// Membership page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/membership.html")]
pub struct MembershipTemplate {
    pub page: PageContext,
    pub membership: Membership,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the profile landing page.
pub async fn profile(
    RequireIdentity(identity): RequireIdentity,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    ProfileTemplate {
        page: PageContext::for_customer(&identity, query),
    }
}

/// Display the personal info form.
#[instrument(skip_all, fields(customer_id = %identity.customer_id))]
pub async fn personal_info(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let Some(profile) = CustomerRepository::new(state.pool())
        .get_profile(&identity.username)
        .await?
    else {
        return Ok(flash::redirect_error("/customer/profile", "customer_not_found").into_response());
    };

    Ok(PersonalInfoTemplate {
        page: PageContext::for_customer(&identity, query),
        profile,
    }
    .into_response())
}

/// Handle the personal info form.
#[instrument(skip_all, fields(customer_id = %identity.customer_id))]
pub async fn update_personal_info(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Form(form): Form<ProfileForm>,
) -> Response {
    const BACK: &str = "/customer/profile/personal_info";

    let result = match form.into_update() {
        Ok(update) => CustomerRepository::new(state.pool())
            .update_profile(&identity.username, &update)
            .await
            .map_err(|e| ServiceError::from_repository(e, "customer")),
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => flash::redirect_success(BACK, "profile_updated").into_response(),
        Err(e) => {
            e.log("update_personal_info");
            flash::redirect_error(BACK, e.code()).into_response()
        }
    }
}

/// Display membership details.
#[instrument(skip_all, fields(customer_id = %identity.customer_id))]
pub async fn membership(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let Some(membership) = IdentityService::new(state.store())
        .membership(&identity)
        .await?
    else {
        return Ok(
            flash::redirect_error("/customer/profile", "membership_not_found").into_response(),
        );
    };

    Ok(MembershipTemplate {
        page: PageContext::for_customer(&identity, query),
        membership,
    }
    .into_response())
}

/// Display order history.
#[instrument(skip_all, fields(customer_id = %identity.customer_id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(query): Query<MessageQuery>,
) -> Result<OrdersTemplate, AppError> {
    let customers = CustomerRepository::new(state.pool());
    let (orders, lines, payments) = tokio::try_join!(
        customers.orders(identity.customer_id),
        customers.order_lines(identity.customer_id),
        customers.payments(identity.customer_id),
    )?;

    Ok(OrdersTemplate {
        page: PageContext::for_customer(&identity, query),
        orders: group_orders(orders, &lines, &payments),
    })
}
