//! Admin pages for drivers: changelist, change page and the add form.

use crate::forms::{DriverCreationForm, FormErrors};
use crate::schemas::AppState;
use crate::templates::PageError;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use common::DriverDto;
use model::{store, Constraint, StoreError};
use tera::Context;
use tracing::{debug, info, instrument, trace, warn};

fn change_url(driver_id: i32) -> String {
    format!("/admin/taxi/driver/{}/change/", driver_id)
}

#[instrument(skip(state))]
pub async fn driver_changelist(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    trace!("Entering driver_changelist function");
    let drivers: Vec<DriverDto> = store::list_drivers(&state.db)
        .await
        .map_err(|e| state.templates.store_error(e))?
        .into_iter()
        .map(DriverDto::from)
        .collect();
    debug!("Admin changelist shows {} drivers", drivers.len());

    let mut context = Context::new();
    context.insert("drivers", &drivers);
    state.templates.render("admin/driver_changelist.html", &context)
}

#[instrument(skip(state))]
pub async fn driver_change(
    Path(driver_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Html<String>, PageError> {
    let driver = store::get_driver(&state.db, driver_id)
        .await
        .map_err(|e| state.templates.store_error(e))?;

    let mut context = Context::new();
    context.insert("has_usable_password", &driver.has_usable_password());
    context.insert("is_active", &driver.account.is_active);
    context.insert("is_superuser", &driver.account.is_superuser);
    context.insert(
        "date_joined",
        &driver.account.date_joined.format("%Y-%m-%d %H:%M").to_string(),
    );
    context.insert("driver", &DriverDto::from(driver));
    state.templates.render("admin/driver_change.html", &context)
}

fn add_page(
    state: &AppState,
    form: &DriverCreationForm,
    errors: &FormErrors,
) -> Result<Html<String>, PageError> {
    // Passwords are never echoed back.
    let mut context = Context::new();
    context.insert(
        "form",
        &DriverCreationForm {
            password1: String::new(),
            password2: String::new(),
            ..form.clone()
        },
    );
    context.insert("errors", &errors.for_fields(&DriverCreationForm::FIELDS));
    state.templates.render("admin/driver_add.html", &context)
}

#[instrument(skip(state))]
pub async fn driver_add_form(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    add_page(&state, &DriverCreationForm::default(), &FormErrors::default())
}

#[instrument(skip(state))]
pub async fn driver_add(
    State(state): State<AppState>,
    Form(form): Form<DriverCreationForm>,
) -> Result<Response, PageError> {
    trace!("Entering driver_add function");

    let new_driver = match form.clean() {
        Ok(new_driver) => new_driver,
        Err(errors) => {
            warn!("Driver creation form rejected: {}", errors);
            return add_page(&state, &form, &errors).map(IntoResponse::into_response);
        }
    };

    match store::create_driver(&state.db, new_driver).await {
        Ok(driver) => {
            info!("Driver {} added through admin", driver.username());
            Ok(Redirect::to(&change_url(driver.id())).into_response())
        }
        Err(StoreError::ConstraintViolation {
            constraint: Constraint::UniqueUsername,
            ..
        }) => {
            let mut errors = FormErrors::default();
            errors.add("username", "A user with that username already exists.");
            add_page(&state, &form, &errors).map(IntoResponse::into_response)
        }
        Err(e) => Err(state.templates.store_error(e)),
    }
}
