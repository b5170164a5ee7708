//! Public HTML pages: index, list pages with search, detail pages and the
//! license-update form.

use crate::forms::DriverLicenseUpdateForm;
use crate::schemas::AppState;
use crate::templates::PageError;
use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use common::{search, CarDto, DriverDto, ManufacturerDto, Searchable};
use model::{entities::manufacturer, store, store::CarRecord, Driver};
use std::collections::HashMap;
use tera::Context;
use tracing::{debug, info, instrument, trace, warn};

/// Search text for `T`, taken from its own query parameter.
fn query_for<T: Searchable>(params: &HashMap<String, String>) -> Option<&str> {
    params.get(T::QUERY_PARAM).map(String::as_str)
}

fn list_context<T: Searchable>(params: &HashMap<String, String>) -> Context {
    let mut context = Context::new();
    context.insert("param", T::QUERY_PARAM);
    context.insert("query", query_for::<T>(params).unwrap_or_default());
    context
}

/// Home page with record counts
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    trace!("Entering index page handler");
    let counts = store::counts(&state.db)
        .await
        .map_err(|e| state.templates.store_error(e))?;
    debug!("Index counts: {:?}", counts);

    let mut context = Context::new();
    context.insert("counts", &counts);
    state.templates.render("index.html", &context)
}

#[instrument(skip(state))]
pub async fn manufacturer_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, PageError> {
    let all = store::list_manufacturers(&state.db)
        .await
        .map_err(|e| state.templates.store_error(e))?;
    let found = search(all, query_for::<manufacturer::Model>(&params));
    debug!("Manufacturer list shows {} records", found.len());

    let manufacturers: Vec<ManufacturerDto> = found.into_iter().map(ManufacturerDto::from).collect();
    let mut context = list_context::<manufacturer::Model>(&params);
    context.insert("manufacturers", &manufacturers);
    state.templates.render("manufacturer_list.html", &context)
}

#[instrument(skip(state))]
pub async fn car_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, PageError> {
    let all = store::list_cars(&state.db)
        .await
        .map_err(|e| state.templates.store_error(e))?;
    let found = search(all, query_for::<CarRecord>(&params));
    debug!("Car list shows {} records", found.len());

    let cars: Vec<CarDto> = found.into_iter().map(CarDto::from).collect();
    let mut context = list_context::<CarRecord>(&params);
    context.insert("cars", &cars);
    state.templates.render("car_list.html", &context)
}

#[instrument(skip(state))]
pub async fn car_detail(
    Path(car_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Html<String>, PageError> {
    let record = store::get_car(&state.db, car_id)
        .await
        .map_err(|e| state.templates.store_error(e))?;
    let drivers: Vec<DriverDto> = store::drivers_of(&state.db, &record)
        .await
        .map_err(|e| state.templates.store_error(e))?
        .into_iter()
        .map(DriverDto::from)
        .collect();

    let mut context = Context::new();
    context.insert("car", &CarDto::from(record));
    context.insert("drivers", &drivers);
    state.templates.render("car_detail.html", &context)
}

#[instrument(skip(state))]
pub async fn driver_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, PageError> {
    let all = store::list_drivers(&state.db)
        .await
        .map_err(|e| state.templates.store_error(e))?;
    let found = search(all, query_for::<Driver>(&params));
    debug!("Driver list shows {} records", found.len());

    let drivers: Vec<DriverDto> = found.into_iter().map(DriverDto::from).collect();
    let mut context = list_context::<Driver>(&params);
    context.insert("drivers", &drivers);
    state.templates.render("driver_list.html", &context)
}

#[instrument(skip(state))]
pub async fn driver_detail(
    Path(driver_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Html<String>, PageError> {
    let driver = store::get_driver(&state.db, driver_id)
        .await
        .map_err(|e| state.templates.store_error(e))?;
    let cars: Vec<CarDto> = store::cars_of(&state.db, driver_id)
        .await
        .map_err(|e| state.templates.store_error(e))?
        .into_iter()
        .map(CarDto::from)
        .collect();

    let mut context = Context::new();
    context.insert("driver", &DriverDto::from(driver));
    context.insert("cars", &cars);
    state.templates.render("driver_detail.html", &context)
}

fn license_form_page(
    state: &AppState,
    driver: Driver,
    form: &DriverLicenseUpdateForm,
    errors: &crate::forms::FormErrors,
) -> Result<Html<String>, PageError> {
    let mut context = Context::new();
    context.insert("driver", &DriverDto::from(driver));
    context.insert("form", form);
    context.insert("errors", &errors.for_fields(&DriverLicenseUpdateForm::FIELDS));
    state.templates.render("driver_license_update.html", &context)
}

#[instrument(skip(state))]
pub async fn driver_license_update_form(
    Path(driver_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Html<String>, PageError> {
    let driver = store::get_driver(&state.db, driver_id)
        .await
        .map_err(|e| state.templates.store_error(e))?;
    let form = DriverLicenseUpdateForm {
        license_number: driver.license_number.clone(),
    };
    license_form_page(&state, driver, &form, &Default::default())
}

#[instrument(skip(state))]
pub async fn driver_license_update(
    Path(driver_id): Path<i32>,
    State(state): State<AppState>,
    Form(form): Form<DriverLicenseUpdateForm>,
) -> Result<Response, PageError> {
    let driver = store::get_driver(&state.db, driver_id)
        .await
        .map_err(|e| state.templates.store_error(e))?;

    let license_number = match form.clean() {
        Ok(license_number) => license_number,
        Err(errors) => {
            warn!("License update for driver {} rejected: {}", driver_id, errors);
            return license_form_page(&state, driver, &form, &errors).map(IntoResponse::into_response);
        }
    };

    let updated = store::update_license_number(&state.db, driver_id, license_number)
        .await
        .map_err(|e| state.templates.store_error(e))?;
    info!("License number of driver {} changed via form", updated.username());
    Ok(Redirect::to(&updated.absolute_url()).into_response())
}

/// Fallback for every unknown path
pub async fn not_found(State(state): State<AppState>) -> PageError {
    state.templates.not_found("The requested page does not exist.")
}
