use axum::{
    Router,
    extract::{Json, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::{
    Affordability, CarComparison, CarInputs, ChartSeries, FinancingRates, GrowthCharts,
    HousingComparison, HousingInputs, HousingView, InMemorySettingsStore, ServiceFees, Settings,
    SettingsStore, car_chart, check_affordability, compare_car, compare_housing, growth_charts,
    housing_chart,
};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum CliHousingView {
    #[default]
    Overview,
    Buy,
    Rent,
    RentAndInvest,
}

impl From<CliHousingView> for HousingView {
    fn from(value: CliHousingView) -> Self {
        match value {
            CliHousingView::Overview => HousingView::Overview,
            CliHousingView::Buy => HousingView::Buy,
            CliHousingView::Rent => HousingView::Rent,
            CliHousingView::RentAndInvest => HousingView::RentAndInvest,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiHousingView {
    Overview,
    #[serde(alias = "kaufen")]
    Buy,
    #[serde(alias = "mieten")]
    Rent,
    #[serde(alias = "rentAndInvest", alias = "rent_and_invest", alias = "mietenMax")]
    RentAndInvest,
}

impl From<ApiHousingView> for CliHousingView {
    fn from(value: ApiHousingView) -> Self {
        match value {
            ApiHousingView::Overview => CliHousingView::Overview,
            ApiHousingView::Buy => CliHousingView::Buy,
            ApiHousingView::Rent => CliHousingView::Rent,
            ApiHousingView::RentAndInvest => CliHousingView::RentAndInvest,
        }
    }
}

impl From<CliHousingView> for ApiHousingView {
    fn from(value: CliHousingView) -> Self {
        match value {
            CliHousingView::Overview => ApiHousingView::Overview,
            CliHousingView::Buy => ApiHousingView::Buy,
            CliHousingView::Rent => ApiHousingView::Rent,
            CliHousingView::RentAndInvest => ApiHousingView::RentAndInvest,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CarPayload {
    available_capital: Option<f64>,
    car_price: Option<f64>,
    duration_months: Option<u32>,
    investment_return: Option<f64>,
    interest_rate: Option<f64>,
    credit_rate: Option<f64>,
    lease_rate: Option<f64>,
    purchase_fee: Option<f64>,
    lease_fee: Option<f64>,
    loan_fee: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HousingPayload {
    property_price: Option<f64>,
    down_payment: Option<f64>,
    purchase_costs: Option<f64>,
    appreciation: Option<f64>,
    maintenance: Option<f64>,
    mortgage_rate: Option<f64>,
    amortization_years: Option<u32>,
    monthly_rent: Option<f64>,
    rent_increase: Option<f64>,
    investment_return: Option<f64>,
    duration_years: Option<u32>,
    tax_rate: Option<f64>,
    gross_income: Option<f64>,
    view: Option<ApiHousingView>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SettingsPayload {
    savings_rate: Option<f64>,
    monthly_savings: Option<f64>,
    current_age: Option<u32>,
}

/// Car comparison parameters. Rates and returns are given in percent.
#[derive(Args, Debug, Clone)]
pub struct CarArgs {
    #[arg(long, default_value_t = 30_000.0, help = "Capital available today")]
    available_capital: f64,
    #[arg(long, default_value_t = 35_000.0)]
    car_price: f64,
    #[arg(long, default_value_t = 48)]
    duration_months: u32,
    #[arg(
        long,
        default_value_t = 6.0,
        help = "Expected annual return on invested capital in percent"
    )]
    investment_return: f64,
    #[arg(
        long,
        default_value_t = 4.9,
        help = "Annual financing rate in percent, shared by loan and lease"
    )]
    interest_rate: f64,
    #[arg(long, help = "Loan rate in percent, defaults to interest-rate")]
    credit_rate: Option<f64>,
    #[arg(long, help = "Lease rate in percent, defaults to interest-rate")]
    lease_rate: Option<f64>,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "One-off fee paid when buying (cash and loan)"
    )]
    purchase_fee: f64,
    #[arg(long, default_value_t = 0.0)]
    lease_fee: f64,
    #[arg(long, default_value_t = 0.0)]
    loan_fee: f64,
}

/// Housing comparison parameters. Rates are given in percent.
#[derive(Args, Debug, Clone)]
pub struct HousingArgs {
    #[arg(long, default_value_t = 1_000_000.0)]
    property_price: f64,
    #[arg(long, default_value_t = 200_000.0)]
    down_payment: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Notary, registry and transfer costs in percent of the price"
    )]
    purchase_costs: f64,
    #[arg(long, default_value_t = 1.5, help = "Annual appreciation in percent")]
    appreciation: f64,
    #[arg(long, default_value_t = 10_000.0, help = "Annual maintenance")]
    maintenance: f64,
    #[arg(long, default_value_t = 2.0)]
    mortgage_rate: f64,
    #[arg(
        long,
        default_value_t = 15,
        help = "Years to amortize the second mortgage"
    )]
    amortization_years: u32,
    #[arg(long, default_value_t = 3_000.0)]
    monthly_rent: f64,
    #[arg(long, default_value_t = 1.5, help = "Annual rent increase in percent")]
    rent_increase: f64,
    #[arg(long, default_value_t = 5.0)]
    investment_return: f64,
    #[arg(long, default_value_t = 20)]
    duration_years: u32,
    #[arg(long, default_value_t = 30.0, help = "Marginal income tax rate in percent")]
    tax_rate: f64,
    #[arg(long, default_value_t = 180_000.0)]
    gross_income: f64,
    #[arg(long, value_enum, default_value_t = CliHousingView::Overview)]
    view: CliHousingView,
}

#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    #[arg(
        long,
        default_value_t = 0.50,
        help = "Savings account interest in percent"
    )]
    savings_rate: f64,
    #[arg(long, default_value_t = 200.0)]
    monthly_savings: f64,
    #[arg(long, default_value_t = 30)]
    current_age: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

#[derive(Debug)]
struct HousingRequest {
    inputs: HousingInputs,
    view: CliHousingView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarResponse {
    comparison: CarComparison,
    message: String,
    chart: ChartSeries,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HousingResponse {
    affordability: Affordability,
    comparison: HousingComparison,
    message: String,
    view: ApiHousingView,
    chart: ChartSeries,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthResponse {
    settings: Settings,
    charts: GrowthCharts,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
struct AppState {
    settings: Arc<dyn SettingsStore>,
}

const MAX_DURATION_MONTHS: u32 = 600;
const MAX_DURATION_YEARS: u32 = 100;
const MAX_AMORTIZATION_YEARS: u32 = 100;

fn check_non_negative(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{name} must be >= 0"));
    }
    Ok(())
}

fn check_percent(name: &str, value: f64) -> Result<(), String> {
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{name} must be between 0 and 100"));
    }
    Ok(())
}

fn check_at_most(name: &str, value: u32, max: u32) -> Result<(), String> {
    if value > max {
        return Err(format!("{name} must be <= {max}"));
    }
    Ok(())
}

fn check_growth(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value <= -100.0 {
        return Err(format!("{name} must be > -100"));
    }
    Ok(())
}

fn build_car_inputs(args: CarArgs) -> Result<CarInputs, String> {
    check_non_negative("--available-capital", args.available_capital)?;

    if !args.car_price.is_finite() || args.car_price <= 0.0 {
        return Err("--car-price must be > 0".to_string());
    }

    if args.duration_months == 0 {
        return Err("--duration-months must be > 0".to_string());
    }
    check_at_most("--duration-months", args.duration_months, MAX_DURATION_MONTHS)?;

    check_growth("--investment-return", args.investment_return)?;
    check_percent("--interest-rate", args.interest_rate)?;
    if let Some(rate) = args.credit_rate {
        check_percent("--credit-rate", rate)?;
    }
    if let Some(rate) = args.lease_rate {
        check_percent("--lease-rate", rate)?;
    }

    for (name, fee) in [
        ("--purchase-fee", args.purchase_fee),
        ("--lease-fee", args.lease_fee),
        ("--loan-fee", args.loan_fee),
    ] {
        check_non_negative(name, fee)?;
    }

    let rates = if args.credit_rate.is_none() && args.lease_rate.is_none() {
        FinancingRates::Shared(args.interest_rate / 100.0)
    } else {
        FinancingRates::Separate {
            credit: args.credit_rate.unwrap_or(args.interest_rate) / 100.0,
            lease: args.lease_rate.unwrap_or(args.interest_rate) / 100.0,
        }
    };

    Ok(CarInputs {
        available_capital: args.available_capital,
        car_price: args.car_price,
        duration_months: args.duration_months,
        investment_return: args.investment_return / 100.0,
        rates,
        fees: ServiceFees {
            purchase: args.purchase_fee,
            lease_setup: args.lease_fee,
            loan_setup: args.loan_fee,
        },
    })
}

fn build_housing_inputs(args: HousingArgs) -> Result<HousingInputs, String> {
    if !args.property_price.is_finite() || args.property_price <= 0.0 {
        return Err("--property-price must be > 0".to_string());
    }

    check_non_negative("--down-payment", args.down_payment)?;
    if args.down_payment > args.property_price {
        return Err("--down-payment cannot exceed --property-price".to_string());
    }

    if args.duration_years == 0 {
        return Err("--duration-years must be > 0".to_string());
    }
    check_at_most("--duration-years", args.duration_years, MAX_DURATION_YEARS)?;
    check_at_most(
        "--amortization-years",
        args.amortization_years,
        MAX_AMORTIZATION_YEARS,
    )?;

    check_percent("--purchase-costs", args.purchase_costs)?;
    check_percent("--mortgage-rate", args.mortgage_rate)?;
    check_percent("--tax-rate", args.tax_rate)?;
    check_growth("--appreciation", args.appreciation)?;
    check_growth("--rent-increase", args.rent_increase)?;
    check_growth("--investment-return", args.investment_return)?;
    check_non_negative("--maintenance", args.maintenance)?;
    check_non_negative("--monthly-rent", args.monthly_rent)?;
    check_non_negative("--gross-income", args.gross_income)?;

    Ok(HousingInputs {
        property_price: args.property_price,
        down_payment: args.down_payment,
        purchase_cost_rate: args.purchase_costs / 100.0,
        appreciation_rate: args.appreciation / 100.0,
        annual_maintenance: args.maintenance,
        mortgage_rate: args.mortgage_rate / 100.0,
        amortization_years: args.amortization_years,
        monthly_rent: args.monthly_rent,
        rent_increase_rate: args.rent_increase / 100.0,
        investment_return: args.investment_return / 100.0,
        duration_years: args.duration_years,
        marginal_tax_rate: args.tax_rate / 100.0,
        gross_income: args.gross_income,
    })
}

fn build_settings(args: SettingsArgs) -> Result<Settings, String> {
    // Stored zeros read back as the defaults.
    check_percent("--savings-rate", args.savings_rate)?;
    if args.savings_rate == 0.0 {
        return Err("--savings-rate must be > 0".to_string());
    }
    if !args.monthly_savings.is_finite() || args.monthly_savings <= 0.0 {
        return Err("--monthly-savings must be > 0".to_string());
    }
    if args.current_age == 0 || args.current_age > 120 {
        return Err("--current-age must be between 1 and 120".to_string());
    }

    Ok(Settings {
        savings_rate: args.savings_rate,
        monthly_savings: args.monthly_savings,
        current_age: args.current_age,
    })
}

/// Runs the car comparison and samples its chart.
pub fn car_report(args: CarArgs) -> Result<CarResponse, String> {
    let inputs = build_car_inputs(args)?;
    let comparison = compare_car(&inputs);
    Ok(CarResponse {
        message: comparison.recommendation.to_string(),
        chart: car_chart(&comparison),
        comparison,
    })
}

pub fn housing_report(args: HousingArgs) -> Result<HousingResponse, String> {
    let view = args.view;
    let inputs = build_housing_inputs(args)?;
    Ok(build_housing_response(HousingRequest { inputs, view }))
}

pub fn growth_report(args: SettingsArgs) -> Result<GrowthResponse, String> {
    let settings = build_settings(args)?;
    Ok(GrowthResponse {
        charts: growth_charts(&settings),
        settings,
    })
}

fn build_housing_response(request: HousingRequest) -> HousingResponse {
    let inputs = &request.inputs;
    let affordability =
        check_affordability(inputs.property_price, inputs.down_payment, inputs.gross_income);
    let comparison = compare_housing(inputs);
    HousingResponse {
        message: comparison.recommendation.to_string(),
        chart: housing_chart(&comparison, request.view.into()),
        view: request.view.into(),
        affordability,
        comparison,
    }
}

pub async fn run_http_server(args: ServeArgs) -> std::io::Result<()> {
    let ip = args
        .host
        .parse::<std::net::IpAddr>()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let addr = SocketAddr::from((ip, args.port));
    let state = AppState {
        settings: Arc::new(InMemorySettingsStore::new()),
    };
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "fincompare HTTP API listening");

    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/car", get(car_get_handler).post(car_post_handler))
        .route(
            "/api/housing",
            get(housing_get_handler).post(housing_post_handler),
        )
        .route("/api/growth", get(growth_get_handler).post(growth_post_handler))
        .route(
            "/api/settings",
            get(settings_get_handler).put(settings_put_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn car_get_handler(Query(payload): Query<CarPayload>) -> Response {
    car_handler_impl(payload).await
}

async fn car_post_handler(Json(payload): Json<CarPayload>) -> Response {
    car_handler_impl(payload).await
}

async fn car_handler_impl(payload: CarPayload) -> Response {
    let args = car_args_from_payload(payload);
    match car_report(args) {
        Ok(response) => {
            tracing::info!(best = ?response.comparison.ranking.best, "car comparison served");
            json_response(StatusCode::OK, response)
        }
        Err(msg) => {
            tracing::warn!(error = %msg, "rejected car comparison");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn housing_get_handler(Query(payload): Query<HousingPayload>) -> Response {
    housing_handler_impl(payload).await
}

async fn housing_post_handler(Json(payload): Json<HousingPayload>) -> Response {
    housing_handler_impl(payload).await
}

async fn housing_handler_impl(payload: HousingPayload) -> Response {
    let request = match housing_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            tracing::warn!(error = %msg, "rejected housing comparison");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let response = build_housing_response(request);
    tracing::info!(
        best = ?response.comparison.ranking.best,
        affordable = response.affordability.is_affordable,
        "housing comparison served"
    );
    json_response(StatusCode::OK, response)
}

async fn growth_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<SettingsPayload>,
) -> Response {
    growth_handler_impl(&state, payload).await
}

async fn growth_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<SettingsPayload>,
) -> Response {
    growth_handler_impl(&state, payload).await
}

async fn growth_handler_impl(state: &AppState, payload: SettingsPayload) -> Response {
    let args = settings_args_from_payload(state.settings.load(), payload);
    match growth_report(args) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn settings_get_handler(State(state): State<AppState>) -> Response {
    json_response(StatusCode::OK, state.settings.load())
}

async fn settings_put_handler(
    State(state): State<AppState>,
    Json(payload): Json<SettingsPayload>,
) -> Response {
    let args = settings_args_from_payload(state.settings.load(), payload);
    match build_settings(args) {
        Ok(settings) => {
            state.settings.save(&settings);
            tracing::info!(
                savings_rate = settings.savings_rate,
                monthly_savings = settings.monthly_savings,
                current_age = settings.current_age,
                "settings saved"
            );
            json_response(StatusCode::OK, settings)
        }
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn car_args_from_json(json: &str) -> Result<CarArgs, String> {
    let payload = serde_json::from_str::<CarPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(car_args_from_payload(payload))
}

#[cfg(test)]
fn housing_request_from_json(json: &str) -> Result<HousingRequest, String> {
    let payload = serde_json::from_str::<HousingPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    housing_request_from_payload(payload)
}

fn car_args_from_payload(payload: CarPayload) -> CarArgs {
    let mut args = default_car_args();

    if let Some(v) = payload.available_capital {
        args.available_capital = v;
    }
    if let Some(v) = payload.car_price {
        args.car_price = v;
    }
    if let Some(v) = payload.duration_months {
        args.duration_months = v;
    }
    if let Some(v) = payload.investment_return {
        args.investment_return = v;
    }
    if let Some(v) = payload.interest_rate {
        args.interest_rate = v;
    }
    if let Some(v) = payload.credit_rate {
        args.credit_rate = Some(v);
    }
    if let Some(v) = payload.lease_rate {
        args.lease_rate = Some(v);
    }
    if let Some(v) = payload.purchase_fee {
        args.purchase_fee = v;
    }
    if let Some(v) = payload.lease_fee {
        args.lease_fee = v;
    }
    if let Some(v) = payload.loan_fee {
        args.loan_fee = v;
    }

    args
}

fn housing_request_from_payload(payload: HousingPayload) -> Result<HousingRequest, String> {
    let mut args = default_housing_args();

    if let Some(v) = payload.property_price {
        args.property_price = v;
    }
    if let Some(v) = payload.down_payment {
        args.down_payment = v;
    }
    if let Some(v) = payload.purchase_costs {
        args.purchase_costs = v;
    }
    if let Some(v) = payload.appreciation {
        args.appreciation = v;
    }
    if let Some(v) = payload.maintenance {
        args.maintenance = v;
    }
    if let Some(v) = payload.mortgage_rate {
        args.mortgage_rate = v;
    }
    if let Some(v) = payload.amortization_years {
        args.amortization_years = v;
    }
    if let Some(v) = payload.monthly_rent {
        args.monthly_rent = v;
    }
    if let Some(v) = payload.rent_increase {
        args.rent_increase = v;
    }
    if let Some(v) = payload.investment_return {
        args.investment_return = v;
    }
    if let Some(v) = payload.duration_years {
        args.duration_years = v;
    }
    if let Some(v) = payload.tax_rate {
        args.tax_rate = v;
    }
    if let Some(v) = payload.gross_income {
        args.gross_income = v;
    }
    if let Some(v) = payload.view {
        args.view = v.into();
    }

    let view = args.view;
    let inputs = build_housing_inputs(args)?;
    Ok(HousingRequest { inputs, view })
}

fn settings_args_from_payload(current: Settings, payload: SettingsPayload) -> SettingsArgs {
    let mut args = SettingsArgs {
        savings_rate: current.savings_rate,
        monthly_savings: current.monthly_savings,
        current_age: current.current_age,
    };

    if let Some(v) = payload.savings_rate {
        args.savings_rate = v;
    }
    if let Some(v) = payload.monthly_savings {
        args.monthly_savings = v;
    }
    if let Some(v) = payload.current_age {
        args.current_age = v;
    }

    args
}

fn default_car_args() -> CarArgs {
    CarArgs {
        available_capital: 30_000.0,
        car_price: 35_000.0,
        duration_months: 48,
        investment_return: 6.0,
        interest_rate: 4.9,
        credit_rate: None,
        lease_rate: None,
        purchase_fee: 0.0,
        lease_fee: 0.0,
        loan_fee: 0.0,
    }
}

fn default_housing_args() -> HousingArgs {
    HousingArgs {
        property_price: 1_000_000.0,
        down_payment: 200_000.0,
        purchase_costs: 3.0,
        appreciation: 1.5,
        maintenance: 10_000.0,
        mortgage_rate: 2.0,
        amortization_years: 15,
        monthly_rent: 3_000.0,
        rent_increase: 1.5,
        investment_return: 5.0,
        duration_years: 20,
        tax_rate: 30.0,
        gross_income: 180_000.0,
        view: CliHousingView::Overview,
    }
}
