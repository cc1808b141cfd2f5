use serde::Serialize;

use super::growth::{annuity_future_value, compound, round_half_up};
use super::settings::Settings;
use super::types::{CarComparison, CarSnapshot, HousingComparison};

/// Return assumed for invested money throughout the education charts, percent.
pub const EDUCATION_RETURN_PERCENT: f64 = 7.0;
pub const RETIREMENT_AGE: u32 = 65;

const CAR_SAMPLE_MONTHS: u32 = 3;
const COMPOUND_PRINCIPAL: f64 = 10_000.0;
const COMPOUND_HORIZON_YEARS: u32 = 30;
const LIFESTYLE_FIRST_AGE: u32 = 25;
const LIFESTYLE_AGE_STEP: u32 = 5;
const ALLOCATION_AGES: [u32; 5] = [25, 35, 45, 55, 65];
const MIN_STOCK_SHARE: u32 = 20;
const INFLATION_RATE: f64 = 0.02;
const LOW_INTEREST_RATE: f64 = 0.005;
const INTEREST_LOSS_YEARS: u32 = 20;
const EARLY_START_AGE: u32 = 25;
const LATE_START_AGE: u32 = 35;

/// A set of line or bar series sharing one x axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    /// Month, year or age of each sample, depending on the chart.
    pub x: Vec<u32>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub values: Vec<f64>,
}

impl Dataset {
    fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum HousingView {
    #[default]
    Overview,
    Buy,
    Rent,
    RentAndInvest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationChart {
    pub series: ChartSeries,
    /// Set when the current age is one of the sampled ages.
    pub current_age: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReturnPoint {
    pub asset_class: &'static str,
    /// Volatility, percent.
    pub risk: f64,
    /// Expected annual return, percent.
    pub expected_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundExample {
    pub monthly_savings: f64,
    pub early_start_age: u32,
    pub late_start_age: u32,
    /// Value at retirement in thousands, saving from the early start age.
    pub early_total_thousands: f64,
    pub late_total_thousands: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthCharts {
    pub compound: ChartSeries,
    pub lifestyle: ChartSeries,
    pub allocation: AllocationChart,
    pub interest_loss: ChartSeries,
    pub risk_return: Vec<RiskReturnPoint>,
    pub compound_example: CompoundExample,
}

/// Samples the three car wealth paths every third month, closing on the
/// final month when the duration is not a multiple of three.
pub fn car_chart(comparison: &CarComparison) -> ChartSeries {
    let duration = comparison.duration_months;
    let mut x = (0..=duration)
        .step_by(CAR_SAMPLE_MONTHS as usize)
        .collect::<Vec<_>>();
    let needs_final = duration % CAR_SAMPLE_MONTHS != 0;
    if needs_final {
        x.push(duration);
    }

    let sample = |trajectory: &[CarSnapshot], final_wealth: f64| {
        let mut values = (0..=duration)
            .step_by(CAR_SAMPLE_MONTHS as usize)
            .map(|m| trajectory.get(m as usize).map(|s| s.wealth).unwrap_or(0.0))
            .collect::<Vec<_>>();
        if needs_final {
            values.push(final_wealth);
        }
        values
    };

    ChartSeries {
        x,
        datasets: vec![
            Dataset::new(
                "Cash",
                sample(&comparison.cash.trajectory, comparison.cash.final_wealth),
            ),
            Dataset::new(
                "Lease",
                sample(&comparison.lease.trajectory, comparison.lease.final_wealth),
            ),
            Dataset::new(
                "Loan",
                sample(&comparison.loan.trajectory, comparison.loan.final_wealth),
            ),
        ],
    }
}

fn housing_sample_years(duration: u32) -> Vec<u32> {
    let step = (duration / 10).max(1);
    let mut years = (0..=duration).step_by(step as usize).collect::<Vec<_>>();
    if duration % step != 0 {
        years.push(duration);
    }
    years
}

fn sample_years(years: &[u32], value_at: impl Fn(usize) -> Option<f64>) -> Vec<f64> {
    years
        .iter()
        .map(|&y| value_at(y as usize).unwrap_or(0.0))
        .collect()
}

pub fn housing_chart(comparison: &HousingComparison, view: HousingView) -> ChartSeries {
    let years = housing_sample_years(comparison.duration_years);
    let buy = &comparison.buy.trajectory;
    let rent = &comparison.rent.trajectory;
    let invest = &comparison.rent_and_invest.trajectory;

    let datasets = match view {
        HousingView::Overview => vec![
            Dataset::new("Buy", sample_years(&years, |y| buy.get(y).map(|s| s.wealth))),
            Dataset::new("Rent", sample_years(&years, |y| rent.get(y).map(|s| s.wealth))),
            Dataset::new(
                "Rent and invest",
                sample_years(&years, |y| invest.get(y).map(|s| s.wealth)),
            ),
        ],
        HousingView::Buy => vec![
            Dataset::new(
                "Property value",
                sample_years(&years, |y| buy.get(y).map(|s| s.property_value)),
            ),
            // Drawn below the axis.
            Dataset::new(
                "Mortgage",
                sample_years(&years, |y| buy.get(y).map(|s| -s.mortgage)),
            ),
        ],
        HousingView::Rent => vec![
            Dataset::new(
                "Portfolio",
                sample_years(&years, |y| rent.get(y).map(|s| s.portfolio)),
            ),
            Dataset::new(
                "Cumulative rent paid",
                sample_years(&years, |y| rent.get(y).map(|s| s.total_rent_paid)),
            ),
        ],
        HousingView::RentAndInvest => vec![
            Dataset::new(
                "Portfolio",
                sample_years(&years, |y| invest.get(y).map(|s| s.portfolio)),
            ),
            Dataset::new(
                "Extra savings",
                sample_years(&years, |y| invest.get(y).map(|s| s.extra_saved)),
            ),
        ],
    };

    ChartSeries { x: years, datasets }
}

/// 10'000 left to grow for up to thirty years, invested versus on a savings
/// account paying `settings.savings_rate`.
pub fn compound_chart(settings: &Settings) -> ChartSeries {
    let x = (0..=COMPOUND_HORIZON_YEARS).step_by(5).collect::<Vec<_>>();
    let grow = |rate: f64| {
        x.iter()
            .map(|&years| {
                if years == 0 {
                    COMPOUND_PRINCIPAL
                } else {
                    round_half_up(compound(COMPOUND_PRINCIPAL, rate, years as f64))
                }
            })
            .collect::<Vec<_>>()
    };

    ChartSeries {
        datasets: vec![
            Dataset::new(
                format!("Invested ({EDUCATION_RETURN_PERCENT:.0}%)"),
                grow(EDUCATION_RETURN_PERCENT),
            ),
            Dataset::new(
                format!("Savings account ({:.2}%)", settings.savings_rate),
                grow(settings.savings_rate),
            ),
        ],
        x,
    }
}

fn lifestyle_ages(current_age: u32) -> Vec<u32> {
    let start = current_age.max(LIFESTYLE_FIRST_AGE);
    let mut ages = (start..=RETIREMENT_AGE)
        .step_by(LIFESTYLE_AGE_STEP as usize)
        .collect::<Vec<_>>();
    if ages.last() != Some(&RETIREMENT_AGE) {
        ages.push(RETIREMENT_AGE);
    }
    ages
}

/// Savings pot by age for one and a half and for half the configured monthly
/// saving. Ages not yet reached read zero.
pub fn lifestyle_chart(settings: &Settings) -> ChartSeries {
    let ages = lifestyle_ages(settings.current_age);
    let high = settings.monthly_savings * 1.5;
    let low = settings.monthly_savings * 0.5;

    let pot = |monthly: f64| {
        ages.iter()
            .map(|&age| {
                if age < settings.current_age {
                    return 0.0;
                }
                let years = (age - settings.current_age) as f64;
                round_half_up(annuity_future_value(monthly, EDUCATION_RETURN_PERCENT, years))
            })
            .collect::<Vec<_>>()
    };

    ChartSeries {
        datasets: vec![
            Dataset::new(
                format!("High savings ({}/month)", round_half_up(high)),
                pot(high),
            ),
            Dataset::new(
                format!("Low savings ({}/month)", round_half_up(low)),
                pot(low),
            ),
        ],
        x: ages,
    }
}

fn allocation_ages(current_age: u32) -> Vec<u32> {
    let in_window = (LIFESTYLE_FIRST_AGE..=RETIREMENT_AGE).contains(&current_age);
    if !in_window || ALLOCATION_AGES.contains(&current_age) {
        return ALLOCATION_AGES.to_vec();
    }

    let mut all = ALLOCATION_AGES.to_vec();
    all.push(current_age);
    all.sort_unstable();
    let index = all.iter().position(|&a| a == current_age).unwrap_or(0);
    let start = index.saturating_sub(2);
    let end = (start + ALLOCATION_AGES.len()).min(all.len());
    all[start..end].to_vec()
}

/// "100 minus age" in stocks, never below 20%, bonds for the rest.
pub fn allocation_chart(settings: &Settings) -> AllocationChart {
    let ages = allocation_ages(settings.current_age);
    let stocks = ages
        .iter()
        .map(|&age| 100u32.saturating_sub(age).max(MIN_STOCK_SHARE) as f64)
        .collect::<Vec<_>>();
    let bonds = stocks.iter().map(|s| 100.0 - s).collect::<Vec<_>>();
    let current_age = ages
        .contains(&settings.current_age)
        .then_some(settings.current_age);

    AllocationChart {
        series: ChartSeries {
            x: ages,
            datasets: vec![Dataset::new("Stocks", stocks), Dataset::new("Bonds", bonds)],
        },
        current_age,
    }
}

/// Real purchasing power of 10'000 under 2% inflation, left at 0% and at 0.5%
/// interest, alongside the unchanged nominal amount.
pub fn interest_loss_chart() -> ChartSeries {
    let x = (0..=INTEREST_LOSS_YEARS).collect::<Vec<_>>();
    let real = |interest: f64| {
        x.iter()
            .map(|&year| {
                let nominal = COMPOUND_PRINCIPAL * (1.0 + interest).powf(year as f64);
                round_half_up(nominal / (1.0 + INFLATION_RATE).powf(year as f64))
            })
            .collect::<Vec<_>>()
    };

    ChartSeries {
        datasets: vec![
            Dataset::new("0.00% interest", real(0.0)),
            Dataset::new("0.50% interest", real(LOW_INTEREST_RATE)),
            Dataset::new("Nominal value", vec![COMPOUND_PRINCIPAL; x.len()]),
        ],
        x,
    }
}

pub fn risk_return_points(settings: &Settings) -> Vec<RiskReturnPoint> {
    let point = |asset_class, risk, expected_return| RiskReturnPoint {
        asset_class,
        risk,
        expected_return,
    };
    vec![
        point("Savings account", 0.5, settings.savings_rate),
        point("Bonds", 3.0, 3.0),
        point("Real estate", 5.0, 5.0),
        point("P2P lending", 9.0, 8.0),
        point("Stocks", 12.0, 7.0),
        point("Gold", 8.0, 4.0),
        point("Crypto", 30.0, 15.0),
    ]
}

pub fn compound_example(settings: &Settings) -> CompoundExample {
    let total = |start_age: u32| {
        let years = (RETIREMENT_AGE - start_age) as f64;
        round_half_up(
            annuity_future_value(settings.monthly_savings, EDUCATION_RETURN_PERCENT, years)
                / 1000.0,
        )
    };
    CompoundExample {
        monthly_savings: settings.monthly_savings,
        early_start_age: EARLY_START_AGE,
        late_start_age: LATE_START_AGE,
        early_total_thousands: total(EARLY_START_AGE),
        late_total_thousands: total(LATE_START_AGE),
    }
}

pub fn growth_charts(settings: &Settings) -> GrowthCharts {
    GrowthCharts {
        compound: compound_chart(settings),
        lifestyle: lifestyle_chart(settings),
        allocation: allocation_chart(settings),
        interest_loss: interest_loss_chart(),
        risk_return: risk_return_points(settings),
        compound_example: compound_example(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::car::compare_car;
    use crate::core::housing::compare_housing;
    use crate::core::types::{CarInputs, FinancingRates, HousingInputs, ServiceFees};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn car_inputs(months: u32) -> CarInputs {
        CarInputs {
            available_capital: 30_000.0,
            car_price: 20_000.0,
            duration_months: months,
            investment_return: 0.06,
            rates: FinancingRates::Shared(0.049),
            fees: ServiceFees::default(),
        }
    }

    fn housing_inputs(years: u32) -> HousingInputs {
        HousingInputs {
            property_price: 1_000_000.0,
            down_payment: 200_000.0,
            purchase_cost_rate: 0.03,
            appreciation_rate: 0.015,
            annual_maintenance: 10_000.0,
            mortgage_rate: 0.02,
            amortization_years: 15,
            monthly_rent: 3_000.0,
            rent_increase_rate: 0.015,
            investment_return: 0.05,
            duration_years: years,
            marginal_tax_rate: 0.30,
            gross_income: 180_000.0,
        }
    }

    #[test]
    fn car_chart_samples_every_third_month() {
        let comparison = compare_car(&car_inputs(12));
        let chart = car_chart(&comparison);
        assert_eq!(chart.x, vec![0, 3, 6, 9, 12]);
        assert_eq!(chart.datasets.len(), 3);
        assert_eq!(chart.datasets[0].values[4], comparison.cash.trajectory[12].wealth);
    }

    #[test]
    fn car_chart_closes_on_an_odd_final_month() {
        let comparison = compare_car(&car_inputs(10));
        let chart = car_chart(&comparison);
        assert_eq!(chart.x, vec![0, 3, 6, 9, 10]);
        assert_eq!(chart.datasets[2].values[4], comparison.loan.final_wealth);
    }

    #[test]
    fn housing_sampling_steps_by_a_tenth_of_the_duration() {
        assert_eq!(housing_sample_years(20), vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20]);
        assert_eq!(housing_sample_years(5), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(
            housing_sample_years(25),
            vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 25]
        );
        assert_eq!(housing_sample_years(0), vec![0]);
    }

    #[test]
    fn buy_view_draws_the_mortgage_negative() {
        let comparison = compare_housing(&housing_inputs(10));
        let chart = housing_chart(&comparison, HousingView::Buy);
        assert_eq!(chart.datasets[1].values[0], -800_000.0);
        assert_eq!(chart.datasets[0].values[0], 1_000_000.0);
    }

    #[test]
    fn overview_has_one_wealth_line_per_option() {
        let comparison = compare_housing(&housing_inputs(10));
        let chart = housing_chart(&comparison, HousingView::Overview);
        assert_eq!(chart.datasets.len(), 3);
        assert_eq!(
            chart.datasets[2].values.last().copied(),
            Some(comparison.rent_and_invest.final_wealth)
        );
    }

    #[test]
    fn rent_views_show_portfolio_and_secondary_line() {
        let comparison = compare_housing(&housing_inputs(10));
        let rent = housing_chart(&comparison, HousingView::Rent);
        assert_eq!(rent.datasets[1].values[0], 0.0);
        let invest = housing_chart(&comparison, HousingView::RentAndInvest);
        assert_eq!(invest.datasets[0].values[0], 230_000.0);
    }

    #[test]
    fn compound_chart_starts_at_principal() {
        let chart = compound_chart(&Settings::default());
        assert_eq!(chart.x, vec![0, 5, 10, 15, 20, 25, 30]);
        assert_eq!(chart.datasets[0].values[0], 10_000.0);
        assert_eq!(chart.datasets[0].values[1], round_half_up(10_000.0 * 1.07_f64.powf(5.0)));
        assert_eq!(chart.datasets[1].label, "Savings account (0.50%)");
    }

    #[test]
    fn lifestyle_ages_always_end_at_retirement() {
        assert_eq!(lifestyle_ages(30), vec![30, 35, 40, 45, 50, 55, 60, 65]);
        assert_eq!(lifestyle_ages(32), vec![32, 37, 42, 47, 52, 57, 62, 65]);
        assert_eq!(lifestyle_ages(18), vec![25, 30, 35, 40, 45, 50, 55, 60, 65]);
        assert_eq!(lifestyle_ages(70), vec![65]);
    }

    #[test]
    fn lifestyle_chart_starts_at_zero_and_high_beats_low() {
        let chart = lifestyle_chart(&Settings::default());
        assert_eq!(chart.datasets[0].values[0], 0.0);
        let high = chart.datasets[0].values.last().copied().unwrap_or(0.0);
        let low = chart.datasets[1].values.last().copied().unwrap_or(0.0);
        assert!(high > low);
        assert_eq!(chart.datasets[0].label, "High savings (300/month)");
    }

    #[test]
    fn lifestyle_chart_zero_before_current_age() {
        let settings = Settings {
            current_age: 18,
            ..Settings::default()
        };
        let chart = lifestyle_chart(&settings);
        assert_eq!(chart.x[0], 25);
        assert!(chart.datasets[1].values[0] > 0.0);

        let settings = Settings {
            current_age: 70,
            ..Settings::default()
        };
        assert_eq!(lifestyle_chart(&settings).datasets[0].values, vec![0.0]);
    }

    #[test]
    fn allocation_uses_base_ages_outside_the_window() {
        assert_eq!(allocation_ages(20), vec![25, 35, 45, 55, 65]);
        assert_eq!(allocation_ages(35), vec![25, 35, 45, 55, 65]);
        assert_eq!(allocation_ages(70), vec![25, 35, 45, 55, 65]);
    }

    #[test]
    fn allocation_window_centres_on_current_age() {
        assert_eq!(allocation_ages(30), vec![25, 30, 35, 45, 55]);
        assert_eq!(allocation_ages(50), vec![35, 45, 50, 55, 65]);
        assert_eq!(allocation_ages(60), vec![45, 55, 60, 65]);
    }

    #[test]
    fn allocation_flags_current_age_and_floors_stocks() {
        let chart = allocation_chart(&Settings::default());
        assert_eq!(chart.current_age, Some(30));
        assert_eq!(chart.series.datasets[0].values, vec![75.0, 70.0, 65.0, 55.0, 45.0]);

        let settings = Settings {
            current_age: 20,
            ..Settings::default()
        };
        let chart = allocation_chart(&settings);
        assert_eq!(chart.current_age, None);
        assert_eq!(chart.series.datasets[0].values[4], 35.0);
        assert_eq!(chart.series.datasets[1].values[4], 65.0);
    }

    #[test]
    fn interest_loss_shrinks_purchasing_power() {
        let chart = interest_loss_chart();
        assert_eq!(chart.x.len(), 21);
        assert_eq!(chart.datasets[0].values[0], 10_000.0);
        assert_eq!(chart.datasets[0].values[1], 9_804.0);
        assert_eq!(chart.datasets[0].values[20], 6_730.0);
        assert!(chart.datasets[1].values[20] > chart.datasets[0].values[20]);
        assert!(chart.datasets[2].values.iter().all(|&v| v == 10_000.0));
    }

    #[test]
    fn savings_account_point_follows_settings() {
        let settings = Settings {
            savings_rate: 1.25,
            ..Settings::default()
        };
        let points = risk_return_points(&settings);
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].expected_return, 1.25);
        assert_eq!(points[6].risk, 30.0);
    }

    #[test]
    fn compound_example_favours_the_early_start() {
        let example = compound_example(&Settings::default());
        let expected = round_half_up(annuity_future_value(200.0, 7.0, 40.0) / 1000.0);
        assert_eq!(example.early_total_thousands, expected);
        assert!(example.early_total_thousands > 2.0 * example.late_total_thousands);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_housing_samples_are_increasing_and_end_on_duration(duration in 0u32..80) {
            let years = housing_sample_years(duration);
            prop_assert_eq!(years[0], 0);
            prop_assert_eq!(years.last().copied(), Some(duration));
            prop_assert!(years.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn prop_allocation_shares_sum_to_one_hundred(age in 0u32..100) {
            let settings = Settings { current_age: age, ..Settings::default() };
            let chart = allocation_chart(&settings);
            let stocks = &chart.series.datasets[0].values;
            let bonds = &chart.series.datasets[1].values;
            prop_assert!(stocks.len() <= 5);
            for (s, b) in stocks.iter().zip(bonds) {
                prop_assert_eq!(s + b, 100.0);
                prop_assert!(*s >= 20.0);
            }
        }
    }
}
