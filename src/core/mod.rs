mod car;
mod charts;
mod depreciation;
mod growth;
mod housing;
mod ranking;
mod settings;
mod types;

pub use car::{LEASE_RESIDUAL_SHARE, compare_car, lease_payment};
pub use charts::{
    AllocationChart, ChartSeries, CompoundExample, Dataset, GrowthCharts, HousingView,
    RiskReturnPoint, allocation_chart, car_chart, compound_chart, compound_example,
    growth_charts, housing_chart, interest_loss_chart, lifestyle_chart, risk_return_points,
};
pub use depreciation::{FIRST_YEAR_DEPRECIATION, LATER_YEAR_DEPRECIATION, car_value};
pub use growth::{
    annuity_future_value, annuity_payment, compound, monthly_equivalent_rate, round_half_up,
};
pub use housing::{
    FIRST_MORTGAGE_LTV, IMPUTED_RENT_RATE, MAINTENANCE_DEDUCTION_RATE, MAX_COST_TO_INCOME,
    STRESS_AMORTIZATION_RATE, STRESS_INTEREST_RATE, STRESS_MAINTENANCE_RATE,
    check_affordability, compare_housing,
};
pub use ranking::{RankedOption, Ranking, rank};
pub use settings::{InMemorySettingsStore, Settings, SettingsStore};
pub use types::{
    Affordability, BuyResult, BuySnapshot, CarComparison, CarInputs, CarOption,
    CarRecommendation, CarSnapshot, CashResult, FinancingRates, HousingComparison,
    HousingInputs, HousingOption, HousingRecommendation, LeaseResult, LoanResult,
    RentInvestResult, RentInvestSnapshot, RentResult, RentSnapshot, ServiceFees,
};
