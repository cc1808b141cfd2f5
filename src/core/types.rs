use std::fmt;

use serde::Serialize;

use super::ranking::Ranking;

/// Interest charged on the loan and built into the lease, as annual fractions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FinancingRates {
    Shared(f64),
    Separate { credit: f64, lease: f64 },
}

impl FinancingRates {
    pub fn credit(self) -> f64 {
        match self {
            FinancingRates::Shared(rate) => rate,
            FinancingRates::Separate { credit, .. } => credit,
        }
    }

    pub fn lease(self) -> f64 {
        match self {
            FinancingRates::Shared(rate) => rate,
            FinancingRates::Separate { lease, .. } => lease,
        }
    }
}

/// One-off fees paid at month 0.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ServiceFees {
    /// Paid by both ownership options (cash and loan).
    pub purchase: f64,
    pub lease_setup: f64,
    pub loan_setup: f64,
}

#[derive(Debug, Clone)]
pub struct CarInputs {
    pub available_capital: f64,
    pub car_price: f64,
    pub duration_months: u32,
    pub investment_return: f64,
    pub rates: FinancingRates,
    pub fees: ServiceFees,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CarOption {
    Cash,
    Lease,
    Loan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSnapshot {
    pub month: u32,
    pub portfolio: f64,
    pub car_value: f64,
    pub debt: f64,
    pub cumulative_payments: f64,
    pub wealth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashResult {
    pub can_afford: bool,
    pub trajectory: Vec<CarSnapshot>,
    pub final_wealth: f64,
    pub final_car_value: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseResult {
    pub trajectory: Vec<CarSnapshot>,
    pub final_wealth: f64,
    pub residual_value: f64,
    pub monthly_payment: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResult {
    pub trajectory: Vec<CarSnapshot>,
    pub final_wealth: f64,
    pub final_car_value: f64,
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "key", rename_all = "kebab-case")]
pub enum CarRecommendation {
    CashUnaffordable,
    FavorCash,
    FavorLoan { advantage: f64 },
    LeaseCaution,
}

impl fmt::Display for CarRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarRecommendation::CashUnaffordable => write!(
                f,
                "Not enough capital for a cash purchase. Compare leasing against the loan."
            ),
            CarRecommendation::FavorCash => write!(
                f,
                "Paying cash is the best option: no interest, and the car is yours from day one."
            ),
            CarRecommendation::FavorLoan { advantage } => write!(
                f,
                "A loan can make sense here: your investments earn more than the loan costs ({advantage:.0} ahead)."
            ),
            CarRecommendation::LeaseCaution => write!(
                f,
                "Leasing leaves the most wealth on paper, but you never own the car."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarComparison {
    pub duration_months: u32,
    pub cash: CashResult,
    pub lease: LeaseResult,
    pub loan: LoanResult,
    pub ranking: Ranking<CarOption>,
    pub recommendation: CarRecommendation,
}

/// Housing parameters. Rates are annual fractions, money in whole currency units.
#[derive(Debug, Clone)]
pub struct HousingInputs {
    pub property_price: f64,
    pub down_payment: f64,
    pub purchase_cost_rate: f64,
    pub appreciation_rate: f64,
    pub annual_maintenance: f64,
    pub mortgage_rate: f64,
    pub amortization_years: u32,
    pub monthly_rent: f64,
    pub rent_increase_rate: f64,
    pub investment_return: f64,
    pub duration_years: u32,
    pub marginal_tax_rate: f64,
    pub gross_income: f64,
}

impl HousingInputs {
    pub fn mortgage(&self) -> f64 {
        self.property_price - self.down_payment
    }

    pub fn purchase_costs(&self) -> f64 {
        self.property_price * self.purchase_cost_rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordability {
    pub is_affordable: bool,
    pub annual_cost: f64,
    pub ratio: f64,
    pub percent_of_income: f64,
    pub max_mortgage: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HousingOption {
    Buy,
    Rent,
    RentAndInvest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuySnapshot {
    pub year: u32,
    pub property_value: f64,
    pub mortgage: f64,
    pub yearly_cost: f64,
    pub tax_effect: f64,
    pub wealth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyResult {
    pub trajectory: Vec<BuySnapshot>,
    pub final_wealth: f64,
    pub final_property_value: f64,
    pub final_mortgage: f64,
    pub total_interest_paid: f64,
    pub total_maintenance_paid: f64,
    pub total_tax_effect: f64,
    pub avg_monthly_cost: f64,
    pub avg_monthly_interest: f64,
    pub avg_monthly_amortization: f64,
    pub avg_monthly_maintenance: f64,
    pub avg_monthly_tax: f64,
    pub purchase_costs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentSnapshot {
    pub year: u32,
    pub portfolio: f64,
    pub yearly_rent: f64,
    pub total_rent_paid: f64,
    pub wealth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentResult {
    pub trajectory: Vec<RentSnapshot>,
    pub final_wealth: f64,
    pub final_portfolio: f64,
    pub total_rent_paid: f64,
    pub start_monthly_rent: f64,
    pub end_monthly_rent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentInvestSnapshot {
    pub year: u32,
    pub portfolio: f64,
    pub yearly_rent: f64,
    pub extra_saved: f64,
    pub wealth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentInvestResult {
    pub trajectory: Vec<RentInvestSnapshot>,
    pub final_wealth: f64,
    pub final_portfolio: f64,
    pub total_extra_saved: f64,
    pub avg_monthly_savings: f64,
    pub initial_capital: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "key", rename_all = "kebab-case")]
pub enum HousingRecommendation {
    BuyWins { advantage: f64 },
    RentWins { advantage: f64 },
    RentAndInvestWins { advantage: f64 },
}

impl fmt::Display for HousingRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HousingRecommendation::BuyWins { advantage } => write!(
                f,
                "Buying ends {advantage:.0} ahead: you build equity and benefit from appreciation."
            ),
            HousingRecommendation::RentWins { advantage } => write!(
                f,
                "Renting ends {advantage:.0} ahead: the invested down payment outgrows the property equity."
            ),
            HousingRecommendation::RentAndInvestWins { advantage } => write!(
                f,
                "Renting and investing the difference ends {advantage:.0} ahead: invest the down payment, the purchase costs and the monthly gap."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HousingComparison {
    pub duration_years: u32,
    pub buy: BuyResult,
    pub rent: RentResult,
    pub rent_and_invest: RentInvestResult,
    pub ranking: Ranking<HousingOption>,
    pub recommendation: HousingRecommendation,
}
