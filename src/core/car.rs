use super::depreciation::car_value;
use super::growth::{annuity_payment, monthly_equivalent_rate, round_half_up};
use super::ranking::{Ranking, rank};
use super::types::{
    CarComparison, CarInputs, CarOption, CarRecommendation, CarSnapshot, CashResult, LeaseResult,
    LoanResult,
};

/// Share of the price a leased car is assumed to be worth when returned.
pub const LEASE_RESIDUAL_SHARE: f64 = 0.45;

pub fn compare_car(inputs: &CarInputs) -> CarComparison {
    let monthly_return = monthly_equivalent_rate(inputs.investment_return);

    let cash = simulate_cash(inputs, monthly_return);
    let lease = simulate_lease(inputs, monthly_return);
    let loan = simulate_loan(inputs, monthly_return);

    let ranking = rank([
        (CarOption::Cash, cash.final_wealth),
        (CarOption::Lease, lease.final_wealth),
        (CarOption::Loan, loan.final_wealth),
    ]);
    let recommendation = recommend(&cash, &ranking);

    tracing::debug!(
        months = inputs.duration_months,
        cash = cash.final_wealth,
        lease = lease.final_wealth,
        loan = loan.final_wealth,
        best = ?ranking.best,
        "car comparison finished"
    );

    CarComparison {
        duration_months: inputs.duration_months,
        cash,
        lease,
        loan,
        ranking,
        recommendation,
    }
}

fn recommend(cash: &CashResult, ranking: &Ranking<CarOption>) -> CarRecommendation {
    if !cash.can_afford {
        return CarRecommendation::CashUnaffordable;
    }
    match ranking.best {
        CarOption::Cash => CarRecommendation::FavorCash,
        CarOption::Loan => CarRecommendation::FavorLoan {
            advantage: round_half_up(ranking.lead()),
        },
        CarOption::Lease => CarRecommendation::LeaseCaution,
    }
}

fn simulate_cash(inputs: &CarInputs, monthly_return: f64) -> CashResult {
    let upfront = inputs.car_price + inputs.fees.purchase;
    let invested = inputs.available_capital - upfront;
    let final_car_value = car_value(inputs.car_price, inputs.duration_months);

    if invested < 0.0 {
        let trajectory = (0..=inputs.duration_months)
            .map(|month| CarSnapshot {
                month,
                portfolio: 0.0,
                car_value: 0.0,
                debt: 0.0,
                cumulative_payments: 0.0,
                wealth: 0.0,
            })
            .collect();
        return CashResult {
            can_afford: false,
            trajectory,
            final_wealth: 0.0,
            final_car_value,
            total_cost: upfront,
        };
    }

    let trajectory = (0..=inputs.duration_months)
        .map(|month| {
            let car = car_value(inputs.car_price, month);
            let portfolio = invested * (1.0 + monthly_return).powf(month as f64);
            CarSnapshot {
                month,
                portfolio: round_half_up(portfolio),
                car_value: car,
                debt: 0.0,
                cumulative_payments: round_half_up(upfront),
                wealth: round_half_up(portfolio + car),
            }
        })
        .collect::<Vec<_>>();

    CashResult {
        can_afford: true,
        final_wealth: final_wealth(&trajectory),
        trajectory,
        final_car_value,
        total_cost: inputs.car_price - final_car_value + inputs.fees.purchase,
    }
}

/// Level lease payment covering depreciation down to the residual value plus
/// simple interest on the average of price and residual.
pub fn lease_payment(car_price: f64, lease_rate: f64, duration_months: u32) -> f64 {
    if duration_months == 0 {
        return 0.0;
    }
    let months = duration_months as f64;
    let residual = car_price * LEASE_RESIDUAL_SHARE;
    let depreciation = car_price - residual;
    let interest = (car_price + residual) / 2.0 * lease_rate * (months / 12.0);
    (depreciation + interest) / months
}

fn simulate_lease(inputs: &CarInputs, monthly_return: f64) -> LeaseResult {
    let payment = lease_payment(inputs.car_price, inputs.rates.lease(), inputs.duration_months);
    let setup = inputs.fees.lease_setup;

    let mut portfolio = inputs.available_capital - setup;
    let mut trajectory = Vec::with_capacity(inputs.duration_months as usize + 1);
    for month in 0..=inputs.duration_months {
        if month > 0 {
            portfolio = portfolio * (1.0 + monthly_return) - payment;
        }
        let clamped = portfolio.max(0.0);
        trajectory.push(CarSnapshot {
            month,
            portfolio: round_half_up(clamped),
            car_value: 0.0,
            debt: 0.0,
            cumulative_payments: round_half_up(setup + payment * month as f64),
            wealth: round_half_up(clamped),
        });
    }

    LeaseResult {
        final_wealth: final_wealth(&trajectory).max(0.0),
        trajectory,
        residual_value: round_half_up(inputs.car_price * LEASE_RESIDUAL_SHARE),
        monthly_payment: round_half_up(payment),
        total_cost: payment * inputs.duration_months as f64 + setup,
    }
}

fn simulate_loan(inputs: &CarInputs, monthly_return: f64) -> LoanResult {
    let monthly_interest = inputs.rates.credit() / 12.0;
    let payment = annuity_payment(inputs.car_price, monthly_interest, inputs.duration_months);
    let fees = inputs.fees.purchase + inputs.fees.loan_setup;

    let mut portfolio = inputs.available_capital - fees;
    let mut remaining_debt = inputs.car_price;
    let mut trajectory = Vec::with_capacity(inputs.duration_months as usize + 1);
    for month in 0..=inputs.duration_months {
        let car = car_value(inputs.car_price, month);
        if month > 0 {
            portfolio = portfolio * (1.0 + monthly_return) - payment;
            let interest_portion = remaining_debt * monthly_interest;
            let principal_portion = payment - interest_portion;
            remaining_debt = (remaining_debt - principal_portion).max(0.0);
        }
        let liquid = portfolio.max(0.0);
        trajectory.push(CarSnapshot {
            month,
            portfolio: round_half_up(liquid),
            car_value: car,
            debt: round_half_up(remaining_debt),
            cumulative_payments: round_half_up(fees + payment * month as f64),
            wealth: round_half_up(liquid + car - remaining_debt),
        });
    }

    let final_car_value = car_value(inputs.car_price, inputs.duration_months);
    let total_paid = payment * inputs.duration_months as f64;
    let total_interest = total_paid - inputs.car_price;

    LoanResult {
        final_wealth: final_wealth(&trajectory),
        trajectory,
        final_car_value,
        monthly_payment: round_half_up(payment),
        total_interest: round_half_up(total_interest),
        total_cost: inputs.car_price - final_car_value + total_interest + fees,
    }
}

fn final_wealth(trajectory: &[CarSnapshot]) -> f64 {
    trajectory.last().map(|s| s.wealth).unwrap_or(0.0)
}
