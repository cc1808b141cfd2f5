/// Rounds to the nearest whole currency unit, with halves going up
/// (`-2.5 -> -2`, `2.5 -> 3`). Every stored per-period figure goes through here.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// `principal * (1 + rate/100)^years`.
pub fn compound(principal: f64, annual_rate_percent: f64, years: f64) -> f64 {
    principal * (1.0 + annual_rate_percent / 100.0).powf(years)
}

/// Future value of a level monthly contribution with monthly compounding.
pub fn annuity_future_value(
    monthly_contribution: f64,
    annual_rate_percent: f64,
    years: f64,
) -> f64 {
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let months = years * 12.0;
    if monthly_rate == 0.0 {
        return monthly_contribution * months;
    }
    monthly_contribution * (((1.0 + monthly_rate).powf(months) - 1.0) / monthly_rate)
}

/// Level payment that amortizes `principal` over `num_periods`.
pub fn annuity_payment(principal: f64, monthly_rate: f64, num_periods: u32) -> f64 {
    if num_periods == 0 {
        return 0.0;
    }
    let n = num_periods as f64;
    if monthly_rate == 0.0 {
        return principal / n;
    }
    let factor = (1.0 + monthly_rate).powf(n);
    principal * (monthly_rate * factor) / (factor - 1.0)
}

/// Monthly rate that compounds to `annual_rate` (a fraction) over twelve months.
pub fn monthly_equivalent_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}
