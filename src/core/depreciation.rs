use super::growth::round_half_up;

/// Value lost over the first year of ownership.
pub const FIRST_YEAR_DEPRECIATION: f64 = 0.15;
/// Value lost over every following year.
pub const LATER_YEAR_DEPRECIATION: f64 = 0.10;

// Full years multiply by these literals; `1.0 - rate` differs in the last bit.
const FIRST_YEAR_RETENTION: f64 = 0.85;
const LATER_YEAR_RETENTION: f64 = 0.90;

/// Market value of a car bought at `price` after `months` of ownership.
///
/// The first year takes 15% off the purchase price, each further full year
/// another 10% of the remaining value. A partial year is pro-rated linearly
/// at the rate of the year it falls into. The result is rounded to whole
/// currency units.
pub fn car_value(price: f64, months: u32) -> f64 {
    let years = months as f64 / 12.0;
    if years < 1.0 {
        return round_half_up(price * (1.0 - FIRST_YEAR_DEPRECIATION * years));
    }

    let full_years = years.floor();
    let mut value = price * FIRST_YEAR_RETENTION;
    for _ in 1..full_years as u32 {
        value *= LATER_YEAR_RETENTION;
    }
    let partial_year = years - full_years;
    if partial_year > 0.0 {
        value *= 1.0 - LATER_YEAR_DEPRECIATION * partial_year;
    }
    round_half_up(value)
}
