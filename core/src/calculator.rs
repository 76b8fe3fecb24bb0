//! Yield calculator — gross and net income for a single loan.

use std::fmt;

/// Share of income kept after the platform commission (4.5%).
pub const COMMISSION_FACTOR: f64 = 0.955;
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Display value for figures that cannot be computed.
pub const NOT_COMPUTABLE: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldFigures {
    pub percent_amount: f64,
    pub income_with_commission: f64,
    pub income_without_commission: f64,
    pub annualized_net_yield_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YieldEstimate {
    Computed(YieldFigures),
    NotComputable,
}

impl YieldEstimate {
    pub fn figures(&self) -> Option<&YieldFigures> {
        match self {
            Self::Computed(f) => Some(f),
            Self::NotComputable => None,
        }
    }

    /// (income with commission, income without commission, yield %) as display strings.
    pub fn display_values(&self) -> (String, String, String) {
        match self {
            Self::Computed(f) => (
                format!("{:.2}", f.income_with_commission),
                format!("{:.2}", f.income_without_commission),
                format!("{:.2}%", f.annualized_net_yield_percent),
            ),
            Self::NotComputable => (
                NOT_COMPUTABLE.to_string(),
                NOT_COMPUTABLE.to_string(),
                NOT_COMPUTABLE.to_string(),
            ),
        }
    }
}

impl fmt::Display for YieldEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (gross, net, annual) = self.display_values();
        write!(f, "with commission: {gross}, without commission: {net}, annual yield: {annual}")
    }
}

pub fn estimate_yield(amount: f64, annual_rate_percent: f64, period_days: f64) -> YieldEstimate {
    if ![amount, annual_rate_percent, period_days].iter().all(|v| v.is_finite())
        || amount == 0.0
        || period_days == 0.0
    {
        return YieldEstimate::NotComputable;
    }

    let percent_amount = amount * (annual_rate_percent / 100.0) * (period_days / DAYS_PER_YEAR);
    let income_with_commission = amount + percent_amount;
    let income_without_commission = income_with_commission * COMMISSION_FACTOR;
    let annualized_net_yield_percent =
        ((income_without_commission - amount) / amount) * (DAYS_PER_YEAR / period_days) * 100.0;

    YieldEstimate::Computed(YieldFigures {
        percent_amount,
        income_with_commission,
        income_without_commission,
        annualized_net_yield_percent,
    })
}

/// Same as `estimate_yield`, from user-typed text. Either `.` or `,` is
/// accepted as the decimal separator.
pub fn estimate_yield_from_text(amount: &str, annual_rate_percent: &str, period_days: &str) -> YieldEstimate {
    match (parse_decimal(amount), parse_decimal(annual_rate_percent), parse_decimal(period_days)) {
        (Some(a), Some(r), Some(p)) => estimate_yield(a, r, p),
        _ => YieldEstimate::NotComputable,
    }
}

pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn reference_figures() {
        let est = estimate_yield(500.0, 700.0, 30.0);
        let f = est.figures().expect("computable");
        assert!(close(f.percent_amount, 287.67), "{}", f.percent_amount);
        assert!(close(f.income_with_commission, 787.67), "{}", f.income_with_commission);
        assert!(close(f.income_without_commission, 752.23), "{}", f.income_without_commission);
        let expected = ((f.income_without_commission - 500.0) / 500.0) * (365.0 / 30.0) * 100.0;
        assert!(close(f.annualized_net_yield_percent, expected));
        assert!(close(f.annualized_net_yield_percent, 613.75), "{}", f.annualized_net_yield_percent);
    }

    #[test]
    fn zero_amount_or_period_is_not_computable() {
        assert_eq!(estimate_yield(0.0, 700.0, 30.0), YieldEstimate::NotComputable);
        assert_eq!(estimate_yield(500.0, 700.0, 0.0), YieldEstimate::NotComputable);
    }

    #[test]
    fn text_inputs_accept_comma_separator() {
        assert_eq!(parse_decimal("12,5"), Some(12.5));
        assert_eq!(parse_decimal(" 3.25 "), Some(3.25));
        assert_eq!(
            estimate_yield_from_text("500,0", "700", "30"),
            estimate_yield(500.0, 700.0, 30.0)
        );
    }

    #[test]
    fn unparsable_text_is_not_computable() {
        assert_eq!(estimate_yield_from_text("abc", "700", "30"), YieldEstimate::NotComputable);
        assert_eq!(estimate_yield_from_text("500", "", "30"), YieldEstimate::NotComputable);
        let (a, b, c) = YieldEstimate::NotComputable.display_values();
        assert_eq!((a.as_str(), b.as_str(), c.as_str()), (NOT_COMPUTABLE, NOT_COMPUTABLE, NOT_COMPUTABLE));
    }

    #[test]
    fn display_values_use_two_decimals() {
        let (gross, net, annual) = estimate_yield(500.0, 700.0, 30.0).display_values();
        assert_eq!(gross, "787.67");
        assert_eq!(net, "752.23");
        assert!(annual.ends_with('%'));
    }
}
