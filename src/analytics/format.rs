/// Default number of digits shown after the decimal point.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Render a fixed-point integer (`value * 10^-exponent`) as a plain decimal
/// string with exactly `display_decimals` fractional digits.
///
/// Extra precision is truncated, never rounded: `1_999_999` at exponent 6
/// renders as `"1.99"`. No grouping separators, `.` as decimal point.
pub fn format_fixed_point(value: u128, exponent: u32, display_decimals: u32) -> String {
    let width = display_decimals as usize;

    if exponent >= display_decimals {
        // Scaled magnitude in units of 10^-display_decimals.
        let scaled = match pow10(exponent - display_decimals) {
            Some(divisor) => value / divisor,
            None => 0,
        };
        let (whole, frac) = match pow10(display_decimals) {
            Some(unit) => (scaled / unit, scaled % unit),
            None => (0, scaled),
        };
        if width == 0 {
            whole.to_string()
        } else {
            format!("{whole}.{frac:0width$}")
        }
    } else {
        // Fewer source digits than display digits: pad with zeros.
        let exp_width = exponent as usize;
        let (whole, frac) = match pow10(exponent) {
            Some(unit) => (value / unit, value % unit),
            None => (0, value),
        };
        let padding = "0".repeat(width - exp_width);
        if exp_width == 0 {
            format!("{whole}.{padding}")
        } else {
            format!("{whole}.{frac:0exp_width$}{padding}")
        }
    }
}

/// `10^n`, or `None` once it no longer fits in a `u128`.
fn pow10(n: u32) -> Option<u128> {
    10u128.checked_pow(n)
}
