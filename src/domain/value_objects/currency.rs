use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::errors::FormatError;

const NBSP: &str = "\u{a0}";

/// Number layout of a locale. The symbol itself comes from the currency.
struct LocaleStyle {
    symbol_first: bool,
    /// Separator between amount and a trailing symbol.
    symbol_gap: &'static str,
    decimal_separator: &'static str,
    group_separator: &'static str,
}

struct Currency {
    code: &'static str,
    /// Symbol used in the currency's home regions.
    symbol: &'static str,
    home_regions: &'static [&'static str],
    /// Symbol used everywhere else.
    international_symbol: &'static str,
    fraction_digits: u32,
}

const fn currency(
    code: &'static str,
    symbol: &'static str,
    home_regions: &'static [&'static str],
    international_symbol: &'static str,
    fraction_digits: u32,
) -> Currency {
    Currency {
        code,
        symbol,
        home_regions,
        international_symbol,
        fraction_digits,
    }
}

const CURRENCIES: &[Currency] = &[
    currency("USD", "$", &["US", "PR", "EC", "SV"], "$", 2),
    currency("EUR", "€", &[], "€", 2),
    currency("GBP", "£", &[], "£", 2),
    currency("JPY", "¥", &["JP"], "¥", 0),
    currency("CAD", "$", &["CA"], "CA$", 2),
    currency("AUD", "$", &["AU"], "A$", 2),
    currency("NZD", "$", &["NZ"], "NZ$", 2),
    currency("MXN", "$", &["MX"], "MX$", 2),
    currency("HKD", "HK$", &[], "HK$", 2),
    currency("SGD", "$", &["SG"], "SGD", 2),
    currency("TWD", "$", &["TW"], "NT$", 2),
    currency("CHF", "CHF", &[], "CHF", 2),
    currency("BRL", "R$", &[], "R$", 2),
    currency("INR", "₹", &[], "₹", 2),
    currency("CNY", "¥", &["CN"], "CN¥", 2),
    currency("KRW", "₩", &[], "₩", 0),
    currency("SEK", "kr", &["SE"], "SEK", 2),
    currency("NOK", "kr", &["NO"], "NOK", 2),
    currency("DKK", "kr.", &["DK"], "DKK", 2),
    currency("PLN", "zł", &["PL"], "PLN", 2),
    currency("CZK", "Kč", &["CZ"], "CZK", 2),
    currency("TRY", "₺", &[], "₺", 2),
    currency("ILS", "₪", &[], "₪", 2),
    currency("ZAR", "R", &["ZA"], "ZAR", 2),
];

/// Regions whose own currency is written `$`; a bare `$` for US dollars
/// would be ambiguous there.
const OTHER_DOLLAR_REGIONS: &[&str] = &["CA", "AU", "NZ", "MX", "SG", "TW"];

impl Currency {
    fn lookup(code: &str) -> Option<&'static Currency> {
        CURRENCIES.iter().find(|currency| currency.code == code)
    }

    fn symbol_in(&self, region: Option<&str>) -> &'static str {
        match region {
            Some(region) if self.home_regions.iter().any(|home| *home == region) => self.symbol,
            Some(region)
                if self.code == "USD" && OTHER_DOLLAR_REGIONS.iter().any(|other| *other == region) =>
            {
                "US$"
            }
            _ => self.international_symbol,
        }
    }
}

struct PriceLocale {
    language: String,
    region: Option<String>,
    currency: Option<String>,
}

/// Splits `pt-BR@currency=BRL` / `zh_Hans_CN@calendar=x;currency=CNY`.
fn parse_locale(locale: &str) -> PriceLocale {
    let (base, keywords) = match locale.trim().split_once('@') {
        Some((base, keywords)) => (base, Some(keywords)),
        None => (locale.trim(), None),
    };

    let base = base.replace('-', "_");
    let mut segments = base.split('_');
    let language = segments.next().unwrap_or_default().to_ascii_lowercase();
    let region = segments
        .find(|segment| {
            (segment.len() == 2 && segment.chars().all(|c| c.is_ascii_alphabetic()))
                || (segment.len() == 3 && segment.chars().all(|c| c.is_ascii_digit()))
        })
        .map(str::to_ascii_uppercase);

    let currency = keywords.and_then(|keywords| {
        keywords.split(';').find_map(|keyword| {
            let (key, value) = keyword.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("currency")
                .then(|| value.trim().to_ascii_uppercase())
                .filter(|value| !value.is_empty())
        })
    });

    PriceLocale {
        language,
        region,
        currency,
    }
}

fn locale_style(language: &str, region: Option<&str>) -> Option<LocaleStyle> {
    let style = |symbol_first: bool,
                 symbol_gap: &'static str,
                 decimal_separator: &'static str,
                 group_separator: &'static str| LocaleStyle {
        symbol_first,
        symbol_gap,
        decimal_separator,
        group_separator,
    };

    let style = match (language, region) {
        ("de", Some("CH" | "LI")) => style(true, NBSP, ".", "\u{2019}"),
        ("de", Some("AT")) => style(true, NBSP, ",", NBSP),
        ("fr", Some("CH")) => style(false, NBSP, ",", NBSP),
        ("pt", Some("PT")) => style(false, NBSP, ",", NBSP),
        ("es", Some("MX" | "US")) => style(true, "", ".", ","),
        ("en" | "ja" | "zh" | "ko" | "th" | "he" | "hi", _) => style(true, "", ".", ","),
        ("de" | "es" | "it" | "el" | "da", _) => style(false, NBSP, ",", "."),
        ("nl" | "pt", _) => style(true, NBSP, ",", "."),
        ("tr" | "id", _) => style(true, "", ",", "."),
        ("fr" | "sv" | "nb" | "no" | "fi" | "pl" | "cs" | "ru" | "uk", _) => {
            style(false, NBSP, ",", NBSP)
        }
        _ => return None,
    };
    Some(style)
}

/// Formats `amount` for a store price locale such as `en_US@currency=USD`.
/// The currency code picks symbol and fraction digits, the language and
/// region pick separators and symbol placement. Rounds half-to-even.
pub fn format_currency(amount: Decimal, locale: &str) -> Result<String, FormatError> {
    let parsed = parse_locale(locale);
    let region = parsed.region.as_deref();

    let style = locale_style(&parsed.language, region)
        .ok_or_else(|| FormatError::UnsupportedLocale(locale.to_string()))?;
    let code = parsed
        .currency
        .ok_or_else(|| FormatError::MissingCurrency(locale.to_string()))?;
    let currency = Currency::lookup(&code).ok_or(FormatError::UnsupportedCurrency(code))?;
    let symbol = currency.symbol_in(region);

    let rounded = amount
        .round_dp_with_strategy(currency.fraction_digits, RoundingStrategy::MidpointNearestEven);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.*}", currency.fraction_digits as usize, rounded.abs());

    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };
    if integer.is_empty() || !integer.chars().all(|c| c.is_ascii_digit()) {
        return Err(FormatError::OutOfRange(amount.to_string()));
    }

    let mut number = group_thousands(integer, style.group_separator);
    if let Some(fraction) = fraction {
        number.push_str(style.decimal_separator);
        number.push_str(fraction);
    }

    let sign = if negative { "-" } else { "" };
    if style.symbol_first {
        // Letter symbols ("CHF", "kr") never touch the digits.
        let gap = if symbol.ends_with(|c: char| c.is_alphabetic()) && style.symbol_gap.is_empty() {
            NBSP
        } else {
            style.symbol_gap
        };
        Ok(format!("{sign}{symbol}{gap}{number}"))
    } else {
        Ok(format!("{sign}{number}{}{symbol}", style.symbol_gap))
    }
}

fn group_thousands(integer: &str, separator: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3 * separator.len());
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(amount: Decimal, locale: &str) -> String {
        format_currency(amount, locale).unwrap()
    }

    #[test]
    fn formats_us_dollars() {
        assert_eq!(format(Decimal::new(5999, 2), "en_US@currency=USD"), "$59.99");
        assert_eq!(
            format(Decimal::new(123456789, 2), "en_US@currency=USD"),
            "$1,234,567.89"
        );
    }

    #[test]
    fn monthly_share_of_annual_price_rounds_to_cents() {
        let monthly = Decimal::new(5999, 2) / Decimal::from(12);
        assert_eq!(format(monthly, "en_US@currency=USD"), "$5.00");

        let monthly = Decimal::new(9999, 2) / Decimal::from(12);
        assert_eq!(format(monthly, "en_US@currency=USD"), "$8.33");
    }

    #[test]
    fn symbol_follows_currency_not_region() {
        assert_eq!(format(Decimal::new(5999, 2), "en_US@currency=EUR"), "€59.99");
        assert_eq!(
            format(Decimal::new(5999, 2), "de_DE@currency=USD"),
            "59,99\u{a0}$"
        );
        assert_eq!(format(Decimal::new(7999, 2), "en_CA@currency=CAD"), "$79.99");
        assert_eq!(format(Decimal::new(7999, 2), "en_US@currency=CAD"), "CA$79.99");
        assert_eq!(format(Decimal::new(5999, 2), "en_CA@currency=USD"), "US$59.99");
    }

    #[test]
    fn euro_locales_put_symbol_last() {
        assert_eq!(
            format(Decimal::new(123499, 2), "de_DE@currency=EUR"),
            "1.234,99\u{a0}€"
        );
        assert_eq!(
            format(Decimal::new(5999, 2), "fr-FR@currency=EUR"),
            "59,99\u{a0}€"
        );
    }

    #[test]
    fn other_storefronts() {
        assert_eq!(format(Decimal::new(5999, 2), "en_IE@currency=EUR"), "€59.99");
        assert_eq!(
            format(Decimal::new(5999, 2), "nl_NL@currency=EUR"),
            "€\u{a0}59,99"
        );
        assert_eq!(
            format(Decimal::new(29990, 2), "pt_BR@currency=BRL"),
            "R$\u{a0}299,90"
        );
        assert_eq!(
            format(Decimal::new(109900, 2), "de_CH@currency=CHF"),
            "CHF\u{a0}1\u{2019}099.00"
        );
        assert_eq!(format(Decimal::new(499900, 2), "en_IN@currency=INR"), "₹4,999.00");
        assert_eq!(
            format(Decimal::new(49900, 2), "zh_Hans_CN@currency=CNY"),
            "¥499.00"
        );
    }

    #[test]
    fn yen_has_no_fraction_digits() {
        assert_eq!(format(Decimal::from(9800), "ja_JP@currency=JPY"), "¥9,800");
        assert_eq!(
            format(Decimal::from(9800) / Decimal::from(12), "ja_JP@currency=JPY"),
            "¥817"
        );
    }

    #[test]
    fn unknown_locale_or_currency_is_an_error() {
        assert_eq!(
            format_currency(Decimal::ONE, "xx_YY@currency=USD").unwrap_err(),
            FormatError::UnsupportedLocale("xx_YY@currency=USD".to_string())
        );
        assert_eq!(
            format_currency(Decimal::ONE, "en_US").unwrap_err(),
            FormatError::MissingCurrency("en_US".to_string())
        );
        assert_eq!(
            format_currency(Decimal::ONE, "en_US@currency=XTS").unwrap_err(),
            FormatError::UnsupportedCurrency("XTS".to_string())
        );
    }
}
