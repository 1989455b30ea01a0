//! Price estimates.
//!
//! `unit = base + size surcharge (+ back print surcharge)`, `total = unit * quantity`.
//! Prices are whole units of the configured currency.

/// Added when the back surface carries a design.
pub const BACK_PRINT_SURCHARGE: u64 = 500;

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum Size {
    XS,
    S,
    #[default]
    M,
    L,
    XL,
    XXL,
}
impl Size {
    #[must_use]
    pub fn surcharge(self) -> u64 {
        match self {
            Self::XS | Self::S | Self::M => 0,
            Self::L => 150,
            Self::XL => 300,
            Self::XXL => 450,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSettings {
    pub base_price: u64,
    pub currency: String,
}
impl Default for PriceSettings {
    fn default() -> Self {
        Self {
            base_price: 2500,
            currency: "LKR".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quote {
    pub unit: u64,
    pub quantity: u32,
    pub total: u64,
    pub currency: String,
}
impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.currency, self.total)?;
        if self.quantity != 1 {
            write!(f, " ({} x {})", self.quantity, self.unit)?;
        }
        Ok(())
    }
}

#[must_use]
pub fn quote(settings: &PriceSettings, size: Size, back_printed: bool, quantity: u32) -> Quote {
    let unit = settings
        .base_price
        .saturating_add(size.surcharge())
        .saturating_add(if back_printed { BACK_PRINT_SURCHARGE } else { 0 });
    Quote {
        unit,
        quantity,
        total: unit.saturating_mul(u64::from(quantity)),
        currency: settings.currency.clone(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn estimates() {
        let settings = PriceSettings::default();
        let plain = quote(&settings, Size::M, false, 1);
        assert_eq!(plain.total, 2500);
        assert_eq!(plain.to_string(), "LKR 2500");

        let big = quote(&settings, Size::XL, true, 3);
        assert_eq!(big.unit, 2500 + 300 + 500);
        assert_eq!(big.total, 3 * 3300);
        assert_eq!(big.to_string(), "LKR 9900 (3 x 3300)");
    }
    #[test]
    fn huge_prices_saturate() {
        let settings = PriceSettings {
            base_price: u64::MAX,
            ..PriceSettings::default()
        };
        let quote = quote(&settings, Size::XXL, true, 2);
        assert_eq!(quote.unit, u64::MAX);
        assert_eq!(quote.total, u64::MAX);
    }
    #[test]
    fn sizes_parse() {
        assert_eq!("XXL".parse::<Size>(), Ok(Size::XXL));
        assert!("XXXL".parse::<Size>().is_err());
        assert_eq!(
            serde_json::from_str::<PriceSettings>(r#"{"basePrice":1000,"currency":"USD"}"#)
                .unwrap()
                .base_price,
            1000
        );
    }
}
