//! The cart and mock checkout.

use garment_core::{
    pricing::Size,
    storage::records::CartLine,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub id: uuid::Uuid,
    pub placed_at: chrono::DateTime<chrono::Utc>,
    pub lines: Vec<CartLine>,
    pub total: u64,
    pub currency: String,
}
impl std::fmt::Display for Receipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "order {} placed {}: {} item(s), {} {}",
            self.id,
            self.placed_at.format("%Y-%m-%d %H:%M"),
            self.lines.iter().map(|line| u64::from(line.qty)).sum::<u64>(),
            self.currency,
            self.total,
        )
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CartError {
    #[error("cart is empty")]
    Empty,
    #[error("no cart line {0}")]
    NoSuchLine(usize),
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}
impl Cart {
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }
    pub fn add(&mut self, size: Size, qty: u32, total: u64, preview: String) -> Result<(), CartError> {
        if qty == 0 {
            return Err(CartError::ZeroQuantity);
        }
        self.lines.push(CartLine {
            size,
            qty,
            total,
            preview,
        });
        Ok(())
    }
    pub fn remove(&mut self, index: usize) -> Result<CartLine, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::NoSuchLine(index));
        }
        Ok(self.lines.remove(index))
    }
    #[must_use]
    pub fn total(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |total, line| total.saturating_add(line.total))
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
    /// Check out. Nothing is sent anywhere, the cart is emptied into a receipt.
    pub fn place_order(&mut self, currency: &str) -> Result<Receipt, CartError> {
        if self.lines.is_empty() {
            return Err(CartError::Empty);
        }
        let total = self.total();
        Ok(Receipt {
            id: uuid::Uuid::new_v4(),
            placed_at: chrono::Utc::now(),
            lines: std::mem::take(&mut self.lines),
            total,
            currency: currency.to_owned(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn cart_flow() {
        let mut cart = Cart::default();
        assert_eq!(cart.place_order("LKR"), Err(CartError::Empty));
        assert_eq!(cart.add(Size::M, 0, 0, String::new()), Err(CartError::ZeroQuantity));

        cart.add(Size::M, 1, 2500, String::new()).unwrap();
        cart.add(Size::XL, 2, 5600, String::new()).unwrap();
        cart.add(Size::S, 1, 2500, String::new()).unwrap();
        assert_eq!(cart.total(), 10600);
        assert_eq!(cart.remove(2).unwrap().size, Size::S);
        assert_eq!(cart.remove(5), Err(CartError::NoSuchLine(5)));

        let receipt = cart.place_order("LKR").unwrap();
        assert!(cart.is_empty());
        assert_eq!(receipt.total, 8100);
        assert_eq!(receipt.lines.len(), 2);
        assert!(receipt.to_string().ends_with("3 item(s), LKR 8100"));
    }
    #[test]
    fn stored_totals_saturate() {
        let line = |total| CartLine {
            size: Size::M,
            qty: 1,
            total,
            preview: String::new(),
        };
        let mut cart = Cart::from_lines(vec![line(u64::MAX), line(1)]);
        assert_eq!(cart.total(), u64::MAX);
        assert_eq!(cart.place_order("LKR").unwrap().total, u64::MAX);
    }
}
