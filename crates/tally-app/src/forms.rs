// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{LineItem, NumericUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Name,
    Qty,
    Price,
    DiscountPercent,
    TaxPercent,
}

impl FieldName {
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Qty,
        Self::Price,
        Self::DiscountPercent,
        Self::TaxPercent,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Qty => "qty",
            Self::Price => "price",
            Self::DiscountPercent => "discountPercent",
            Self::TaxPercent => "taxPercent",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Invoice Name",
            Self::Qty => "Quantity",
            Self::Price => "Price",
            Self::DiscountPercent => "Discount %",
            Self::TaxPercent => "Tax %",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "qty" => Some(Self::Qty),
            "price" => Some(Self::Price),
            "discountPercent" => Some(Self::DiscountPercent),
            "taxPercent" => Some(Self::TaxPercent),
            _ => None,
        }
    }

    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Name)
    }

    /// Update carrying `value` for this field only. `Name` proposes nothing.
    pub fn numeric_update(self, value: f64) -> NumericUpdate {
        let mut update = NumericUpdate::default();
        match self {
            Self::Name => {}
            Self::Qty => update.qty = Some(value),
            Self::Price => update.price = Some(value),
            Self::DiscountPercent => update.discount_percent = Some(value),
            Self::TaxPercent => update.tax_percent = Some(value),
        }
        update
    }

    /// Text the form shows for this field of `item`.
    pub fn display_value(self, item: &LineItem) -> String {
        match self {
            Self::Name => item.name.clone(),
            Self::Qty => format_amount(item.qty),
            Self::Price => format_amount(item.price),
            Self::DiscountPercent => format_amount(item.discount_percent),
            Self::TaxPercent => format_amount(item.tax_percent),
        }
    }
}

/// Lenient numeric coercion for form input. Reads the longest leading decimal
/// literal after any leading whitespace; input with no such prefix, NaN and
/// negative zero all become 0.
pub fn parse_number(raw: &str) -> f64 {
    let value = leading_number(raw.trim_start()).unwrap_or(0.0);
    if value == 0.0 || value.is_nan() {
        0.0
    } else {
        value
    }
}

fn leading_number(input: &str) -> Option<f64> {
    let bytes = input.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    if input[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    input[..end].parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

/// Shortest round-trip rendering: `189`, `0.30000000000000004`, `-5`.
/// Infinities render as `Infinity` so [`parse_number`] reads them back.
pub fn format_amount(value: f64) -> String {
    if value == f64::INFINITY {
        "Infinity".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_owned()
    } else {
        format!("{value}")
    }
}
