// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::LineItem;

/// Proposed values for the numeric inputs. `None` keeps the current value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericUpdate {
    pub qty: Option<f64>,
    pub price: Option<f64>,
    pub discount_percent: Option<f64>,
    pub tax_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub discount: f64,
    pub tax: f64,
    pub total_price: f64,
}

pub fn calculate(current: &LineItem, update: &NumericUpdate) -> Derived {
    let qty = update.qty.unwrap_or(current.qty);
    let price = update.price.unwrap_or(current.price);
    let discount_percent = update.discount_percent.unwrap_or(current.discount_percent);
    let tax_percent = update.tax_percent.unwrap_or(current.tax_percent);

    // Operand order is load-bearing: totals must match the written formula
    // bit for bit.
    let discount = qty * price * discount_percent / 100.0;
    let tax = (qty * price - discount) * tax_percent / 100.0;
    let total_price = qty * price - discount + tax;

    Derived {
        discount,
        tax,
        total_price,
    }
}
