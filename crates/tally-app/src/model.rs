// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::LineItemId;

pub const DEFAULT_QTY: f64 = 1.0;
pub const SAVE_LABEL: &str = "Save Invoice";
pub const UPDATE_LABEL: &str = "Update Invoice";

/// One invoice row. `discount`, `tax` and `total_price` are derived from the
/// four numeric inputs and are only ever written through [`LineItem::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: LineItemId,
    pub name: String,
    pub qty: f64,
    pub price: f64,
    pub discount_percent: f64,
    pub discount: f64,
    pub tax_percent: f64,
    pub tax: f64,
    pub total_price: f64,
}

impl LineItem {
    pub fn blank(id: LineItemId) -> Self {
        Self {
            id,
            name: String::new(),
            qty: DEFAULT_QTY,
            price: 0.0,
            discount_percent: 0.0,
            discount: 0.0,
            tax_percent: 0.0,
            tax: 0.0,
            total_price: 0.0,
        }
    }

    /// Builds a fully derived item from its inputs.
    pub fn with_inputs(
        id: LineItemId,
        name: impl Into<String>,
        qty: f64,
        price: f64,
        discount_percent: f64,
        tax_percent: f64,
    ) -> Self {
        let mut item = Self {
            name: name.into(),
            ..Self::blank(id)
        };
        item.apply(&crate::NumericUpdate {
            qty: Some(qty),
            price: Some(price),
            discount_percent: Some(discount_percent),
            tax_percent: Some(tax_percent),
        });
        item
    }

    /// Merges the proposed inputs and recomputes the derived amounts.
    pub fn apply(&mut self, update: &crate::NumericUpdate) {
        let derived = crate::calculate(self, update);
        if let Some(qty) = update.qty {
            self.qty = qty;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(discount_percent) = update.discount_percent {
            self.discount_percent = discount_percent;
        }
        if let Some(tax_percent) = update.tax_percent {
            self.tax_percent = tax_percent;
        }
        self.discount = derived.discount;
        self.tax = derived.tax;
        self.total_price = derived.total_price;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditingMode {
    None,
    Editing(LineItemId),
}

impl EditingMode {
    pub fn target(&self) -> Option<&LineItemId> {
        match self {
            Self::None => None,
            Self::Editing(id) => Some(id),
        }
    }

    pub const fn submit_label(&self) -> &'static str {
        match self {
            Self::None => SAVE_LABEL,
            Self::Editing(_) => UPDATE_LABEL,
        }
    }
}
