// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tally_app::{FieldName, IdStrategy, InvoiceCommand, InvoiceState, LineItemId};

/// Inputs for one line item, as the user would type them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemInput<'a> {
    pub name: &'a str,
    pub qty: f64,
    pub price: f64,
    pub discount_percent: f64,
    pub tax_percent: f64,
}

impl<'a> ItemInput<'a> {
    pub const fn new(name: &'a str, qty: f64, price: f64) -> Self {
        Self {
            name,
            qty,
            price,
            discount_percent: 0.0,
            tax_percent: 0.0,
        }
    }

    pub const fn discount(mut self, percent: f64) -> Self {
        self.discount_percent = percent;
        self
    }

    pub const fn tax(mut self, percent: f64) -> Self {
        self.tax_percent = percent;
        self
    }

    fn commands(&self) -> [InvoiceCommand; 5] {
        [
            change(FieldName::Name, self.name),
            change(FieldName::Qty, &self.qty.to_string()),
            change(FieldName::Price, &self.price.to_string()),
            change(FieldName::DiscountPercent, &self.discount_percent.to_string()),
            change(FieldName::TaxPercent, &self.tax_percent.to_string()),
        ]
    }
}

pub const SAMPLE_ITEMS: [ItemInput<'static>; 3] = [
    ItemInput::new("Widget", 2.0, 100.0).discount(10.0).tax(5.0),
    ItemInput::new("Gadget", 1.0, 49.5),
    ItemInput::new("Service call", 3.0, 80.0).tax(8.0),
];

/// Empty state with deterministic `item-<n>` ids.
pub fn sequential_state() -> InvoiceState {
    InvoiceState::new(IdStrategy::Sequential.source())
}

/// Sequential state with [`SAMPLE_ITEMS`] committed in order.
pub fn sample_state() -> InvoiceState {
    let mut state = sequential_state();
    for input in SAMPLE_ITEMS {
        submit_item(&mut state, input);
    }
    state
}

pub fn change(field: FieldName, raw: &str) -> InvoiceCommand {
    InvoiceCommand::ChangeField {
        field,
        raw: raw.to_owned(),
    }
}

/// Types `input` into the draft without submitting.
pub fn fill_draft(state: &mut InvoiceState, input: ItemInput<'_>) {
    for command in input.commands() {
        state.dispatch(command);
    }
}

/// Types `input` into the draft and submits it, returning the id the
/// committed entry ended up with.
pub fn submit_item(state: &mut InvoiceState, input: ItemInput<'_>) -> LineItemId {
    fill_draft(state, input);
    let editing = state.editing().target().cloned();
    state.dispatch(InvoiceCommand::Submit);
    match editing {
        Some(id) => id,
        None => state
            .items()
            .last()
            .map(|item| item.id.clone())
            .unwrap_or_else(|| LineItemId::new("")),
    }
}
