// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FieldName, InvoiceCommand, InvoiceState};

const DEMO_ITEMS: [(&str, &str, &str, &str, &str); 4] = [
    ("Consulting hours", "12", "85", "0", "8.25"),
    ("Standing desk", "2", "499.99", "15", "8.25"),
    ("Monitor arm", "3", "79.5", "10", "8.25"),
    ("Onboarding workshop", "1", "1200", "25", "0"),
];

/// Fills `state` with a handful of entries by driving the same commands the
/// form uses.
pub fn seed_demo(state: &mut InvoiceState) {
    for (name, qty, price, discount_percent, tax_percent) in DEMO_ITEMS {
        for (field, raw) in [
            (FieldName::Name, name),
            (FieldName::Qty, qty),
            (FieldName::Price, price),
            (FieldName::DiscountPercent, discount_percent),
            (FieldName::TaxPercent, tax_percent),
        ] {
            state.dispatch(InvoiceCommand::ChangeField {
                field,
                raw: raw.to_owned(),
            });
        }
        state.dispatch(InvoiceCommand::Submit);
    }
}
