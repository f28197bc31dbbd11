// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::{
    EditingMode, FieldName, IdGenerator, IdSource, LineItem, LineItemId, parse_number,
};

/// The whole form: the list of committed line items, the draft bound to the
/// inputs, and whether that draft is a new entry or an edit of an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceState {
    items: Vec<LineItem>,
    draft: LineItem,
    editing: EditingMode,
    ids: IdSource,
}

impl Default for InvoiceState {
    fn default() -> Self {
        Self::new(IdSource::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceCommand {
    ChangeField { field: FieldName, raw: String },
    Submit,
    SelectForEdit(LineItemId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceEvent {
    DraftChanged(FieldName),
    ItemAppended(LineItemId),
    ItemReplaced(LineItemId),
    EditingStarted(LineItemId),
    DraftReset,
}

impl InvoiceState {
    pub fn new(mut ids: IdSource) -> Self {
        let draft = LineItem::blank(ids.next_id());
        Self {
            items: Vec::new(),
            draft,
            editing: EditingMode::None,
            ids,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn draft(&self) -> &LineItem {
        &self.draft
    }

    pub fn editing(&self) -> &EditingMode {
        &self.editing
    }

    pub fn find(&self, id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn submit_label(&self) -> &'static str {
        self.editing.submit_label()
    }

    pub fn grand_total(&self) -> f64 {
        self.items.iter().map(|item| item.total_price).sum()
    }

    pub fn dispatch(&mut self, command: InvoiceCommand) -> Vec<InvoiceEvent> {
        match command {
            InvoiceCommand::ChangeField { field, raw } => self.change_field(field, &raw),
            InvoiceCommand::Submit => self.submit(),
            InvoiceCommand::SelectForEdit(id) => self.select_for_edit(id),
        }
    }

    fn change_field(&mut self, field: FieldName, raw: &str) -> Vec<InvoiceEvent> {
        if field.is_numeric() {
            let value = parse_number(raw);
            self.draft.apply(&field.numeric_update(value));
            debug!(field = field.as_str(), value, total = self.draft.total_price, "draft updated");
        } else {
            self.draft.name = raw.to_owned();
            debug!(field = field.as_str(), "draft updated");
        }
        vec![InvoiceEvent::DraftChanged(field)]
    }

    fn submit(&mut self) -> Vec<InvoiceEvent> {
        let fresh = LineItem::blank(self.ids.next_id());
        let draft = std::mem::replace(&mut self.draft, fresh);

        let committed = match std::mem::replace(&mut self.editing, EditingMode::None) {
            EditingMode::Editing(target) => {
                if let Some(slot) = self.items.iter_mut().find(|item| item.id == target) {
                    *slot = draft;
                    debug!(id = %target, "line item replaced");
                } else {
                    debug!(id = %target, "edited line item no longer listed");
                }
                InvoiceEvent::ItemReplaced(target)
            }
            EditingMode::None => {
                let id = self.ids.next_id();
                self.items.push(LineItem { id: id.clone(), ..draft });
                debug!(id = %id, count = self.items.len(), "line item appended");
                InvoiceEvent::ItemAppended(id)
            }
        };

        vec![committed, InvoiceEvent::DraftReset]
    }

    fn select_for_edit(&mut self, id: LineItemId) -> Vec<InvoiceEvent> {
        let Some(item) = self.find(&id) else {
            debug!(id = %id, "edit requested for unknown line item");
            return Vec::new();
        };
        self.draft = item.clone();
        self.editing = EditingMode::Editing(id.clone());
        debug!(id = %id, "editing line item");
        vec![InvoiceEvent::EditingStarted(id)]
    }
}

#[cfg(test)]
mod tests {
    use super::{InvoiceCommand, InvoiceEvent, InvoiceState};
    use crate::{EditingMode, FieldName, IdStrategy, LineItemId};

    fn state() -> InvoiceState {
        InvoiceState::new(IdStrategy::Sequential.source())
    }

    fn change(state: &mut InvoiceState, field: FieldName, raw: &str) -> Vec<InvoiceEvent> {
        state.dispatch(InvoiceCommand::ChangeField {
            field,
            raw: raw.to_owned(),
        })
    }

    fn fill(state: &mut InvoiceState, name: &str, qty: &str, price: &str) {
        change(state, FieldName::Name, name);
        change(state, FieldName::Qty, qty);
        change(state, FieldName::Price, price);
    }

    #[test]
    fn starts_with_blank_draft_and_no_editing() {
        let state = state();
        assert!(state.items().is_empty());
        assert_eq!(state.draft().id, LineItemId::new("item-1"));
        assert_eq!(state.draft().qty, 1.0);
        assert_eq!(state.editing(), &EditingMode::None);
        assert_eq!(state.submit_label(), "Save Invoice");
    }

    #[test]
    fn field_change_recomputes_derived_amounts() {
        let mut state = state();
        change(&mut state, FieldName::Qty, "2");
        change(&mut state, FieldName::Price, "100");
        change(&mut state, FieldName::DiscountPercent, "10");
        let events = change(&mut state, FieldName::TaxPercent, "5");

        assert_eq!(events, vec![InvoiceEvent::DraftChanged(FieldName::TaxPercent)]);
        let draft = state.draft();
        assert_eq!(draft.discount, 20.0);
        assert_eq!(draft.tax, 9.0);
        assert_eq!(draft.total_price, 189.0);
    }

    #[test]
    fn name_is_stored_verbatim() {
        let mut state = state();
        change(&mut state, FieldName::Qty, "3");
        change(&mut state, FieldName::Price, "4");
        change(&mut state, FieldName::Name, "  12 widgets ");

        assert_eq!(state.draft().name, "  12 widgets ");
        assert_eq!(state.draft().qty, 3.0);
        assert_eq!(state.draft().total_price, 12.0);
    }

    #[test]
    fn non_numeric_price_zeroes_amounts() {
        let mut state = state();
        change(&mut state, FieldName::Price, "50");
        change(&mut state, FieldName::DiscountPercent, "10");
        change(&mut state, FieldName::Price, "abc");

        let draft = state.draft();
        assert_eq!(draft.price, 0.0);
        assert_eq!(draft.discount, 0.0);
        assert_eq!(draft.tax, 0.0);
        assert_eq!(draft.total_price, 0.0);
    }

    #[test]
    fn submit_without_editing_appends_with_fresh_id() {
        let mut state = state();
        fill(&mut state, "Widget", "2", "5");
        let draft_id = state.draft().id.clone();

        let events = state.dispatch(InvoiceCommand::Submit);

        assert_eq!(state.items().len(), 1);
        let appended = &state.items()[0];
        assert_ne!(appended.id, draft_id);
        assert_eq!(appended.name, "Widget");
        assert_eq!(appended.total_price, 10.0);
        assert_eq!(
            events,
            vec![
                InvoiceEvent::ItemAppended(appended.id.clone()),
                InvoiceEvent::DraftReset,
            ]
        );
    }

    #[test]
    fn submit_resets_draft() {
        let mut state = state();
        fill(&mut state, "Widget", "2", "5");
        change(&mut state, FieldName::TaxPercent, "8");
        let before = state.draft().id.clone();

        state.dispatch(InvoiceCommand::Submit);

        let draft = state.draft();
        assert_ne!(draft.id, before);
        assert!(state.items().iter().all(|item| item.id != draft.id));
        assert!(draft.name.is_empty());
        assert_eq!(draft.qty, 1.0);
        assert_eq!(draft.price, 0.0);
        assert_eq!(draft.discount_percent, 0.0);
        assert_eq!(draft.discount, 0.0);
        assert_eq!(draft.tax_percent, 0.0);
        assert_eq!(draft.tax, 0.0);
        assert_eq!(draft.total_price, 0.0);
    }

    #[test]
    fn edit_then_submit_replaces_in_place() {
        let mut state = state();
        for name in ["first", "second", "third"] {
            fill(&mut state, name, "1", "10");
            state.dispatch(InvoiceCommand::Submit);
        }
        let target = state.items()[1].id.clone();

        let events = state.dispatch(InvoiceCommand::SelectForEdit(target.clone()));
        assert_eq!(events, vec![InvoiceEvent::EditingStarted(target.clone())]);
        assert_eq!(state.editing(), &EditingMode::Editing(target.clone()));
        assert_eq!(state.draft().name, "second");
        assert_eq!(state.submit_label(), "Update Invoice");

        change(&mut state, FieldName::Name, "second (revised)");
        change(&mut state, FieldName::Qty, "4");
        let events = state.dispatch(InvoiceCommand::Submit);

        assert_eq!(
            events,
            vec![InvoiceEvent::ItemReplaced(target.clone()), InvoiceEvent::DraftReset]
        );
        assert_eq!(state.items().len(), 3);
        let names = state
            .items()
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["first", "second (revised)", "third"]);
        assert_eq!(state.items()[1].id, target);
        assert_eq!(state.items()[1].total_price, 40.0);
        assert_eq!(state.editing(), &EditingMode::None);
    }

    #[test]
    fn select_unknown_id_is_ignored() {
        let mut state = state();
        fill(&mut state, "Widget", "1", "3");
        let before = state.clone();

        let events = state.dispatch(InvoiceCommand::SelectForEdit(LineItemId::new("missing")));

        assert!(events.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn reselecting_switches_edit_target() {
        let mut state = state();
        for name in ["a", "b"] {
            fill(&mut state, name, "1", "1");
            state.dispatch(InvoiceCommand::Submit);
        }
        let first = state.items()[0].id.clone();
        let second = state.items()[1].id.clone();

        state.dispatch(InvoiceCommand::SelectForEdit(first));
        state.dispatch(InvoiceCommand::SelectForEdit(second.clone()));

        assert_eq!(state.editing(), &EditingMode::Editing(second));
        assert_eq!(state.draft().name, "b");
    }

    #[test]
    fn grand_total_sums_entries() {
        let mut state = state();
        fill(&mut state, "a", "2", "10");
        state.dispatch(InvoiceCommand::Submit);
        fill(&mut state, "b", "1", "5.5");
        state.dispatch(InvoiceCommand::Submit);

        assert_eq!(state.grand_total(), 25.5);
    }
}
