//! Typed field-descriptor table
//!
//! Maps each logical dialog field to its wire column and a parse rule, so
//! prefill and confirm walk the same table instead of reaching into dialogs
//! by ad-hoc string keys.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::collaborators::{DialogHandle, DialogPresenter};
use crate::error::PresenterError;
use crate::gateway::Record;
use crate::model::columns;

/// Logical dialog field names
pub mod names {
    pub const NAME: &str = "name";
    pub const BIO: &str = "bio";
    pub const TITLE: &str = "title";
    pub const DESCR: &str = "descr";
    pub const STOCK: &str = "stock";
    pub const PRICE: &str = "price";
    pub const CURRENCY_CODE: &str = "currencyCode";
}

/// How dialog text is turned into a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed string
    Text,
    /// Integer text; anything unparsable stays "not a number"
    Integer,
    /// Trimmed, upper-cased currency code
    CurrencyCode,
}

/// A parsed dialog value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// `None` when the input was not a number
    Integer(Option<i64>),
}

/// One row of the descriptor table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Logical dialog field name
    pub name: &'static str,
    /// Column on read/update records
    pub column: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self { name, column, kind }
    }

    /// Parse raw dialog text
    pub fn parse(&self, raw: &str) -> FieldValue {
        let trimmed = raw.trim();
        match self.kind {
            FieldKind::Text => FieldValue::Text(trimmed.to_string()),
            FieldKind::Integer => FieldValue::Integer(trimmed.parse::<i64>().ok()),
            FieldKind::CurrencyCode => FieldValue::Text(trimmed.to_uppercase()),
        }
    }

    /// Dialog text for this field's value on a record
    pub fn render(&self, record: &Record) -> String {
        match record.get(self.column) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }
}

pub const AUTHOR_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new(names::NAME, columns::NAME, FieldKind::Text),
    FieldDescriptor::new(names::BIO, columns::BIO, FieldKind::Text),
];

pub const BOOK_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new(names::TITLE, columns::TITLE, FieldKind::Text),
    FieldDescriptor::new(names::DESCR, columns::DESCR, FieldKind::Text),
    FieldDescriptor::new(names::STOCK, columns::STOCK, FieldKind::Integer),
    FieldDescriptor::new(names::PRICE, columns::PRICE, FieldKind::Text),
    FieldDescriptor::new(
        names::CURRENCY_CODE,
        columns::CURRENCY_CODE,
        FieldKind::CurrencyCode,
    ),
];

/// Parsed values of one dialog, keyed by logical field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    values: BTreeMap<&'static str, FieldValue>,
}

impl FormValues {
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Text value of a field; missing fields read as empty
    pub fn text(&self, name: &str) -> String {
        match self.values.get(name) {
            Some(FieldValue::Text(s)) => s.clone(),
            Some(FieldValue::Integer(Some(n))) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Integer value of a field; missing or unparsable fields read as `None`
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(FieldValue::Integer(n)) => *n,
            Some(FieldValue::Text(s)) => s.parse().ok(),
            None => None,
        }
    }
}

/// Read and parse every field in `fields` from an open dialog
pub fn read_form(
    presenter: &dyn DialogPresenter,
    dialog: &DialogHandle,
    fields: &[FieldDescriptor],
) -> Result<FormValues, PresenterError> {
    let mut form = FormValues::default();
    for field in fields {
        let raw = presenter.get_field(dialog, field.name)?;
        form.insert(field.name, field.parse(&raw));
    }
    Ok(form)
}

/// Prefill a dialog from a record
pub fn fill_form(
    presenter: &dyn DialogPresenter,
    dialog: &DialogHandle,
    fields: &[FieldDescriptor],
    record: &Record,
) -> Result<(), PresenterError> {
    for field in fields {
        presenter.set_field(dialog, field.name, &field.render(record))?;
    }
    Ok(())
}
