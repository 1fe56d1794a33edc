//! Author and book records
//!
//! Typed views of the remote records, plus the drafts the dialogs produce.
//! Book payloads are shape-asymmetric on the wire: create nests the currency
//! as `currency.code`, while reads and updates use the flat `currency_code`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::fields::{names, FormValues};
use crate::gateway::Record;

/// Wire column names
pub mod columns {
    pub const ID: &str = "ID";
    pub const NAME: &str = "name";
    pub const BIO: &str = "bio";
    pub const IS_DELETED: &str = "isDeleted";
    pub const AUTHOR_ID: &str = "author_ID";
    pub const TITLE: &str = "title";
    pub const DESCR: &str = "descr";
    pub const STOCK: &str = "stock";
    pub const PRICE: &str = "price";
    pub const CURRENCY: &str = "currency";
    pub const CODE: &str = "code";
    pub const CURRENCY_CODE: &str = "currency_code";
}

/// An author record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "ID")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(rename = "isDeleted", default)]
    pub is_deleted: bool,
}

impl Author {
    /// Server-side rules for a stored author
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Author name is required".to_string());
        }
        Ok(())
    }

    pub fn to_record(&self) -> Record {
        to_record(self)
    }
}

/// A book record, as read or updated (flat currency)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "ID")]
    pub id: Uuid,
    #[serde(rename = "author_ID")]
    pub author_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub descr: String,
    pub stock: u32,
    /// Decimal kept as text to avoid floating-point currency error
    pub price: String,
    pub currency_code: String,
    #[serde(rename = "isDeleted", default)]
    pub is_deleted: bool,
}

impl Book {
    /// Server-side rules for a stored book
    pub fn validate(&self) -> Result<(), String> {
        Decimal::from_str(&self.price)
            .map_err(|_| format!("Price '{}' is not a decimal number", self.price))?;
        if !is_currency_code(&self.currency_code) {
            return Err(format!(
                "Currency code '{}' must be three uppercase letters",
                self.currency_code
            ));
        }
        Ok(())
    }

    pub fn to_record(&self) -> Record {
        to_record(self)
    }
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

fn to_record<T: Serialize>(value: &T) -> Record {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Record::new(),
    }
}

/// Author fields as entered in the author dialog
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorDraft {
    pub name: String,
    pub bio: String,
}

impl AuthorDraft {
    pub fn from_form(form: &FormValues) -> Self {
        Self {
            name: form.text(names::NAME),
            bio: form.text(names::BIO),
        }
    }

    pub fn create_payload(&self) -> Value {
        json!({
            "name": self.name,
            "bio": self.bio,
        })
    }

    /// Field mutations for an update batch
    pub fn changes(&self) -> Vec<(&'static str, Value)> {
        vec![
            (columns::NAME, json!(self.name)),
            (columns::BIO, json!(self.bio)),
        ]
    }
}

/// Book fields as entered in the book dialog
#[derive(Debug, Clone, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub descr: String,
    /// `None` when the input was not a number; the gateway rejects it
    pub stock: Option<i64>,
    pub price: String,
    pub currency_code: String,
}

impl BookDraft {
    pub fn from_form(form: &FormValues) -> Self {
        Self {
            title: form.text(names::TITLE),
            descr: form.text(names::DESCR),
            stock: form.integer(names::STOCK),
            price: form.text(names::PRICE),
            currency_code: form.text(names::CURRENCY_CODE),
        }
    }

    /// Create payload scoped to `author_id`, with the nested currency shape
    pub fn create_payload(&self, author_id: Uuid) -> Value {
        json!({
            "author_ID": author_id,
            "title": self.title,
            "descr": self.descr,
            "stock": self.stock,
            "price": self.price,
            "currency": { "code": self.currency_code },
        })
    }

    /// Field mutations for an update batch, with the flat currency column
    pub fn changes(&self) -> Vec<(&'static str, Value)> {
        vec![
            (columns::TITLE, json!(self.title)),
            (columns::DESCR, json!(self.descr)),
            (columns::STOCK, json!(self.stock)),
            (columns::PRICE, json!(self.price)),
            (columns::CURRENCY_CODE, json!(self.currency_code)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        Book {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "Notes".to_string(),
            descr: String::new(),
            stock: 5,
            price: "9.99".to_string(),
            currency_code: "EUR".to_string(),
            is_deleted: false,
        }
    }

    #[test]
    fn test_book_validation() {
        assert!(book().validate().is_ok());

        let mut bad_price = book();
        bad_price.price = "nine".to_string();
        assert!(bad_price.validate().is_err());

        let mut bad_code = book();
        bad_code.currency_code = "eur".to_string();
        assert!(bad_code.validate().is_err());
    }

    #[test]
    fn test_book_record_uses_wire_names() {
        let record = book().to_record();
        assert!(record.contains_key("author_ID"));
        assert!(record.contains_key("currency_code"));
        assert!(record.contains_key("isDeleted"));
        assert!(!record.contains_key("author_id"));
    }

    #[test]
    fn test_stock_rejects_negative_and_null() {
        let mut record = book().to_record();
        record.insert("stock".to_string(), json!(-1));
        assert!(serde_json::from_value::<Book>(Value::Object(record.clone())).is_err());

        record.insert("stock".to_string(), Value::Null);
        assert!(serde_json::from_value::<Book>(Value::Object(record)).is_err());
    }

    #[test]
    fn test_book_payload_shapes() {
        let draft = BookDraft {
            title: "Notes".to_string(),
            descr: "d".to_string(),
            stock: Some(12),
            price: "10.00".to_string(),
            currency_code: "USD".to_string(),
        };
        let author_id = Uuid::new_v4();

        let create = draft.create_payload(author_id);
        assert_eq!(create["currency"]["code"], "USD");
        assert_eq!(create["author_ID"], json!(author_id));
        assert!(create.get("currency_code").is_none());

        let changes = draft.changes();
        assert!(changes.contains(&("currency_code", json!("USD"))));
        assert!(changes.contains(&("stock", json!(12))));
        assert!(changes.iter().all(|(c, _)| *c != "author_ID" && *c != "ID"));
    }

    #[test]
    fn test_author_requires_name() {
        let author = Author {
            id: Uuid::new_v4(),
            name: "  ".to_string(),
            bio: String::new(),
            is_deleted: false,
        };
        assert!(author.validate().is_err());
    }
}
