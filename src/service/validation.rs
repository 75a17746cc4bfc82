//! Request validation from the kind's declared constraint set.

use crate::error::AppError;
use crate::schema::{FieldDef, FieldType, RecordKind};
use crate::store::Document;
use serde_json::Value;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a full field map (a create body, or the merged result of an
    /// update) against the kind. Fields are checked in declaration order and
    /// the first violated constraint is reported.
    pub fn validate(kind: &RecordKind, fields: &Document) -> Result<(), AppError> {
        for def in &kind.fields {
            let val = fields.get(&def.name);
            if def.required && val.map_or(true, Value::is_null) {
                return Err(AppError::Validation(format!("{} is required", def.name)));
            }
            if let Some(v) = val {
                validate_field(def, v)?;
            }
        }
        Ok(())
    }
}

fn validate_field(def: &FieldDef, v: &Value) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    match &def.field_type {
        FieldType::Text => {
            if !v.is_string() {
                return Err(AppError::Validation(format!("{} must be text", def.name)));
            }
        }
        FieldType::Integer => {
            let Some(n) = v.as_i64() else {
                return Err(AppError::Validation(format!(
                    "{} must be an integer",
                    def.name
                )));
            };
            if let Some(min) = def.minimum {
                if n < min {
                    return Err(AppError::Validation(format!(
                        "{} must be at least {}",
                        def.name, min
                    )));
                }
            }
        }
        FieldType::Reference { target } => {
            if !v.is_string() {
                return Err(AppError::Validation(format!(
                    "{} must be a {} identifier",
                    def.name, target
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use serde_json::json;

    fn user_kind() -> RecordKind {
        RecordKind {
            name: "user".into(),
            fields: vec![
                FieldDef::text("name").required(),
                FieldDef::text("email").required().unique(),
                FieldDef::integer("age").minimum(0),
            ],
        }
    }

    fn fields(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = RequestValidator::validate(
            &user_kind(),
            &fields(json!({"email": "a@example.com"})),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("name")));
    }

    #[test]
    fn null_required_field_is_rejected() {
        let err = RequestValidator::validate(
            &user_kind(),
            &fields(json!({"name": null, "email": "a@example.com"})),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("name")));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = RequestValidator::validate(
            &user_kind(),
            &fields(json!({"name": 7, "email": "a@example.com"})),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("text")));
    }

    #[test]
    fn minimum_is_enforced() {
        let err = RequestValidator::validate(
            &user_kind(),
            &fields(json!({"name": "A", "email": "a@example.com", "age": -1})),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("at least 0")));
    }

    #[test]
    fn optional_field_may_be_absent_or_null() {
        let kind = user_kind();
        RequestValidator::validate(&kind, &fields(json!({"name": "A", "email": "a@x.com"})))
            .unwrap();
        RequestValidator::validate(
            &kind,
            &fields(json!({"name": "A", "email": "a@x.com", "age": null})),
        )
        .unwrap();
    }

    #[test]
    fn reference_must_be_an_identifier_string() {
        let kind = RecordKind {
            name: "post".into(),
            fields: vec![FieldDef::reference("author", "user")],
        };
        RequestValidator::validate(&kind, &fields(json!({"author": "some-id"}))).unwrap();
        let err =
            RequestValidator::validate(&kind, &fields(json!({"author": 12}))).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("user identifier")));
    }
}
