//! Формы создания/редактирования: схема, правила, приведение типов и валидатор

mod coerce;
pub mod rules;
pub mod schema;
pub mod validator;

pub use rules::ValidationRule;
pub use schema::{FieldKind, FieldSpec, FormSchema, FormValues};
pub use validator::{EntityFormValidator, FirstError, SubmitError, SubmitRequest, UploadRequest};
