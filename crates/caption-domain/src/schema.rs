//! Validador de esquemas declarativos.
//!
//! Los esquemas son valores de primera clase: la misma declaración sirve para
//! validar datos no confiables (entrada del usuario, salida del motor) y para
//! describir al motor la forma que debe producir (`to_json_schema`).
//!
//! La validación es pura y acumula todas las violaciones, no sólo la primera.
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

use crate::image::is_image_mime;
use crate::{ImagePayload, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    TextList,
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    /// Para `Text`: no vacío tras trim. Para `TextList`: al menos un elemento.
    pub non_empty: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Object(&'static [Field]),
    TextList,
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub shape: Shape,
}

/// Una violación concreta, localizada por ruta (`hashtags[2]`, `platform`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationErrors {
    pub schema: String,
    pub violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new(schema: &str) -> Self {
        Self { schema: schema.to_string(),
               violations: Vec::new() }
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation { field: field.into(),
                                         message: message.into() });
    }

    pub fn is_empty(&self) -> bool { self.violations.is_empty() }

    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.violations
                                     .iter()
                                     .map(|v| format!("{}: {}", v.field, v.message))
                                     .collect();
        write!(f, "{} ({})", parts.join(", "), self.schema)
    }
}

impl std::error::Error for ValidationErrors {}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_text_list(path: &str, value: &Value, non_empty: bool, errors: &mut ValidationErrors) {
    match value {
        Value::Array(items) => {
            if non_empty && items.is_empty() {
                errors.push(path, "must contain at least one entry");
            }
            for (i, item) in items.iter().enumerate() {
                if !item.is_string() {
                    errors.push(format!("{path}[{i}]"), format!("expected string, got {}", type_name(item)));
                }
            }
        }
        other => errors.push(path, format!("expected array of strings, got {}", type_name(other))),
    }
}

fn check_field(field: &Field, value: &Value, errors: &mut ValidationErrors) {
    match field.ty {
        FieldType::Text => match value {
            Value::String(s) if field.non_empty && s.trim().is_empty() => errors.push(field.name, "must not be empty"),
            Value::String(_) => {}
            other => errors.push(field.name, format!("expected string, got {}", type_name(other))),
        },
        FieldType::TextList => check_text_list(field.name, value, field.non_empty, errors),
        FieldType::OneOf(allowed) => match value {
            Value::String(s) if allowed.contains(&s.as_str()) => {}
            Value::String(s) => {
                errors.push(field.name, format!("'{s}' is not one of [{}]", allowed.join(", ")))
            }
            other => errors.push(field.name, format!("expected one of [{}], got {}", allowed.join(", "), type_name(other))),
        },
    }
}

impl Schema {
    /// Valida `value` contra el esquema. Devuelve el mismo valor si es
    /// conforme o la lista completa de violaciones.
    pub fn validate<'a>(&self, value: &'a Value) -> Result<&'a Value, ValidationErrors> {
        let mut errors = ValidationErrors::new(self.name);
        match self.shape {
            Shape::TextList => check_text_list("$", value, false, &mut errors),
            Shape::Object(fields) => match value.as_object() {
                Some(map) => {
                    for field in fields {
                        match map.get(field.name) {
                            None | Some(Value::Null) if field.required => errors.push(field.name, "is required"),
                            None | Some(Value::Null) => {}
                            Some(v) => check_field(field, v, &mut errors),
                        }
                    }
                }
                None => errors.push("$", format!("expected object, got {}", type_name(value))),
            },
        }
        if errors.is_empty() {
            Ok(value)
        } else {
            Err(errors)
        }
    }

    /// Misma declaración expresada como JSON Schema para restringir al motor.
    pub fn to_json_schema(&self) -> Value {
        fn field_schema(field: &Field) -> Value {
            let mut s = match field.ty {
                FieldType::Text => json!({"type": "string"}),
                FieldType::TextList => json!({"type": "array", "items": {"type": "string"}}),
                FieldType::OneOf(allowed) => json!({"type": "string", "enum": allowed}),
            };
            if !field.description.is_empty() {
                s["description"] = json!(field.description);
            }
            s
        }
        match self.shape {
            Shape::TextList => json!({"type": "array", "items": {"type": "string"}}),
            Shape::Object(fields) => {
                let mut props = Map::new();
                for f in fields {
                    props.insert(f.name.to_string(), field_schema(f));
                }
                let required: Vec<&str> = fields.iter().filter(|f| f.required).map(|f| f.name).collect();
                json!({"type": "object", "properties": props, "required": required})
            }
        }
    }
}

// ---- Esquemas declarados ----

pub const GENERATE_INPUT: Schema = Schema {
    name: "GenerateInput",
    shape: Shape::Object(&[
        Field { name: "mimeType", ty: FieldType::Text, required: true, non_empty: true,
                description: "MIME type of the uploaded image" },
        Field { name: "platform", ty: FieldType::OneOf(Platform::NAMES), required: true, non_empty: true,
                description: "The social media platform to generate a caption for." },
    ]),
};

pub const CAPTION_OUTPUT: Schema = Schema {
    name: "CaptionOutput",
    shape: Shape::Object(&[
        Field { name: "caption", ty: FieldType::Text, required: true, non_empty: false,
                description: "The generated social media caption." },
        Field { name: "hashtags", ty: FieldType::TextList, required: true, non_empty: false,
                description: "A list of relevant hashtags for the image." },
    ]),
};

pub const AUGMENT_OUTPUT: Schema = Schema { name: "AugmentOutput", shape: Shape::TextList };

pub const TRENDING_TOOL_INPUT: Schema = Schema {
    name: "TrendingTopicsInput",
    shape: Shape::Object(&[
        Field { name: "platform", ty: FieldType::Text, required: true, non_empty: true,
                description: "The social media platform to get trending topics from." },
    ]),
};

/// Valida la entrada cruda del pipeline (bytes + MIME declarado + plataforma)
/// antes de cualquier llamada externa. Acumula todas las violaciones.
pub fn validate_generate_input(bytes: &[u8], mime_type: &str, platform: &str)
                               -> Result<(ImagePayload, Platform), ValidationErrors> {
    let candidate = json!({ "mimeType": mime_type, "platform": platform });
    let mut errors = match GENERATE_INPUT.validate(&candidate) {
        Ok(_) => ValidationErrors::new(GENERATE_INPUT.name),
        Err(e) => e,
    };
    if !mime_type.trim().is_empty() && !is_image_mime(mime_type.trim()) {
        errors.push("mimeType", format!("'{}' is not an image type", mime_type.trim()));
    }
    if bytes.is_empty() {
        errors.push("image", "must not be empty");
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let single = |field: &str, message: String| {
        let mut errs = ValidationErrors::new(GENERATE_INPUT.name);
        errs.push(field, message);
        errs
    };
    let image = ImagePayload::new(bytes.to_vec(), mime_type).map_err(|e| single("image", e.to_string()))?;
    let platform = platform.parse::<Platform>()
                           .map_err(|e| single("platform", e.to_string()))?;
    Ok((image, platform))
}
