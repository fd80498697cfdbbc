//! OpenAPI 3.0 document generation
//!
//! Endpoints record an [`Operation`] when they are registered. Once
//! registration is complete, [`OpenApiBuilder::build`] folds them into an
//! immutable [`Document`].

use crate::bind::{Location, ParamDescriptor, ParamKind};
use crate::{Method, Result};
use serde::Serialize;
use std::collections::BTreeMap;

pub const OPENAPI_VERSION: &str = "3.0.0";

/// Headers the HTTP layer supplies itself; never documented
const EXCLUDED_HEADERS: [&str; 3] = ["content-type", "content-length", "user-agent"];

/// API title and version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
        }
    }
}

/// A documented response code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSpec {
    pub code: u16,
    pub description: String,
}

/// One documented (path, method) pair
#[derive(Debug, Clone)]
pub struct Operation {
    /// Pattern as registered, e.g. `/users/{id}`
    pub path: String,
    pub method: Method,
    pub tags: Vec<String>,
    pub params: Vec<ParamDescriptor>,
    pub responses: Vec<ResponseSpec>,
}

impl Operation {
    pub fn new(path: impl Into<String>, method: Method) -> Self {
        Self {
            path: path.into(),
            method,
            tags: Vec::new(),
            params: Vec::new(),
            responses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaObject {
    #[serde(rename = "type")]
    pub kind: ParamKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterObject {
    #[serde(rename = "in")]
    pub location: Location,
    pub name: String,
    pub required: bool,
    pub schema: SchemaObject,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseObject {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationObject {
    pub tags: Vec<String>,
    pub parameters: Vec<ParameterObject>,
    pub responses: BTreeMap<String, ResponseObject>,
    /// Empty placeholder on every non-GET operation
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<&Operation> for OperationObject {
    fn from(op: &Operation) -> Self {
        let parameters = op
            .params
            .iter()
            .filter(|p| {
                p.location != Location::Header
                    || !EXCLUDED_HEADERS.contains(&p.name.to_ascii_lowercase().as_str())
            })
            .map(|p| match p.location {
                Location::Path => ParameterObject {
                    location: Location::Path,
                    name: p.name.clone(),
                    required: true,
                    schema: SchemaObject {
                        kind: ParamKind::String,
                    },
                },
                location => ParameterObject {
                    location,
                    name: p.name.clone(),
                    required: p.required,
                    schema: SchemaObject { kind: p.kind },
                },
            })
            .collect();

        let mut responses: BTreeMap<String, ResponseObject> = BTreeMap::new();
        for response in &op.responses {
            responses
                .entry(response.code.to_string())
                .and_modify(|existing| {
                    existing.description =
                        format!("{} or {}", existing.description, response.description);
                })
                .or_insert_with(|| ResponseObject {
                    description: response.description.clone(),
                });
        }

        Self {
            tags: op.tags.clone(),
            parameters,
            responses,
            request_body: (op.method != Method::Get).then(serde_json::Map::new),
        }
    }
}

/// Immutable OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    /// Path -> lowercase method -> operation
    pub paths: BTreeMap<String, BTreeMap<String, OperationObject>>,
}

impl Document {
    pub fn operation(&self, path: &str, method: Method) -> Option<&OperationObject> {
        self.paths.get(path)?.get(method.as_lower_str())
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Collects operations and builds the document in one step
#[derive(Debug, Clone)]
pub struct OpenApiBuilder {
    info: Info,
    operations: Vec<Operation>,
}

impl OpenApiBuilder {
    pub fn new(info: Info) -> Self {
        Self {
            info,
            operations: Vec::new(),
        }
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn add(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Fold the operations into a document
    ///
    /// The first operation recorded for a (path, method) pair wins.
    pub fn build(&self) -> Document {
        let mut paths: BTreeMap<String, BTreeMap<String, OperationObject>> = BTreeMap::new();

        for op in &self.operations {
            paths
                .entry(op.path.clone())
                .or_default()
                .entry(op.method.as_lower_str().to_string())
                .or_insert_with(|| OperationObject::from(op));
        }

        Document {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info.clone(),
            paths,
        }
    }
}

const SWAGGER_UI: &str = r#"<!DOCTYPE html>
<html>
<head>
<link type="text/css" rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@4/swagger-ui.css">
<title>Swagger UI</title>
</head>
<body>
<div id="swagger-ui">
</div>
<script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@4/swagger-ui-bundle.js"></script>
<script>
const ui = SwaggerUIBundle({
    url: '{spec_url}',
    dom_id: '#swagger-ui',
    layout: 'BaseLayout',
    deepLinking: true,
    showExtensions: true,
    showCommonExtensions: true,
    presets: [
        SwaggerUIBundle.presets.apis,
        SwaggerUIBundle.SwaggerUIStandalonePreset
    ],
})
</script>
</body>
</html>
"#;

/// Swagger UI page loading the document from `spec_url`
pub fn swagger_ui(spec_url: &str) -> String {
    SWAGGER_UI.replace("{spec_url}", spec_url)
}
