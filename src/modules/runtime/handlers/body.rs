//! Request body extractor accepting JSON or URL-encoded forms

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
    response::Response,
    Form,
};
use contactd_core::ContactError;
use contactd_parser::decode_form;
use serde_json::Value;

use super::error_response;

/// The decoded request body.
///
/// JSON bodies are parsed as-is and URL-encoded forms are decoded with
/// bracket nesting. A missing body, or one of any other content type,
/// decodes to `{}`.
#[derive(Debug)]
pub struct RequestBody(pub Value);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

impl BodyKind {
    fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return BodyKind::Other;
        };
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if mime == "application/json" || mime.ends_with("+json") {
            BodyKind::Json
        } else if mime == "application/x-www-form-urlencoded" {
            BodyKind::Form
        } else {
            BodyKind::Other
        }
    }
}

fn parse_json(bytes: &[u8]) -> Result<Value, ContactError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes).map_err(|e| ContactError::InvalidBody(e.to_string()))
}

#[async_trait]
impl<S> FromRequest<S> for RequestBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = BodyKind::from_content_type(
            req.headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let reject = |e: ContactError| error_response("decode request body", e);

        match kind {
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| reject(ContactError::InvalidBody(e.body_text())))?;
                parse_json(&bytes).map(Self).map_err(reject)
            }
            BodyKind::Form => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| reject(ContactError::InvalidBody(e.body_text())))?;
                decode_form(pairs).map(Self).map_err(reject)
            }
            BodyKind::Other => Ok(Self(Value::Object(Default::default()))),
        }
    }
}
