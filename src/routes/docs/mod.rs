mod handler;

pub use handler::{api_document, openapi_json, redoc, swagger_ui};
