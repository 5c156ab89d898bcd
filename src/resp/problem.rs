use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

use crate::error::LifecycleError;

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub type_uri: String,
    pub title: String,

    pub detail: Option<String>,
    pub instance_uri: Option<String>,

    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            type_uri: "about:blank".to_string(),
            title: "Problem".to_string(),
            detail: None,
            instance_uri: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem {
            status,
            type_uri: "about:blank".to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut body = self.body.clone();

        // Following are required by rfc7807
        body.insert(String::from("type"), serde_json::Value::from(self.type_uri));
        body.insert(String::from("title"), serde_json::Value::from(self.title));

        // Optional parameters as specified by rfc7807
        if let Some(detail) = self.detail {
            body.insert(String::from("detail"), serde_json::Value::from(detail));
        }
        body.insert(
            String::from("status"),
            serde_json::Value::from(self.status.code),
        );
        if let Some(instance) = self.instance_uri {
            body.insert(String::from("instance"), serde_json::Value::from(instance));
        }

        let body_string = serde_json::to_string(&body)
            .expect("JSON map keys and values must be JSON serializable");

        Response::build()
            .status(self.status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header("Content-Language", "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

impl From<LifecycleError> for Problem {
    fn from(e: LifecycleError) -> Self {
        match &e {
            LifecycleError::NotFound(kind, id) => {
                Problem::new_untyped(Status::NotFound, format!("{} doesn't exist.", kind))
                    .insert_str("id", id)
                    .clone()
            }
            LifecycleError::InvalidState(_) => {
                Problem::new_untyped(Status::Conflict, "Operation not allowed in current state.")
                    .detail(&e)
                    .clone()
            }
            LifecycleError::Forbidden(_) => {
                Problem::new_untyped(Status::Forbidden, "Operation not permitted for caller.")
                    .detail(&e)
                    .clone()
            }
            LifecycleError::Validation(_) => {
                Problem::new_untyped(Status::BadRequest, "Invalid input.")
                    .detail(&e)
                    .clone()
            }
            LifecycleError::Store(_) => {
                Problem::new_untyped(Status::InternalServerError, "Record store failure.")
                    .detail("Submitted data might not be properly stored.")
                    .clone()
            }
        }
    }
}

impl From<serde_json::Error> for Problem {
    fn from(_: serde_json::Error) -> Self {
        Problem::new_untyped(
            Status::InternalServerError,
            "An error occurred while processing JSON data.",
        )
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.into_kind() {
            ErrorKind::ExpiredSignature => {
                Problem::new_untyped(Status::Unauthorized, "Expired JWT signature.")
            }
            _ => Problem::new_untyped(Status::Unauthorized, "Error while handling JWT."),
        }
    }
}

impl From<std::io::Error> for Problem {
    fn from(_: std::io::Error) -> Self {
        Problem::new_untyped(Status::InternalServerError, "Server IO error")
    }
}
