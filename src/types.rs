use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequest, Multipart, Query};
use axum::http::{header, Request};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::{Deserialize, Serialize};

/// Body of `POST /create`.
///
/// `content` is read from a urlencoded or multipart body, falling back to
/// the query string. A missing field is treated as empty content.
pub struct CreatePaste {
    pub content: String,
}

#[derive(Deserialize)]
struct ContentField {
    content: Option<String>,
}

#[async_trait]
impl<S> FromRequest<S, Body> for CreatePaste
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let from_query = Query::<ContentField>::try_from_uri(req.uri())
            .ok()
            .and_then(|Query(field)| field.content);

        let from_body = if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            multipart_content(multipart)
                .await
                .map_err(IntoResponse::into_response)?
        } else {
            let Form(field) = Form::<ContentField>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            field.content
        };

        Ok(CreatePaste {
            content: from_body.or(from_query).unwrap_or_default(),
        })
    }
}

fn is_multipart(req: &Request<Body>) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.starts_with("multipart/form-data"))
}

/// The first multipart field named `content`, if any.
async fn multipart_content(mut multipart: Multipart) -> crate::AppResult<Option<String>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("content") {
            return Ok(Some(field.text().await?));
        }
    }
    Ok(None)
}

/// Context for `view.html`.
#[derive(Serialize)]
pub struct ViewPaste {
    pub content: String,
    pub url: String,
}
