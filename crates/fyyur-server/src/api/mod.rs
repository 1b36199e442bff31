pub mod artists;
pub mod home;
pub mod shows;
pub mod venues;

use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::{FormErrors, GENRES, STATES};
use fyyur_db::queries::SearchResults;
use fyyur_db::AppState;

/// A page model: the body plus any flash queued by the previous request.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
    #[serde(flatten)]
    pub body: T,
}

/// Render a page, consuming the pending flash.
pub fn render<T: Serialize>(jar: CookieJar, body: T) -> (CookieJar, Json<Page<T>>) {
    let (jar, flash) = flash::take(jar);
    (jar, Json(Page { flash, body }))
}

/// Redirect with a flash for the destination page.
pub fn redirect_with(state: &AppState, jar: CookieJar, to: &str, flash: Flash) -> Response {
    let jar = flash::push(jar, flash, state.secure_cookies);
    (jar, Redirect::to(to)).into_response()
}

/// Integer id path segment. Anything else is a missing page.
pub struct EntityId(pub i32);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i32>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| EntityId(id))
            .map_err(|_| AppError::NotFound("page"))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub search_term: String,
    pub results: SearchResults,
}

#[derive(Debug, Serialize)]
pub struct Choices {
    pub states: &'static [&'static str],
    pub genres: &'static [&'static str],
}

pub const CHOICES: Choices = Choices {
    states: STATES,
    genres: GENRES,
};

/// Model of a create/edit form page.
#[derive(Debug, Serialize)]
pub struct FormPage<F: Serialize> {
    /// Set when editing an existing record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub form: F,
    pub errors: FormErrors,
    pub choices: Choices,
}

impl<F: Serialize> FormPage<F> {
    pub fn new(id: Option<i32>, form: F) -> Self {
        Self {
            id,
            form,
            errors: FormErrors::default(),
            choices: CHOICES,
        }
    }
}

/// Re-render a rejected submission with its field errors. Nothing was persisted.
pub fn invalid_form<F: Serialize>(
    jar: CookieJar,
    id: Option<i32>,
    form: F,
    errors: FormErrors,
) -> Response {
    tracing::debug!(fields = errors.len(), "form rejected");
    let page = FormPage {
        errors,
        ..FormPage::new(id, form)
    };
    (StatusCode::UNPROCESSABLE_ENTITY, render(jar, page)).into_response()
}
