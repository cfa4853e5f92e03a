//! Create, detail, edit, delete and search routes for one resource collection

use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use fhir_desk_core::{FhirResource, ResourceForm, SearchCriteria};
use serde::Deserialize;

use crate::client::ResourceClient;
use crate::error::AppError;
use crate::pages::{
    Confirmation, CreatePage, CreateView, DetailPage, DetailView, SearchPage, SearchView,
    delete_prompt,
};

/// Client plus the path segment the collection is mounted at
pub struct Collection<R> {
    client: ResourceClient<R>,
    path: &'static str,
}

impl<R> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path,
        }
    }
}

/// Routes under `/{path}` for the resource edited by `F` and searched by `C`
pub fn collection_routes<F, C>(client: ResourceClient<F::Resource>, path: &'static str) -> Router
where
    F: ResourceForm,
    C: SearchCriteria<Resource = F::Resource>,
{
    Router::new()
        .route(&format!("/{}", path), get(search::<C>).post(create::<F>))
        .route(&format!("/{}/new", path), get(new_form::<F>))
        .route(
            &format!("/{}/{{id}}", path),
            get(read::<F>).put(update::<F>).delete(delete::<F>),
        )
        .with_state(Collection { client, path })
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    #[serde(default)]
    confirm: bool,
}

/// GET /{collection}?{criteria} - Search page. Without a query string the
/// empty page is shown and nothing is sent.
async fn search<C: SearchCriteria>(
    State(collection): State<Collection<C::Resource>>,
    RawQuery(raw): RawQuery,
    Query(criteria): Query<C>,
) -> Result<Json<SearchView<C, C::Resource>>, AppError> {
    let mut page = SearchPage::with_criteria(collection.client, criteria);
    if raw.as_deref().is_none_or(str::is_empty) {
        return Ok(Json(page.view()));
    }

    match page.submit().await {
        Ok(()) => Ok(Json(page.view())),
        Err(err) => Err(AppError::page(&err, page.view())),
    }
}

/// GET /{collection}/new - Blank create form
async fn new_form<F: ResourceForm>(
    State(collection): State<Collection<F::Resource>>,
) -> Json<CreateView<F>> {
    Json(CreatePage::<F>::new(collection.client).view())
}

/// POST /{collection} - Submit the create form
async fn create<F: ResourceForm>(
    State(collection): State<Collection<F::Resource>>,
    Json(form): Json<F>,
) -> Result<Response, AppError> {
    let mut page = CreatePage::with_form(collection.client, form);
    let created = match page.submit().await {
        Ok(created) => created,
        Err(err) => return Err(AppError::page(&err, page.view())),
    };

    let location = created
        .id()
        .and_then(|id| HeaderValue::from_str(&format!("/{}/{}", collection.path, id)).ok());
    let mut response = (StatusCode::CREATED, Json(created)).into_response();
    if let Some(location) = location {
        response.headers_mut().insert(header::LOCATION, location);
    }
    Ok(response)
}

/// GET /{collection}/{id} - Detail page
async fn read<F: ResourceForm>(
    State(collection): State<Collection<F::Resource>>,
    Path(id): Path<String>,
) -> Result<Json<DetailView<F, F::Resource>>, AppError> {
    let mut page = DetailPage::<F>::new(collection.client, id);
    match page.load().await {
        Ok(()) => Ok(Json(page.view())),
        Err(err) => Err(AppError::page(&err, page.view())),
    }
}

/// PUT /{collection}/{id} - Submit the edit form over the stored resource
async fn update<F: ResourceForm>(
    State(collection): State<Collection<F::Resource>>,
    Path(id): Path<String>,
    Json(form): Json<F>,
) -> Result<Json<DetailView<F, F::Resource>>, AppError> {
    let mut page = DetailPage::<F>::new(collection.client, id);
    if let Err(err) = page.load().await {
        return Err(AppError::page(&err, page.view()));
    }

    page.replace_form(form);
    match page.submit().await {
        Ok(()) => Ok(Json(page.view())),
        Err(err) => Err(AppError::page(&err, page.view())),
    }
}

/// DELETE /{collection}/{id}?confirm=true
async fn delete<F: ResourceForm>(
    State(collection): State<Collection<F::Resource>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<Response, AppError> {
    let mut page = DetailPage::<F>::new(collection.client, id);
    match page.delete(Confirmation::from(params.confirm)).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT.into_response()),
        Ok(false) => Err(AppError::Conflict(delete_prompt(F::LABEL))),
        Err(err) => Err(AppError::page(&err, page.view())),
    }
}
