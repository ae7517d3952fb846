use super::auth::check_basic_auth;
use super::AppState;
use crate::manifest::format_release;
use crate::publish::{self, ArtifactUpload, PublishRequest};
use crate::select::{select_version as select_version_algo, FailureCode, Selection};
use crate::types::{RequestedCompatibility, ServiceError, Version};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::collections::BTreeMap;

pub async fn healthz() -> &'static str {
    "OK"
}

pub async fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

#[derive(Deserialize)]
pub struct SelectVersionQuery {
    zig_version: Option<String>,
    compatibility: Option<String>,
}

pub async fn select_version(
    State(state): State<AppState>,
    Query(query): Query<SelectVersionQuery>,
) -> Result<Response, ServiceError> {
    let zig_version_str = query.zig_version.ok_or(ServiceError::BadQuery("zig_version"))?;
    let compatibility_str = query.compatibility.ok_or(ServiceError::BadQuery("compatibility"))?;

    let zig_version = Version::parse(&zig_version_str).ok_or(ServiceError::BadQuery("zig_version"))?;
    let compatibility: RequestedCompatibility =
        compatibility_str.parse().map_err(|_| ServiceError::BadQuery("compatibility"))?;

    let public_url_base = state.config.require_public_url_base()?;

    let selection = select_version_algo(state.store.as_ref(), &zig_version, compatibility)
        .await
        .map_err(ServiceError::Store)?;

    match selection {
        Selection::Selected(record) => {
            let manifest = format_release(&record, public_url_base)?;
            let cache_control = if zig_version.is_tagged() { "public, max-age=3600" } else { "public, max-age=300" };
            let mut response = Json(manifest).into_response();
            response.headers_mut().insert("cache-control", HeaderValue::from_static(cache_control));
            Ok(response)
        }
        Selection::Failed(code) => {
            let body = serde_json::json!({
                "code": code.code(),
                "message": failure_message(code, &zig_version),
            });
            Ok(Json(body).into_response())
        }
    }
}

fn failure_message(code: FailureCode, zig_version: &Version) -> String {
    match code {
        FailureCode::Unsupported => format!("Zig {zig_version} is not supported by ZLS"),
        FailureCode::DevelopmentBuildUnsupported => {
            format!("No builds for the {}.{} release cycle are currently available", zig_version.major, zig_version.minor)
        }
        FailureCode::DevelopmentBuildIncompatible => format!("Zig {zig_version} has no compatible ZLS build (yet)"),
        FailureCode::TaggedReleaseIncompatible => {
            format!("ZLS {}.{} has not been released yet", zig_version.major, zig_version.minor)
        }
    }
}

pub async fn index_redirect(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let public_url_base = state.config.require_public_url_base()?;
    let location = HeaderValue::from_str(&format!("{public_url_base}/index.json"))
        .map_err(|_| ServiceError::BadQuery("public_url_base"))?;
    let mut response = StatusCode::MOVED_PERMANENTLY.into_response();
    response.headers_mut().insert(axum::http::header::LOCATION, location);
    Ok(response)
}

pub async fn get_release(State(state): State<AppState>, Path(version): Path<String>) -> Result<Response, ServiceError> {
    let public_url_base = state.config.require_public_url_base()?;
    let record = state.store.get_by_version(&version).await.map_err(ServiceError::Store)?;
    match record {
        Some(record) => {
            let manifest = format_release(&record, public_url_base)?;
            Ok(Json(manifest).into_response())
        }
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

#[derive(Deserialize)]
pub struct PublishArtifactPayload {
    shasum: String,
    size: u64,
    #[serde(default)]
    has_signature: bool,
}

#[derive(Deserialize)]
pub struct PublishPayload {
    zls_version: String,
    zig_version: String,
    minimum_build_zig_version: String,
    minimum_runtime_zig_version: String,
    compatibility: String,
    artifacts: BTreeMap<String, PublishArtifactPayload>,
}

pub async fn publish(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(payload): Json<PublishPayload>,
) -> Result<Response, ServiceError> {
    let api_token = state.config.require_api_token()?;
    let auth_header = headers.get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    check_basic_auth(auth_header, api_token)?;

    let artifacts = payload
        .artifacts
        .into_iter()
        .map(|(name, upload)| {
            (name, ArtifactUpload { shasum: upload.shasum, size: upload.size, has_signature: upload.has_signature })
        })
        .collect();

    let request = PublishRequest {
        zls_version: payload.zls_version,
        zig_version: payload.zig_version,
        minimum_build_zig_version: payload.minimum_build_zig_version,
        minimum_runtime_zig_version: payload.minimum_runtime_zig_version,
        compatibility: payload.compatibility,
        artifacts,
    };

    let has_artifacts = !request.artifacts.is_empty();
    let now_ms = chrono::Utc::now().timestamp_millis();
    let outcome = publish::publish(state.store.as_ref(), &request, state.config.force_minisign, now_ms)
        .await
        .map_err(ServiceError::Publish)?;

    if let Ok(public_url_base) = state.config.require_public_url_base() {
        publish::maybe_materialize_index(
            &outcome,
            has_artifacts,
            state.store.clone(),
            state.blob_store.clone(),
            public_url_base.to_string(),
        );
    }

    Ok(StatusCode::OK.into_response())
}
