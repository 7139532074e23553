//! Where an API key is read from.

use actix_web::http::header;
use actix_web::HttpRequest;

use super::error::ApiKeyError;

/// Where to look for the API key in requests.
///
/// The location is fixed when a scheme is registered; the key name comes from
/// [`ApiKeyOptions`](super::ApiKeyOptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    /// A request header named after the key, e.g. `X-API-KEY: Key1`.
    Header,
    /// A query parameter named after the key, e.g. `?key=Key1`.
    QueryParams,
    /// The query string first, then the header, then the `Authorization` header.
    HeaderOrQueryParams,
    /// `Authorization: <scheme> <key>` where the scheme is the scheme name or the key name.
    AuthorizationHeader,
    /// A route segment named after the key, e.g. `/keys/{key}/items`.
    RouteValues,
}

impl ApiKeyLocation {
    /// The `in` parameter advertised in the `WWW-Authenticate` challenge.
    pub fn in_parameter(&self) -> &'static str {
        match self {
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::QueryParams => "query_params",
            ApiKeyLocation::HeaderOrQueryParams => "header_or_query_params",
            ApiKeyLocation::AuthorizationHeader => "authorization_header",
            ApiKeyLocation::RouteValues => "route_values",
        }
    }

    /// Reads the candidate key from the request.
    ///
    /// Returns `Ok(None)` when no usable key is present and `Err(ApiKeyError::Parse)`
    /// when a value exists but cannot be read.
    pub fn extract(
        &self,
        req: &HttpRequest,
        key_name: &str,
        scheme_name: &str,
    ) -> Result<Option<String>, ApiKeyError> {
        match self {
            ApiKeyLocation::Header => from_header(req, key_name),
            ApiKeyLocation::QueryParams => from_query(req, key_name),
            ApiKeyLocation::AuthorizationHeader => {
                from_authorization_header(req, key_name, scheme_name)
            }
            ApiKeyLocation::RouteValues => Ok(from_route(req, key_name)),
            ApiKeyLocation::HeaderOrQueryParams => {
                if let Some(key) = from_query(req, key_name)? {
                    return Ok(Some(key));
                }
                if let Some(key) = from_header(req, key_name)? {
                    return Ok(Some(key));
                }
                from_authorization_header(req, key_name, scheme_name)
            }
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Result<Option<&'a str>, ApiKeyError> {
    match req.headers().get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| ApiKeyError::parse(format!("header '{}' is not visible ASCII", name))),
    }
}

fn from_header(req: &HttpRequest, key_name: &str) -> Result<Option<String>, ApiKeyError> {
    Ok(header_str(req, key_name)?.and_then(non_blank))
}

fn from_query(req: &HttpRequest, key_name: &str) -> Result<Option<String>, ApiKeyError> {
    for pair in req.query_string().split('&') {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        if !decode_lossy(name).eq_ignore_ascii_case(key_name) {
            continue;
        }

        let decoded = urlencoding::decode(&value.replace('+', " "))
            .map_err(|_| {
                ApiKeyError::parse(format!(
                    "query parameter '{}' is not valid UTF-8 once decoded",
                    key_name
                ))
            })?
            .into_owned();

        return Ok(non_blank(&decoded));
    }
    Ok(None)
}

fn decode_lossy(value: &str) -> String {
    let value = value.replace('+', " ");
    urlencoding::decode(&value)
        .map(|v| v.into_owned())
        .unwrap_or(value)
}

fn from_authorization_header(
    req: &HttpRequest,
    key_name: &str,
    scheme_name: &str,
) -> Result<Option<String>, ApiKeyError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    // Foreign schemes are skipped before the value is checked for visible ASCII.
    let raw = value.as_bytes().trim_ascii();
    let Some(space) = raw.iter().position(|b| *b == b' ') else {
        return Ok(None);
    };
    let scheme = &raw[..space];
    if !scheme.eq_ignore_ascii_case(scheme_name.as_bytes())
        && !scheme.eq_ignore_ascii_case(key_name.as_bytes())
    {
        return Ok(None);
    }

    let auth = value
        .to_str()
        .map_err(|_| ApiKeyError::parse("header 'authorization' is not visible ASCII"))?;
    Ok(auth
        .trim()
        .split_once(' ')
        .and_then(|(_, parameter)| non_blank(parameter)))
}

fn from_route(req: &HttpRequest, key_name: &str) -> Option<String> {
    req.match_info().get(key_name).and_then(non_blank)
}
