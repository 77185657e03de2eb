use crate::utils::error::{Result, ServiceError};
use url::Url;

/// 有序的查詢參數；值在組成 URL 時才做編碼
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// 未設定（`None`）的選填條件直接省略，不會送出字面上的 "null"
    pub fn with_optional<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// 相對路由，以路徑片段表示，每個片段各自編碼
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    segments: Vec<String>,
}

impl Route {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            segments: segments.into_iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// 基底位址 + 相對路由 + 查詢參數
///
/// 相同輸入永遠得到相同的 URL。
pub fn build_route(base: &Url, route: &Route, query: &QueryParams) -> Result<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);

    url.path_segments_mut()
        .map_err(|_| ServiceError::ConfigError {
            message: format!("Base address '{}' cannot carry a path", base),
        })?
        .pop_if_empty()
        .extend(route.segments());

    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query.iter() {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}
