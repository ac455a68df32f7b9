use super::{reddit, wallhaven, FetchResult, Upstream};
use crate::error::SourceError;
use crate::settings::Endpoints;
use reqwest::blocking::{Client, Response};

/// [`Upstream`] backed by blocking HTTP requests.
pub struct HttpUpstream {
    client: Client,
    endpoints: Endpoints,
}

impl HttpUpstream {
    pub fn new(endpoints: Endpoints) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(endpoints.user_agent.clone())
            .timeout(endpoints.timeout)
            .build()
            .map_err(|e| SourceError::unavailable("http client", e))?;
        Ok(Self { client, endpoints })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn checked(source_name: &str, response: reqwest::Result<Response>) -> Result<Response, SourceError> {
        let response = response.map_err(|e| SourceError::unavailable(source_name, e))?;
        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                log::warn!("{} is rate limiting requests", source_name);
            }
            return Err(SourceError::unavailable(source_name, format!("HTTP {}", status)));
        }
        Ok(response)
    }

    fn search_api(&self, source_name: &str, query: Option<&str>, sorting: &str, limit: usize) -> FetchResult {
        let url = format!("{}/search", self.endpoints.search_api.trim_end_matches('/'));
        let purity = if self.endpoints.allow_nsfw { "110" } else { "100" };

        let mut params = vec![
            ("sorting", sorting),
            ("categories", self.endpoints.categories_mask.as_str()),
            ("purity", purity),
        ];
        if let Some(q) = query {
            params.push(("q", q));
        }

        log::debug!("GET {} {:?}", url, params);
        let response = Self::checked(source_name, self.client.get(&url).query(&params).send())?;
        let body: wallhaven::SearchResponse = response
            .json()
            .map_err(|e| SourceError::unavailable(source_name, e))?;

        let records = wallhaven::into_records(body, limit);
        if records.is_empty() {
            return Err(SourceError::empty(source_name));
        }
        Ok(records)
    }
}

impl Upstream for HttpUpstream {
    fn channel(&self, name: &str, limit: usize) -> FetchResult {
        let source_name = format!("channel {}", name);
        let url = format!(
            "{}/r/{}/hot.json",
            self.endpoints.channel_site.trim_end_matches('/'),
            name
        );
        let limit = limit.to_string();

        log::debug!("GET {}", url);
        let response = Self::checked(
            &source_name,
            self.client
                .get(&url)
                .query(&[("limit", limit.as_str()), ("raw_json", "1")])
                .send(),
        )?;
        let listing: reddit::Listing = response
            .json()
            .map_err(|e| SourceError::unavailable(&source_name, e))?;

        let records = reddit::into_records(listing, &self.endpoints.channel_site, self.endpoints.allow_nsfw);
        if records.is_empty() {
            return Err(SourceError::empty(source_name));
        }
        Ok(records)
    }

    fn category(&self, name: &str, limit: usize) -> FetchResult {
        self.search_api(&format!("category {}", name), Some(name), "random", limit)
    }

    fn search(&self, query: Option<&str>, limit: usize) -> FetchResult {
        self.search_api("search", query, "random", limit)
    }

    fn latest(&self, limit: usize) -> FetchResult {
        self.search_api("catalog", None, "date_added", limit)
    }
}
