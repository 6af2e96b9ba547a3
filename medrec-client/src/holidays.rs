//! Public holidays feed, shown next to the appointments calendar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ClientConfig;
use crate::errors::{ClientError, ClientResult};

/// Country used when none is given.
pub const DEFAULT_COUNTRY_CODE: &str = "IE";
const DEFAULT_FEED_URL: &str = "https://date.nager.at/api/v3/";

/// A public holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub date: NaiveDate,
    #[serde(default)]
    pub local_name: String,
    pub name: String,
    #[serde(default)]
    pub country_code: String,
}

/// Client for the public holidays feed.
#[derive(Clone, Debug)]
pub struct HolidayClient {
    http: reqwest::Client,
    feed_url: Url,
}

impl HolidayClient {
    /// Creates a client for the default feed; only the timeout and user agent of `config`
    /// are used.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Self::with_feed_url(DEFAULT_FEED_URL, config)
    }

    pub fn with_feed_url(feed_url: &str, config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let mut builder = reqwest::Client::builder().timeout(config.timeout());
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        Ok(Self {
            http: builder.build()?,
            feed_url: crate::utils::normalize_base_url(feed_url)?,
        })
    }

    /// Returns the public holidays of the given country and year.
    ///
    /// The feed is best effort: any failure is logged and yields an empty list.
    pub async fn public_holidays(&self, country_code: &str, year: i32) -> Vec<Holiday> {
        match self.fetch(country_code, year).await {
            Ok(holidays) => holidays,
            Err(err) => {
                tracing::warn!(country_code, year, "error fetching holidays: {err}");
                Vec::new()
            }
        }
    }

    async fn fetch(&self, country_code: &str, year: i32) -> ClientResult<Vec<Holiday>> {
        let url = self.holidays_url(country_code, year)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::from_response(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
                None,
            ));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    fn holidays_url(&self, country_code: &str, year: i32) -> ClientResult<Url> {
        Ok(self
            .feed_url
            .join(&format!("PublicHolidays/{year}/{country_code}"))?)
    }
}
