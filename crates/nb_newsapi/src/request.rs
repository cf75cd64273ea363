use nb_core::{CanonicalFilter, Error, Pagination, Result};
use url::Url;

/// Search term sent to the full-text endpoint when the user gave none; that
/// endpoint rejects an empty `q`.
pub const DEFAULT_SEARCH_TERM: &str = "news";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/top-headlines`: country/category or sources, no date range
    TopHeadlines,
    /// `/everything`: full-text search with language and date range
    Everything,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::TopHeadlines => "top-headlines",
            Endpoint::Everything => "everything",
        }
    }
}

/// A typed outbound request. Parameters are encoded by [`NewsApiRequest::url`],
/// never by string concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsApiRequest {
    pub endpoint: Endpoint,
    pub params: Vec<(&'static str, String)>,
}

impl NewsApiRequest {
    pub fn from_filter(filter: &CanonicalFilter, page: &Pagination) -> Self {
        let mut params = Vec::new();

        let endpoint = if let Some(language) = &filter.language {
            let term = filter.query.as_deref().unwrap_or(DEFAULT_SEARCH_TERM);
            params.push(("q", term.to_string()));
            params.push(("language", language.clone()));
            if let Some(from) = filter.date_from {
                params.push(("from", from.format(DATE_FORMAT).to_string()));
            }
            if let Some(to) = filter.date_to {
                params.push(("to", to.format(DATE_FORMAT).to_string()));
            }
            params.push(("sortBy", "publishedAt".to_string()));
            Endpoint::Everything
        } else {
            // The provider rejects sources combined with country/category.
            if let Some(sources) = &filter.sources {
                params.push(("sources", sources.clone()));
            } else {
                params.push(("country", filter.country.clone()));
                if let Some(category) = &filter.category {
                    params.push(("category", category.clone()));
                }
            }
            if let Some(query) = &filter.query {
                params.push(("q", query.clone()));
            }
            Endpoint::TopHeadlines
        };

        params.push(("pageSize", page.page_size.to_string()));
        params.push(("page", page.page.to_string()));

        Self { endpoint, params }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn url(&self, base_url: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .and_then(|base| base.join(self.endpoint.path()))
            .map_err(|e| Error::Configuration(format!("Invalid news API url '{}': {}", base_url, e)))?;
        url.query_pairs_mut().extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn filter() -> CanonicalFilter {
        CanonicalFilter::default()
    }

    #[test]
    fn test_language_selects_full_text_search() {
        let request = NewsApiRequest::from_filter(
            &CanonicalFilter {
                language: Some("fr".to_string()),
                date_from: NaiveDate::from_ymd_opt(2024, 3, 1),
                date_to: NaiveDate::from_ymd_opt(2024, 3, 5),
                category: Some("business".to_string()),
                ..filter()
            },
            &Pagination::default(),
        );
        assert_eq!(request.endpoint, Endpoint::Everything);
        assert_eq!(request.param("q"), Some(DEFAULT_SEARCH_TERM));
        assert_eq!(request.param("language"), Some("fr"));
        assert_eq!(request.param("from"), Some("2024-03-01"));
        assert_eq!(request.param("to"), Some("2024-03-05"));
        assert_eq!(request.param("country"), None);
    }

    #[test]
    fn test_no_language_selects_headlines_without_dates() {
        let request = NewsApiRequest::from_filter(
            &CanonicalFilter {
                category: Some("science".to_string()),
                query: Some("mars".to_string()),
                date_from: NaiveDate::from_ymd_opt(2024, 3, 1),
                ..filter()
            },
            &Pagination::default(),
        );
        assert_eq!(request.endpoint, Endpoint::TopHeadlines);
        assert_eq!(request.param("country"), Some("us"));
        assert_eq!(request.param("category"), Some("science"));
        assert_eq!(request.param("q"), Some("mars"));
        assert_eq!(request.param("from"), None);
        assert_eq!(request.param("pageSize"), Some("20"));
    }

    #[test]
    fn test_sources_suppress_country_and_category() {
        let request = NewsApiRequest::from_filter(
            &CanonicalFilter {
                country: "de".to_string(),
                category: Some("sports".to_string()),
                sources: Some("bbc-news,cnn".to_string()),
                ..filter()
            },
            &Pagination::default(),
        );
        assert_eq!(request.endpoint, Endpoint::TopHeadlines);
        assert_eq!(request.param("sources"), Some("bbc-news,cnn"));
        assert_eq!(request.param("category"), None);
        assert_eq!(request.param("country"), None);
    }

    #[test]
    fn test_url_escapes_parameters() {
        let request = NewsApiRequest::from_filter(
            &CanonicalFilter {
                language: Some("en".to_string()),
                query: Some("rust & go=fast".to_string()),
                ..filter()
            },
            &Pagination { page: 2, page_size: 50 },
        );
        let url = request.url("https://newsapi.org/v2/").unwrap();
        assert_eq!(url.path(), "/v2/everything");
        assert_eq!(
            url.query(),
            Some("q=rust+%26+go%3Dfast&language=en&sortBy=publishedAt&pageSize=50&page=2")
        );
    }

    #[test]
    fn test_bad_base_url_is_configuration_error() {
        let request = NewsApiRequest::from_filter(&filter(), &Pagination::default());
        assert!(matches!(request.url("not a url"), Err(Error::Configuration(_))));
    }
}
