use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::filter::{CanonicalFilter, Pagination};
use crate::types::StoredArticle;

/// Provenance fields an article can be matched on by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvenanceField {
    Country,
    Category,
    Language,
    Sources,
}

impl ProvenanceField {
    pub fn column(&self) -> &'static str {
        match self {
            ProvenanceField::Country => "country",
            ProvenanceField::Category => "category",
            ProvenanceField::Language => "language",
            ProvenanceField::Sources => "sources",
        }
    }

    pub fn get<'a>(&self, filter: &'a CanonicalFilter) -> Option<&'a str> {
        match self {
            ProvenanceField::Country => Some(filter.country.as_str()),
            ProvenanceField::Category => filter.category.as_deref(),
            ProvenanceField::Language => filter.language.as_deref(),
            ProvenanceField::Sources => filter.sources.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Equals { field: ProvenanceField, value: String },
    /// Case-insensitive substring match on the title.
    TitleContains(String),
    /// `from <= fetched_at < before`.
    FetchedBetween {
        from: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    },
}

impl Constraint {
    pub fn matches(&self, article: &StoredArticle) -> bool {
        match self {
            Constraint::Equals { field, value } => field.get(&article.query_params) == Some(value.as_str()),
            Constraint::TitleContains(needle) => article
                .article
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Constraint::FetchedBetween { from, before } => {
                from.map_or(true, |from| article.fetched_at >= from)
                    && before.map_or(true, |before| article.fetched_at < before)
            }
        }
    }
}

/// A conjunction of constraints. No constraints matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticlePredicate {
    pub constraints: Vec<Constraint>,
}

impl ArticlePredicate {
    pub fn from_filter(filter: &CanonicalFilter) -> Self {
        let mut constraints = Vec::new();

        // The default country matches every cached country.
        if !filter.has_default_country() {
            constraints.push(Constraint::Equals {
                field: ProvenanceField::Country,
                value: filter.country.clone(),
            });
        }

        for field in [ProvenanceField::Category, ProvenanceField::Language, ProvenanceField::Sources] {
            if let Some(value) = field.get(filter) {
                constraints.push(Constraint::Equals {
                    field,
                    value: value.to_string(),
                });
            }
        }

        if let Some(query) = &filter.query {
            constraints.push(Constraint::TitleContains(query.clone()));
        }

        if filter.date_from.is_some() || filter.date_to.is_some() {
            constraints.push(Constraint::FetchedBetween {
                from: filter.date_from.map(start_of_day),
                before: filter.date_to.and_then(day_after),
            });
        }

        Self { constraints }
    }

    pub fn matches(&self, article: &StoredArticle) -> bool {
        self.constraints.iter().all(|c| c.matches(article))
    }

    pub fn is_open(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// What a backend executes: the predicate, ordered by `published_at`
/// descending, then paged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub predicate: ArticlePredicate,
    pub page: Pagination,
}

impl ArticleQuery {
    pub fn new(filter: &CanonicalFilter, page: Pagination) -> Self {
        Self {
            predicate: ArticlePredicate::from_filter(filter),
            page,
        }
    }
}

/// Newest first; articles without a publish date go last.
pub fn newest_first(a: &StoredArticle, b: &StoredArticle) -> std::cmp::Ordering {
    b.article.published_at.cmp(&a.article.published_at)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Exclusive upper bound for a `to` date. The last representable date has
/// none.
fn day_after(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.succ_opt().map(start_of_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Article, ArticleSource};

    fn stored(title: &str, fetched_at: &str, query_params: CanonicalFilter) -> StoredArticle {
        StoredArticle::new(
            Article {
                url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
                title: title.to_string(),
                description: None,
                url_to_image: None,
                author: None,
                content: None,
                source: ArticleSource {
                    id: None,
                    name: "Example".to_string(),
                },
                published_at: None,
            },
            fetched_at.parse().unwrap(),
            query_params,
        )
    }

    #[test]
    fn test_default_filter_is_open() {
        let predicate = ArticlePredicate::from_filter(&CanonicalFilter::default());
        assert!(predicate.is_open());

        for country in ["us", "de", "fr"] {
            let article = stored(
                "Anything",
                "2024-01-01T00:00:00Z",
                CanonicalFilter {
                    country: country.to_string(),
                    category: Some("sports".to_string()),
                    ..CanonicalFilter::default()
                },
            );
            assert!(predicate.matches(&article));
        }
    }

    #[test]
    fn test_non_default_country_is_constrained() {
        let filter = CanonicalFilter {
            country: "de".to_string(),
            ..CanonicalFilter::default()
        };
        let predicate = ArticlePredicate::from_filter(&filter);
        assert_eq!(
            predicate.constraints,
            vec![Constraint::Equals {
                field: ProvenanceField::Country,
                value: "de".to_string()
            }]
        );
        assert!(predicate.matches(&stored("A", "2024-01-01T00:00:00Z", filter.clone())));
        assert!(!predicate.matches(&stored("A", "2024-01-01T00:00:00Z", CanonicalFilter::default())));
    }

    #[test]
    fn test_provenance_equality_and_title_match() {
        let filter = CanonicalFilter {
            category: Some("business".to_string()),
            query: Some("MARKETS".to_string()),
            ..CanonicalFilter::default()
        };
        let predicate = ArticlePredicate::from_filter(&filter);
        assert_eq!(predicate.constraints.len(), 2);

        let business = CanonicalFilter {
            category: Some("business".to_string()),
            ..CanonicalFilter::default()
        };
        assert!(predicate.matches(&stored("Global markets rally", "2024-01-01T00:00:00Z", business.clone())));
        assert!(!predicate.matches(&stored("Weather update", "2024-01-01T00:00:00Z", business)));
        assert!(!predicate.matches(&stored(
            "Global markets rally",
            "2024-01-01T00:00:00Z",
            CanonicalFilter::default()
        )));
    }

    #[test]
    fn test_date_to_includes_whole_day() {
        let filter = CanonicalFilter {
            date_from: NaiveDate::from_ymd_opt(2024, 3, 1),
            date_to: NaiveDate::from_ymd_opt(2024, 3, 2),
            ..CanonicalFilter::default()
        };
        let predicate = ArticlePredicate::from_filter(&filter);
        let provenance = CanonicalFilter::default();

        assert!(predicate.matches(&stored("A", "2024-03-01T00:00:00Z", provenance.clone())));
        assert!(predicate.matches(&stored("A", "2024-03-02T23:59:59.999Z", provenance.clone())));
        assert!(!predicate.matches(&stored("A", "2024-02-29T23:59:59Z", provenance.clone())));
        assert!(predicate.matches(&stored("A", "2024-03-02T23:59:59.999999Z", provenance.clone())));
        assert!(!predicate.matches(&stored("A", "2024-03-03T00:00:00Z", provenance)));
    }

    #[test]
    fn test_date_to_on_last_date_is_unbounded() {
        let filter = CanonicalFilter {
            date_to: Some(NaiveDate::MAX),
            ..CanonicalFilter::default()
        };
        let predicate = ArticlePredicate::from_filter(&filter);
        assert_eq!(
            predicate.constraints,
            vec![Constraint::FetchedBetween { from: None, before: None }]
        );
        assert!(predicate.matches(&stored("A", "2024-03-03T00:00:00Z", CanonicalFilter::default())));
    }

    #[test]
    fn test_sources_constraint() {
        let filter = CanonicalFilter {
            sources: Some("bbc-news".to_string()),
            ..CanonicalFilter::default()
        };
        let predicate = ArticlePredicate::from_filter(&filter);
        assert!(predicate.matches(&stored("A", "2024-01-01T00:00:00Z", filter.clone())));
        assert!(!predicate.matches(&stored("A", "2024-01-01T00:00:00Z", CanonicalFilter::default())));
    }
}
