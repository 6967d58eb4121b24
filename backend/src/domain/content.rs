//! Events and news posts published on the public site.

use chrono::{DateTime, Utc};

use super::campaigns::slug_field;
use super::validation::{FieldError, FieldErrorCode, FieldErrors, optional_text, required_text};
use super::{EventId, NewsPostId, Slug};

pub const CONTENT_TITLE_MAX: usize = 160;
pub const SUMMARY_MAX: usize = 2_000;
pub const BODY_MAX: usize = 100_000;
pub const LOCATION_MAX: usize = 200;

/// Validated event fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub slug: Slug,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published: bool,
}

/// Untrusted event form payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published: Option<bool>,
}

impl EventForm {
    pub fn validate(&self) -> Result<EventDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = errors.check(required_text(
            "title",
            self.title.as_deref(),
            1,
            CONTENT_TITLE_MAX,
        ));
        let slug = errors.check(slug_field("slug", self.slug.as_deref()));
        let summary = errors.check(optional_text("summary", self.summary.as_deref(), SUMMARY_MAX));
        let location =
            errors.check(optional_text("location", self.location.as_deref(), LOCATION_MAX));
        let starts_at = errors.check(self.starts_at.ok_or_else(|| FieldError::required("startsAt")));
        if let (Some(starts), Some(ends)) = (self.starts_at, self.ends_at) {
            if ends < starts {
                errors.push(FieldError::new(
                    "endsAt",
                    FieldErrorCode::OutOfRange,
                    "endsAt must not be before startsAt",
                ));
            }
        }

        let (Some(title), Some(slug), Some(summary), Some(location), Some(starts_at)) =
            (title, slug, summary, location, starts_at)
        else {
            return Err(errors);
        };
        errors.into_result()?;
        Ok(EventDraft {
            title,
            slug,
            summary,
            location,
            starts_at,
            ends_at: self.ends_at,
            published: self.published.unwrap_or(false),
        })
    }
}

/// Stored event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub slug: Slug,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventRecord {
    pub fn create(id: EventId, draft: EventDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            slug: draft.slug,
            summary: draft.summary,
            location: draft.location,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            published: draft.published,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn revise(&self, draft: EventDraft, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now.max(self.created_at),
            ..Self::create(self.id, draft, self.created_at)
        }
    }
}

/// Published events, soonest first.
pub fn public_events(mut events: Vec<EventRecord>) -> Vec<EventRecord> {
    events.retain(|event| event.published);
    events.sort_by_key(|event| event.starts_at);
    events
}

/// Validated news post fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsPostDraft {
    pub title: String,
    pub slug: Slug,
    pub excerpt: Option<String>,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Untrusted news post form payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsPostForm {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsPostForm {
    pub fn validate(&self) -> Result<NewsPostDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = errors.check(required_text(
            "title",
            self.title.as_deref(),
            1,
            CONTENT_TITLE_MAX,
        ));
        let slug = errors.check(slug_field("slug", self.slug.as_deref()));
        let excerpt = errors.check(optional_text("excerpt", self.excerpt.as_deref(), SUMMARY_MAX));
        let body = errors.check(required_text("body", self.body.as_deref(), 1, BODY_MAX));

        let (Some(title), Some(slug), Some(excerpt), Some(body)) = (title, slug, excerpt, body)
        else {
            return Err(errors);
        };
        Ok(NewsPostDraft {
            title,
            slug,
            excerpt,
            body,
            published_at: self.published_at,
        })
    }
}

/// Stored news post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsPostRecord {
    pub id: NewsPostId,
    pub title: String,
    pub slug: Slug,
    pub excerpt: Option<String>,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewsPostRecord {
    pub fn create(id: NewsPostId, draft: NewsPostDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            slug: draft.slug,
            excerpt: draft.excerpt,
            body: draft.body,
            published_at: draft.published_at,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn revise(&self, draft: NewsPostDraft, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now.max(self.created_at),
            ..Self::create(self.id, draft, self.created_at)
        }
    }

    /// Visible once `published_at` is set and has passed.
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.published_at.is_some_and(|at| at <= now)
    }
}

/// Published posts, newest first.
pub fn public_news(mut posts: Vec<NewsPostRecord>, now: DateTime<Utc>) -> Vec<NewsPostRecord> {
    posts.retain(|post| post.is_published(now));
    posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    posts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn event(slug: &str, starts_at: DateTime<Utc>, published: bool) -> EventRecord {
        let draft = EventForm {
            title: Some("Coffee meetup".into()),
            slug: Some(slug.into()),
            starts_at: Some(starts_at),
            published: Some(published),
            ..EventForm::default()
        }
        .validate()
        .expect("valid event");
        EventRecord::create(EventId::random(), draft, starts_at)
    }

    fn post(slug: &str, published_at: Option<DateTime<Utc>>) -> NewsPostRecord {
        let draft = NewsPostForm {
            title: Some("Update".into()),
            slug: Some(slug.into()),
            body: Some("Body".into()),
            published_at,
            ..NewsPostForm::default()
        }
        .validate()
        .expect("valid post");
        NewsPostRecord::create(NewsPostId::random(), draft, published_at.unwrap_or_default())
    }

    #[rstest]
    fn events_are_published_and_chronological(now: DateTime<Utc>) {
        let listed = public_events(vec![
            event("later", now + Duration::days(10), true),
            event("draft", now + Duration::days(1), false),
            event("sooner", now + Duration::days(2), true),
        ]);
        let slugs: Vec<&str> = listed.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["sooner", "later"]);
    }

    #[rstest]
    fn news_hides_unpublished_and_scheduled(now: DateTime<Utc>) {
        let listed = public_news(
            vec![
                post("older", Some(now - Duration::days(3))),
                post("unpublished", None),
                post("scheduled", Some(now + Duration::days(1))),
                post("newer", Some(now - Duration::hours(1))),
            ],
            now,
        );
        let slugs: Vec<&str> = listed.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newer", "older"]);
    }

    #[rstest]
    fn event_end_must_follow_start(now: DateTime<Utc>) {
        let errors = EventForm {
            title: Some("Gala".into()),
            slug: Some("gala".into()),
            starts_at: Some(now),
            ends_at: Some(now - Duration::hours(1)),
            ..EventForm::default()
        }
        .validate()
        .expect_err("end before start");
        assert!(errors.contains("endsAt"));
    }

    #[rstest]
    fn revise_keeps_identity_and_creation(now: DateTime<Utc>) {
        let original = event("gala", now, true);
        let draft = EventForm {
            title: Some("Gala night".into()),
            slug: Some("gala".into()),
            starts_at: Some(now),
            ..EventForm::default()
        }
        .validate()
        .expect("valid");
        let revised = original.revise(draft, now + Duration::minutes(5));
        assert_eq!(revised.id, original.id);
        assert_eq!(revised.created_at, original.created_at);
        assert_eq!(revised.title, "Gala night");
        assert!(!revised.published);
    }
}
