//! Behaviour of application submission, transitions and filtering.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ApplicationId;
use crate::domain::listing::{SearchText, StatusFilter};
use crate::domain::validation::FieldErrorCode;

#[fixture]
fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn jane() -> ApplicationSubmission {
    ApplicationSubmission {
        full_name: Some("Jane Doe".into()),
        email: Some("jane@example.com".into()),
        phone: Some("5551234567".into()),
        location: Some("Austin, TX".into()),
        cover_note: Some("I want to help.".into()),
        role: Some("volunteer".into()),
        ..ApplicationSubmission::default()
    }
}

#[fixture]
fn jane_record(jane: ApplicationSubmission, submitted_at: DateTime<Utc>) -> ApplicationRecord {
    let details = jane.validate().expect("jane's submission is valid");
    ApplicationRecord::submit(ApplicationId::random(), details, submitted_at)
}

fn record_named(name: &str, email: &str, status: ApplicationStatus) -> ApplicationRecord {
    let submission = ApplicationSubmission {
        full_name: Some(name.into()),
        email: Some(email.into()),
        phone: Some("5550001111".into()),
        location: Some("Denver, CO".into()),
        ..ApplicationSubmission::default()
    };
    let details = submission.validate().expect("valid submission");
    let now = Utc::now();
    ApplicationRecord::from_parts(ApplicationParts {
        id: ApplicationId::random(),
        details,
        status,
        internal_notes: None,
        created_at: now,
        updated_at: now,
        reviewed_at: None,
    })
}

#[rstest]
fn submission_starts_new_with_equal_timestamps(jane_record: ApplicationRecord) {
    assert_eq!(jane_record.status(), ApplicationStatus::New);
    assert_eq!(jane_record.created_at(), jane_record.updated_at());
    assert!(jane_record.reviewed_at().is_none());
    assert!(jane_record.internal_notes().is_none());
}

#[rstest]
fn validation_defaults_role_and_normalises_email(jane: ApplicationSubmission) {
    let details = ApplicationSubmission {
        role: None,
        email: Some("Jane@Example.COM".into()),
        ..jane
    }
    .validate()
    .expect("valid");
    assert_eq!(details.role, ApplicationRole::Volunteer);
    assert_eq!(details.email.as_str(), "jane@example.com");
}

#[rstest]
fn validation_reports_every_invalid_field() {
    let submission = ApplicationSubmission {
        full_name: Some("J".into()),
        email: Some("jane.example.com".into()),
        phone: Some("12".into()),
        location: None,
        profile_url: Some("javascript:alert(1)".into()),
        role: Some("astronaut".into()),
        desired_start_date: Some("next week".into()),
        ..ApplicationSubmission::default()
    };
    let errors = submission.validate().expect_err("invalid submission");
    let codes: Vec<(&str, FieldErrorCode)> = errors
        .iter()
        .map(|e| (e.field.as_str(), e.code))
        .collect();
    assert_eq!(
        codes,
        vec![
            ("fullName", FieldErrorCode::TooShort),
            ("email", FieldErrorCode::InvalidEmail),
            ("phone", FieldErrorCode::InvalidPhone),
            ("location", FieldErrorCode::Required),
            ("profileUrl", FieldErrorCode::InvalidUrl),
            ("role", FieldErrorCode::InvalidChoice),
            ("desiredStartDate", FieldErrorCode::InvalidDate),
        ]
    );
}

#[rstest]
fn cover_note_has_an_upper_bound(jane: ApplicationSubmission) {
    let errors = ApplicationSubmission {
        cover_note: Some("x".repeat(COVER_NOTE_MAX + 1)),
        ..jane
    }
    .validate()
    .expect_err("note too long");
    assert!(errors.contains("coverNote"));
}

#[rstest]
fn permissive_policy_allows_any_pair(jane_record: ApplicationRecord, submitted_at: DateTime<Utc>) {
    for from in ApplicationStatus::ALL {
        let mut start = jane_record.clone();
        start.status = from;
        for to in ApplicationStatus::ALL {
            let next = start
                .transition(
                    &StatusTransition::to(to),
                    TransitionPolicy::Permissive,
                    submitted_at + Duration::minutes(1),
                )
                .expect("permissive allows everything");
            assert_eq!(next.status(), to);
            assert!(ApplicationStatus::ALL.contains(&next.status()));
        }
    }
}

#[rstest]
fn transition_refreshes_timestamps_and_notes(
    jane_record: ApplicationRecord,
    submitted_at: DateTime<Utc>,
) {
    let later = submitted_at + Duration::hours(2);
    let transition = StatusTransition::to(ApplicationStatus::Contacted)
        .with_notes("  called, left voicemail ")
        .expect("notes within bounds");
    let next = jane_record
        .transition(&transition, TransitionPolicy::Permissive, later)
        .expect("transition applies");

    assert_eq!(next.status(), ApplicationStatus::Contacted);
    assert_eq!(next.updated_at(), later);
    assert_eq!(next.reviewed_at(), Some(later));
    assert_eq!(next.created_at(), submitted_at);
    assert_eq!(next.internal_notes(), Some("called, left voicemail"));
    assert_eq!(jane_record.status(), ApplicationStatus::New, "input untouched");
}

#[rstest]
fn notes_are_kept_when_absent_and_cleared_when_blank(
    jane_record: ApplicationRecord,
    submitted_at: DateTime<Utc>,
) {
    let with_notes = jane_record
        .transition(
            &StatusTransition::to(ApplicationStatus::Reviewing)
                .with_notes("first pass")
                .expect("notes"),
            TransitionPolicy::Permissive,
            submitted_at,
        )
        .expect("transition");
    let kept = with_notes
        .transition(
            &StatusTransition::to(ApplicationStatus::Interviewed),
            TransitionPolicy::Permissive,
            submitted_at,
        )
        .expect("transition");
    assert_eq!(kept.internal_notes(), Some("first pass"));

    let cleared = kept
        .transition(
            &StatusTransition::to(ApplicationStatus::Interviewed)
                .with_notes("")
                .expect("notes"),
            TransitionPolicy::Permissive,
            submitted_at,
        )
        .expect("transition");
    assert!(cleared.internal_notes().is_none());
}

#[rstest]
fn overlong_notes_are_rejected() {
    let err = StatusTransition::to(ApplicationStatus::Closed)
        .with_notes(&"n".repeat(NOTES_MAX + 1))
        .expect_err("too long");
    assert_eq!(err.code, FieldErrorCode::TooLong);
}

#[rstest]
#[case(ApplicationStatus::Accepted, ApplicationStatus::Reviewing, false)]
#[case(ApplicationStatus::Rejected, ApplicationStatus::New, false)]
#[case(ApplicationStatus::Closed, ApplicationStatus::Closed, true)]
#[case(ApplicationStatus::Interviewed, ApplicationStatus::Accepted, true)]
fn lock_terminal_policy(
    jane_record: ApplicationRecord,
    submitted_at: DateTime<Utc>,
    #[case] from: ApplicationStatus,
    #[case] to: ApplicationStatus,
    #[case] allowed: bool,
) {
    let mut start = jane_record;
    start.status = from;
    let result = start.transition(
        &StatusTransition::to(to),
        TransitionPolicy::LockTerminal,
        submitted_at,
    );
    assert_eq!(result.is_ok(), allowed);
    if !allowed {
        assert_eq!(result, Err(TransitionError::Locked { from, to }));
    }
}

#[rstest]
fn stale_expectation_is_refused(jane_record: ApplicationRecord, submitted_at: DateTime<Utc>) {
    let stale = submitted_at - Duration::seconds(5);
    let result = jane_record.transition(
        &StatusTransition::to(ApplicationStatus::Reviewing).expecting(stale),
        TransitionPolicy::Permissive,
        submitted_at + Duration::minutes(1),
    );
    assert!(matches!(result, Err(TransitionError::Stale { .. })));

    let fresh = jane_record.transition(
        &StatusTransition::to(ApplicationStatus::Reviewing).expecting(submitted_at),
        TransitionPolicy::Permissive,
        submitted_at + Duration::minutes(1),
    );
    assert!(fresh.is_ok());
}

#[rstest]
fn transition_never_moves_updated_at_before_creation(
    jane_record: ApplicationRecord,
    submitted_at: DateTime<Utc>,
) {
    let next = jane_record
        .transition(
            &StatusTransition::to(ApplicationStatus::Reviewing),
            TransitionPolicy::Permissive,
            submitted_at - Duration::days(1),
        )
        .expect("transition");
    assert!(next.created_at() <= next.updated_at());
}

#[rstest]
fn transition_errors_map_to_conflict() {
    let err: crate::domain::Error = TransitionError::Locked {
        from: ApplicationStatus::Accepted,
        to: ApplicationStatus::New,
    }
    .into();
    assert_eq!(err.code(), crate::domain::ErrorCode::Conflict);
}

#[rstest]
fn mailto_link_prefills_address_and_subject(jane_record: ApplicationRecord) {
    assert_eq!(
        jane_record.mailto_link(),
        "mailto:jane@example.com?subject=Your%20VETPAL%20volunteer%20application"
    );
}

#[rstest]
fn search_is_case_insensitive_substring() {
    let records = vec![
        record_named("John Doe", "john@example.com", ApplicationStatus::New),
        record_named("Alice Smith", "alice@example.com", ApplicationStatus::New),
    ];
    let filter = ApplicationFilter::new(StatusFilter::All, SearchText::new("jo"));
    let kept = filter.apply(records);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].full_name(), "John Doe");
}

#[rstest]
fn status_and_search_are_conjunctive() {
    let records = vec![
        record_named("John Doe", "john@example.com", ApplicationStatus::New),
        record_named("Joan Park", "joan@example.com", ApplicationStatus::Contacted),
        record_named("Alice Smith", "alice@example.com", ApplicationStatus::Contacted),
    ];
    let filter = ApplicationFilter::new(
        StatusFilter::Only(ApplicationStatus::Contacted),
        SearchText::new("JO"),
    );
    let kept: Vec<String> = filter
        .apply(records)
        .iter()
        .map(|r| r.full_name().to_owned())
        .collect();
    assert_eq!(kept, vec!["Joan Park".to_owned()]);
}

#[rstest]
fn search_covers_role() {
    let records = vec![record_named("Sam Lee", "sam@example.com", ApplicationStatus::New)];
    let filter = ApplicationFilter::new(StatusFilter::All, SearchText::new("VOLUN"));
    assert_eq!(filter.apply(records).len(), 1);
}

#[rstest]
fn legacy_status_names_filter_on_canonical_state() {
    let filter: StatusFilter<ApplicationStatus> = "review".parse().expect("legacy name");
    assert_eq!(filter, StatusFilter::Only(ApplicationStatus::Reviewing));
}
