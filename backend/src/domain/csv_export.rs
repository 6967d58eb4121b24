//! CSV exports for the back office.
//!
//! Each export has a fixed header row followed by one row per record. Fields
//! are quoted by the `csv` writer whenever they contain separators, quotes or
//! line breaks, and rows end with CRLF. Free-text cells that a spreadsheet
//! would evaluate as a formula are prefixed with `'`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::applications::ApplicationRecord;
use super::donations::{DonationListing, DonorRecord};
use super::Error;

pub const APPLICATION_HEADERS: [&str; 16] = [
    "id",
    "created_at",
    "updated_at",
    "status",
    "full_name",
    "email",
    "phone",
    "location",
    "role",
    "position",
    "veteran_status",
    "willing_to_relocate",
    "desired_start_date",
    "profile_url",
    "cover_note",
    "internal_notes",
];

pub const DONATION_HEADERS: [&str; 8] = [
    "id",
    "created_at",
    "status",
    "amount",
    "cadence",
    "donor_name",
    "donor_email",
    "campaign_id",
];

pub const DONOR_HEADERS: [&str; 4] = ["id", "created_at", "full_name", "email"];

/// Failure while encoding an export.
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("failed to write csv row: {0}")]
    Write(#[from] csv::Error),
    #[error("failed to flush csv output: {0}")]
    Flush(String),
    #[error("csv output was not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl From<CsvExportError> for Error {
    fn from(value: CsvExportError) -> Self {
        Error::internal(value.to_string())
    }
}

/// Export kinds, used for file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Applications,
    Donations,
    Donors,
}

impl ExportKind {
    /// `applications-2025-03-01.csv` style attachment name.
    pub fn file_name(self, day: NaiveDate) -> String {
        let prefix = match self {
            Self::Applications => "applications",
            Self::Donations => "donations",
            Self::Donors => "donors",
        };
        format!("{prefix}-{}.csv", day.format("%Y-%m-%d"))
    }
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Neutralise spreadsheet formulas in user-supplied text.
fn text_cell(value: &str) -> String {
    match value.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{value}"),
        _ => value.to_owned(),
    }
}

fn write_rows<const N: usize>(
    headers: [&str; N],
    rows: impl Iterator<Item = [String; N]>,
) -> Result<String, CsvExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| CsvExportError::Flush(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Applications export.
pub fn applications_csv(records: &[ApplicationRecord]) -> Result<String, CsvExportError> {
    write_rows(
        APPLICATION_HEADERS,
        records.iter().map(|record| {
            let details = record.details();
            [
                record.id().to_string(),
                timestamp(record.created_at()),
                timestamp(record.updated_at()),
                record.status().to_string(),
                text_cell(&details.full_name),
                text_cell(details.email.as_str()),
                text_cell(&details.phone),
                text_cell(&details.location),
                details.role.to_string(),
                text_cell(details.position.as_deref().unwrap_or_default()),
                details
                    .veteran_status
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                details
                    .willing_to_relocate
                    .map(|b| b.to_string())
                    .unwrap_or_default(),
                details
                    .desired_start_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                details
                    .profile_url
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                text_cell(details.cover_note.as_deref().unwrap_or_default()),
                text_cell(record.internal_notes().unwrap_or_default()),
            ]
        }),
    )
}

/// Donations export, one row per donation with its donor inlined.
pub fn donations_csv(listings: &[DonationListing]) -> Result<String, CsvExportError> {
    write_rows(
        DONATION_HEADERS,
        listings.iter().map(|listing| {
            let donation = &listing.donation;
            let (name, email) = listing
                .donor
                .as_ref()
                .map(|d| (text_cell(&d.full_name), text_cell(d.email.as_str())))
                .unwrap_or_default();
            [
                donation.id.to_string(),
                timestamp(donation.created_at),
                donation.status.to_string(),
                donation.amount.to_string(),
                donation.cadence.to_string(),
                name,
                email,
                donation
                    .campaign_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            ]
        }),
    )
}

/// Donors export.
pub fn donors_csv(donors: &[DonorRecord]) -> Result<String, CsvExportError> {
    write_rows(
        DONOR_HEADERS,
        donors.iter().map(|donor| {
            [
                donor.id.to_string(),
                timestamp(donor.created_at),
                text_cell(&donor.full_name),
                text_cell(donor.email.as_str()),
            ]
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DonorId, EmailAddress};
    use chrono::TimeZone;
    use rstest::rstest;
    use uuid::Uuid;

    fn donor(name: &str) -> DonorRecord {
        DonorRecord {
            id: DonorId::from_uuid(Uuid::nil()),
            full_name: name.to_owned(),
            email: EmailAddress::parse("pat@example.com").expect("valid email"),
            created_at: Utc
                .with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    fn quotes_embedded_separators() {
        let csv = donors_csv(&[donor("Kim, Pat \"PK\"\nJr.")]).expect("export");
        insta::assert_snapshot!(csv.replace("\r\n", "\n"), @r#"
        id,created_at,full_name,email
        00000000-0000-0000-0000-000000000000,2025-01-02T03:04:05Z,"Kim, Pat ""PK""
        Jr.",pat@example.com
        "#);
    }

    #[rstest]
    fn empty_export_still_has_headers() {
        let csv = applications_csv(&[]).expect("export");
        assert_eq!(csv, format!("{}\r\n", APPLICATION_HEADERS.join(",")));
    }

    #[rstest]
    fn rows_round_trip_through_a_reader() {
        let exported = donors_csv(&[donor("Kim, Pat"), donor("Lee\nSam")]).expect("export");
        let mut reader = csv::Reader::from_reader(exported.as_bytes());
        let names: Vec<String> = reader
            .records()
            .map(|row| row.expect("row parses")[2].to_owned())
            .collect();
        assert_eq!(names, vec!["Kim, Pat".to_owned(), "Lee\nSam".to_owned()]);
    }

    #[rstest]
    #[case("=HYPERLINK(\"http://evil.example\")", "'=HYPERLINK(\"http://evil.example\")")]
    #[case("+1+1", "'+1+1")]
    #[case("-2", "'-2")]
    #[case("@SUM(A1)", "'@SUM(A1)")]
    #[case("Pat Kim", "Pat Kim")]
    fn formula_like_names_are_neutralised(#[case] name: &str, #[case] expected: &str) {
        let exported = donors_csv(&[donor(name)]).expect("export");
        let mut reader = csv::Reader::from_reader(exported.as_bytes());
        let row = reader
            .records()
            .next()
            .expect("one row")
            .expect("row parses");
        assert_eq!(&row[2], expected);
    }

    #[rstest]
    #[case(ExportKind::Applications, "applications-2025-03-01.csv")]
    #[case(ExportKind::Donors, "donors-2025-03-01.csv")]
    fn file_names_carry_the_day(#[case] kind: ExportKind, #[case] expected: &str) {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
        assert_eq!(kind.file_name(day), expected);
    }
}
