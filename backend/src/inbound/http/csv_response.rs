//! CSV attachment responses for admin exports.

use actix_web::HttpResponse;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use chrono::NaiveDate;

use crate::domain::ExportKind;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Wrap an export body as a dated attachment.
pub(crate) fn csv_attachment(kind: ExportKind, day: NaiveDate, body: String) -> HttpResponse {
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(kind.file_name(day))],
    };
    HttpResponse::Ok()
        .content_type(CSV_CONTENT_TYPE)
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .insert_header(disposition)
        .body(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn attachment_is_named_after_the_day() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).expect("date");
        let res = csv_attachment(ExportKind::Donors, day, "id\r\n".to_owned());
        let disposition = res
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .expect("disposition");
        assert_eq!(disposition, "attachment; filename=\"donors-2025-03-01.csv\"");
        assert_eq!(
            res.headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some(CSV_CONTENT_TYPE)
        );
    }
}
