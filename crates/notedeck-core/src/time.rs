use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub fn now_utc_rfc3339() -> Result<String, time::error::Format> {
    OffsetDateTime::now_utc().format(&Rfc3339)
}

/// Calendar date of an RFC3339 stamp, for listings. Unparseable stamps are shown as-is.
pub fn display_date(stamp: &str) -> String {
    match OffsetDateTime::parse(stamp, &Rfc3339) {
        Ok(value) => value.date().to_string(),
        Err(_) => stamp.to_string(),
    }
}
