//! Read views over the stored rows: the user dashboard and the expiry report.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::{Package, SheetRow, DATE_FORMAT, SHEET_HEADERS};
use crate::registry::expiry::{ExpiryStatus, StatusClass};

pub const EMPTY_STORE_MESSAGE: &str = "Belum ada data user terdaftar.";

const REPORT_EXTRA_HEADERS: [&str; 3] = ["Tanggal Expired", "Sisa Hari", "Status"];

/// `1234.5` -> `$1,234.50 USDT`
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents} USDT")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageStats {
    pub total: usize,
    pub monthly: usize,
    pub quarterly: usize,
    pub lifetime: usize,
}

impl PackageStats {
    pub fn from_rows(rows: &[SheetRow]) -> Self {
        let mut stats = PackageStats {
            total: rows.len(),
            ..Default::default()
        };
        for row in rows {
            match row.parsed_package() {
                Some(Package::Monthly) => stats.monthly += 1,
                Some(Package::Quarterly) => stats.quarterly += 1,
                Some(Package::Lifetime) => stats.lifetime += 1,
                None => {}
            }
        }
        stats
    }
}

/// Package selection plus case-insensitive name search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilter {
    pub packages: Vec<Package>,
    pub search: Option<String>,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            packages: Package::ALL.to_vec(),
            search: None,
        }
    }
}

impl UserFilter {
    /// Rows whose package is not one of the selected packages never match.
    pub fn matches(&self, row: &SheetRow) -> bool {
        let package_ok = row
            .parsed_package()
            .is_some_and(|p| self.packages.contains(&p));
        if !package_ok {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => row
                .user_name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }

    pub fn apply<'a>(&self, rows: &'a [SheetRow]) -> Vec<&'a SheetRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardEntry {
    #[serde(flatten)]
    pub row: SheetRow,
    pub price_display: String,
}

impl DashboardEntry {
    pub fn new(row: SheetRow) -> Self {
        let price_display = match row.price() {
            Some(price) => format_currency(price),
            None => row.price_usdt.clone(),
        };
        Self { row, price_display }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: PackageStats,
    pub showing: usize,
    pub users: Vec<DashboardEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Dashboard {
    /// Statistics cover every stored row, the listing only the filtered ones.
    pub fn build(rows: &[SheetRow], filter: &UserFilter) -> Self {
        let users: Vec<DashboardEntry> = filter
            .apply(rows)
            .into_iter()
            .cloned()
            .map(DashboardEntry::new)
            .collect();
        Self {
            stats: PackageStats::from_rows(rows),
            showing: users.len(),
            users,
            message: rows.is_empty().then(|| EMPTY_STORE_MESSAGE.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    #[serde(flatten)]
    pub row: SheetRow,
    #[serde(flatten)]
    pub expiry: ExpiryStatus,
    pub indicator: &'static str,
}

/// Rows with their derived expiry status, most urgent first.
///
/// Rows with equal sort keys keep their store order.
pub fn build_expiry_report(
    rows: &[SheetRow],
    now: NaiveDateTime,
    status: Option<StatusClass>,
) -> Vec<ReportEntry> {
    let mut entries: Vec<ReportEntry> = rows
        .iter()
        .map(|row| {
            let expiry = ExpiryStatus::evaluate(&row.start_date, &row.package, now);
            ReportEntry {
                row: row.clone(),
                indicator: expiry.status.indicator(),
                expiry,
            }
        })
        .filter(|entry| status.map_or(true, |s| entry.expiry.status == s))
        .collect();
    entries.sort_by_key(|entry| entry.expiry.sort_key());
    entries
}

pub fn export_file_name(prefix: &str, today: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, today.format("%Y%m%d"))
}

pub fn users_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a SheetRow>,
{
    let mut out = String::new();
    write_record(&mut out, SHEET_HEADERS);
    for row in rows {
        write_record(&mut out, row.values());
    }
    out
}

pub fn report_csv(entries: &[ReportEntry]) -> String {
    let mut out = String::new();
    write_record(&mut out, SHEET_HEADERS.iter().chain(&REPORT_EXTRA_HEADERS));
    for entry in entries {
        let expiry_date = entry
            .expiry
            .expiry_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        let days = entry
            .expiry
            .days_remaining
            .map(|d| d.to_string())
            .unwrap_or_default();
        let extra = [
            expiry_date.as_str(),
            days.as_str(),
            entry.expiry.status.label(),
        ];
        write_record(&mut out, entry.row.values().into_iter().chain(extra));
    }
    out
}

fn write_record<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let field = field.as_ref();
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, package: &str, start: &str) -> SheetRow {
        SheetRow {
            timestamp: "2025-01-01 10:00:00".to_string(),
            user_name: name.to_string(),
            chat_user_id: "1".to_string(),
            package: package.to_string(),
            price_usdt: "1250.00".to_string(),
            start_date: start.to_string(),
            network: "Polygon".to_string(),
            tx_hash: "0x1".to_string(),
            ..Default::default()
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00 USDT");
        assert_eq!(format_currency(49.5), "$49.50 USDT");
        assert_eq!(format_currency(1234.5), "$1,234.50 USDT");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00 USDT");
        assert_eq!(format_currency(999.999), "$1,000.00 USDT");
    }

    #[test]
    fn test_stats_count_every_row() {
        let rows = vec![
            row("a", "Monthly", "2025-01-01"),
            row("b", "Monthly", "2025-01-01"),
            row("c", "Lifetime", "2025-01-01"),
            row("d", "Weekly", "2025-01-01"),
        ];
        let stats = PackageStats::from_rows(&rows);
        assert_eq!(
            stats,
            PackageStats {
                total: 4,
                monthly: 2,
                quarterly: 0,
                lifetime: 1,
            }
        );
    }

    #[test]
    fn test_hand_edited_package_names_still_count() {
        let rows = vec![
            row("a", "monthly ", "2025-01-01"),
            row("b", "LIFETIME", "2025-01-01"),
        ];
        let stats = PackageStats::from_rows(&rows);
        assert_eq!((stats.monthly, stats.lifetime), (1, 1));

        let report = build_expiry_report(&rows, now(), None);
        assert_eq!(report[0].expiry.status, StatusClass::Expired);
        assert_eq!(report[1].expiry.status, StatusClass::Lifetime);
    }

    #[test]
    fn test_filter_by_package_and_search() {
        let rows = vec![
            row("John Doe", "Monthly", "2025-01-01"),
            row("Jane", "Quarterly", "2025-01-01"),
            row("johnny", "Lifetime", "2025-01-01"),
            row("John Weekly", "Weekly", "2025-01-01"),
        ];

        let all = UserFilter::default().apply(&rows);
        assert_eq!(all.len(), 3);

        let filter = UserFilter {
            packages: vec![Package::Monthly, Package::Lifetime],
            search: Some("JOHN".to_string()),
        };
        let names: Vec<&str> = filter
            .apply(&rows)
            .iter()
            .map(|r| r.user_name.as_str())
            .collect();
        assert_eq!(names, vec!["John Doe", "johnny"]);
    }

    #[test]
    fn test_dashboard_on_empty_store() {
        let dashboard = Dashboard::build(&[], &UserFilter::default());
        assert_eq!(dashboard.showing, 0);
        assert_eq!(dashboard.message.as_deref(), Some(EMPTY_STORE_MESSAGE));
    }

    #[test]
    fn test_dashboard_formats_price() {
        let rows = vec![row("a", "Monthly", "2025-01-01")];
        let dashboard = Dashboard::build(&rows, &UserFilter::default());
        assert_eq!(dashboard.users[0].price_display, "$1,250.00 USDT");
        assert!(dashboard.message.is_none());
    }

    #[test]
    fn test_report_orders_by_urgency() {
        let rows = vec![
            row("lifetime", "Lifetime", "2024-01-01"),
            row("stale", "Monthly", "2024-10-01"),
            row("active", "Quarterly", "2025-01-01"),
            row("broken", "Monthly", "not a date"),
            row("recent", "Monthly", "2025-01-01"),
            row("soon", "Monthly", "2025-01-10"),
        ];
        let report = build_expiry_report(&rows, now(), None);
        let names: Vec<&str> = report.iter().map(|e| e.row.user_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["soon", "active", "recent", "stale", "lifetime", "broken"]
        );
        assert_eq!(report[0].expiry.status, StatusClass::ExpiringSoon);
        assert_eq!(report[0].indicator, "🟠");
        assert_eq!(report[5].expiry.status, StatusClass::Unknown);
    }

    #[test]
    fn test_report_keeps_far_future_start_ahead_of_expired() {
        let rows = vec![
            row("expired", "Monthly", "2025-01-01"),
            row("future_active", "Monthly", "2055-01-01"),
            row("lifetime", "Lifetime", "2025-01-01"),
        ];
        let report = build_expiry_report(&rows, now(), None);
        let names: Vec<&str> = report.iter().map(|e| e.row.user_name.as_str()).collect();
        assert_eq!(names, vec!["future_active", "expired", "lifetime"]);
        assert_eq!(report[0].expiry.status, StatusClass::Active);
        assert_eq!(report[0].expiry.days_remaining, Some(10952));
        assert_eq!(report[1].expiry.days_remaining, Some(-5));
    }

    #[test]
    fn test_report_status_filter() {
        let rows = vec![
            row("recent", "Monthly", "2025-01-01"),
            row("active", "Quarterly", "2025-01-01"),
        ];
        let report = build_expiry_report(&rows, now(), Some(StatusClass::Expired));
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].row.user_name, "recent");
        assert_eq!(report[0].expiry.days_remaining, Some(-5));
    }

    #[test]
    fn test_users_csv_quotes_fields() {
        let mut r = row("Doe, John", "Monthly", "2025-01-01");
        r.chat_link = "say \"hi\"".to_string();
        let csv = users_csv([&r]);
        let mut lines = csv.split("\r\n");
        assert_eq!(lines.next(), Some(SHEET_HEADERS.join(",").as_str()));
        let body = lines.next().unwrap();
        assert!(body.contains("\"Doe, John\""));
        assert!(body.contains("\"say \"\"hi\"\"\""));
    }

    #[test]
    fn test_report_csv_appends_expiry_columns() {
        let rows = vec![row("recent", "Monthly", "2025-01-01")];
        let report = build_expiry_report(&rows, now(), None);
        let csv = report_csv(&report);
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[0].ends_with("Tanggal Expired,Sisa Hari,Status"));
        assert!(lines[1].ends_with("2025-01-31,-5,Expired"));
    }

    #[test]
    fn test_export_file_name() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(
            export_file_name("luxquant_users", today),
            "luxquant_users_20250309.csv"
        );
    }
}
