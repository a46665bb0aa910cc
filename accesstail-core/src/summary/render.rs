use crate::summary::table::SummaryTable;
use chrono::{DateTime, Local};

pub const TITLE: &str = "Access Log Summary";
pub const COLUMNS: [&str; 4] = [
    "total_requests",
    "2xx_requests",
    "non_2xx_requests",
    "avg_duration_s",
];

const HOST_HEADER: &str = "Host";
const HOST_PADDING: usize = 2;
const COLUMN_GAP: &str = "  ";

impl SummaryTable {
    /// Render the table as a fixed-width report.
    ///
    /// The host column is as wide as the longest host (or the header) plus two
    /// spaces; numeric columns are right-aligned under their headers. An empty
    /// table still gets the banner and header.
    pub fn format(&self, generated_at: DateTime<Local>) -> String {
        let rows = self.sorted();
        let host_width = host_column_width(rows.iter().map(|(host, _)| *host));
        let [w_total, w_ok, w_non, w_avg] = COLUMNS.map(str::len);

        let mut out = String::new();

        out.push_str(&format!(
            "{TITLE} (generated {})\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!(
            "{HOST_HEADER:<host_width$}{}\n",
            COLUMNS.join(COLUMN_GAP)
        ));

        let rule_width = host_width + COLUMNS.iter().map(|c| c.len()).sum::<usize>()
            + COLUMN_GAP.len() * (COLUMNS.len() - 1);
        out.push_str(&"-".repeat(rule_width));
        out.push('\n');

        for (host, s) in rows {
            out.push_str(&format!(
                "{host:<host_width$}{:>w_total$}{COLUMN_GAP}{:>w_ok$}{COLUMN_GAP}{:>w_non$}{COLUMN_GAP}{:>w_avg$.3}\n",
                s.request_total,
                s.request_2xx,
                s.non_2xx(),
                s.avg_duration(),
            ));
        }

        out
    }
}

fn host_column_width<'a>(hosts: impl Iterator<Item = &'a str>) -> usize {
    hosts
        .map(str::len)
        .max()
        .unwrap_or(0)
        .max(HOST_HEADER.len())
        + HOST_PADDING
}
