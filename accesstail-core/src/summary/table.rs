use crate::record::Record;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HostSummary {
    pub request_total: u64,
    pub request_2xx: u64,
    /// Seconds, summed over every request.
    pub duration_total: f64,
}

impl HostSummary {
    pub fn record(&mut self, record: &Record) {
        self.duration_total += record.duration;
        if record.is_success() {
            self.request_2xx += 1;
        }
        self.request_total += 1;
    }

    pub fn non_2xx(&self) -> u64 {
        self.request_total - self.request_2xx
    }

    pub fn avg_duration(&self) -> f64 {
        if self.request_total == 0 {
            return 0.0;
        }
        self.duration_total / self.request_total as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct SummaryTable {
    hosts: HashMap<String, HostSummary>,
}

impl SummaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, record: &Record) {
        // Avoid allocating the key for hosts we have already seen.
        match self.hosts.get_mut(&record.host) {
            Some(summary) => summary.record(record),
            None => {
                let mut summary = HostSummary::default();
                summary.record(record);
                self.hosts.insert(record.host.clone(), summary);
            }
        }
    }

    pub fn get(&self, host: &str) -> Option<&HostSummary> {
        self.hosts.get(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Sum of `request_total` across every host.
    pub fn total_requests(&self) -> u64 {
        self.hosts.values().map(|s| s.request_total).sum()
    }

    /// Hosts in ascending order, paired with their summaries.
    pub fn sorted(&self) -> Vec<(&str, &HostSummary)> {
        let mut rows: Vec<_> = self
            .hosts
            .iter()
            .map(|(host, summary)| (host.as_str(), summary))
            .collect();
        rows.sort_by_key(|(host, _)| *host);
        rows
    }
}
