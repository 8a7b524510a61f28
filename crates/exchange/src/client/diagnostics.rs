//! Per-lookup attempt tracking for diagnostics.

use std::time::Duration;

use crate::errors::RetryClass;

/// Record of a single attempt during a lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptRecord {
    pub number: u32,
    pub class: Option<RetryClass>,
    pub error: Option<String>,
    /// Wait scheduled before the next attempt, when one was scheduled.
    pub delay_before_next: Option<Duration>,
    pub success: bool,
}

/// Detailed account of one `fetch_quote` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchReport {
    pub pair: String,
    pub source: String,
    pub attempts: Vec<AttemptRecord>,
    pub elapsed: Duration,
}

impl FetchReport {
    pub fn new(pair: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            pair: pair.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn record_success(&mut self, number: u32) {
        self.attempts.push(AttemptRecord {
            number,
            class: None,
            error: None,
            delay_before_next: None,
            success: true,
        });
    }

    pub fn record_failure(
        &mut self,
        number: u32,
        class: RetryClass,
        error: String,
        delay_before_next: Option<Duration>,
    ) {
        self.attempts.push(AttemptRecord {
            number,
            class: Some(class),
            error: Some(error),
            delay_before_next,
            success: false,
        });
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempts.len() as u32
    }

    /// Check if the final attempt succeeded.
    pub fn has_success(&self) -> bool {
        self.attempts.iter().any(|a| a.success)
    }

    /// Total time spent sleeping between attempts.
    pub fn total_delay(&self) -> Duration {
        self.attempts
            .iter()
            .filter_map(|a| a.delay_before_next)
            .sum()
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        let attempts = self
            .attempts
            .iter()
            .map(|a| {
                if a.success {
                    format!("#{}: SUCCESS", a.number)
                } else {
                    let mut line = format!(
                        "#{}: {:?} ({})",
                        a.number,
                        a.class.unwrap_or(RetryClass::NonRetriable),
                        a.error.as_deref().unwrap_or("unknown")
                    );
                    if let Some(delay) = a.delay_before_next {
                        line.push_str(&format!(" wait {}ms", delay.as_millis()));
                    }
                    line
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ");
        format!(
            "{} via {} in {}ms: {}",
            self.pair,
            self.source,
            self.elapsed.as_millis(),
            if attempts.is_empty() { "no attempts" } else { attempts.as_str() }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary() {
        let mut report = FetchReport::new("EUR/USD", "HNB");
        report.record_failure(
            1,
            RetryClass::Retriable,
            "HTTP 503: busy".to_string(),
            Some(Duration::from_millis(500)),
        );
        report.record_success(2);
        report.elapsed = Duration::from_millis(620);

        let summary = report.summary();
        assert_eq!(
            summary,
            "EUR/USD via HNB in 620ms: #1: Retriable (HTTP 503: busy) wait 500ms -> #2: SUCCESS"
        );
        assert!(report.has_success());
        assert_eq!(report.attempt_count(), 2);
        assert_eq!(report.total_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_empty_report() {
        let report = FetchReport::new("EUR/EUR", "IDENTITY");
        assert!(!report.has_success());
        assert!(report.summary().ends_with("no attempts"));
    }
}
