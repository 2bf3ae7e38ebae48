use indicatif::ProgressStyle;
use maki_common::progress::ProgressReporter;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

const BAR_TEMPLATE: &str = "{spinner:.blue} [{bar:40.green/bright_black}] {percent:>3}% ({pos}/{len}) {msg}";

/// Drives the progress bar attached to a scan span.
pub struct SpanProgress {
    span: Span,
}

impl SpanProgress {
    pub fn new(span: Span) -> Self {
        Self { span }
    }
}

impl ProgressReporter for SpanProgress {
    fn start(&self, total: usize) {
        let style: ProgressStyle = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█░");
        self.span.pb_set_style(&style);
        self.span.pb_set_length(total as u64);
        self.span.pb_set_position(0);
    }

    fn advance(&self, completed: usize, _total: usize) {
        self.span.pb_set_position(completed as u64);
    }
}
