use indicatif::{ProgressBar, ProgressBarIter, ProgressIterator, ProgressStyle};

/// Wraps `iter` in a progress bar of `total` steps labelled with `unit`.
///
/// Items pass through unchanged. With `enabled` set to `false` the bar is
/// hidden and nothing is drawn.
pub fn progress<I: Iterator>(iter: I, total: u64, unit: &str, enabled: bool) -> ProgressBarIter<I> {
    let pb = if enabled {
        ProgressBar::new(total)
    } else {
        ProgressBar::hidden()
    };

    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(unit.to_string());

    iter.progress_with(pb)
}
