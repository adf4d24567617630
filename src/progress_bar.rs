pub use crate::traits::Progress;

impl Progress for indicatif::ProgressBar {
    fn inc(&self, i: u64) {
        indicatif::ProgressBar::inc(self, i)
    }

    fn finish(&self) {
        indicatif::ProgressBar::finish_and_clear(self)
    }
}

impl Progress for logbar::ProgressBar {
    fn inc(&self, i: u64) {
        logbar::ProgressBar::inc(self, i as usize)
    }

    fn finish(&self) {
        logbar::ProgressBar::finish(self)
    }
}

/// Progress indicator that shows nothing
#[derive(Copy, Clone, Debug, Default)]
pub struct NoProgress {}

impl Progress for NoProgress {
    fn inc(&self, _i: u64) {}

    fn finish(&self) {}
}

pub const NO_PROGRESS: NoProgress = NoProgress {};

/// Progress over the generated events
///
/// Uses an animated bar on an interactive terminal and a plain log bar
/// otherwise. Nothing is shown unless the maximum log level is exactly
/// `info`: at lower verbosity the user asked for quiet, at higher
/// verbosity the bar would interleave with log output.
pub struct ProgressBar {
    bar: Box<dyn Progress>,
    restore_level: Option<log::LevelFilter>,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            bar: Box::new(NO_PROGRESS),
            restore_level: None,
        }
    }
}

impl Progress for ProgressBar {
    fn inc(&self, i: u64) {
        self.bar.inc(i);
    }

    fn finish(&self) {
        self.bar.finish();
        if let Some(level) = self.restore_level {
            log::set_max_level(level);
        }
    }
}

impl ProgressBar {
    pub fn new(len: u64, message: &str) -> Self {
        if len == 0 || log::max_level() != log::LevelFilter::Info {
            ProgressBar::default()
        } else if console::Term::stderr().features().is_attended() {
            ProgressBar::indicatif(len, message)
        } else {
            ProgressBar::logbar(len, message)
        }
    }

    fn indicatif(len: u64, message: &str) -> Self {
        let bar = indicatif::ProgressBar::new(len);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{bar:60.cyan/cyan} {msg} {pos}/{len} [{elapsed}]")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_owned());
        Self::silence_logging(Box::new(bar))
    }

    fn logbar(len: u64, message: &str) -> Self {
        let style = logbar::Style::new().indicator('█');
        eprintln!("{message}");
        let bar = logbar::ProgressBar::with_style(len as usize, style);
        Self::silence_logging(Box::new(bar))
    }

    // logging would tear the bar apart, so mute it until `finish`
    fn silence_logging(bar: Box<dyn Progress>) -> Self {
        let restore_level = Some(log::max_level());
        log::set_max_level(log::LevelFilter::Off);
        Self { bar, restore_level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tst_no_progress() {
        let bar = ProgressBar::new(0, "nothing to do");
        bar.inc(1);
        bar.finish();
    }
}
