use crate::{
    event::{CrossSection, Event},
    histogram::Histogram1D,
};

/// How the run driver reacts to a failed event request
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Severity {
    /// Skip the event and continue
    Skip,
    /// The source has no more events, stop early
    EndOfInput,
    /// Abort the run
    Fatal,
}

/// Classification of event source errors
pub trait Classify {
    fn severity(&self) -> Severity;

    /// Whether the failure only affects the current event
    fn is_transient(&self) -> bool {
        self.severity() == Severity::Skip
    }
}

impl Classify for std::convert::Infallible {
    fn severity(&self) -> Severity {
        match *self {}
    }
}

/// A source of collision events under a fixed configuration
pub trait EventSource {
    type Error: Classify;

    /// Produce the next event
    ///
    /// A valid event without any final-state particles is not an error.
    fn next_event(&mut self) -> Result<Event, Self::Error>;

    /// Current estimate of the generated cross section
    fn sigma_gen(&self) -> CrossSection;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    type Error = S::Error;

    fn next_event(&mut self) -> Result<Event, Self::Error> {
        (**self).next_event()
    }

    fn sigma_gen(&self) -> CrossSection {
        (**self).sigma_gen()
    }
}

/// Final destination of a histogram
///
/// Consumed on writing, so the histogram is persisted at most once.
pub trait WriteHistogram {
    type Error;

    fn write(self, hist: &Histogram1D) -> Result<(), Self::Error>;
}

pub trait Progress {
    fn inc(&self, i: u64);
    fn finish(&self);
}
