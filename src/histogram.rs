//! One-dimensional weighted histograms
use serde::{Deserialize, Serialize};

/// Accumulated statistics of a single histogram bin
#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq)]
pub struct Bin {
    /// Sum of weights
    pub sumw: f64,
    /// Sum of squared weights
    pub sumw2: f64,
    /// Sum of weight times value
    pub sumwx: f64,
    /// Sum of weight times squared value
    pub sumwx2: f64,
    /// Number of fills
    pub entries: u64,
}

impl Bin {
    fn fill(&mut self, x: f64, w: f64) {
        self.sumw += w;
        self.sumw2 += w * w;
        self.sumwx += w * x;
        self.sumwx2 += w * x * x;
        self.entries += 1;
    }
}

impl std::ops::AddAssign<&Bin> for Bin {
    fn add_assign(&mut self, rhs: &Bin) {
        self.sumw += rhs.sumw;
        self.sumw2 += rhs.sumw2;
        self.sumwx += rhs.sumwx;
        self.sumwx2 += rhs.sumwx2;
        self.entries += rhs.entries;
    }
}

/// Histogram with equidistant bins over `[low, high)`
///
/// Values below `low` are accumulated in an underflow bin, values at or
/// above `high` in an overflow bin. The binning is fixed on
/// construction.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Histogram1D {
    name: String,
    title: String,
    low: f64,
    high: f64,
    bins: Vec<Bin>,
    underflow: Bin,
    overflow: Bin,
}

impl Histogram1D {
    /// Construct an empty histogram with `nbins` bins between `low` and `high`
    ///
    /// # Panics
    ///
    /// Panics if `nbins` is zero or the range is empty.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        nbins: usize,
        low: f64,
        high: f64,
    ) -> Self {
        assert!(nbins > 0, "Histogram needs at least one bin");
        assert!(low < high, "Empty histogram range [{low}, {high})");
        Self {
            name: name.into(),
            title: title.into(),
            low,
            high,
            bins: vec![Bin::default(); nbins],
            underflow: Bin::default(),
            overflow: Bin::default(),
        }
    }

    /// Histogram of jet transverse momenta for a given minimum hard
    /// transverse momentum
    ///
    /// `1000 + pt_hat_min` bins ranging from zero to 100 GeV above the
    /// threshold.
    pub fn jet_pt(pt_hat_min: f64) -> Self {
        let nbins = 1000 + pt_hat_min.max(0.) as usize;
        Self::new("Jet pT", "N(p_{T})", nbins, 0., 100. + pt_hat_min)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lower edge of the histogram range
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper edge of the histogram range
    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn nbins(&self) -> usize {
        self.bins.len()
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn underflow(&self) -> &Bin {
        &self.underflow
    }

    pub fn overflow(&self) -> &Bin {
        &self.overflow
    }

    /// Lower and upper edge of the bin with index `idx`
    pub fn bin_edges(&self, idx: usize) -> (f64, f64) {
        let width = self.bin_width();
        (
            self.low + idx as f64 * width,
            self.low + (idx + 1) as f64 * width,
        )
    }

    pub fn bin_width(&self) -> f64 {
        (self.high - self.low) / self.nbins() as f64
    }

    /// Index of the bin containing `x`, if it lies inside the range
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        if !(x >= self.low && x < self.high) {
            return None;
        }
        let nbins = self.nbins();
        let idx = ((x - self.low) / (self.high - self.low) * nbins as f64)
            as usize;
        // guard against rounding up at the upper edge
        Some(idx.min(nbins - 1))
    }

    /// Add `x` with weight `w`
    ///
    /// Out-of-range values end up in the under- or overflow bin. NaN is
    /// ignored.
    pub fn fill(&mut self, x: f64, w: f64) {
        if x.is_nan() {
            return;
        }
        if let Some(idx) = self.find_bin(x) {
            self.bins[idx].fill(x, w);
        } else if x < self.low {
            self.underflow.fill(x, w);
        } else {
            self.overflow.fill(x, w);
        }
    }

    /// Sum of weights in the bin containing `x`
    pub fn content_at(&self, x: f64) -> f64 {
        self.find_bin(x).map(|idx| self.bins[idx].sumw).unwrap_or_default()
    }

    /// Sum of weights inside the histogram range
    pub fn integral(&self) -> f64 {
        self.bins.iter().map(|b| b.sumw).sum()
    }

    /// Statistics of all fills, including under- and overflow
    pub fn total(&self) -> Bin {
        let mut total = self.underflow;
        total += &self.overflow;
        for bin in &self.bins {
            total += bin;
        }
        total
    }

    /// Number of fills, including under- and overflow
    pub fn entries(&self) -> u64 {
        self.total().entries
    }

    /// Weighted mean of all values inside the histogram range
    ///
    /// Returns NaN for an empty histogram.
    pub fn mean(&self) -> f64 {
        let (sumwx, sumw) = self
            .bins
            .iter()
            .fold((0., 0.), |(sx, s), b| (sx + b.sumwx, s + b.sumw));
        sumwx / sumw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tst_fill() {
        let mut hist = Histogram1D::new("h", "test", 10, 0., 10.);
        hist.fill(0., 1.);
        hist.fill(9.99, 2.);
        hist.fill(3.5, 0.5);
        hist.fill(3.2, 0.5);
        assert_eq!(hist.bins()[0].sumw, 1.);
        assert_eq!(hist.bins()[9].sumw, 2.);
        assert_eq!(hist.bins()[3].sumw, 1.);
        assert_eq!(hist.bins()[3].entries, 2);
        assert_eq!(hist.bins()[3].sumw2, 0.5);
        assert_eq!(hist.integral(), 4.);
        assert_eq!(hist.entries(), 4);
    }

    #[test]
    fn tst_flow() {
        let mut hist = Histogram1D::new("h", "test", 10, 0., 10.);
        hist.fill(-1., 1.);
        hist.fill(10., 3.);
        hist.fill(1e9, 1.);
        hist.fill(f64::NAN, 1.);
        assert_eq!(hist.integral(), 0.);
        assert_eq!(hist.underflow().sumw, 1.);
        assert_eq!(hist.overflow().sumw, 4.);
        assert_eq!(hist.overflow().entries, 2);
        assert_eq!(hist.entries(), 3);
        assert_eq!(hist.total().sumw, 5.);
    }

    #[test]
    fn tst_edges() {
        let hist = Histogram1D::jet_pt(25.);
        assert_eq!(hist.nbins(), 1025);
        assert_eq!(hist.high(), 125.);
        assert_eq!(hist.find_bin(0.), Some(0));
        assert_eq!(hist.find_bin(125.), None);
        assert_eq!(hist.find_bin(124.999999), Some(1024));
        let idx = hist.find_bin(30.05).unwrap();
        let (low, high) = hist.bin_edges(idx);
        assert!(low < 30.05 && 30.05 < high);
    }

    #[test]
    fn tst_mean() {
        let mut hist = Histogram1D::new("h", "test", 4, 0., 4.);
        assert!(hist.mean().is_nan());
        hist.fill(1., 1.);
        hist.fill(3., 3.);
        assert_eq!(hist.mean(), 2.5);
        assert_eq!(hist.content_at(3.5), 3.);
        assert_eq!(hist.content_at(-3.), 0.);
    }

    #[test]
    #[should_panic]
    fn tst_empty_range() {
        Histogram1D::new("h", "test", 4, 1., 1.);
    }
}
