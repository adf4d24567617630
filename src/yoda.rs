use std::io::{self, Write};

use crate::histogram::{Bin, Histogram1D};

const HISTO1D_TAG: &str = "YODA_HISTO1D_V2";

/// Write `hist` as a YODA `Histo1D` block
///
/// The block can be read by the YODA library and the Rivet tool chain.
pub fn write_histo1d<W: Write>(
    mut out: W,
    hist: &Histogram1D,
) -> io::Result<()> {
    let path = format!("/{}", hist.name());
    let total = hist.total();
    writeln!(out, "BEGIN {HISTO1D_TAG} {path}")?;
    writeln!(out, "Path: {path}")?;
    writeln!(out, "ScaledBy: 1")?;
    writeln!(out, "Title: {}", hist.title())?;
    writeln!(out, "Type: Histo1D")?;
    writeln!(out, "---")?;
    writeln!(out, "# Mean: {}", sci(total.sumwx / total.sumw))?;
    writeln!(out, "# Area: {}", sci(total.sumw))?;
    writeln!(out, "# ID\t ID\t sumw\t sumw2\t sumwx\t sumwx2\t numEntries")?;
    write_bin(&mut out, "Total   \tTotal   ", &total)?;
    write_bin(&mut out, "Underflow\tUnderflow", hist.underflow())?;
    write_bin(&mut out, "Overflow\tOverflow", hist.overflow())?;
    writeln!(out, "# xlow\t xhigh\t sumw\t sumw2\t sumwx\t sumwx2\t numEntries")?;
    for (idx, bin) in hist.bins().iter().enumerate() {
        let (low, high) = hist.bin_edges(idx);
        let edges = format!("{}\t{}", sci(low), sci(high));
        write_bin(&mut out, &edges, bin)?;
    }
    writeln!(out, "END {HISTO1D_TAG}")?;
    writeln!(out)
}

fn write_bin<W: Write>(out: &mut W, label: &str, bin: &Bin) -> io::Result<()> {
    writeln!(
        out,
        "{label}\t{}\t{}\t{}\t{}\t{}",
        sci(bin.sumw),
        sci(bin.sumw2),
        sci(bin.sumwx),
        sci(bin.sumwx2),
        sci(bin.entries as f64),
    )
}

// C-style `%e` formatting, e.g. `1.250000e+02`
fn sci(x: f64) -> String {
    if !x.is_finite() {
        return if x.is_nan() {
            "nan".to_owned()
        } else if x > 0. {
            "inf".to_owned()
        } else {
            "-inf".to_owned()
        };
    }
    let formatted = format!("{x:.6e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tst_sci() {
        assert_eq!(sci(0.), "0.000000e+00");
        assert_eq!(sci(125.), "1.250000e+02");
        assert_eq!(sci(-0.00123), "-1.230000e-03");
        assert_eq!(sci(1e100), "1.000000e+100");
        assert_eq!(sci(f64::NAN), "nan");
    }

    #[test]
    fn tst_write() {
        let mut hist = Histogram1D::new("Jet pT", "N(p_{T})", 2, 0., 2.);
        hist.fill(0.5, 2.);
        hist.fill(3., 1.);
        let mut buf = Vec::new();
        write_histo1d(&mut buf, &hist).unwrap();
        let yoda = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = yoda.lines().collect();
        assert_eq!(lines[0], "BEGIN YODA_HISTO1D_V2 /Jet pT");
        assert_eq!(lines[3], "Title: N(p_{T})");
        assert!(yoda.contains(
            "Total   \tTotal   \t3.000000e+00\t5.000000e+00\t4.000000e+00\t9.500000e+00\t2.000000e+00\n"
        ));
        assert!(yoda.contains(
            "0.000000e+00\t1.000000e+00\t2.000000e+00\t4.000000e+00\t1.000000e+00\t5.000000e-01\t1.000000e+00\n"
        ));
        assert!(yoda.contains(
            "1.000000e+00\t2.000000e+00\t0.000000e+00\t0.000000e+00\t0.000000e+00\t0.000000e+00\t0.000000e+00\n"
        ));
        assert!(yoda.ends_with("END YODA_HISTO1D_V2\n\n"));
    }
}
