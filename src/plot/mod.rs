//! Gnuplot script and data-file generation
//!
//! Estimation runs are inspected offline: the tools write plain data files
//! plus matching gnuplot scripts, and an EPS render is handed to an
//! external formatter for conversion to PDF.

pub mod formatter;

pub use formatter::{format_to_pdf, FORMATTER_ENV};

use crate::types::SkypolError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write row-major `values` as a whitespace-separated matrix, one image
/// row per line. Gnuplot reads this with `matrix with image`.
///
/// # Errors
/// Returns `InvalidImage` if `values` does not match `dims`.
pub fn write_matrix_dat<W: Write>(
    writer: &mut W,
    dims: (u32, u32),
    values: &[f64],
) -> Result<(), SkypolError> {
    let expected = dims.0 as usize * dims.1 as usize;
    if values.len() != expected {
        return Err(SkypolError::InvalidImage(format!(
            "{} values cannot fill a {}x{} matrix",
            values.len(),
            dims.0,
            dims.1
        )));
    }

    for row in values.chunks(dims.0 as usize) {
        let line = row
            .iter()
            .map(|value| format!("{value:.4}"))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{line}")?;
    }

    Ok(())
}

/// Write histogram bins as `center count` lines for gnuplot's `boxes`
/// style.
pub fn write_histogram_dat<W: Write>(
    writer: &mut W,
    bins: impl Iterator<Item = (f64, u32)>,
) -> Result<(), SkypolError> {
    for (center, count) in bins {
        writeln!(writer, "{center:.4} {count}")?;
    }

    Ok(())
}

/// Builds a gnuplot script rendering a matrix data file as an EPS heatmap.
pub struct HeatmapScript {
    title: String,
    data_file: PathBuf,
    output_file: PathBuf,
    dims: (u32, u32),
    color_range: (f64, f64),
    color_label: String,
}

impl HeatmapScript {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(title: &str, data_file: P, output_file: Q) -> Self {
        Self {
            title: title.to_string(),
            data_file: data_file.as_ref().to_path_buf(),
            output_file: output_file.as_ref().to_path_buf(),
            dims: (0, 0),
            color_range: (0.0, 1.0),
            color_label: String::new(),
        }
    }

    /// Pin the axis ranges to the image dimensions. Row zero renders at
    /// the top, matching sensor orientation.
    pub fn with_dims(mut self, dims: (u32, u32)) -> Self {
        self.dims = dims;
        self
    }

    pub fn with_color_range(mut self, low: f64, high: f64, label: &str) -> Self {
        self.color_range = (low, high);
        self.color_label = label.to_string();
        self
    }

    pub fn render(&self) -> String {
        let mut script = String::new();

        script.push_str("set terminal postscript eps color\n");
        script.push_str(&format!("set output '{}'\n", self.output_file.display()));
        script.push_str(&format!("set title '{}'\n", self.title));
        if self.dims != (0, 0) {
            script.push_str(&format!("set xrange [-0.5:{}]\n", f64::from(self.dims.0) - 0.5));
            script.push_str(&format!("set yrange [{}:-0.5]\n", f64::from(self.dims.1) - 0.5));
        }
        script.push_str(&format!(
            "set cbrange [{}:{}]\n",
            self.color_range.0, self.color_range.1
        ));
        if !self.color_label.is_empty() {
            script.push_str(&format!("set cblabel '{}'\n", self.color_label));
        }
        script.push_str("set view map\n");
        script.push_str(&format!(
            "plot '{}' matrix with image notitle\n",
            self.data_file.display()
        ));

        script
    }
}

/// Builds a gnuplot script rendering accumulator bins as an EPS histogram.
pub struct HistogramScript {
    title: String,
    data_file: PathBuf,
    output_file: PathBuf,
    x_range: (f64, f64),
    x_label: String,
    box_width: f64,
}

impl HistogramScript {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(title: &str, data_file: P, output_file: Q) -> Self {
        Self {
            title: title.to_string(),
            data_file: data_file.as_ref().to_path_buf(),
            output_file: output_file.as_ref().to_path_buf(),
            x_range: (-90.0, 90.0),
            x_label: "line angle (deg)".to_string(),
            box_width: 1.0,
        }
    }

    pub fn with_x_range(mut self, low: f64, high: f64, label: &str) -> Self {
        self.x_range = (low, high);
        self.x_label = label.to_string();
        self
    }

    /// Box width in x-axis units; match the accumulator resolution.
    pub fn with_box_width(mut self, width: f64) -> Self {
        self.box_width = width;
        self
    }

    pub fn render(&self) -> String {
        let mut script = String::new();

        script.push_str("set terminal postscript eps color\n");
        script.push_str(&format!("set output '{}'\n", self.output_file.display()));
        script.push_str(&format!("set title '{}'\n", self.title));
        script.push_str(&format!(
            "set xrange [{}:{}]\n",
            self.x_range.0, self.x_range.1
        ));
        script.push_str(&format!("set xlabel '{}'\n", self.x_label));
        script.push_str("set ylabel 'votes'\n");
        script.push_str(&format!("set boxwidth {}\n", self.box_width));
        script.push_str("set style fill solid\n");
        script.push_str(&format!(
            "plot '{}' using 1:2 with boxes notitle\n",
            self.data_file.display()
        ));

        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_dat_is_row_major() {
        let mut out = Vec::new();
        write_matrix_dat(&mut out, (3, 2), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "1.0000 2.0000 3.0000\n4.0000 5.0000 6.0000\n");
    }

    #[test]
    fn matrix_dat_rejects_bad_dimensions() {
        let mut out = Vec::new();
        let result = write_matrix_dat(&mut out, (3, 2), &[1.0; 5]);
        assert!(matches!(result, Err(SkypolError::InvalidImage(_))));
    }

    #[test]
    fn histogram_dat_pairs_centers_and_counts() {
        let mut out = Vec::new();
        write_histogram_dat(&mut out, [(-89.5, 3), (0.5, 10)].into_iter()).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "-89.5000 3\n0.5000 10\n");
    }

    #[test]
    fn heatmap_script_sets_ranges_and_titles() {
        let script = HeatmapScript::new("angle of polarization", "aop.dat", "aop.eps")
            .with_dims((1224, 1024))
            .with_color_range(-90.0, 90.0, "AoP (deg)")
            .render();

        assert!(script.contains("set output 'aop.eps'"));
        assert!(script.contains("set title 'angle of polarization'"));
        assert!(script.contains("set xrange [-0.5:1223.5]"));
        assert!(script.contains("set yrange [1023.5:-0.5]"));
        assert!(script.contains("set cbrange [-90:90]"));
        assert!(script.contains("plot 'aop.dat' matrix with image"));
    }

    #[test]
    fn histogram_script_sets_ranges_and_titles() {
        let script = HistogramScript::new("hough votes", "votes.dat", "votes.eps")
            .with_box_width(0.5)
            .render();

        assert!(script.contains("set output 'votes.eps'"));
        assert!(script.contains("set xrange [-90:90]"));
        assert!(script.contains("set boxwidth 0.5"));
        assert!(script.contains("with boxes"));
    }
}
