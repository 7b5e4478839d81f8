use crate::error::PlotError;
use crate::record::{PileRecord, RecordReader};
use std::error::Error;
use std::path::Path;

/// Per-position values tracked for each sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Depth,
    Splitters,
    Softs,
    Discordant,
    DiscChrom,
    Inserts1,
    Inserts2,
    Gc,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Depth,
        Metric::Splitters,
        Metric::Softs,
        Metric::Discordant,
        Metric::DiscChrom,
        Metric::Inserts1,
        Metric::Inserts2,
        Metric::Gc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Depth => "depth",
            Metric::Splitters => "splitters",
            Metric::Softs => "softs",
            Metric::Discordant => "discordant",
            Metric::DiscChrom => "discchrom",
            Metric::Inserts1 => "inserts1",
            Metric::Inserts2 => "inserts2",
            Metric::Gc => "gc",
        }
    }
}

/// Which of bigly's two GC-content windows to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GcWindow {
    Gc65,
    Gc257,
}

impl GcWindow {
    fn value(self, rec: &PileRecord) -> u32 {
        match self {
            GcWindow::Gc65 => rec.gc65,
            GcWindow::Gc257 => rec.gc257,
        }
    }
}

/// Soft-clip count, zeroed where fewer than 10% of reads are clipped.
pub fn filtered_softs(softstarts: u32, softends: u32, depth: u32) -> f64 {
    let softs = softstarts as f64 + softends as f64;
    if softs < depth as f64 / 10.0 {
        0.0
    } else {
        softs
    }
}

/// Discordant-chromosome count weighted by `1 - entropy`; too few reads give 0.
pub fn weighted_discchrom(discchrom: u32, entropy: f64) -> f64 {
    if discchrom > 2 {
        discchrom as f64 * (1.0 - entropy)
    } else {
        0.0
    }
}

/// Positions and lock-stepped metric columns for one input file.
#[derive(Debug, Clone)]
pub struct SampleSeries {
    pub name: String,
    pub xs: Vec<u32>,
    /// Chromosomes in order of first appearance.
    pub chroms: Vec<String>,
    columns: [Vec<f64>; 8],
}

impl SampleSeries {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            xs: Vec::new(),
            chroms: Vec::new(),
            columns: Default::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn values(&self, metric: Metric) -> &[f64] {
        &self.columns[metric as usize]
    }

    /// Append one record. Once two points exist, a jump of more than one base
    /// first drops every column to zero one base after the previous point and
    /// one base before this one.
    pub fn push(&mut self, rec: &PileRecord, gc: GcWindow) {
        if !self.chroms.contains(&rec.chrom) {
            self.chroms.push(rec.chrom.clone());
        }

        if self.xs.len() > 1 {
            let last = self.xs[self.xs.len() - 1];
            // saturating so a point at u32::MAX never pads
            if rec.pos > last.saturating_add(1) {
                self.xs.push(last + 1);
                self.xs.push(rec.pos - 1);
                for column in self.columns.iter_mut() {
                    column.extend([0.0, 0.0]);
                }
            }
        }

        self.xs.push(rec.pos);
        for metric in Metric::ALL {
            let value = match metric {
                Metric::Depth => rec.depth as f64,
                Metric::Splitters => rec.splitters1 as f64,
                Metric::Softs => filtered_softs(rec.softstarts, rec.softends, rec.depth),
                Metric::Discordant => rec.discordant as f64,
                Metric::DiscChrom => weighted_discchrom(rec.discchrom, rec.discchromentropy),
                Metric::Inserts1 => rec.mean_insert1 as f64,
                Metric::Inserts2 => rec.mean_insert2 as f64,
                Metric::Gc => gc.value(rec) as f64,
            };
            self.columns[metric as usize].push(value);
        }
    }

    pub fn from_records<I>(name: &str, records: I, gc: GcWindow) -> Result<Self, PlotError>
    where
        I: IntoIterator<Item = Result<PileRecord, PlotError>>,
    {
        let mut series = Self::new(name);
        for rec in records {
            series.push(&rec?, gc);
        }
        Ok(series)
    }

    /// Positions with a non-zero filtered soft-clip signal.
    pub fn soft_clip_bars(&self) -> Vec<(u32, f64)> {
        self.xs
            .iter()
            .zip(self.values(Metric::Softs))
            .filter(|(_, s)| **s > 0.0)
            .map(|(&x, &s)| (x, s))
            .collect()
    }

    pub fn max_of(&self, metric: Metric) -> f64 {
        self.values(metric).iter().cloned().fold(0.0, f64::max)
    }
}

/// Read one bigly file into a `SampleSeries`, reporting progress as it goes.
pub fn load_sample(
    path: &str,
    gc: GcWindow,
    logger: &mut crate::Logger,
) -> Result<SampleSeries, Box<dyn Error>> {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    logger.progress(&format!("[Progressing] Loading {}", name))?;
    let series = SampleSeries::from_records(&name, RecordReader::open(path)?, gc)?;
    logger.finish_progress()?;

    if series.is_empty() {
        return Err(PlotError::EmptyInput {
            path: path.to_string(),
        }
        .into());
    }

    logger.log(&format!(
        "Loaded {}: {} plotted points, positions {}-{}",
        path,
        series.len(),
        series.xs[0],
        series.xs[series.len() - 1]
    ))?;
    let maxima: Vec<String> = Metric::ALL
        .iter()
        .map(|&m| format!("{}={}", m.name(), series.max_of(m)))
        .collect();
    logger.log(&format!("Maxima {}: {}", series.name, maxima.join(" ")))?;
    if series.chroms.len() > 1 {
        logger.log(&format!(
            "Warning: {} spans {} chromosomes ({}); positions share one axis",
            path,
            series.chroms.len(),
            series.chroms.join(", ")
        ))?;
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pos: u32, depth: u32) -> PileRecord {
        PileRecord {
            chrom: "chr1".to_string(),
            pos,
            depth,
            refbase: 'A',
            mismatches: 0,
            pairs: 0,
            softstarts: 0,
            softends: 0,
            hardstarts: 0,
            hardends: 0,
            insertstarts: 0,
            insertends: 0,
            deletions: 0,
            splitters: 0,
            splitters1: 0,
            mean_insert1: 0,
            mean_insert2: 0,
            weird: 0,
            discordant: 0,
            discchrom: 0,
            discchromentropy: 0.0,
            gc65: 0,
            gc257: 0,
            duplicity65: 0.0,
            duplicity257: 0.0,
            spl: String::new(),
        }
    }

    fn build(records: Vec<PileRecord>) -> SampleSeries {
        SampleSeries::from_records("s", records.into_iter().map(Ok), GcWindow::Gc257).unwrap()
    }

    fn assert_lockstep(series: &SampleSeries) {
        for metric in Metric::ALL {
            assert_eq!(series.values(metric).len(), series.len(), "{}", metric.name());
        }
    }

    #[test]
    fn contiguous_input_keeps_one_point_per_record() {
        let series = build((100..110).map(|p| rec(p, 10)).collect());
        assert_eq!(series.len(), 10);
        assert_eq!(series.xs, (100..110).collect::<Vec<_>>());
        assert_lockstep(&series);
    }

    #[test]
    fn gap_inserts_two_zero_points() {
        let mut busy = rec(20, 7);
        busy.splitters1 = 2;
        busy.softstarts = 4;
        busy.discordant = 3;
        busy.discchrom = 5;
        busy.mean_insert1 = 300;
        busy.mean_insert2 = 310;
        busy.gc257 = 50;
        let mut before = busy.clone();
        before.pos = 11;
        let series = build(vec![rec(10, 5), before, busy]);

        assert_eq!(series.xs, vec![10, 11, 12, 19, 20]);
        assert_eq!(series.values(Metric::Depth), &[5.0, 7.0, 0.0, 0.0, 7.0]);
        for metric in Metric::ALL {
            let values = series.values(metric);
            assert_eq!(&values[2..4], &[0.0, 0.0], "{}", metric.name());
            assert!(values[4] > 0.0, "{}", metric.name());
        }
        assert_lockstep(&series);
    }

    #[test]
    fn positions_at_u32_max_do_not_overflow() {
        let series = build(vec![rec(u32::MAX - 1, 5), rec(u32::MAX, 5), rec(u32::MAX, 5)]);
        assert_eq!(series.xs, vec![u32::MAX - 1, u32::MAX, u32::MAX]);

        let series = build(vec![rec(u32::MAX - 10, 5), rec(u32::MAX - 9, 5), rec(u32::MAX, 5)]);
        assert_eq!(
            series.xs,
            vec![u32::MAX - 10, u32::MAX - 9, u32::MAX - 8, u32::MAX - 1, u32::MAX]
        );
        assert_lockstep(&series);
    }

    #[test]
    fn first_gap_is_not_padded() {
        let series = build(vec![rec(10, 5), rec(20, 5), rec(30, 5)]);
        // the 10 -> 20 jump happens with a single point present
        assert_eq!(series.xs, vec![10, 20, 21, 29, 30]);
        assert_lockstep(&series);
    }

    #[test]
    fn discchrom_needs_more_than_two_reads() {
        assert_eq!(weighted_discchrom(0, 0.0), 0.0);
        assert_eq!(weighted_discchrom(2, 0.0), 0.0);
        assert!((weighted_discchrom(3, 0.5) - 1.5).abs() < 1e-12);
        assert!((weighted_discchrom(10, 0.25) - 7.5).abs() < 1e-12);
    }

    #[test]
    fn softs_below_ten_percent_of_depth_are_dropped() {
        assert_eq!(filtered_softs(4, 5, 100), 0.0);
        assert_eq!(filtered_softs(5, 5, 100), 10.0);
        assert_eq!(filtered_softs(1, 0, 0), 1.0);

        let mut clipped = rec(2, 20);
        clipped.softstarts = 3;
        let mut noise = rec(3, 100);
        noise.softends = 2;
        let series = build(vec![rec(1, 20), clipped, noise]);
        assert_eq!(series.values(Metric::Softs), &[0.0, 3.0, 0.0]);
        assert_eq!(series.soft_clip_bars(), vec![(2, 3.0)]);
    }

    #[test]
    fn zero_fields_give_flat_series() {
        let series = build((1..=5).map(|p| rec(p, 10)).collect());
        for metric in Metric::ALL {
            let expect = if metric == Metric::Depth { 10.0 } else { 0.0 };
            assert!(series.values(metric).iter().all(|&v| v == expect), "{}", metric.name());
        }
        assert!(series.soft_clip_bars().is_empty());
    }

    #[test]
    fn gc_window_selects_column() {
        let mut r = rec(1, 10);
        r.gc65 = 40;
        r.gc257 = 55;
        let s65 = SampleSeries::from_records("s", vec![Ok(r.clone())], GcWindow::Gc65).unwrap();
        let s257 = SampleSeries::from_records("s", vec![Ok(r)], GcWindow::Gc257).unwrap();
        assert_eq!(s65.values(Metric::Gc), &[40.0]);
        assert_eq!(s257.values(Metric::Gc), &[55.0]);
    }

    #[test]
    fn tracks_chromosomes_seen() {
        let mut other = rec(5, 10);
        other.chrom = "chr2".to_string();
        let series = build(vec![rec(1, 10), rec(2, 10), other]);
        assert_eq!(series.chroms, vec!["chr1".to_string(), "chr2".to_string()]);
    }

    #[test]
    fn record_errors_propagate() {
        let records: Vec<Result<PileRecord, PlotError>> = vec![
            Ok(rec(1, 10)),
            Err(PlotError::EmptyInput { path: "x".to_string() }),
        ];
        assert!(SampleSeries::from_records("s", records, GcWindow::Gc257).is_err());
    }
}
