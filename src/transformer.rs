//! Conversion lifecycle control.
//!
//! A [`FitTransformer`] owns one resolved schema and one set of column
//! accumulators, and drives any number of sequential conversions with them.
//! Per-run state is fully cleared after every run, success or failure, so a
//! single instance can be reused without re-reading configuration;
//! [`FitTransformer::reload`] installs a fresh configuration snapshot when
//! that is actually wanted.

use std::fs::{self, File};
use std::path::Path;

use log::info;
use memmap2::Mmap;

use crate::config::Config;
use crate::emitter::RowEmitter;
use crate::error::{Error, Result};
use crate::fit::Decoder;
use crate::formats::parquet::write_table;
use crate::schema::ResolvedSchema;

/// Outcome of one successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionStats {
    /// Messages delivered by the decoder (unknown-type messages excluded)
    pub mesgs: usize,
    /// Rows written to the output table
    pub rows: usize,
}

impl ConversionStats {
    pub fn summary(&self) -> String {
        format!("{} messages expanded into {} rows", self.mesgs, self.rows)
    }
}

/// Converts FIT files to Parquet tables under one configuration snapshot.
///
/// # Examples
///
/// ```no_run
/// use fit_parquet::{Config, FitTransformer};
///
/// let mut transformer = FitTransformer::new(Config::default());
/// let stats = transformer.convert("activity.fit", "activity.parquet")?;
/// println!("{}", stats.summary());
/// # Ok::<(), fit_parquet::Error>(())
/// ```
pub struct FitTransformer {
    config: Config,
    emitter: RowEmitter,
}

impl FitTransformer {
    /// Resolve the column schema from `config` and build the accumulators.
    pub fn new(config: Config) -> Self {
        let schema = ResolvedSchema::from_config(&config);
        Self {
            config,
            emitter: RowEmitter::new(schema),
        }
    }

    /// The configuration snapshot this transformer was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Install a new configuration snapshot, rebuilding the schema and the
    /// accumulators. The explicit reload operation: nothing short of this
    /// changes the column selection of subsequent runs.
    pub fn reload(&mut self, config: Config) {
        let schema = ResolvedSchema::from_config(&config);
        self.config = config;
        self.emitter = RowEmitter::new(schema);
    }

    /// Convert one FIT file into one Parquet table.
    ///
    /// Fails without writing any output when the input cannot be opened or
    /// does not pass the FIT integrity check. All per-run state is reset on
    /// both success and failure, so the transformer stays reusable.
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        input: P,
        output: Q,
    ) -> Result<ConversionStats> {
        let result = self.run(input.as_ref(), output.as_ref());
        self.emitter.reset();
        result
    }

    fn run(&mut self, input: &Path, output: &Path) -> Result<ConversionStats> {
        let file = File::open(input)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if !Decoder::check_integrity(&mmap) {
            return Err(Error::Integrity(input.display().to_string()));
        }

        let filename = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_uri = fs::canonicalize(input)?.to_string_lossy().into_owned();
        self.emitter.begin_source(filename, file_uri);

        let mut decoder = Decoder::new();
        decoder.decode(&mmap, &mut self.emitter)?;

        let mesgs = self.emitter.mesg_count();
        let (schema, columns) = self.emitter.finish_table();
        let rows = write_table(output, schema, columns)?;

        info!(
            "converted {} -> {} ({mesgs} messages, {rows} rows)",
            input.display(),
            output.display()
        );
        Ok(ConversionStats { mesgs, rows })
    }
}
