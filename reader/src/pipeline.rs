use common::{Config, FailurePolicy};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::error::{ReaderError, Result};
use crate::extract::{ArticleExtractor, ReadabilityExtractor};
use crate::fetch::Fetcher;
use crate::normalize;

/// One output line: the URL and its article text, or the error that replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub url: String,
    pub text: String,
    /// Only ever set under `FailurePolicy::Record`
    pub error: Option<String>,
}

impl ResultRow {
    fn failed(url: &str, err: &ReaderError) -> Self {
        Self {
            url: url.to_string(),
            text: String::new(),
            error: Some(format!("{}: {}", err.kind(), err)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows_written: usize,
    pub failures: usize,
    pub output_path: PathBuf,
}

/// Fetch → extract → normalize over a URL list, one URL at a time.
pub struct Pipeline {
    fetcher: Fetcher,
    extractor: Box<dyn ArticleExtractor>,
    policy: FailurePolicy,
    skip_blank_lines: bool,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, extractor: Box<dyn ArticleExtractor>) -> Self {
        Self {
            fetcher,
            extractor,
            policy: FailurePolicy::Abort,
            skip_blank_lines: false,
        }
    }

    /// Readability-backed pipeline using the fetch and pipeline sections of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Fetcher::from_config(config)?;
        Ok(Self::new(fetcher, Box::new(ReadabilityExtractor))
            .with_policy(config.pipeline.on_error)
            .with_skip_blank_lines(config.pipeline.skip_blank_lines))
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_skip_blank_lines(mut self, skip: bool) -> Self {
        self.skip_blank_lines = skip;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Runs a single URL through all three stages.
    pub async fn process_url(&self, url: &str) -> Result<String> {
        let page = self.fetcher.fetch(url).await?;
        let fragment = self.extractor.extract(&page.body, url)?;
        normalize::normalize(&fragment)
    }

    /// Processes `urls` in order. Under `Abort` the first error is returned and
    /// every row collected so far is dropped.
    pub async fn collect(&self, urls: &[String]) -> Result<Vec<ResultRow>> {
        let mut rows = Vec::with_capacity(urls.len());

        for url in urls {
            println!("url: '{}'", url);
            info!(url = %url, "pipeline: processing");

            match self.process_url(url).await {
                Ok(text) => rows.push(ResultRow { url: url.clone(), text, error: None }),
                Err(e) => match self.policy {
                    FailurePolicy::Abort => {
                        error!(url = %url, kind = e.kind(), error = %e, "pipeline: aborting run");
                        return Err(e);
                    }
                    FailurePolicy::Record => {
                        warn!(url = %url, kind = e.kind(), error = %e, "pipeline: recording failure");
                        rows.push(ResultRow::failed(url, &e));
                    }
                },
            }
        }

        Ok(rows)
    }

    /// Reads the URL list at `input`, processes it and writes the CSV to `output`.
    ///
    /// The output file is only opened once every URL has been handled, so a
    /// failed run under `Abort` leaves any previous file untouched.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        let contents = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| ReaderError::io(input, e))?;
        let urls = parse_url_list(&contents, self.skip_blank_lines);
        info!(input = %input.display(), count = urls.len(), "pipeline: url list loaded");

        let rows = self.collect(&urls).await?;
        let bytes = encode_rows(&rows, self.policy)?;

        tokio::fs::write(output, bytes)
            .await
            .map_err(|e| ReaderError::io(output, e))?;

        let summary = RunSummary {
            rows_written: rows.len(),
            failures: rows.iter().filter(|r| r.error.is_some()).count(),
            output_path: output.to_path_buf(),
        };
        info!(
            output = %output.display(),
            rows = summary.rows_written,
            failures = summary.failures,
            "pipeline: results written"
        );

        Ok(summary)
    }
}

/// One URL per line with trailing whitespace removed. `\n`, `\r\n` and a lone
/// `\r` all end a line. Blank lines are kept unless `skip_blank` is set.
pub fn parse_url_list(contents: &str, skip_blank: bool) -> Vec<String> {
    let unified = contents.replace("\r\n", "\n");
    unified
        .split_terminator(['\r', '\n'])
        .map(str::trim_end)
        .filter(|line| !(skip_blank && line.is_empty()))
        .map(str::to_string)
        .collect()
}

/// Serializes rows as headerless CSV with CRLF line endings.
/// `Record` adds a third column holding the error, empty on success.
pub fn encode_rows(rows: &[ResultRow], policy: FailurePolicy) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    for row in rows {
        match policy {
            FailurePolicy::Abort => writer.write_record([&row.url, &row.text])?,
            FailurePolicy::Record => {
                let error = row.error.as_deref().unwrap_or("");
                writer.write_record([row.url.as_str(), row.text.as_str(), error])?
            }
        }
    }

    writer
        .into_inner()
        .map_err(|e| ReaderError::Csv(csv::Error::from(e.into_error())))
}
