//! Modular table loading.
//!
//! A registry is built from up to three layers, parsed in order into the
//! same [`Registry`]:
//!
//! 1. The default table compiled into the binary
//! 2. The base table on disk, if present
//! 3. Overlay files matching a glob, in reverse-lexicographic order
//!
//! Each file is parsed under [`tbl_parse::parse_guarded`], so a broken
//! overlay is logged and recorded in the [`LoadOutcome`] without stopping
//! the files after it.

use globset::GlobBuilder;
use serde::{Deserialize, Serialize};
use tbl_parse::{
    Choice, FileSystem, ParseConfig, ParseError, Parser, PathType, SourceText, StringKind,
};

use crate::error::{Result, TableError};
use crate::registry::{Record, Registry};

/// Marker that makes a record patch an existing one instead of adding one.
pub const NO_CREATE: &str = "+nocreate";

/// Header that closes a table section.
pub const END_TAG: &str = "#End";

/// Describes one kind of modular table.
pub trait TableKind {
    type Record: Record;

    /// Section header, e.g. `#AI Profiles`.
    const SECTION: &'static str;
    /// Tag that starts a record and carries its name.
    const NAME_TAG: &'static str;
    /// Optional tag naming the default record.
    const DEFAULT_TAG: &'static str;
    /// Table file on disk.
    const BASE_FILE: &'static str;
    /// Glob for overlay files.
    const OVERLAY_PATTERN: &'static str;
    /// Record ceiling when [`LoadConfig::max_records`] is unset.
    const MAX_RECORDS: usize;
    /// Default table compiled into the binary.
    const EMBEDDED: &'static str;

    /// Parses the field at the cursor into `record`.
    ///
    /// Returns `false` when the field is not one this kind knows.
    fn parse_field(parser: &mut Parser, record: &mut Self::Record) -> tbl_parse::Result<bool>;
}

/// Settings for a modular load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub parse: ParseConfig,
    /// Overrides the kind's record ceiling.
    pub max_records: Option<usize>,
}

/// A file that failed to load.
#[derive(Debug)]
pub struct FileFailure {
    pub file: String,
    pub error: ParseError,
}

/// What happened during a modular load.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Files parsed to completion, in load order.
    pub parsed: Vec<String>,
    /// Files abandoned after an abort, in load order.
    pub failures: Vec<FileFailure>,
}

impl LoadOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, file: &str, result: tbl_parse::Result<()>) {
        match result {
            Ok(()) => self.parsed.push(file.to_string()),
            Err(error) => self.failures.push(FileFailure {
                file: file.to_string(),
                error,
            }),
        }
    }
}

/// Loads the default, base and overlay tables for `K` into a new registry.
pub fn load_registry<K: TableKind>(
    fs: &dyn FileSystem,
    base_filename: &str,
    overlay_pattern: &str,
    config: &LoadConfig,
) -> Result<(Registry<K::Record>, LoadOutcome)> {
    let matcher = GlobBuilder::new(overlay_pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map_err(|source| TableError::InvalidPattern {
            pattern: overlay_pattern.to_string(),
            source,
        })?
        .compile_matcher();

    let mut registry = Registry::new(config.max_records.unwrap_or(K::MAX_RECORDS));
    let mut outcome = LoadOutcome::default();

    let embedded = SourceText::from_array(K::EMBEDDED, &config.parse).and_then(|source| {
        tbl_parse::parse_guarded(source, config.parse.clone(), |p| {
            parse_table::<K>(p, &mut registry)
        })
    });
    outcome.record(tbl_parse::INTERNAL_FILENAME, embedded);

    if fs.exists(base_filename, PathType::Tables) {
        let base = tbl_parse::parse_file(
            fs,
            base_filename,
            PathType::Tables,
            config.parse.clone(),
            |p| parse_table::<K>(p, &mut registry),
        );
        outcome.record(base_filename, base);
    }

    let mut overlays: Vec<String> = fs
        .list(PathType::Tables)
        .map_err(|source| TableError::ListFiles {
            path_type: PathType::Tables,
            source,
        })?
        .into_iter()
        .filter(|name| matcher.is_match(name))
        .collect();
    overlays.sort_unstable_by(|a, b| b.cmp(a));

    for name in &overlays {
        let result = tbl_parse::parse_file(fs, name, PathType::Tables, config.parse.clone(), |p| {
            parse_table::<K>(p, &mut registry)
        });
        outcome.record(name, result);
    }

    let default_index = registry.resolve_default();
    tracing::info!(
        table = base_filename,
        records = registry.len(),
        overlays = overlays.len(),
        failures = outcome.failures.len(),
        default_index,
        "Loaded modular table"
    );
    Ok((registry, outcome))
}

/// Loads `K` from its own base file and overlay pattern.
pub fn load_kind<K: TableKind>(
    fs: &dyn FileSystem,
    config: &LoadConfig,
) -> Result<(Registry<K::Record>, LoadOutcome)> {
    load_registry::<K>(fs, K::BASE_FILE, K::OVERLAY_PATTERN, config)
}

/// Parses one table file into `registry`.
pub fn parse_table<K: TableKind>(
    p: &mut Parser,
    registry: &mut Registry<K::Record>,
) -> tbl_parse::Result<()> {
    p.required_string(K::SECTION)?;

    if p.optional_string(K::DEFAULT_TAG) {
        let name = p.stuff_string(StringKind::Name, None, None)?;
        registry.set_default_name(name);
    }

    while p.required_string_either(END_TAG, K::NAME_TAG)? == Choice::Second {
        p.required_string(K::NAME_TAG)?;
        let name = p.stuff_string(StringKind::Name, None, None)?;
        p.set_context(format!("{} {name}", K::NAME_TAG));

        let max_records = registry.max_records();
        let mut scratch = K::Record::default();
        let record = if p.optional_string(NO_CREATE) {
            match registry.lookup(&name) {
                Some(index) => registry.get_mut(index),
                None => {
                    p.warning(format!(
                        "Record [{name}] marked {NO_CREATE} does not exist; its fields are ignored."
                    ))?;
                    Some(&mut scratch)
                }
            }
        } else {
            registry
                .create(&name)
                .and_then(|index| registry.get_mut(index))
        };

        let Some(record) = record else {
            p.warning(format!(
                "Too many records in {}! Max is {}.",
                p.filename(),
                max_records
            ))?;
            p.clear_context();
            p.skip_to_start_of_string(END_TAG, None);
            break;
        };

        parse_fields::<K>(p, record)?;
        p.clear_context();
    }

    p.required_string(END_TAG)?;
    Ok(())
}

/// Reads fields until the next record or the end of the section. Unknown
/// fields are skipped.
fn parse_fields<K: TableKind>(p: &mut Parser, record: &mut K::Record) -> tbl_parse::Result<()> {
    while !p.check_for_string(K::NAME_TAG) && !p.check_for_string(END_TAG) {
        if p.check_for_eof() {
            break;
        }
        if !K::parse_field(p, record)? {
            tracing::trace!(file = %p.filename(), line = p.line_number(), field = %p.next_tokens(), "Skipping unknown field");
            p.advance_to_eoln("");
        }
        p.skip_to_start_of_string_either("$", "#", None);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Point {
        name: String,
        x: i32,
        y: i32,
    }

    impl Record for Point {
        fn name(&self) -> &str {
            &self.name
        }

        fn set_name(&mut self, name: String) {
            self.name = name;
        }
    }

    struct Points;

    impl TableKind for Points {
        type Record = Point;

        const SECTION: &'static str = "#Points";
        const NAME_TAG: &'static str = "$Point:";
        const DEFAULT_TAG: &'static str = "$Default Point:";
        const BASE_FILE: &'static str = "points.tbl";
        const OVERLAY_PATTERN: &'static str = "*-pts.tbm";
        const MAX_RECORDS: usize = 3;
        const EMBEDDED: &'static str = "#Points\n$Point: Origin\n$X: 0\n$Y: 0\n#End\n";

        fn parse_field(parser: &mut Parser, record: &mut Point) -> tbl_parse::Result<bool> {
            if parser.optional_string("$X:") {
                record.x = parser.stuff_int()?;
            } else if parser.optional_string("$Y:") {
                record.y = parser.stuff_int()?;
            } else {
                return Ok(false);
            }
            Ok(true)
        }
    }

    fn parse(text: &str, registry: &mut Registry<Point>) -> tbl_parse::Result<()> {
        let mut p = Parser::from_text("points.tbl", text, ParseConfig::default())?;
        parse_table::<Points>(&mut p, registry)
    }

    #[test]
    fn test_nocreate_patches_in_place() {
        let mut registry = Registry::new(3);
        parse("#Points\n$Point: P0\n$X: 1\n$Y: 2\n#End\n", &mut registry).unwrap();
        parse(
            "#Points\n$Point: p0\n+nocreate\n$Y: 9\n$Point: P1\n$Y: 5\n#End\n",
            &mut registry,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        let p0 = registry.get(0).unwrap();
        assert_eq!((p0.x, p0.y), (1, 9));
        let p1 = registry.get(1).unwrap();
        assert_eq!((p1.name.as_str(), p1.x, p1.y), ("P1", 1, 5));
    }

    #[test]
    fn test_unknown_nocreate_is_discarded() {
        let mut registry = Registry::new(3);
        parse(
            "#Points\n$Point: Ghost\n+nocreate\n$X: 4\n$Point: Real\n$X: 2\n#End\n",
            &mut registry,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(0).unwrap().x, 2);
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let mut registry = Registry::new(3);
        parse(
            "#Points\n$Point: A\n$Color: red\n  extra line\n$Y: 3\n#End\n",
            &mut registry,
        )
        .unwrap();
        assert_eq!(registry.get(0).unwrap().y, 3);
    }

    #[test]
    fn test_ceiling_skips_rest_of_file() {
        let mut registry = Registry::new(1);
        parse(
            "#Points\n$Point: A\n$X: 1\n$Point: B\n$X: 2\n#End\n",
            &mut registry,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(0).unwrap().x, 1);
    }

    #[test]
    fn test_missing_end_aborts() {
        let mut registry = Registry::new(3);
        let err = parse("#Points\n$Point: A\n$X: 1\n", &mut registry).unwrap_err();
        assert_eq!(err.code(), tbl_parse::AbortCode::MissingEither);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_default_tag() {
        let mut registry = Registry::new(3);
        parse(
            "#Points\n$Default Point: b\n$Point: A\n$Point: B\n#End\n",
            &mut registry,
        )
        .unwrap();
        assert_eq!(registry.resolve_default(), 1);
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = tempfile::TempDir::new().unwrap();
        let fs = tbl_parse::DirFileSystem::new(dir.path());
        let err = load_registry::<Points>(&fs, "points.tbl", "[", &LoadConfig::default())
            .unwrap_err();
        assert!(matches!(err, TableError::InvalidPattern { .. }));
    }
}
