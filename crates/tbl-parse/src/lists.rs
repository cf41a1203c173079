//! Parenthesized and fixed-count list extractors.
//!
//! Lists look like `( item item ... )`. Items past the caller's maximum are
//! read and discarded with one warning. Running out of input before `)` is
//! treated like a missing `(`.

use crate::error::{ParseError, Result};
use crate::extract::Vec3;
use crate::parser::Parser;

/// Stored in an integer list for a name that could not be resolved.
pub const UNRESOLVED: i32 = -1;

/// What the quoted names in an integer list refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// The quoted text is itself a number.
    RawInteger,
    /// A ship in the current mission. Unknown names abort.
    Ship,
    /// A ship class. Unknown names are dropped along with the counts that
    /// follow them.
    ShipClass,
    /// A weapon in a loadout. Unknown names become [`UNRESOLVED`].
    WeaponList,
    /// A weapon in a pool. Unknown names are dropped along with the counts
    /// that follow them.
    WeaponPool,
}

impl LookupKind {
    pub fn describe(self) -> &'static str {
        match self {
            Self::RawInteger => "integer",
            Self::Ship => "ship",
            Self::ShipClass => "ship class",
            Self::WeaponList | Self::WeaponPool => "weapon",
        }
    }
}

/// Resolves quoted names to indices for [`Parser::stuff_int_list`].
pub trait NameResolver {
    fn resolve(&self, kind: LookupKind, name: &str) -> Option<usize>;
}

impl<F> NameResolver for F
where
    F: Fn(LookupKind, &str) -> Option<usize>,
{
    fn resolve(&self, kind: LookupKind, name: &str) -> Option<usize> {
        self(kind, name)
    }
}

/// Resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl NameResolver for NoResolver {
    fn resolve(&self, _kind: LookupKind, _name: &str) -> Option<usize> {
        None
    }
}

/// Item counter that warns once when a list overflows.
struct Capacity {
    max: usize,
    warned: bool,
}

impl Capacity {
    fn new(max: usize) -> Self {
        Self { max, warned: false }
    }

    fn admit(&mut self, parser: &mut Parser, len: usize, what: &str) -> Result<bool> {
        if len < self.max {
            return Ok(true);
        }
        if !self.warned {
            self.warned = true;
            parser.warning(format!(
                "{what} has more than allowed arguments; max is {}. Arguments over max will be ignored.",
                self.max
            ))?;
        }
        Ok(false)
    }
}

impl Parser {
    /// Consumes the opening `(` of a list.
    fn open_list(&mut self, what: &'static str) -> Result<()> {
        self.skip_white();
        if self.cursor().peek() == Some(b'(') {
            self.cursor_mut().advance();
            return Ok(());
        }
        let (file, line) = self.site();
        let found = self.next_tokens();
        self.abort(ParseError::MalformedList {
            file,
            line,
            what,
            expected: '(',
            found,
        })
    }

    /// Skips whitespace; consumes `)` and returns true at the end of a list.
    fn close_list(&mut self, what: &'static str) -> Result<bool> {
        self.skip_white();
        match self.cursor().peek() {
            Some(b')') => {
                self.cursor_mut().advance();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => {
                let (file, line) = self.site();
                self.abort(ParseError::MalformedList {
                    file,
                    line,
                    what,
                    expected: ')',
                    found: "end of file".to_string(),
                })
            }
        }
    }

    /// Reads `( i* )` where each item is an integer or a quoted name.
    ///
    /// Names are resolved through `resolver` according to `kind`.
    pub fn stuff_int_list(
        &mut self,
        max: usize,
        kind: LookupKind,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<i32>> {
        const WHAT: &str = "integer list";
        self.open_list(WHAT)?;

        let mut values = Vec::new();
        let mut capacity = Capacity::new(max);
        let mut keep_numbers = true;

        while !self.close_list(WHAT)? {
            if self.cursor().peek() == Some(b'"') {
                let name = self.get_string()?;
                let value = match kind {
                    LookupKind::RawInteger => Some(name.trim().parse::<i32>().unwrap_or(0)),
                    LookupKind::Ship => match resolver.resolve(kind, &name) {
                        Some(index) => Some(index as i32),
                        None => {
                            let (file, line) = self.site();
                            return self.abort(ParseError::UnresolvedName {
                                file,
                                line,
                                kind: kind.describe(),
                                name,
                            });
                        }
                    },
                    LookupKind::ShipClass | LookupKind::WeaponPool => {
                        let index = resolver.resolve(kind, &name);
                        keep_numbers = index.is_some();
                        if index.is_none() {
                            tracing::debug!(name = %name, kind = kind.describe(), "Dropping unknown list entry");
                        }
                        index.map(|i| i as i32)
                    }
                    LookupKind::WeaponList => match resolver.resolve(kind, &name) {
                        Some(index) => Some(index as i32),
                        None => {
                            if !name.is_empty() {
                                self.warning(format!("Unable to find weapon [{name}]"))?;
                            }
                            Some(UNRESOLVED)
                        }
                    },
                };

                if let Some(value) = value
                    && capacity.admit(self, values.len(), "Integer list")?
                {
                    values.push(value);
                }
            } else {
                let value = self.stuff_int()?;
                if keep_numbers && capacity.admit(self, values.len(), "Integer list")? {
                    values.push(value);
                }
            }
        }

        Ok(values)
    }

    /// Reads `( f* )`.
    pub fn stuff_float_list(&mut self, max: usize) -> Result<Vec<f32>> {
        const WHAT: &str = "float list";
        self.open_list(WHAT)?;

        let mut values = Vec::new();
        let mut capacity = Capacity::new(max);
        while !self.close_list(WHAT)? {
            let value = self.stuff_float()?;
            if capacity.admit(self, values.len(), "Float list")? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Reads `( (x y z)* )`.
    pub fn stuff_vector_list(&mut self, max: usize) -> Result<Vec<Vec3>> {
        const WHAT: &str = "vector list";
        self.open_list(WHAT)?;

        let mut values = Vec::new();
        let mut capacity = Capacity::new(max);
        while !self.close_list(WHAT)? {
            let value = self.stuff_parenthesized_vector()?;
            if capacity.admit(self, values.len(), "Vector list")? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Reads `( b* )`; items may be separated by commas.
    pub fn stuff_bool_list(&mut self, max: usize) -> Result<Vec<bool>> {
        const WHAT: &str = "boolean list";
        self.open_list(WHAT)?;

        let mut values = Vec::new();
        let mut capacity = Capacity::new(max);
        while !self.close_list(WHAT)? {
            if self.cursor().peek() == Some(b',') {
                self.cursor_mut().advance();
                continue;
            }
            let token = self.boolean_token(b",)")?;
            let value = self.interpret_boolean(&token)?;
            if capacity.admit(self, values.len(), "Boolean list")? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Reads `( "s"* )`.
    pub fn stuff_string_list(&mut self, max: usize) -> Result<Vec<String>> {
        const WHAT: &str = "string list";
        self.skip_white();
        if self.cursor().peek() != Some(b'(') {
            let (file, line) = self.site();
            let found = self.next_tokens();
            return self.abort(ParseError::StringList { file, line, found });
        }
        self.cursor_mut().advance();

        let mut values = Vec::new();
        let mut capacity = Capacity::new(max);
        while !self.close_list(WHAT)? {
            let value = self.get_string()?;
            if capacity.admit(self, values.len(), "String list")? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Reads `( i* )` and sets `marks[i]` for every item.
    ///
    /// Quoted names are resolved through `resolver`. Unknown names and
    /// out-of-range indices are reported and skipped.
    pub fn mark_int_list(
        &mut self,
        marks: &mut [bool],
        kind: LookupKind,
        resolver: &dyn NameResolver,
    ) -> Result<()> {
        const WHAT: &str = "integer list";
        self.open_list(WHAT)?;

        while !self.close_list(WHAT)? {
            let index = if self.cursor().peek() == Some(b'"') {
                let name = self.get_string()?;
                let index = resolver.resolve(kind, &name);
                if index.is_none_or(|i| i >= marks.len()) {
                    self.report_error(format!("Unable to find string \"{name}\" in mark_int_list."))?;
                    continue;
                }
                index
            } else {
                let value = self.stuff_int()?;
                usize::try_from(value).ok()
            };

            match index.and_then(|i| marks.get_mut(i)) {
                Some(mark) => *mark = true,
                None => self.warning(format!(
                    "Index {index:?} out of range for list of {}",
                    marks.len()
                ))?,
            }
        }
        Ok(())
    }

    /// Fills `out` with unparenthesized floats.
    pub fn parse_float_list(&mut self, out: &mut [f32]) -> Result<()> {
        for slot in out.iter_mut() {
            *slot = self.stuff_float()?;
        }
        Ok(())
    }

    /// Fills `out` with unparenthesized integers.
    pub fn parse_int_list(&mut self, out: &mut [i32]) -> Result<()> {
        for slot in out.iter_mut() {
            *slot = self.stuff_int()?;
        }
        Ok(())
    }

    /// Reads a string list of flag names and ORs the matching bits.
    /// Unknown names are warnings.
    pub fn parse_string_flag_list(&mut self, defs: &[(&str, u32)]) -> Result<u32> {
        let names = self.stuff_string_list(defs.len().max(1) * 4)?;
        let mut flags = 0;
        for name in names {
            match defs.iter().find(|(def, _)| def.eq_ignore_ascii_case(&name)) {
                Some((_, bit)) => flags |= bit,
                None => self.warning(format!("Unknown flag [{name}]"))?,
            }
        }
        Ok(flags)
    }
}
