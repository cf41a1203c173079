//! Name lookups against caller-supplied string lists.

use crate::error::Result;
use crate::parser::Parser;
use crate::strings::StringKind;

/// Case-insensitive index of `name` in `list`.
pub fn string_lookup<S: AsRef<str>>(name: &str, list: &[S]) -> Option<usize> {
    list.iter()
        .position(|entry| entry.as_ref().eq_ignore_ascii_case(name))
}

impl Parser {
    /// [`string_lookup`] that warns when the name is missing.
    pub fn lookup_or_warn<S: AsRef<str>>(
        &mut self,
        name: &str,
        list: &[S],
        description: &str,
    ) -> Result<Option<usize>> {
        let index = string_lookup(name, list);
        if index.is_none() {
            self.warning(format!("Unable to find [{name}] in {description} list."))?;
        }
        Ok(index)
    }

    /// Consumes the required `id`, reads a string of `kind` and looks it up.
    pub fn find_and_stuff<S: AsRef<str>>(
        &mut self,
        id: &str,
        kind: StringKind,
        list: &[S],
        description: &str,
    ) -> Result<Option<usize>> {
        self.required_string(id)?;
        let name = self.stuff_string(kind, None, None)?;
        self.lookup_or_warn(&name, list, description)
    }

    /// Like [`Self::find_and_stuff`] but `id` may be absent, in which case
    /// `slot` is left untouched. Returns whether `id` was present.
    pub fn find_and_stuff_optional<S: AsRef<str>>(
        &mut self,
        id: &str,
        kind: StringKind,
        list: &[S],
        description: &str,
        slot: &mut Option<usize>,
    ) -> Result<bool> {
        if !self.optional_string(id) {
            return Ok(false);
        }
        let name = self.stuff_string(kind, None, None)?;
        *slot = self.lookup_or_warn(&name, list, description)?;
        Ok(true)
    }

    /// Reads a string of `kind` at the cursor and looks it up quietly.
    pub fn match_and_stuff<S: AsRef<str>>(
        &mut self,
        kind: StringKind,
        list: &[S],
    ) -> Result<Option<usize>> {
        let name = self.stuff_string(kind, None, None)?;
        Ok(string_lookup(&name, list))
    }

    /// Consumes the required `id`, reads a string and returns its index in
    /// `list`, appending it when missing. Returns `None` with a warning when
    /// the list already holds `max` entries.
    pub fn find_and_stuff_or_add(
        &mut self,
        id: &str,
        kind: StringKind,
        list: &mut Vec<String>,
        max: usize,
        description: &str,
    ) -> Result<Option<usize>> {
        self.required_string(id)?;
        let name = self.stuff_string(kind, None, None)?;

        if let Some(index) = string_lookup(&name, list.as_slice()) {
            return Ok(Some(index));
        }
        if list.len() >= max {
            self.warning(format!(
                "Cannot add [{name}] to {description} list; max is {max}."
            ))?;
            return Ok(None);
        }
        list.push(name);
        Ok(Some(list.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseConfig;

    const SPECIES: [&str; 3] = ["Terran", "Vasudan", "Shivan"];

    fn parser(text: &str) -> Parser {
        Parser::from_text("test.tbl", text, ParseConfig::default()).unwrap()
    }

    #[test]
    fn test_string_lookup_case_insensitive() {
        assert_eq!(string_lookup("SHIVAN", &SPECIES), Some(2));
        assert_eq!(string_lookup("Ancient", &SPECIES), None);
    }

    #[test]
    fn test_find_and_stuff() {
        let mut p = parser("$Species: vasudan\n$Species: Ancient\n");
        let first = p.find_and_stuff("$Species:", StringKind::Name, &SPECIES, "species");
        assert_eq!(first.unwrap(), Some(1));
        let second = p.find_and_stuff("$Species:", StringKind::Name, &SPECIES, "species");
        assert_eq!(second.unwrap(), None);
        assert_eq!(p.diagnostics().warnings, 1);
    }

    #[test]
    fn test_find_and_stuff_optional_leaves_slot() {
        let mut p = parser("$Other: x\n");
        let mut slot = Some(0);
        let present = p
            .find_and_stuff_optional("$Species:", StringKind::Name, &SPECIES, "species", &mut slot)
            .unwrap();
        assert!(!present);
        assert_eq!(slot, Some(0));
    }

    #[test]
    fn test_match_and_stuff_is_quiet() {
        let mut p = parser("Ancient\n");
        assert_eq!(p.match_and_stuff(StringKind::Name, &SPECIES).unwrap(), None);
        assert_eq!(p.diagnostics().warnings, 0);
    }

    #[test]
    fn test_find_and_stuff_or_add() {
        let mut p = parser("$Team: Hostile\n$Team: friendly\n$Team: Unknown\n");
        let mut teams = vec!["Friendly".to_string()];
        assert_eq!(
            p.find_and_stuff_or_add("$Team:", StringKind::Name, &mut teams, 2, "team")
                .unwrap(),
            Some(1)
        );
        assert_eq!(
            p.find_and_stuff_or_add("$Team:", StringKind::Name, &mut teams, 2, "team")
                .unwrap(),
            Some(0)
        );
        assert_eq!(
            p.find_and_stuff_or_add("$Team:", StringKind::Name, &mut teams, 2, "team")
                .unwrap(),
            None
        );
        assert_eq!(teams, vec!["Friendly", "Hostile"]);
    }
}
