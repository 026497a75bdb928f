use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info};

const DISTRICT_PREFIX: &str = "# ";
const TALUKA_PREFIX: &str = "## ";
const VILLAGE_PREFIX: &str = "- ";

type Talukas = IndexMap<String, Vec<String>>;

/// District → taluka → villages, every level kept in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyTable {
    districts: IndexMap<String, Talukas>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("hierarchy file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read hierarchy file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One `(district, taluka, village)` triple borrowed from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VillageEntry<'a> {
    pub district: &'a str,
    pub taluka: &'a str,
    pub village: &'a str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub districts: usize,
    pub talukas: usize,
    pub villages: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    District(&'a str),
    Taluka(&'a str),
    Village(&'a str),
    Other,
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if let Some(name) = line.strip_prefix(DISTRICT_PREFIX) {
        Line::District(name.trim())
    } else if let Some(name) = line.strip_prefix(TALUKA_PREFIX) {
        Line::Taluka(name.trim())
    } else if let Some(name) = line.strip_prefix(VILLAGE_PREFIX) {
        Line::Village(name.trim())
    } else {
        Line::Other
    }
}

/// Line-at-a-time parser holding the district/taluka cursors.
#[derive(Default)]
struct Builder {
    districts: IndexMap<String, Talukas>,
    district: Option<String>,
    taluka: Option<String>,
}

impl Builder {
    fn feed(&mut self, raw: &str) {
        match classify(raw) {
            Line::District(name) => {
                self.districts.insert(name.to_string(), Talukas::new());
                self.district = Some(name.to_string());
            }
            Line::Taluka(name) => {
                let Some(talukas) = self
                    .district
                    .as_ref()
                    .and_then(|d| self.districts.get_mut(d))
                else {
                    debug!("ignoring taluka {name:?} outside any district");
                    return;
                };
                talukas.insert(name.to_string(), Vec::new());
                self.taluka = Some(name.to_string());
            }
            Line::Village(name) => {
                // The taluka cursor survives a district heading, so the pair
                // may not exist yet under the current district.
                let villages = match (&self.district, &self.taluka) {
                    (Some(d), Some(t)) => self
                        .districts
                        .get_mut(d)
                        .map(|ts| ts.entry(t.clone()).or_default()),
                    _ => None,
                };
                match villages {
                    Some(villages) => villages.push(name.to_string()),
                    None => debug!("ignoring orphan village {name:?}"),
                }
            }
            Line::Other => {}
        }
    }

    fn finish(self) -> HierarchyTable {
        HierarchyTable {
            districts: self.districts,
        }
    }
}

impl HierarchyTable {
    /// Read a markdown outline from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path_ref = path.as_ref();
        let io_err = |source: io::Error| {
            if source.kind() == io::ErrorKind::NotFound {
                LoadError::NotFound(path_ref.to_path_buf())
            } else {
                LoadError::Io {
                    path: path_ref.to_path_buf(),
                    source,
                }
            }
        };

        let file = File::open(path_ref).map_err(io_err)?;
        let reader = BufReader::new(file);
        let mut builder = Builder::default();
        for line in reader.lines() {
            builder.feed(&line.map_err(io_err)?);
        }

        let table = builder.finish();
        let stats = table.stats();
        info!(
            "loaded {} districts, {} talukas, {} villages from {}",
            stats.districts,
            stats.talukas,
            stats.villages,
            path_ref.display()
        );
        Ok(table)
    }

    /// Parse an outline already held in memory.
    pub fn parse(text: &str) -> Self {
        let mut builder = Builder::default();
        for line in text.lines() {
            builder.feed(line);
        }
        builder.finish()
    }

    pub fn districts(&self) -> impl Iterator<Item = &str> {
        self.districts.keys().map(String::as_str)
    }

    pub fn talukas(&self, district: &str) -> Option<impl Iterator<Item = &str>> {
        self.districts
            .get(district)
            .map(|talukas| talukas.keys().map(String::as_str))
    }

    pub fn villages(&self, district: &str, taluka: &str) -> Option<&[String]> {
        self.districts
            .get(district)
            .and_then(|talukas| talukas.get(taluka))
            .map(Vec::as_slice)
    }

    /// Every village in district, then taluka, then village order.
    pub fn iter(&self) -> impl Iterator<Item = VillageEntry<'_>> {
        self.districts.iter().flat_map(|(district, talukas)| {
            talukas.iter().flat_map(move |(taluka, villages)| {
                villages.iter().map(move |village| VillageEntry {
                    district,
                    taluka,
                    village,
                })
            })
        })
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            districts: self.districts.len(),
            talukas: self.districts.values().map(IndexMap::len).sum(),
            villages: self
                .districts
                .values()
                .flat_map(IndexMap::values)
                .map(Vec::len)
                .sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# North West
## Narela
- Alipur
- Bakhtawarpur

## Model Town
- Azadpur
# South
## Mehrauli
- Chhatarpur
";

    #[test]
    fn classifies_prefixes_after_trimming() {
        assert_eq!(classify("  # Central  "), Line::District("Central"));
        assert_eq!(classify("## Kotwali"), Line::Taluka("Kotwali"));
        assert_eq!(classify("\t-  Chandni Chowk "), Line::Village("Chandni Chowk"));
        assert_eq!(classify("#Central"), Line::Other);
        assert_eq!(classify("### Deeper"), Line::Other);
        assert_eq!(classify(""), Line::Other);
    }

    #[test]
    fn groups_villages_under_latest_headings() {
        let table = HierarchyTable::parse(SAMPLE);
        assert_eq!(
            table.villages("North West", "Narela").unwrap(),
            ["Alipur", "Bakhtawarpur"]
        );
        assert_eq!(
            table.villages("North West", "Model Town").unwrap(),
            ["Azadpur"]
        );
        assert_eq!(table.villages("South", "Mehrauli").unwrap(), ["Chhatarpur"]);
        assert_eq!(
            table.districts().collect::<Vec<_>>(),
            ["North West", "South"]
        );
        assert_eq!(
            table.stats(),
            TableStats {
                districts: 2,
                talukas: 3,
                villages: 4
            }
        );
    }

    #[test]
    fn drops_orphans() {
        let table = HierarchyTable::parse(
            "- Nowhere\n## Floating\n- Lost\n# East\n- Also Lost\n## Shahdara\n- Seelampur\n",
        );
        assert_eq!(table.districts().collect::<Vec<_>>(), ["East"]);
        assert_eq!(
            table.talukas("East").unwrap().collect::<Vec<_>>(),
            ["Shahdara"]
        );
        let villages: Vec<_> = table.iter().map(|e| e.village).collect();
        assert_eq!(villages, ["Seelampur"]);
    }

    #[test]
    fn taluka_cursor_carries_into_next_district() {
        let table = HierarchyTable::parse("# A\n## T\n- one\n# B\n- two\n- three\n");
        assert_eq!(table.villages("A", "T").unwrap(), ["one"]);
        assert_eq!(table.villages("B", "T").unwrap(), ["two", "three"]);
        assert_eq!(table.talukas("B").unwrap().collect::<Vec<_>>(), ["T"]);
        assert_eq!(table.stats().villages, 3);
    }

    #[test]
    fn district_heading_alone_creates_no_taluka() {
        let table = HierarchyTable::parse("# A\n## T\n- one\n# B\n# C\n## U\n- two\n");
        assert_eq!(table.talukas("B").unwrap().count(), 0);
        assert_eq!(table.villages("C", "U").unwrap(), ["two"]);
    }

    #[test]
    fn reopened_district_keeps_position_but_resets() {
        let table = HierarchyTable::parse("# A\n## T\n- one\n# B\n## U\n- two\n# A\n## V\n- three\n");
        assert_eq!(table.districts().collect::<Vec<_>>(), ["A", "B"]);
        assert!(table.villages("A", "T").is_none());
        assert_eq!(table.villages("A", "V").unwrap(), ["three"]);
    }

    #[test]
    fn keeps_duplicate_villages_in_order() {
        let table = HierarchyTable::parse("# A\n## T\n- Rampur\n- Kheda\n- Rampur\n");
        assert_eq!(table.villages("A", "T").unwrap(), ["Rampur", "Kheda", "Rampur"]);
    }

    #[test]
    fn load_matches_parse() {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "{SAMPLE}").unwrap();
        let loaded = HierarchyTable::load(file.path()).expect("load");
        assert_eq!(loaded, HierarchyTable::parse(SAMPLE));
        assert_eq!(loaded, HierarchyTable::load(file.path()).expect("reload"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = HierarchyTable::load(dir.path().join("absent.md")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn invalid_utf8_is_io_error() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"# A\n## T\n- \xff\xfe\n").unwrap();
        let err = HierarchyTable::load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
