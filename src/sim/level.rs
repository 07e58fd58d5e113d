/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, sorted by file name)
///   2. Built-in embedded levels
///
/// ## Level file format (`.txt`):
///   Line 1 (optional): `# Level Name`
///   Lines: map rows, one tile code per cell
///
/// Separators (space, comma, tab, brackets) are ignored, so both
/// `140003` and `[1, 4, 0, 0, 0, 3],` describe the same row.
///
/// ## Tile legend:
///   '0' = Empty    '1' = Solid    '2' = Hazard (spikes)
///   '3' = Goal     '4' = Spawn
///   anything else = Empty

use std::path::Path;

/// Runtime level data (owned, loaded from file or embedded).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub codes: Vec<Vec<u8>>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Levels for a session: the directory's levels if it has any, otherwise
/// the built-in set. Never empty.
pub fn load_levels(levels_dir: &Path) -> Vec<LevelDef> {
    if levels_dir.is_dir() {
        let mut found = load_from_directory(levels_dir);
        if !found.is_empty() {
            found.sort_by(|a, b| a.0.cmp(&b.0));
            log::info!("loaded {} levels from {}", found.len(), levels_dir.display());
            return found.into_iter()
                .enumerate()
                .map(|(i, (_, mut def))| {
                    if def.name.is_empty() {
                        def.name = format!("Level {}", i + 1);
                    }
                    def
                })
                .collect();
        }
    }
    embedded_levels()
}

// ══════════════════════════════════════════════════════════════
// Single-level file parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content. `None` if it has no rows.
/// The name is left empty when the file has no `#` line.
pub fn parse_level_file(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut codes = vec![];

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix('#') {
            if name.is_empty() {
                name = rest.trim().to_string();
            }
            continue;
        }
        let row: Vec<u8> = trimmed
            .chars()
            .filter(|c| !is_separator(*c))
            .map(tile_code)
            .collect();
        if !row.is_empty() {
            codes.push(row);
        }
    }

    if codes.is_empty() {
        return None;
    }

    Some(LevelDef { name, codes })
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '[' | ']')
}

fn tile_code(c: char) -> u8 {
    match c.to_digit(10) {
        Some(d) if d <= 4 => d as u8,
        _ => 0,
    }
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<(String, LevelDef)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log::debug!("no level directory at {}: {e}", dir.display());
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                    continue;
                }
            };
            match parse_level_file(&content) {
                Some(def) => {
                    let filename = path.file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string();
                    results.push((filename, def));
                }
                None => log::warn!("{}: no map rows, skipped", path.display()),
            }
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Level 1", &[
            "111111111111111111111111",
            "140000000000000000000031",
            "111011101110111011101111",
            "100000000010000000100001",
            "101110111011110110111011",
            "100000010001000100010001",
            "111101010101010101010111",
            "100101000100010001000101",
            "100101110111011101200101",
            "100100010001000100200101",
            "100001000100010001000001",
            "111011101110111011101111",
            "100000000000000000000001",
            "101111110111111101111101",
            "100000000000000000000001",
            "111111111111111111111111",
        ]),
        make_embedded("Level 2", &[
            "111111111111111111111111",
            "140000000000000000000031",
            "111011101110111011101111",
            "100000100100010001000001",
            "101110110111011101110101",
            "100000010001000100010101",
            "111101010101010101010101",
            "100001000100010001000101",
            "101101110111011101011101",
            "101000010001000101000101",
            "101011011101110101110101",
            "100012000100010001200001",
            "111011101110111011101111",
            "100000000000000000000001",
            "100000000000000000000001",
            "111111111111111111111111",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        codes: map.iter().map(|row| row.chars().map(tile_code).collect()).collect(),
    }
}
